//! Streaming transports feeding a session.
//!
//! A [`Transport`] opens one connection per call and reports what happens on
//! it through a [`TransportEvents`] subscriber. The returned
//! [`TransportHandle`] is the only way to end the connection.

mod websocket;

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Error;

pub use websocket::{WebSocketHandle, WebSocketTransport};

/// Callbacks registered once per connection
pub trait TransportEvents: Send + Sync {
    /// One inbound frame, as text
    fn on_message(&self, line: String);

    /// Something went wrong; the connection may still be usable
    fn on_error(&self, error: &Error);

    /// The connection is gone and will not deliver anything else
    fn on_close(&self);
}

/// Live connection handle
pub trait TransportHandle: Send + Sync + Debug {
    /// Request termination. Idempotent, also before the connection is up.
    ///
    /// Events starting after this returns are dropped. A callback already
    /// running on another thread may still finish; `SessionManager` discards
    /// those by session generation.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Opens streaming connections
pub trait Transport: Send + Sync {
    /// Start connecting to `url` in the background and return immediately.
    ///
    /// Implementations must not invoke `events` before returning.
    fn open(&self, url: &str, events: Arc<dyn TransportEvents>) -> Box<dyn TransportHandle>;
}
