//! Follow one remote log stream at a time and render it as ordered lines.
//!
//! - `session`: the session manager owning the single live stream.
//! - `transport`: streaming connections, with a WebSocket implementation.
//! - `sink`: presentation surfaces receiving lines.
//! - `target`: what to stream and how its endpoint is resolved.

pub mod config;
pub mod error;
pub mod logger;
pub mod session;
pub mod sink;
pub mod target;
pub mod terminal;
pub mod transport;

pub use error::{Error, Result};
pub use session::{SessionManager, SessionSettings, SessionState};
pub use sink::{LineSink, MemorySink};
pub use target::Target;
pub use transport::{Transport, TransportEvents, TransportHandle, WebSocketTransport};
