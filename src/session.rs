//! Session manager: at most one live log stream, forwarded to a line sink.
//!
//! Every mutation of the current session and every sink write happens under
//! one lock, so a `start` cannot interleave with a callback of the session it
//! replaces. Each session carries a generation number and callbacks from any
//! other generation are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, trace, warn};

use crate::config::{Config, DEFAULT_STATUS_LINE};
use crate::error::Error;
use crate::sink::LineSink;
use crate::target::{DEFAULT_ADDRESS, Target};
use crate::transport::{Transport, TransportEvents, TransportHandle};

/// Prefix distinguishing transport errors from log content
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Whether a session is currently forwarding lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live session
    Idle,
    /// A live session is forwarding lines
    Streaming,
}

/// Behaviour knobs for a [`SessionManager`]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Address used for targets that do not name one
    pub default_address: String,
    /// First line shown for every new session
    pub status_line: String,
    /// Show transport errors inline
    pub show_errors: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_address: DEFAULT_ADDRESS.to_string(),
            status_line: DEFAULT_STATUS_LINE.to_string(),
            show_errors: true,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_address: config.server.address.clone(),
            status_line: config.stream.status_line.clone(),
            show_errors: config.stream.show_errors,
        }
    }
}

/// One streaming attempt
#[derive(Debug)]
struct Session {
    id: u64,
    target: Target,
    endpoint: String,
    handle: Box<dyn TransportHandle>,
}

struct Shared {
    sink: Box<dyn LineSink>,
    current: Option<Session>,
    next_id: u64,
}

impl Shared {
    fn is_current(&self, session_id: u64) -> bool {
        self.current.as_ref().is_some_and(|s| s.id == session_id)
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the single live log stream session
pub struct SessionManager {
    shared: Arc<Mutex<Shared>>,
    transport: Box<dyn Transport>,
    settings: SessionSettings,
}

impl SessionManager {
    /// Create an idle manager with default settings
    pub fn new(transport: impl Transport + 'static, sink: impl LineSink + 'static) -> Self {
        Self::with_settings(transport, sink, SessionSettings::default())
    }

    pub fn with_settings(
        transport: impl Transport + 'static,
        sink: impl LineSink + 'static,
        settings: SessionSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                sink: Box::new(sink),
                current: None,
                next_id: 0,
            })),
            transport: Box::new(transport),
            settings,
        }
    }

    /// Switch to streaming `target`.
    ///
    /// A target without a resource id is ignored entirely. Otherwise the sink
    /// is cleared, any live session is closed, the status line is shown and a
    /// new connection is opened. When this returns the sink holds only the
    /// status line.
    pub fn start(&self, target: Target) {
        let Some(endpoint) = target.endpoint(&self.settings.default_address) else {
            debug!("Ignoring start without a resource id");
            return;
        };
        if !target.is_url_safe() {
            warn!("Resource id {:?} may not be routable by the log source", target.resource_id());
        }

        let mut shared = lock(&self.shared);

        shared.sink.clear();
        if let Some(previous) = shared.current.take() {
            info!("Closing session {} for {}", previous.id, previous.target);
            previous.handle.close();
        }
        shared.sink.append(self.settings.status_line.clone());

        shared.next_id += 1;
        let id = shared.next_id;
        let events = Arc::new(SessionEvents {
            shared: Arc::downgrade(&self.shared),
            session_id: id,
            show_errors: self.settings.show_errors,
        });

        info!("Starting session {} for {} at {}", id, target, endpoint);
        let handle = self.transport.open(&endpoint, events);
        shared.current = Some(Session {
            id,
            target,
            endpoint,
            handle,
        });
    }

    /// Start streaming `resource_id`, on `address` or the default address
    pub fn start_at(&self, address: Option<&str>, resource_id: &str) {
        let target = match address {
            Some(address) => Target::new(resource_id).with_address(address),
            None => Target::new(resource_id),
        };
        self.start(target);
    }

    /// Close the live session, if any. The sink keeps its lines.
    pub fn stop(&self) {
        let mut shared = lock(&self.shared);
        if let Some(session) = shared.current.take() {
            info!("Stopping session {} for {}", session.id, session.target);
            session.handle.close();
        }
    }

    pub fn state(&self) -> SessionState {
        if lock(&self.shared).current.is_some() {
            SessionState::Streaming
        } else {
            SessionState::Idle
        }
    }

    pub fn current_target(&self) -> Option<Target> {
        lock(&self.shared).current.as_ref().map(|s| s.target.clone())
    }

    pub fn current_endpoint(&self) -> Option<String> {
        lock(&self.shared).current.as_ref().map(|s| s.endpoint.clone())
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Routes one session's transport events into the sink
struct SessionEvents {
    shared: Weak<Mutex<Shared>>,
    session_id: u64,
    show_errors: bool,
}

impl SessionEvents {
    fn with_current(&self, event: &str, f: impl FnOnce(&mut Shared)) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut shared = lock(&shared);
        if shared.is_current(self.session_id) {
            f(&mut shared);
        } else {
            trace!("Dropping {} from stale session {}", event, self.session_id);
        }
    }
}

impl TransportEvents for SessionEvents {
    fn on_message(&self, line: String) {
        self.with_current("message", |shared| shared.sink.append(line));
    }

    fn on_error(&self, error: &Error) {
        let show_errors = self.show_errors;
        self.with_current("error", |shared| {
            if show_errors {
                shared.sink.append(format!("{}{}", ERROR_PREFIX, error));
            }
        });
    }

    fn on_close(&self) {
        self.with_current("close", |shared| {
            if let Some(session) = shared.current.take() {
                info!("Session {} for {} ended", session.id, session.target);
                session.handle.close();
            }
        });
    }
}
