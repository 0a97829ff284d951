use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvents, TransportHandle};

/// WebSocket transport running its connections on a tokio runtime
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    runtime: Handle,
}

impl WebSocketTransport {
    /// Create a transport bound to the runtime of the calling context
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;
        Ok(Self { runtime })
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, url: &str, events: Arc<dyn TransportEvents>) -> Box<dyn TransportHandle> {
        tracing::info!("Opening log stream connection to: {}", url);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let closed = Arc::new(AtomicBool::new(false));
        let events = GuardedEvents {
            inner: events,
            closed: closed.clone(),
        };

        self.runtime
            .spawn(run_connection(url.to_string(), events, shutdown_rx));

        Box::new(WebSocketHandle {
            url: url.to_string(),
            closed,
            shutdown: Mutex::new(Some(shutdown_tx)),
        })
    }
}

/// Handle to one WebSocket connection
pub struct WebSocketHandle {
    url: String,
    closed: Arc<AtomicBool>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl fmt::Debug for WebSocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketHandle")
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl TransportHandle for WebSocketHandle {
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!("Closing log stream connection to: {}", self.url);

        let sender = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            // The task may already be gone after a remote close
            let _ = sender.send(());
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for WebSocketHandle {
    /// Dropping a handle ends its connection
    fn drop(&mut self) {
        self.close();
    }
}

/// Forwards events until the owning handle is closed
///
/// The flag is checked before each callback, so a `close()` racing with a
/// callback in flight does not stop that one callback.
struct GuardedEvents {
    inner: Arc<dyn TransportEvents>,
    closed: Arc<AtomicBool>,
}

impl GuardedEvents {
    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    fn message(&self, line: String) {
        if self.is_open() {
            self.inner.on_message(line);
        }
    }

    fn error(&self, error: Error) {
        tracing::error!("{}", error);
        if self.is_open() {
            self.inner.on_error(&error);
        }
    }

    fn close(&self) {
        if self.is_open() {
            self.inner.on_close();
        }
    }
}

async fn run_connection(url: String, events: GuardedEvents, mut shutdown: oneshot::Receiver<()>) {
    let request = match url.as_str().into_client_request() {
        Ok(request) => request,
        Err(e) => {
            events.error(Error::InvalidUrl(format!("{}: {}", url, e)));
            events.close();
            return;
        }
    };

    let connected = tokio::select! {
        _ = &mut shutdown => {
            tracing::debug!("Connection to {} closed before it was established", url);
            return;
        }
        result = connect_async(request) => result,
    };

    let mut stream = match connected {
        Ok((stream, response)) => {
            tracing::info!("Connected to {}! Response status: {:?}", url, response.status());
            tracing::debug!("Response headers: {:?}", response.headers());
            stream
        }
        Err(e) => {
            events.error(Error::from(e));
            events.close();
            return;
        }
    };

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(e) = stream.close(None).await {
                    tracing::debug!("Failed to send close frame to {}: {}", url, e);
                }
                tracing::info!("Connection to {} closed locally", url);
                return;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    tracing::trace!("Received text message, length: {}", text.len());
                    events.message(text);
                }
                Some(Ok(Message::Binary(bin))) => {
                    tracing::debug!("Received binary message, length: {}", bin.len());
                    events.message(String::from_utf8_lossy(&bin).into_owned());
                }
                Some(Ok(Message::Ping(_))) => {
                    tracing::debug!("Received ping from server");
                }
                Some(Ok(Message::Pong(_))) => {
                    tracing::debug!("Received pong from server");
                }
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        tracing::info!("Received close frame: code={}, reason={}", frame.code, frame.reason);
                    } else {
                        tracing::info!("Received close frame");
                    }
                }
                Some(Ok(Message::Frame(frame))) => {
                    tracing::debug!("Received raw frame: {:?}", frame);
                }
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    break;
                }
                Some(Err(e)) => {
                    // The stream is finished after any read error
                    events.error(Error::from(e));
                    break;
                }
            }
        }
    }

    tracing::info!("Connection to {} ended", url);
    events.close();
}
