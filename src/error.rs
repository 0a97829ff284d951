use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as TungsteniteError;
use tracing_subscriber::filter::ParseError as TracingParseError;
use toml::de::Error as TomlDeError;

/// Result type alias with our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the log stream client
#[derive(Error, Debug)]
pub enum Error {
    /// WebSocket connection or protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] TungsteniteError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parsing error
    #[error("Config error: {0}")]
    Config(#[from] TomlDeError),

    /// Log filter directive could not be parsed
    #[error("Logging error: {0}")]
    Logging(#[from] TracingParseError),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Endpoint could not be turned into a WebSocket request
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport was created outside of a tokio runtime
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}
