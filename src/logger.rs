use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::Result;

/// Environment variable holding a filter directive such as
/// `logstream_client=trace,tokio_tungstenite=debug`
pub const LOG_ENV: &str = "LOGSTREAM_LOG";

/// Build the level filter from the debug flag and an optional directive
pub fn build_filter(debug: bool, directive: Option<&str>) -> Result<Targets> {
    if let Some(directive) = directive.filter(|d| !d.trim().is_empty()) {
        return Ok(directive.parse::<Targets>()?);
    }

    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    Ok(Targets::new().with_default(level))
}

/// Initialize logging with the specified debug level
///
/// Log output goes to stderr so that streamed lines on stdout stay clean.
pub fn init_logging(debug: bool) -> Result<()> {
    let directive = std::env::var(LOG_ENV).ok();
    let targets = build_filter(debug, directive.as_deref())?;

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_level(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(targets.clone());

    subscriber.init();

    tracing::info!("Logging initialized with filter: {:?}", targets);
    Ok(())
}
