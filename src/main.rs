use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use logstream_client::config::Config;
use logstream_client::error::Result;
use logstream_client::logger::init_logging;
use logstream_client::terminal::{Command, TerminalSink, display_error, parse_command};
use logstream_client::{SessionManager, SessionSettings, Target, WebSocketTransport};

/// Follow a remote log stream, one resource at a time
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Resource to stream first (for example a task or host name)
    resource_id: Option<String>,

    /// Log source address as host:port or ws:// URL
    #[arg(short, long)]
    address: Option<String>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Do not show transport errors in the stream
    #[arg(long, default_value_t = false)]
    no_errors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug)?;

    let mut config = Config::load(cli.config)?;
    if let Some(address) = cli.address {
        config.server.address = address;
    }
    if cli.no_errors {
        config.stream.show_errors = false;
    }

    let transport = WebSocketTransport::new()?;
    let manager = SessionManager::with_settings(
        transport,
        TerminalSink::new(),
        SessionSettings::from(&config),
    );

    let initial = cli.resource_id.or(config.stream.resource_id.clone());
    manager.start(Target::from_parts(None, initial));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(input)) => match parse_command(&input) {
                    Command::Start { address, resource_id } => {
                        manager.start_at(address.as_deref(), &resource_id);
                    }
                    Command::Stop => manager.stop(),
                    Command::Quit => break,
                    Command::Invalid(message) => display_error(&message),
                    Command::Nothing => {}
                },
                Ok(None) => {
                    tracing::debug!("stdin closed, streaming until interrupted");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::error!("IO error: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    manager.stop();
    Ok(())
}
