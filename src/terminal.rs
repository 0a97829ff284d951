use std::io::{self, IsTerminal, Stdout, Write};

use crate::sink::LineSink;

/// Line sink that prints to stdout
pub struct TerminalSink {
    out: Stdout,
    interactive: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        Self { out, interactive }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for TerminalSink {
    /// Clears the screen when attached to a terminal; piped output is
    /// left alone
    fn clear(&mut self) {
        if !self.interactive {
            return;
        }
        let mut out = self.out.lock();
        if let Err(e) = write!(out, "\x1b[2J\x1b[H").and_then(|_| out.flush()) {
            tracing::warn!("Failed to clear terminal: {}", e);
        }
    }

    fn append(&mut self, line: String) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::error!("Failed to write line to stdout: {}", e);
        }
    }
}

/// Display an error message to stderr
pub fn display_error(message: &str) {
    eprintln!("Error: {}", message);
}

/// Input typed at the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `[address] resource` switches to a new stream
    Start {
        address: Option<String>,
        resource_id: String,
    },
    /// `/stop` closes the live stream
    Stop,
    /// `/quit` exits
    Quit,
    /// Blank input
    Nothing,
    /// Input matching none of the above, with a usage hint
    Invalid(String),
}

/// Usage hint for unrecognized input
pub const USAGE: &str = "expected `[address] resource`, `/stop` or `/quit`";

/// Parse one line of interactive input
pub fn parse_command(input: &str) -> Command {
    let mut words = input.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (None, _, _) => Command::Nothing,
        (Some("/quit"), None, _) => Command::Quit,
        (Some("/stop"), None, _) => Command::Stop,
        (Some(resource_id), None, _) => Command::Start {
            address: None,
            resource_id: resource_id.to_string(),
        },
        (Some(address), Some(resource_id), None) => Command::Start {
            address: Some(address.to_string()),
            resource_id: resource_id.to_string(),
        },
        _ => Command::Invalid(format!("{:?}: {}", input.trim(), USAGE)),
    }
}
