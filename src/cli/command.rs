use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::cli::decode::DecodeArgs;
use crate::cli::encode::EncodeArgs;
use crate::cli::inspect::InspectArgs;

/// Command-line options for the pngify tool.
#[derive(Debug, Parser)]
#[command(
    name = "pngify",
    about = "Carry text and files inside ordinary-looking PNG images."
)]
pub struct Args {
    /// Log level; overrides `RUST_LOG` (default `warn`).
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
    /// Output format; defaults to `pretty` on a terminal and `json` otherwise.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// Creates argument values directly without CLI parsing.
    ///
    /// ```
    /// use pngify::{Args, Command, InspectArgs};
    ///
    /// let args = Args::new(Command::Inspect(InspectArgs::new("output.png")));
    /// assert_eq!(None, args.log_level());
    /// ```
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            log_level: None,
            format: None,
            command,
        }
    }

    /// Sets an explicit log level.
    #[must_use]
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = Some(log_level);
        self
    }

    /// Sets an explicit output format.
    #[must_use]
    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.format = Some(output_format);
        self
    }

    /// Returns the requested log level, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Returns the requested output format, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format
    }

    /// Consumes the arguments and returns the selected command.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Log levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub(crate) const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output formats accepted by `--format`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines, coloured on a terminal.
    Pretty,
    /// One pretty-printed JSON object per command.
    Json,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode text or a file into a PNG image.
    Encode(EncodeArgs),
    /// Decode a PNG image back into text or a file.
    Decode(DecodeArgs),
    /// Report the frame an encoded image carries without writing anything.
    Inspect(InspectArgs),
}

impl Command {
    /// Spinner text shown while the command's span is open on a terminal.
    pub(crate) fn progress_message(&self) -> &'static str {
        match self {
            Self::Encode(_args) => crate::cli::encode::PROGRESS_MESSAGE,
            Self::Decode(_args) => crate::cli::decode::PROGRESS_MESSAGE,
            Self::Inspect(_args) => crate::cli::inspect::PROGRESS_MESSAGE,
        }
    }
}
