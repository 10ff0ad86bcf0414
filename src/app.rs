use std::io;

use anyhow::Result;
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cli::ui::Painter;
use crate::cli::{Command, LogLevel, OutputFormat};
use crate::telemetry;
use crate::terminal::{SystemTerminalClient, TerminalClient};

/// Runs the CLI command against the process's real terminal.
///
/// ```no_run
/// use clap::Parser;
///
/// let args = pngify::Args::try_parse_from(["pngify", "encode", "text", "hello"])?;
/// let mut out = Vec::new();
/// pngify::run(args.into_command(), &mut out, pngify::OutputFormat::Json)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the command fails, or
/// output writing fails.
pub fn run<W>(command: Command, out: &mut W, output_format: OutputFormat) -> Result<()>
where
    W: io::Write,
{
    run_with_log_level(command, out, None, output_format)
}

/// Runs the CLI command with an explicit telemetry log-level override.
///
/// ```no_run
/// use clap::Parser;
///
/// let args = pngify::Args::try_parse_from([
///     "pngify",
///     "--log-level",
///     "debug",
///     "inspect",
///     "output.png",
/// ])?;
/// let log_level = args.log_level();
/// let mut out = Vec::new();
/// pngify::run_with_log_level(
///     args.into_command(),
///     &mut out,
///     log_level,
///     pngify::OutputFormat::Pretty,
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the command fails, or
/// output writing fails.
pub fn run_with_log_level<W>(
    command: Command,
    out: &mut W,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(
        command,
        out,
        &SystemTerminalClient,
        log_level,
        output_format,
    )
}

/// Runs the CLI command with an injected terminal client.
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the command fails, or
/// output writing fails.
pub fn run_with_clients<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(command, out, terminal_client, None, output_format)
}

/// Runs the CLI command with an injected terminal client and explicit
/// telemetry settings.
///
/// ```no_run
/// use clap::Parser;
///
/// struct FakeTerminal;
/// impl pngify::TerminalClient for FakeTerminal {
///     fn stdout_is_terminal(&self) -> bool { false }
///     fn stderr_is_terminal(&self) -> bool { false }
/// }
///
/// let args = pngify::Args::try_parse_from([
///     "pngify",
///     "--log-level",
///     "trace",
///     "decode",
///     "output.png",
///     "--output-dir",
///     "restored",
/// ])?;
/// let log_level = args.log_level();
/// let mut out = Vec::new();
/// pngify::run_with_clients_and_log_level(
///     args.into_command(),
///     &mut out,
///     &FakeTerminal,
///     log_level,
///     pngify::OutputFormat::Json,
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the command fails, or
/// output writing fails.
#[instrument(
    skip(command, out, terminal_client),
    level = "info",
    fields(command = %command_name(&command), ?log_level, ?output_format)
)]
pub fn run_with_clients_and_log_level<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    telemetry::initialise_tracing(
        "pngify",
        terminal_client.stderr_is_terminal(),
        log_level.map(LogLevel::as_level_filter),
    )?;

    tracing::Span::current().pb_set_message(command.progress_message());
    let painter = Painter::new(terminal_client.stdout_is_terminal());
    match command {
        Command::Encode(args) => crate::cli::encode::run(&args, out, &painter, output_format),
        Command::Decode(args) => crate::cli::decode::run(&args, out, &painter, output_format),
        Command::Inspect(args) => crate::cli::inspect::run(&args, out, &painter, output_format),
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Encode(_args) => "encode",
        Command::Decode(_args) => "decode",
        Command::Inspect(_args) => "inspect",
    }
}
