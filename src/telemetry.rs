use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::ProgressStyle;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata};
use tracing_indicatif::{IndicatifLayer, TickSettings};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

use crate::error::TelemetryError;

const DEFAULT_DIRECTIVE: &str = "warn";
const PROGRESS_TARGET_PREFIX: &str = "pngify::";

static TRACING_INITIALISED: OnceLock<Result<(), TelemetryError>> = OnceLock::new();

/// Installs the process-wide tracing subscriber.
///
/// Only the first call in a process installs anything; later calls return the
/// first outcome regardless of their arguments. `level_override` wins over
/// `RUST_LOG`, which wins over `warn`.
pub(crate) fn initialise_tracing(
    service_name: &str,
    interactive_terminal: bool,
    level_override: Option<LevelFilter>,
) -> Result<(), &'static TelemetryError> {
    TRACING_INITIALISED
        .get_or_init(|| {
            let directive = log_directive(level_override, std::env::var("RUST_LOG").ok());
            install(
                service_name,
                interactive_terminal && io::stderr().is_terminal(),
                &directive,
            )
        })
        .as_ref()
        .copied()
}

fn install(service_name: &str, interactive: bool, directive: &str) -> Result<(), TelemetryError> {
    let tracer_provider = SdkTracerProvider::builder().build();
    let tracer = tracer_provider.tracer(service_name.to_owned());
    global::set_tracer_provider(tracer_provider);
    let env_filter =
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    if !interactive {
        let json_layer = fmt::layer()
            .json()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(env_filter);
        tracing_subscriber::registry()
            .with(json_layer)
            .with(OpenTelemetryLayer::new(tracer))
            .try_init()?;
        return Ok(());
    }

    let spinners = IndicatifLayer::new()
        .with_progress_style(spinner_style())
        .with_tick_settings(TickSettings {
            default_tick_interval: Some(Duration::from_millis(90)),
            ..TickSettings::default()
        });
    let pretty_layer = fmt::layer()
        .pretty()
        .with_target(false)
        .with_writer(spinners.get_stderr_writer())
        .with_filter(env_filter);
    tracing_subscriber::registry()
        .with(pretty_layer)
        .with(spinners.with_filter(filter::filter_fn(shows_spinner)))
        .with(OpenTelemetryLayer::new(tracer))
        .try_init()?;
    Ok(())
}

/// Picks the filter directive: explicit level, then `RUST_LOG`, then `warn`.
fn log_directive(level_override: Option<LevelFilter>, rust_log: Option<String>) -> String {
    match (level_override, rust_log) {
        (Some(level), _) => level.to_string().to_lowercase(),
        (None, Some(rust_log)) if !rust_log.trim().is_empty() => rust_log,
        (None, _) => DEFAULT_DIRECTIVE.to_owned(),
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan.bold} {msg}")
        .unwrap_or_else(|_error| ProgressStyle::default_spinner())
}

// Command spans at info and above from this crate get a spinner.
fn shows_spinner(metadata: &Metadata<'_>) -> bool {
    metadata.is_span()
        && metadata.target().starts_with(PROGRESS_TARGET_PREFIX)
        && *metadata.level() <= Level::INFO
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::override_wins(Some(LevelFilter::DEBUG), Some("trace"), "debug")]
    #[case::rust_log(None, Some("pngify=info"), "pngify=info")]
    #[case::blank_rust_log(None, Some("  "), "warn")]
    #[case::nothing_set(None, None, "warn")]
    fn log_directive_precedence(
        #[case] level_override: Option<LevelFilter>,
        #[case] rust_log: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            expected,
            log_directive(level_override, rust_log.map(str::to_owned))
        );
    }
}
