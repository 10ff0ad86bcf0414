use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cli::ui::{InspectReportView, Painter, format_checksum};
use crate::cli::{OutputFormat, write_json_line};
use crate::codec::{Decoded, PayloadKind};
use crate::{ImageArtifact, PngifyError};

pub(crate) const PROGRESS_MESSAGE: &str = "Inspecting image";

/// JSON result emitted by the `inspect` command.
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum InspectResult {
    Inspect {
        version: u8,
        kind: PayloadKind,
        field_name: Option<String>,
        metadata_value: Option<String>,
        payload_len: usize,
        frame_len: usize,
        checksum: String,
        width: u32,
        height: u32,
    },
}

impl From<&Decoded> for InspectResult {
    fn from(decoded: &Decoded) -> Self {
        let lossy = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
        let dimensions = decoded.dimensions();
        Self::Inspect {
            version: decoded.version(),
            kind: decoded.kind(),
            field_name: decoded.metadata().field_name().map(lossy),
            metadata_value: decoded.metadata_value().map(lossy),
            payload_len: decoded.payload().len(),
            frame_len: decoded.frame_len(),
            checksum: format_checksum(decoded.checksum()),
            width: dimensions.width(),
            height: dimensions.height(),
        }
    }
}

/// Arguments for the `inspect` command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Encoded image to inspect.
    image: PathBuf,
}

impl InspectArgs {
    /// Creates inspect arguments for one image.
    #[must_use]
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
        }
    }

    /// Returns the image path.
    #[must_use]
    pub fn image(&self) -> &Path {
        &self.image
    }
}

/// Executes the `inspect` command.
#[instrument(skip(args, out, painter), level = "info", fields(image = %args.image().display(), ?output_format))]
pub(crate) fn run<W>(
    args: &InspectArgs,
    out: &mut W,
    painter: &Painter,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    tracing::Span::current().pb_set_message(PROGRESS_MESSAGE);
    let source_bytes = std::fs::read(args.image())
        .with_context(|| format!("failed to read image `{}`", args.image().display()))?;
    let decoded = ImageArtifact::decode(&source_bytes)
        .inspect_err(|error: &PngifyError| debug!(%error, "inspect failed"))
        .with_context(|| format!("failed to decode image `{}`", args.image().display()))?;

    match output_format {
        OutputFormat::Pretty => {
            writeln!(
                out,
                "{}",
                InspectReportView::new(args.image(), &decoded, painter)
            )?;
        }
        OutputFormat::Json => write_json_line(out, &InspectResult::from(&decoded))?,
    }
    Ok(())
}
