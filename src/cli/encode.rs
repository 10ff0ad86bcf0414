use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bon::Builder;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cli::ui::{EncodedView, Painter};
use crate::cli::{DEFAULT_OUTPUT_FILE, OutputFormat, write_json_line};
use crate::codec::{Encoder, FILENAME_FIELD, PayloadKind};
use crate::error::CliError;
use crate::{ImageArtifact, PngifyError};

pub(crate) const PROGRESS_MESSAGE: &str = "Encoding payload into pixels";

/// JSON result emitted by the `encode` command.
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum EncodeResult {
    Encoded {
        kind: PayloadKind,
        output: String,
        payload_len: usize,
        width: u32,
        height: u32,
    },
}

/// Arguments for the `encode` command.
#[derive(Debug, Args)]
pub struct EncodeArgs {
    #[command(subcommand)]
    source: EncodeSource,
}

impl EncodeArgs {
    /// Creates encode arguments for one source.
    #[must_use]
    pub fn new(source: EncodeSource) -> Self {
        Self { source }
    }

    /// Returns the selected source.
    #[must_use]
    pub fn source(&self) -> &EncodeSource {
        &self.source
    }
}

/// What the `encode` command reads its payload from.
#[derive(Debug, Subcommand)]
pub enum EncodeSource {
    /// Encode literal text.
    Text(TextArgs),
    /// Encode a file's contents, carrying its path as the file name.
    File(FileArgs),
}

/// Arguments for `encode text`.
#[derive(Debug, Args)]
pub struct TextArgs {
    /// Text to encode; must not be empty.
    text: String,
    /// Destination PNG path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
}

impl TextArgs {
    /// Creates text-encode arguments writing to `output.png`.
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use pngify::TextArgs;
    ///
    /// let args = TextArgs::new("hello").with_output("greeting.png");
    /// assert_eq!("hello", args.text());
    /// assert_eq!(Path::new("greeting.png"), args.output());
    /// ```
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }

    /// Overrides the destination PNG path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the text to encode.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the destination PNG path.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// Arguments for `encode file`.
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File whose contents to encode.
    file: PathBuf,
    /// Destination PNG path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
}

impl FileArgs {
    /// Creates file-encode arguments writing to `output.png`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }

    /// Overrides the destination PNG path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the source file path.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns the destination PNG path.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// Payload, optional file name, and destination for one encode run.
///
/// The file name is kept as the platform's raw path bytes.
#[derive(Debug, Builder)]
struct EncodeJob {
    payload: Vec<u8>,
    file_name: Option<Vec<u8>>,
    output: PathBuf,
}

impl EncodeJob {
    fn from_source(source: &EncodeSource) -> Result<Self> {
        match source {
            EncodeSource::Text(args) => {
                if args.text().is_empty() {
                    return Err(CliError::EmptyText.into());
                }
                Ok(Self::builder()
                    .payload(args.text().as_bytes().to_vec())
                    .output(args.output().to_path_buf())
                    .build())
            }
            EncodeSource::File(args) => {
                let payload = std::fs::read(args.file()).with_context(|| {
                    format!("failed to read file `{}`", args.file().display())
                })?;
                Ok(Self::builder()
                    .payload(payload)
                    .file_name(args.file().as_os_str().as_encoded_bytes().to_vec())
                    .output(args.output().to_path_buf())
                    .build())
            }
        }
    }

    fn kind(&self) -> PayloadKind {
        if self.file_name.is_some() {
            PayloadKind::File
        } else {
            PayloadKind::Text
        }
    }

    fn into_encoder(self) -> Encoder {
        let mut encoder = Encoder::begin(self.payload);
        if let Some(file_name) = self.file_name {
            encoder.attach_metadata(FILENAME_FIELD, file_name);
        }
        encoder
    }
}

/// Executes the `encode` command.
#[instrument(skip(args, out, painter), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    args: &EncodeArgs,
    out: &mut W,
    painter: &Painter,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    tracing::Span::current().pb_set_message(PROGRESS_MESSAGE);
    let job = EncodeJob::from_source(args.source())?;
    let kind = job.kind();
    let payload_len = job.payload.len();
    let output = job.output.clone();

    let grid = job
        .into_encoder()
        .finalize()
        .map_err(PngifyError::from)
        .context("failed to encode payload")?;
    ImageArtifact::write_png(&grid, &output)
        .map_err(PngifyError::from)
        .with_context(|| format!("failed to write image `{}`", output.display()))?;

    let dimensions = grid.dimensions();
    match output_format {
        OutputFormat::Pretty => {
            writeln!(
                out,
                "{}",
                EncodedView::new(kind, payload_len, &output, dimensions.to_string(), painter)
            )?;
        }
        OutputFormat::Json => {
            write_json_line(
                out,
                &EncodeResult::Encoded {
                    kind,
                    output: output.display().to_string(),
                    payload_len,
                    width: dimensions.width(),
                    height: dimensions.height(),
                },
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codec::Metadata;

    #[test]
    fn text_job_rejects_empty_text() {
        let source = EncodeSource::Text(TextArgs::new(""));

        let error = EncodeJob::from_source(&source).expect_err("empty text should be rejected");

        assert_matches!(error.downcast_ref::<CliError>(), Some(CliError::EmptyText));
    }

    #[test]
    fn text_job_has_no_metadata() {
        let source = EncodeSource::Text(TextArgs::new("hello").with_output("a.png"));

        let job = EncodeJob::from_source(&source).expect("non-empty text should build a job");

        assert_eq!(PayloadKind::Text, job.kind());
        assert_eq!(Path::new("a.png"), job.output.as_path());
        let encoder = job.into_encoder();
        assert_eq!(&Metadata::Absent, encoder.metadata());
    }

    #[test]
    fn file_job_attaches_filename_metadata() {
        let job = EncodeJob::builder()
            .payload(b"0123456789".to_vec())
            .file_name(b"docs/notes.txt".to_vec())
            .output(PathBuf::from("out.png"))
            .build();

        assert_eq!(PayloadKind::File, job.kind());
        let encoder = job.into_encoder();
        assert_eq!(&Metadata::filename("docs/notes.txt"), encoder.metadata());
    }

    #[test]
    fn file_job_reports_missing_source() {
        let source = EncodeSource::File(FileArgs::new("/nonexistent/pngify/source.bin"));

        let error = EncodeJob::from_source(&source).expect_err("missing file should fail");

        assert!(error.to_string().contains("failed to read file"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn file_job_keeps_non_utf8_path_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = std::env::temp_dir().join(format!(
            "pngify-raw-name-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be writable");
        let source = dir.join(OsStr::from_bytes(b"caf\xE9.txt"));
        std::fs::write(&source, b"bytes").expect("temp dir should accept raw names");

        let job = EncodeJob::from_source(&EncodeSource::File(FileArgs::new(&source)))
            .expect("existing file should build a job");

        let stored = job.file_name.clone().expect("file jobs carry a name");
        assert!(stored.ends_with(b"/caf\xE9.txt"));
        assert_eq!(source.as_os_str().as_bytes(), stored.as_slice());
        assert_eq!(
            &Metadata::filename(stored.clone()),
            job.into_encoder().metadata()
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
