use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cli::ui::Painter;
use crate::cli::{OutputFormat, write_json_line};
use crate::error::CliError;
use crate::{ImageArtifact, PngifyError};

pub(crate) const PROGRESS_MESSAGE: &str = "Decoding image";

/// JSON result emitted by the `decode` command.
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum DecodeResult {
    DecodedText {
        text: String,
        payload_len: usize,
    },
    DecodedFile {
        file_name: String,
        saved_to: String,
        payload_len: usize,
    },
}

/// Arguments for the `decode` command.
#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Encoded image to read.
    image: PathBuf,
    /// Exact path for a decoded file; text payloads are always printed.
    #[arg(long, conflicts_with = "output_dir")]
    save_as: Option<PathBuf>,
    /// Directory a decoded file is saved into under its recovered name.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Replace an existing file at the destination.
    #[arg(long)]
    overwrite: bool,
}

impl DecodeArgs {
    /// Creates decode arguments saving files into the current directory.
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use pngify::DecodeArgs;
    ///
    /// let args = DecodeArgs::new("output.png").with_output_dir("restored");
    /// assert_eq!(Path::new("output.png"), args.image());
    /// ```
    #[must_use]
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            save_as: None,
            output_dir: None,
            overwrite: false,
        }
    }

    /// Saves a decoded file at exactly `path`.
    #[must_use]
    pub fn with_save_as(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_as = Some(path.into());
        self.output_dir = None;
        self
    }

    /// Saves a decoded file into `dir` under its recovered name.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self.save_as = None;
        self
    }

    /// Allows replacing an existing file.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Returns the image path.
    #[must_use]
    pub fn image(&self) -> &Path {
        &self.image
    }

    /// Resolves where a decoded file goes. The stored name is only consulted
    /// when no `--save-as` path is given.
    fn destination(&self, recovered_name: &[u8]) -> Result<PathBuf, CliError> {
        if let Some(save_as) = &self.save_as {
            return Ok(save_as.clone());
        }
        let file_name = recovered_file_name(recovered_name)?;
        Ok(match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        })
    }
}

/// Writes `payload` to `path`.
///
/// Without `overwrite` the file is created exclusively, so any existing entry
/// at `path` (including a dangling symlink) is refused rather than written
/// through.
fn save_payload(path: &Path, payload: &[u8], overwrite: bool) -> Result<()> {
    if overwrite {
        return std::fs::write(path, payload)
            .with_context(|| format!("failed to save file `{}`", path.display()));
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CliError::DestinationExists {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to save file `{}`", path.display()));
        }
    };
    file.write_all(payload)
        .with_context(|| format!("failed to save file `{}`", path.display()))
}

/// Returns the last path component of a stored file name.
///
/// Both `/` and `\` count as separators so names recorded on any platform
/// stay inside the chosen directory.
fn recovered_file_name(recovered_name: &[u8]) -> Result<String, CliError> {
    let stored = String::from_utf8_lossy(recovered_name);
    let candidate = stored
        .rsplit(|character| character == '/' || character == '\\')
        .next()
        .unwrap_or_default();
    if matches!(candidate, "" | "." | "..") {
        return Err(CliError::UnusableFileName {
            name: stored.into_owned(),
        });
    }
    Ok(candidate.to_string())
}

/// Executes the `decode` command.
#[instrument(skip(args, out, painter), level = "info", fields(image = %args.image().display(), ?output_format))]
pub(crate) fn run<W>(
    args: &DecodeArgs,
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
        .inspect_err(|error: &PngifyError| debug!(%error, "decode failed"))
        .with_context(|| format!("failed to decode image `{}`", args.image().display()))?;
    let (payload, metadata_value) = decoded.into_parts();
    let payload_len = payload.len();

    match metadata_value {
        None => {
            let text = String::from_utf8_lossy(&payload).into_owned();
            match output_format {
                OutputFormat::Pretty => writeln!(out, "{text}")?,
                OutputFormat::Json => {
                    write_json_line(out, &DecodeResult::DecodedText { text, payload_len })?;
                }
            }
        }
        Some(recovered_name) => {
            let path = args.destination(&recovered_name)?;
            save_payload(&path, &payload, args.overwrite)?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match output_format {
                OutputFormat::Pretty => {
                    writeln!(
                        out,
                        "{} File saved to {} {}",
                        painter.success("✓"),
                        painter.value(path.display().to_string()),
                        painter.muted(format!("({payload_len} bytes)")),
                    )?;
                }
                OutputFormat::Json => {
                    write_json_line(
                        out,
                        &DecodeResult::DecodedFile {
                            file_name,
                            saved_to: path.display().to_string(),
                            payload_len,
                        },
                    )?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::bare(b"notes.txt".as_slice(), "notes.txt")]
    #[case::unix_path(b"/home/user/docs/notes.txt".as_slice(), "notes.txt")]
    #[case::windows_path(b"C:\\Users\\me\\report.pdf".as_slice(), "report.pdf")]
    #[case::relative(b"../../etc/passwd".as_slice(), "passwd")]
    fn recovered_file_name_keeps_last_component(#[case] stored: &[u8], #[case] expected: &str) {
        assert_eq!(
            expected,
            recovered_file_name(stored).expect("stored name has a usable component")
        );
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::trailing_slash(b"docs/".as_slice())]
    #[case::parent(b"docs/..".as_slice())]
    #[case::current(b".".as_slice())]
    fn recovered_file_name_rejects_unusable_names(#[case] stored: &[u8]) {
        assert_matches!(
            recovered_file_name(stored),
            Err(CliError::UnusableFileName { .. })
        );
    }

    #[test]
    fn destination_prefers_save_as() {
        let args = DecodeArgs::new("in.png").with_save_as("/nonexistent/pngify/restored.bin");

        let path = args
            .destination(b"notes.txt")
            .expect("an explicit path should resolve");

        assert_eq!(PathBuf::from("/nonexistent/pngify/restored.bin"), path);
    }

    #[rstest]
    #[case::trailing_slash(b"docs/".as_slice())]
    #[case::parent(b"..".as_slice())]
    fn destination_with_save_as_ignores_unusable_stored_name(#[case] stored: &[u8]) {
        let args = DecodeArgs::new("in.png").with_save_as("restored.bin");

        assert_matches!(args.destination(stored), Ok(path) if path == Path::new("restored.bin"));
    }

    #[test]
    fn destination_joins_output_dir() {
        let args = DecodeArgs::new("in.png").with_output_dir("/nonexistent/pngify");

        let path = args
            .destination(b"/tmp/source/notes.txt")
            .expect("a usable stored name should resolve");

        assert_eq!(PathBuf::from("/nonexistent/pngify/notes.txt"), path);
    }

    #[test]
    fn destination_with_output_dir_rejects_unusable_stored_name() {
        let args = DecodeArgs::new("in.png").with_output_dir("/nonexistent/pngify");

        assert_matches!(
            args.destination(b"docs/"),
            Err(CliError::UnusableFileName { name }) if name == "docs/"
        );
    }

    #[test]
    fn save_payload_refuses_existing_file_without_overwrite() {
        let path = std::env::temp_dir().join(format!(
            "pngify-save-{}-{:?}.bin",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::write(&path, b"keep me").expect("temp dir should be writable");

        let error = save_payload(&path, b"replacement", false)
            .expect_err("an existing file should be refused");
        assert_matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::DestinationExists { path: reported }) if reported == &path
        );
        assert_eq!(b"keep me".to_vec(), std::fs::read(&path).expect("file should remain"));

        save_payload(&path, b"replacement", true).expect("overwrite should replace the file");
        assert_eq!(b"replacement".to_vec(), std::fs::read(&path).expect("file should exist"));
        let _ = std::fs::remove_file(&path);
    }
}
