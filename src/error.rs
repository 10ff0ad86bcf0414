use std::path::PathBuf;

use derive_more::From;
use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::codec::CodecError;

/// Errors raised by the command-line front-end before or after the codec runs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("please enter text to encode")]
    EmptyText,
    #[error("recovered file name `{name}` has no usable file name component")]
    UnusableFileName { name: String },
    #[error(
        "refusing to overwrite existing file `{}`; pass --overwrite to replace it",
        path.display()
    )]
    DestinationExists { path: PathBuf },
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Top-level errors wrapping the codec and image-artifact error types.
#[derive(Debug, Error, From)]
pub enum PngifyError {
    #[error(transparent)]
    #[from(CodecError, Box<CodecError>)]
    Codec(Box<CodecError>),
    #[error(transparent)]
    #[from(ArtifactError, Box<ArtifactError>)]
    Artifact(Box<ArtifactError>),
}

impl PngifyError {
    /// Returns the codec error, if this failure came from the codec.
    #[must_use]
    pub fn as_codec(&self) -> Option<&CodecError> {
        match self {
            Self::Codec(error) => Some(error),
            Self::Artifact(_) => None,
        }
    }
}
