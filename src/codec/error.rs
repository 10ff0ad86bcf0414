use serde::Serialize;
use thiserror::Error;

use super::frame::{FORMAT_VERSION, FrameField};
use super::raster::PixelGridError;

/// Errors returned by frame encoding and decoding.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CodecError {
    /// A run is longer than its length field can describe.
    #[error("{field} is too large: {len} bytes exceeds max {max}")]
    FieldTooLarge {
        field: FrameField,
        len: usize,
        max: usize,
    },
    /// The frame cannot be laid out over a representable pixel grid.
    #[error(transparent)]
    Grid(#[from] PixelGridError),
    /// The pixel data does not start with the frame magic.
    #[error("not a recognized encoded image")]
    UnrecognisedMagic,
    /// The frame was written by an unknown format revision.
    #[error("unsupported version {version}; this build reads version {}", FORMAT_VERSION)]
    UnsupportedVersion { version: u8 },
    /// The flags byte has bits this format revision does not define.
    #[error("unsupported frame flags {flags:#04x}")]
    UnknownFlags { flags: u8 },
    /// The stored checksum does not match the parsed fields.
    #[error(
        "corrupted or tampered data: stored checksum {stored:#010x} does not match computed {computed:#010x}"
    )]
    ChecksumMismatch { stored: u32, computed: u32 },
    /// A declared length runs past the end of the pixel data.
    #[error("frame is truncated: {field} needs {needed} bytes but only {available} remain")]
    Truncated {
        field: FrameField,
        needed: usize,
        available: usize,
    },
}

impl CodecError {
    /// Returns the broad failure class of this error.
    ///
    /// ```
    /// use pngify::{CodecError, CodecErrorKind};
    ///
    /// assert_eq!(CodecErrorKind::Format, CodecError::UnrecognisedMagic.kind());
    /// assert_eq!("IntegrityError", CodecErrorKind::Integrity.to_string());
    /// ```
    #[must_use]
    pub const fn kind(&self) -> CodecErrorKind {
        match self {
            Self::FieldTooLarge { .. } | Self::Grid(_) => CodecErrorKind::Encoding,
            Self::UnrecognisedMagic | Self::UnsupportedVersion { .. } | Self::UnknownFlags { .. } => {
                CodecErrorKind::Format
            }
            Self::ChecksumMismatch { .. } => CodecErrorKind::Integrity,
            Self::Truncated { .. } => CodecErrorKind::Truncation,
        }
    }
}

/// Failure classes reported to callers of the codec.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Serialize, strum_macros::Display, strum_macros::EnumIter,
)]
pub enum CodecErrorKind {
    /// Input exceeds a representable size.
    #[strum(serialize = "EncodingError")]
    Encoding,
    /// Missing magic, unknown version, or unknown flags.
    #[strum(serialize = "FormatError")]
    Format,
    /// Checksum mismatch.
    #[strum(serialize = "IntegrityError")]
    Integrity,
    /// A declared length exceeds the available data.
    #[strum(serialize = "TruncationError")]
    Truncation,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(
        CodecError::FieldTooLarge { field: FrameField::FieldName, len: 70_000, max: 65_535 },
        CodecErrorKind::Encoding
    )]
    #[case(
        CodecError::Grid(PixelGridError::DimensionsOverflow { byte_len: usize::MAX }),
        CodecErrorKind::Encoding
    )]
    #[case(CodecError::UnsupportedVersion { version: 9 }, CodecErrorKind::Format)]
    #[case(CodecError::UnknownFlags { flags: 0x80 }, CodecErrorKind::Format)]
    #[case(CodecError::ChecksumMismatch { stored: 1, computed: 2 }, CodecErrorKind::Integrity)]
    #[case(
        CodecError::Truncated { field: FrameField::Payload, needed: 10, available: 3 },
        CodecErrorKind::Truncation
    )]
    fn kind_classifies_variants(#[case] error: CodecError, #[case] expected: CodecErrorKind) {
        assert_eq!(expected, error.kind());
    }

    #[test]
    fn truncated_message_names_field() {
        let error = CodecError::Truncated {
            field: FrameField::ValueLength,
            needed: 4,
            available: 1,
        };
        assert_eq!(
            "frame is truncated: metadata value length needs 4 bytes but only 1 remain",
            error.to_string()
        );
    }

    #[test]
    fn kind_names_are_distinct_error_labels() {
        let names: Vec<String> = CodecErrorKind::iter().map(|kind| kind.to_string()).collect();

        assert_eq!(
            vec![
                "EncodingError",
                "FormatError",
                "IntegrityError",
                "TruncationError"
            ],
            names
        );
    }
}
