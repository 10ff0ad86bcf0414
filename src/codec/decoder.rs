use serde::Serialize;
use tracing::{debug, instrument};

use super::error::CodecError;
use super::frame::{Frame, Metadata, ParsedFrame};
use super::raster::{GridDimensions, PixelGrid};

/// How a decoded payload should be presented.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum PayloadKind {
    /// No metadata; show the payload as text.
    Text,
    /// Metadata present; save the payload under the recovered name.
    File,
}

/// Payload and metadata recovered from a pixel grid.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Decoded {
    parsed: ParsedFrame,
    dimensions: GridDimensions,
}

impl Decoded {
    /// Returns the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.parsed.frame().payload()
    }

    /// Returns the metadata record.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        self.parsed.frame().metadata()
    }

    /// Returns the metadata value, e.g. the original file name.
    #[must_use]
    pub fn metadata_value(&self) -> Option<&[u8]> {
        self.metadata().value()
    }

    /// Returns [`PayloadKind::File`] when a metadata value is present.
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        if self.metadata().is_present() {
            PayloadKind::File
        } else {
            PayloadKind::Text
        }
    }

    /// Returns the format revision of the frame.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.parsed.version()
    }

    /// Returns the verified CRC-32 of the frame.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.parsed.checksum()
    }

    /// Returns the frame length in bytes, excluding grid padding.
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.parsed.len()
    }

    /// Returns the dimensions of the grid the frame was read from.
    #[must_use]
    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Consumes the result and returns `(payload, metadata value)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, Option<Vec<u8>>) {
        let (payload, metadata) = self.parsed.into_frame().into_parts();
        (payload, metadata.into_value())
    }
}

/// Recovers frames from pixel grids.
pub struct Decoder;

impl Decoder {
    /// Derasterizes `grid` and parses the frame it carries.
    ///
    /// # Errors
    ///
    /// Returns a format, truncation, or integrity error; no partial result is
    /// ever produced.
    ///
    /// ```
    /// use pngify::{Decoder, Encoder, PayloadKind};
    ///
    /// let grid = Encoder::begin(*b"0123456789")
    ///     .with_metadata("filename", "notes.txt")
    ///     .finalize()?;
    /// let decoded = Decoder::decode(&grid)?;
    /// assert_eq!(PayloadKind::File, decoded.kind());
    /// assert_eq!(Some(b"notes.txt".as_slice()), decoded.metadata_value());
    /// # Ok::<(), pngify::CodecError>(())
    /// ```
    #[instrument(skip(grid), level = "debug", fields(dimensions = %grid.dimensions()))]
    pub fn decode(grid: &PixelGrid) -> Result<Decoded, CodecError> {
        let parsed = Frame::parse(grid.derasterize()).inspect_err(|error| {
            debug!(%error, kind = %error.kind(), "rejected pixel grid");
        })?;
        debug!(
            frame_len = parsed.len(),
            payload_len = parsed.frame().payload().len(),
            "parsed frame"
        );
        Ok(Decoded {
            parsed,
            dimensions: grid.dimensions(),
        })
    }
}
