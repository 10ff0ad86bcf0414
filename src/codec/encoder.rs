use tracing::{debug, instrument};

use super::error::CodecError;
use super::frame::{Frame, Metadata};
use super::raster::PixelGrid;

/// One encode session: a payload, at most one metadata record, then a grid.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Encoder {
    frame: Frame,
}

impl Encoder {
    /// Starts a session holding `payload`, with no metadata attached.
    ///
    /// An empty payload is accepted and round-trips as empty.
    #[must_use]
    pub fn begin(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            frame: Frame::new(payload, Metadata::Absent),
        }
    }

    /// Stores a named metadata record, replacing any earlier one.
    ///
    /// ```
    /// use pngify::{Encoder, Metadata};
    ///
    /// let mut encoder = Encoder::begin("report");
    /// encoder.attach_metadata("filename", "draft.txt");
    /// encoder.attach_metadata("filename", "final.txt");
    /// assert_eq!(&Metadata::filename("final.txt"), encoder.metadata());
    /// ```
    pub fn attach_metadata(
        &mut self,
        field_name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.frame.set_metadata(Metadata::named(field_name, value));
        self
    }

    /// Consuming form of [`Encoder::attach_metadata`].
    #[must_use]
    pub fn with_metadata(
        mut self,
        field_name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.attach_metadata(field_name, value);
        self
    }

    /// Returns the payload collected so far.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.frame.payload()
    }

    /// Returns the metadata record collected so far.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        self.frame.metadata()
    }

    /// Serializes the session without rasterizing it.
    ///
    /// # Errors
    ///
    /// Returns an encoding error when a run does not fit its length field.
    pub fn frame_bytes(&self) -> Result<Vec<u8>, CodecError> {
        self.frame.serialize()
    }

    /// Serializes the session and lays the frame out over a pixel grid.
    ///
    /// Identical payload and metadata always yield an identical grid.
    ///
    /// # Errors
    ///
    /// Returns an encoding error when the payload or metadata exceed their
    /// length fields or the grid would be unrepresentable. Nothing is
    /// truncated.
    ///
    /// ```
    /// use pngify::{Decoder, Encoder};
    ///
    /// let grid = Encoder::begin("hello").finalize()?;
    /// let decoded = Decoder::decode(&grid)?;
    /// assert_eq!(b"hello", decoded.payload());
    /// assert_eq!(None, decoded.metadata_value());
    /// # Ok::<(), pngify::CodecError>(())
    /// ```
    #[instrument(
        skip(self),
        level = "debug",
        fields(payload_len = self.frame.payload().len(), has_metadata = self.frame.metadata().is_present())
    )]
    pub fn finalize(self) -> Result<PixelGrid, CodecError> {
        let bytes = self.frame.serialize()?;
        let grid = PixelGrid::rasterize(&bytes)?;
        debug!(
            frame_len = bytes.len(),
            dimensions = %grid.dimensions(),
            "rasterized frame"
        );
        Ok(grid)
    }
}
