//! Payload-to-pixel codec.
//!
//! Encoding serializes a payload and an optional metadata record into a
//! [`Frame`], then lays the frame bytes over the RGBA samples of a
//! [`PixelGrid`]. Decoding reads the samples back in the same order, parses
//! the frame, and verifies its CRC-32. Nothing in this module touches the
//! filesystem.

mod decoder;
mod encoder;
mod error;
mod frame;
mod raster;

pub use self::decoder::{Decoded, Decoder, PayloadKind};
pub use self::encoder::Encoder;
pub use self::error::{CodecError, CodecErrorKind};
pub use self::frame::{
    FILENAME_FIELD, FORMAT_VERSION, Frame, FrameField, MAGIC, MAX_FIELD_NAME_LEN, MAX_PAYLOAD_LEN,
    MAX_VALUE_LEN, Metadata, ParsedFrame,
};
pub use self::raster::{CHANNELS, FILLER, GridDimensions, PixelGrid, PixelGridError};
