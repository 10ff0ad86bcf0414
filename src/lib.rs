//! Carry text and files inside ordinary-looking PNG images.
//!
//! The [`Encoder`] and [`Decoder`] turn a payload and an optional file name into
//! a CRC-protected frame laid over RGBA pixels. [`ImageArtifact`] moves those
//! pixels in and out of PNG files, and the `pngify` binary wraps both in a
//! small command-line tool.

mod app;
mod artifact;
mod cli;
mod codec;
mod error;
mod telemetry;
mod terminal;

pub use app::{run, run_with_clients, run_with_clients_and_log_level, run_with_log_level};
pub use artifact::{ArtifactError, ImageArtifact};
pub use cli::{
    Args, Command, DecodeArgs, EncodeArgs, EncodeSource, FileArgs, InspectArgs, LogLevel,
    OutputFormat, TextArgs,
};
pub use codec::{
    CHANNELS, CodecError, CodecErrorKind, Decoded, Decoder, Encoder, FILENAME_FIELD, FILLER,
    FORMAT_VERSION, Frame, FrameField, GridDimensions, MAGIC, MAX_FIELD_NAME_LEN, MAX_PAYLOAD_LEN,
    MAX_VALUE_LEN, Metadata, ParsedFrame, PayloadKind, PixelGrid, PixelGridError,
};
pub use error::{CliError, PngifyError};
pub use terminal::TerminalClient;
