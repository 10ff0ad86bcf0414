pub(crate) mod command;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod inspect;
pub(crate) mod ui;

use std::io;

use anyhow::Result;
use serde::Serialize;

pub use self::command::{Args, Command, LogLevel, OutputFormat};
pub use self::decode::DecodeArgs;
pub use self::encode::{EncodeArgs, EncodeSource, FileArgs, TextArgs};
pub use self::inspect::InspectArgs;

pub(crate) const DEFAULT_OUTPUT_FILE: &str = "output.png";

/// Writes one pretty-printed JSON value followed by a newline.
pub(crate) fn write_json_line<W, T>(out: &mut W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
