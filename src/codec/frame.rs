use super::error::CodecError;

/// Bytes every frame starts with.
pub const MAGIC: [u8; 4] = *b"PNGF";

/// Frame format revision written by this build.
pub const FORMAT_VERSION: u8 = 1;

/// Metadata role used when the payload is the contents of a named file.
pub const FILENAME_FIELD: &[u8] = b"filename";

/// Longest metadata field name, bounded by its `u16` length field.
pub const MAX_FIELD_NAME_LEN: usize = u16::MAX as usize;

/// Longest metadata value, bounded by its `u32` length field.
pub const MAX_VALUE_LEN: usize = u32::MAX as usize;

/// Longest payload, bounded by its `u32` length field.
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

const FLAG_HAS_METADATA: u8 = 0b0000_0001;
const FIXED_HEADER_LEN: usize = MAGIC.len() + 2;
const FIELD_NAME_LEN_WIDTH: usize = 2;
const VALUE_LEN_WIDTH: usize = 4;
const PAYLOAD_LEN_WIDTH: usize = 4;
const CHECKSUM_LEN: usize = 4;

/// Named positions inside a frame, used to report where encoding or parsing
/// stopped.
#[derive(Debug, Clone, Copy, Eq, PartialEq, strum_macros::Display)]
pub enum FrameField {
    #[strum(serialize = "magic")]
    Magic,
    #[strum(serialize = "version")]
    Version,
    #[strum(serialize = "flags")]
    Flags,
    #[strum(serialize = "metadata field name length")]
    FieldNameLength,
    #[strum(serialize = "metadata field name")]
    FieldName,
    #[strum(serialize = "metadata value length")]
    ValueLength,
    #[strum(serialize = "metadata value")]
    Value,
    #[strum(serialize = "payload length")]
    PayloadLength,
    #[strum(serialize = "payload")]
    Payload,
    #[strum(serialize = "checksum")]
    Checksum,
}

/// Optional named record carried next to the payload.
///
/// A frame holds at most one record. Its presence is what tells a decoded
/// file apart from decoded text.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum Metadata {
    /// No record; the payload is plain text.
    #[default]
    Absent,
    /// One record with a role name and a value.
    Named { field_name: Vec<u8>, value: Vec<u8> },
}

impl Metadata {
    /// Creates a named record.
    #[must_use]
    pub fn named(field_name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self::Named {
            field_name: field_name.into(),
            value: value.into(),
        }
    }

    /// Creates a [`FILENAME_FIELD`] record.
    ///
    /// ```
    /// use pngify::Metadata;
    ///
    /// let metadata = Metadata::filename("notes.txt");
    /// assert_eq!(Some(b"filename".as_slice()), metadata.field_name());
    /// assert_eq!(Some(b"notes.txt".as_slice()), metadata.value());
    /// ```
    #[must_use]
    pub fn filename(value: impl Into<Vec<u8>>) -> Self {
        Self::named(FILENAME_FIELD, value)
    }

    /// Returns whether a record is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Named { .. })
    }

    /// Returns the record's role name.
    #[must_use]
    pub fn field_name(&self) -> Option<&[u8]> {
        match self {
            Self::Absent => None,
            Self::Named { field_name, .. } => Some(field_name),
        }
    }

    /// Returns the record's value.
    #[must_use]
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Self::Absent => None,
            Self::Named { value, .. } => Some(value),
        }
    }

    /// Consumes the record and returns its value.
    #[must_use]
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Self::Absent => None,
            Self::Named { value, .. } => Some(value),
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Named { field_name, value } => {
                FIELD_NAME_LEN_WIDTH + field_name.len() + VALUE_LEN_WIDTH + value.len()
            }
        }
    }
}

/// Payload plus optional metadata, the unit the codec serializes.
///
/// Wire layout, integers little-endian:
///
/// ```text
/// [4 bytes] magic "PNGF"
/// [1 byte ] version
/// [1 byte ] flags (bit 0: metadata present)
/// [2 bytes] field name length  } only when
/// [n bytes] field name         } bit 0 is set
/// [4 bytes] value length       }
/// [n bytes] value              }
/// [4 bytes] payload length
/// [n bytes] payload
/// [4 bytes] CRC-32 of everything above
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Frame {
    metadata: Metadata,
    payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame from its parts.
    #[must_use]
    pub fn new(payload: impl Into<Vec<u8>>, metadata: Metadata) -> Self {
        Self {
            metadata,
            payload: payload.into(),
        }
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the metadata record.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Consumes the frame and returns `(payload, metadata)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, Metadata) {
        (self.payload, self.metadata)
    }

    /// Returns the serialized length in bytes.
    ///
    /// ```
    /// use pngify::{Frame, Metadata};
    ///
    /// assert_eq!(19, Frame::new(b"hello".as_slice(), Metadata::Absent).encoded_len());
    /// ```
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN
            + self.metadata.encoded_len()
            + PAYLOAD_LEN_WIDTH
            + self.payload.len()
            + CHECKSUM_LEN
    }

    pub(crate) fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Serializes the frame, checksum included.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldTooLarge`] when a run does not fit its
    /// length field.
    ///
    /// ```
    /// use pngify::{Frame, Metadata};
    ///
    /// let bytes = Frame::new(b"hi".as_slice(), Metadata::Absent).serialize()?;
    /// assert_eq!(b"PNGF\x01\x00\x02\x00\x00\x00hi", &bytes[..12]);
    /// # Ok::<(), pngify::CodecError>(())
    /// ```
    pub fn serialize(&self) -> Result<Vec<u8>, CodecError> {
        let payload_len = u32::try_from(self.payload.len()).map_err(|_overflow| {
            CodecError::FieldTooLarge {
                field: FrameField::Payload,
                len: self.payload.len(),
                max: MAX_PAYLOAD_LEN,
            }
        })?;
        let metadata_lens = match &self.metadata {
            Metadata::Absent => None,
            Metadata::Named { field_name, value } => {
                let name_len = u16::try_from(field_name.len()).map_err(|_overflow| {
                    CodecError::FieldTooLarge {
                        field: FrameField::FieldName,
                        len: field_name.len(),
                        max: MAX_FIELD_NAME_LEN,
                    }
                })?;
                let value_len = u32::try_from(value.len()).map_err(|_overflow| {
                    CodecError::FieldTooLarge {
                        field: FrameField::Value,
                        len: value.len(),
                        max: MAX_VALUE_LEN,
                    }
                })?;
                Some((name_len, field_name, value_len, value))
            }
        };

        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(&MAGIC);
        bytes.push(FORMAT_VERSION);
        match metadata_lens {
            None => bytes.push(0),
            Some((name_len, field_name, value_len, value)) => {
                bytes.push(FLAG_HAS_METADATA);
                bytes.extend_from_slice(&name_len.to_le_bytes());
                bytes.extend_from_slice(field_name);
                bytes.extend_from_slice(&value_len.to_le_bytes());
                bytes.extend_from_slice(value);
            }
        }
        bytes.extend_from_slice(&payload_len.to_le_bytes());
        bytes.extend_from_slice(&self.payload);

        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        Ok(bytes)
    }

    /// Parses a frame from the start of `bytes`, verifying its checksum.
    ///
    /// `bytes` may run past the end of the frame (grid padding); the length
    /// fields decide where the frame stops.
    ///
    /// # Errors
    ///
    /// Returns a format error for a missing magic, unknown version or unknown
    /// flags, a truncation error when a declared length runs past the end of
    /// `bytes`, and an integrity error on checksum mismatch.
    ///
    /// ```
    /// use pngify::{Frame, Metadata};
    ///
    /// let frame = Frame::new(b"data".as_slice(), Metadata::filename("a.bin"));
    /// let mut bytes = frame.serialize()?;
    /// bytes.extend_from_slice(&[0x00; 3]);
    ///
    /// let parsed = Frame::parse(&bytes)?;
    /// assert_eq!(&frame, parsed.frame());
    /// assert_eq!(bytes.len() - 3, parsed.len());
    /// # Ok::<(), pngify::CodecError>(())
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<ParsedFrame, CodecError> {
        if !bytes.starts_with(&MAGIC) {
            return Err(CodecError::UnrecognisedMagic);
        }

        let mut reader = FrameReader::new(bytes);
        reader.take(FrameField::Magic, MAGIC.len())?;
        let version = reader.take_u8(FrameField::Version)?;
        if version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion { version });
        }
        let flags = reader.take_u8(FrameField::Flags)?;
        if flags & !FLAG_HAS_METADATA != 0 {
            return Err(CodecError::UnknownFlags { flags });
        }

        let named = if flags & FLAG_HAS_METADATA != 0 {
            let name_len = usize::from(reader.take_u16(FrameField::FieldNameLength)?);
            let field_name = reader.take(FrameField::FieldName, name_len)?;
            let value_len = widen(reader.take_u32(FrameField::ValueLength)?);
            let value = reader.take(FrameField::Value, value_len)?;
            Some((field_name, value))
        } else {
            None
        };
        let payload_len = widen(reader.take_u32(FrameField::PayloadLength)?);
        let payload = reader.take(FrameField::Payload, payload_len)?;

        let computed = crc32fast::hash(reader.consumed());
        let stored = u32::from_le_bytes(reader.take_array(FrameField::Checksum)?);
        if stored != computed {
            return Err(CodecError::ChecksumMismatch { stored, computed });
        }

        let metadata = match named {
            None => Metadata::Absent,
            Some((field_name, value)) => Metadata::named(field_name, value),
        };
        Ok(ParsedFrame {
            frame: Frame::new(payload, metadata),
            version,
            checksum: stored,
            len: reader.consumed().len(),
        })
    }
}

/// Frame recovered by [`Frame::parse`] along with its trailer details.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedFrame {
    frame: Frame,
    version: u8,
    checksum: u32,
    len: usize,
}

impl ParsedFrame {
    /// Returns the parsed frame.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Returns the format revision read from the header.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the verified CRC-32.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Returns the frame length in bytes, checksum included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the frame has zero length. Parsed frames never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consumes the result and returns the frame.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        self.frame
    }
}

struct FrameReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> FrameReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, field: FrameField, needed: usize) -> Result<&'a [u8], CodecError> {
        let remaining = &self.bytes[self.offset..];
        let Some(run) = remaining.get(..needed) else {
            return Err(CodecError::Truncated {
                field,
                needed,
                available: remaining.len(),
            });
        };
        self.offset += needed;
        Ok(run)
    }

    fn take_array<const N: usize>(&mut self, field: FrameField) -> Result<[u8; N], CodecError> {
        let run = self.take(field, N)?;
        let mut array = [0_u8; N];
        array.copy_from_slice(run);
        Ok(array)
    }

    fn take_u8(&mut self, field: FrameField) -> Result<u8, CodecError> {
        let [value] = self.take_array::<1>(field)?;
        Ok(value)
    }

    fn take_u16(&mut self, field: FrameField) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.take_array(field)?))
    }

    fn take_u32(&mut self, field: FrameField) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take_array(field)?))
    }

    fn consumed(&self) -> &'a [u8] {
        &self.bytes[..self.offset]
    }
}

// A length that does not fit usize can never be satisfied by an in-memory
// buffer, so it saturates and fails as a truncation.
fn widen(len: u32) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}
