use std::fmt::{self, Display, Formatter};
use std::path::Path;

use crate::codec::{Decoded, PayloadKind};

use super::painter::Painter;
use super::table::Table;

/// Renders the `inspect` report for one decoded image.
pub(crate) struct InspectReportView<'a> {
    image: &'a Path,
    decoded: &'a Decoded,
    painter: &'a Painter,
}

impl<'a> InspectReportView<'a> {
    pub(crate) fn new(image: &'a Path, decoded: &'a Decoded, painter: &'a Painter) -> Self {
        Self {
            image,
            decoded,
            painter,
        }
    }
}

impl Display for InspectReportView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let decoded = self.decoded;
        let mut rows = vec![
            ("version", self.painter.value(decoded.version().to_string())),
            ("kind", self.painter.value(decoded.kind().to_string())),
        ];
        if let (Some(field_name), Some(value)) =
            (decoded.metadata().field_name(), decoded.metadata_value())
        {
            rows.push((
                "metadata",
                format!(
                    "{} {}",
                    self.painter.muted(format!("{}=", String::from_utf8_lossy(field_name))),
                    self.painter.value(String::from_utf8_lossy(value))
                ),
            ));
        }
        rows.extend([
            (
                "payload_len",
                self.painter.value(decoded.payload().len().to_string()),
            ),
            ("frame_len", self.painter.value(decoded.frame_len().to_string())),
            (
                "checksum",
                self.painter.value(format_checksum(decoded.checksum())),
            ),
            (
                "grid",
                self.painter.value(decoded.dimensions().to_string()),
            ),
        ]);

        write!(
            f,
            "{} {}",
            self.painter.heading("Frame in"),
            self.painter.value(self.image.display().to_string())
        )?;
        write!(f, "\n{}", Table::key_value(self.painter, rows))
    }
}

/// Renders the confirmation line of a finished `encode` command.
pub(crate) struct EncodedView<'a> {
    kind: PayloadKind,
    payload_len: usize,
    output: &'a Path,
    grid: String,
    painter: &'a Painter,
}

impl<'a> EncodedView<'a> {
    pub(crate) fn new(
        kind: PayloadKind,
        payload_len: usize,
        output: &'a Path,
        grid: String,
        painter: &'a Painter,
    ) -> Self {
        Self {
            kind,
            payload_len,
            output,
            grid,
            painter,
        }
    }
}

impl Display for EncodedView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let noun = match self.kind {
            PayloadKind::Text => "Text",
            PayloadKind::File => "File",
        };
        write!(
            f,
            "{} {noun} encoded to {} {}",
            self.painter.success("✓"),
            self.painter.value(self.output.display().to_string()),
            self.painter
                .muted(format!("({} bytes, {} pixels)", self.payload_len, self.grid)),
        )
    }
}

/// Formats a CRC-32 as eight uppercase hex digits.
pub(crate) fn format_checksum(checksum: u32) -> String {
    hex::encode_upper(checksum.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Decoder, Encoder};

    #[test]
    fn format_checksum_pads_to_eight_digits() {
        assert_eq!("000000AB", format_checksum(0xAB));
        assert_eq!("DEADBEEF", format_checksum(0xDEAD_BEEF));
    }

    #[test]
    fn encoded_view_renders_plain_line() {
        let painter = Painter::new(false);
        let view = EncodedView::new(
            PayloadKind::File,
            10,
            Path::new("out.png"),
            "3x3".to_string(),
            &painter,
        );

        assert_snapshot!(view.to_string(), @"✓ File encoded to out.png (10 bytes, 3x3 pixels)");
    }

    #[test]
    fn inspect_view_lists_metadata() {
        let grid = Encoder::begin(*b"0123456789")
            .with_metadata("filename", "notes.txt")
            .finalize()
            .expect("file payload should encode");
        let decoded = Decoder::decode(&grid).expect("fresh grid should decode");
        let painter = Painter::new(false);

        let rendered = InspectReportView::new(Path::new("out.png"), &decoded, &painter).to_string();

        assert!(rendered.starts_with("Frame in out.png\n"));
        assert!(rendered.contains("filename= notes.txt"));
        assert!(rendered.contains("file"));
        assert!(rendered.contains(&format_checksum(decoded.checksum())));
    }
}
