use owo_colors::{OwoColorize, Style};

/// Roles a piece of pretty output can play.
#[derive(Debug, Clone, Copy, Eq, PartialEq, strum_macros::EnumIter)]
pub(crate) enum Tone {
    Heading,
    Success,
    Muted,
    Value,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Heading => Style::new().bold().cyan(),
            Self::Success => Style::new().bold().green(),
            Self::Muted => Style::new().dimmed(),
            Self::Value => Style::new().bold(),
        }
    }
}

/// Styles report text, or passes it through untouched when stdout is not a
/// terminal.
#[derive(Debug)]
pub(crate) struct Painter {
    use_colour: bool,
}

impl Painter {
    pub(crate) fn new(use_colour: bool) -> Self {
        Self { use_colour }
    }

    pub(crate) fn paint(&self, tone: Tone, text: impl AsRef<str>) -> String {
        let text = text.as_ref();
        if self.use_colour {
            text.style(tone.style()).to_string()
        } else {
            text.to_owned()
        }
    }

    pub(crate) fn heading(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Heading, text)
    }

    pub(crate) fn success(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Success, text)
    }

    pub(crate) fn muted(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Muted, text)
    }

    pub(crate) fn value(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Value, text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn plain_painter_passes_text_through() {
        let painter = Painter::new(false);

        for tone in Tone::iter() {
            assert_eq!("notes.txt", painter.paint(tone, "notes.txt"));
        }
    }

    #[test]
    fn colour_painter_wraps_text_in_escapes() {
        let painter = Painter::new(true);

        for tone in Tone::iter() {
            let styled = painter.paint(tone, "notes.txt");
            assert!(styled.starts_with("\u{1b}["), "{tone:?} should emit an escape");
            assert!(styled.contains("notes.txt"));
        }
    }
}
