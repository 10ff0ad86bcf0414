use std::fmt::{self, Display, Formatter};

use tabled::{builder::Builder, settings::Style as TableStyle};

use super::painter::Painter;

/// Two-column field/value table rendered via `Display`.
#[derive(Debug)]
pub(crate) struct Table {
    rows: Vec<[String; 2]>,
}

impl Table {
    /// Creates a field/value table with muted field names.
    pub(crate) fn key_value(painter: &Painter, rows: Vec<(&str, String)>) -> Self {
        let rows = rows
            .into_iter()
            .map(|(field, value)| [painter.muted(field), value])
            .collect();
        Self { rows }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(["field", "value"]);
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }
        let mut table = builder.build();
        table.with(TableStyle::rounded());
        write!(f, "{table}")
    }
}
