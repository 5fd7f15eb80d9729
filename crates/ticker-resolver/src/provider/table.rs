//! Tabular listing data as returned by providers, and column detection.

use serde_json::{Map, Value};

/// Cell values that stand for "no data" in provider responses.
const PLACEHOLDERS: [&str; 5] = ["", "nan", "None", "null", "-"];

/// Known `(identifier column, name column)` pairs, tried in order.
pub const COLUMN_CANDIDATES: [ColumnCandidate; 4] = [
    ColumnCandidate::new("symbol", "name"),
    ColumnCandidate::new("代码", "名称"),
    ColumnCandidate::new("Symbol", "Name"),
    ColumnCandidate::new("f12", "f14"),
];

/// A pair of column names that may carry identifier and name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnCandidate {
    pub identifier: &'static str,
    pub name: &'static str,
}

impl ColumnCandidate {
    pub const fn new(identifier: &'static str, name: &'static str) -> Self {
        Self { identifier, name }
    }
}

/// How the identifier and name columns were picked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MappingSource {
    /// A known column-name pair matched.
    Named(ColumnCandidate),
    /// No pair matched; the first two columns are used.
    Positional,
}

/// Resolved column positions within a [`ListingTable`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnMapping {
    pub identifier: usize,
    pub name: usize,
    pub source: MappingSource,
}

/// One `(identifier, display name)` pair read from a provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingRow {
    pub identifier: String,
    pub display_name: String,
}

/// Rows of string cells under named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ListingTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from JSON objects.
    ///
    /// Columns follow the key order of the first object; keys first seen
    /// in later objects are appended. Missing cells are empty.
    pub fn from_json_objects(objects: &[Map<String, Value>]) -> Self {
        let mut table = Self::default();
        table.extend_from_json_objects(objects);
        table
    }

    /// Appends JSON objects as rows, widening the column set if needed.
    pub fn extend_from_json_objects(&mut self, objects: &[Map<String, Value>]) {
        for object in objects {
            for key in object.keys() {
                if !self.columns.iter().any(|c| c == key) {
                    self.columns.push(key.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                }
            }
            let row = self
                .columns
                .iter()
                .map(|column| object.get(column).map(cell_text).unwrap_or_default())
                .collect();
            self.rows.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Picks identifier and name columns.
    ///
    /// Tries [`COLUMN_CANDIDATES`] in order, then falls back to the first
    /// two columns. Returns `None` when the table has fewer than two columns.
    pub fn detect_columns(&self) -> Option<ColumnMapping> {
        for candidate in COLUMN_CANDIDATES {
            if let (Some(identifier), Some(name)) = (
                self.column_index(candidate.identifier),
                self.column_index(candidate.name),
            ) {
                return Some(ColumnMapping {
                    identifier,
                    name,
                    source: MappingSource::Named(candidate),
                });
            }
        }

        if self.columns.len() >= 2 {
            return Some(ColumnMapping {
                identifier: 0,
                name: 1,
                source: MappingSource::Positional,
            });
        }

        None
    }

    /// Reads identifier/name pairs through `mapping`.
    ///
    /// Rows whose identifier or name is missing or a placeholder are
    /// skipped one by one; the rest of the table is still read.
    pub fn rows_with(&self, mapping: ColumnMapping) -> Vec<ListingRow> {
        self.rows
            .iter()
            .filter_map(|row| {
                let identifier = row.get(mapping.identifier)?.trim();
                let display_name = row.get(mapping.name)?.trim();
                if is_placeholder(identifier) || is_placeholder(display_name) {
                    return None;
                }
                Some(ListingRow {
                    identifier: identifier.to_string(),
                    display_name: display_name.to_string(),
                })
            })
            .collect()
    }
}

fn is_placeholder(cell: &str) -> bool {
    PLACEHOLDERS.contains(&cell)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
