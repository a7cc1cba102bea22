//! Column descriptors and the row model the ingestor reads from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// A single cell value as supplied by the host's row objects.
///
/// Serialized untagged so plain JSON / JS values (`null`, numbers, booleans,
/// strings) map directly onto the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    /// Absent value (JS `null`/`undefined`).
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
}

impl Datum {
    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }
}

/// Storage classification of a column's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// 64-bit floats, nulls encoded as NaN.
    Float64,
    /// Booleans encoded as 0.0 / 1.0, nulls as NaN.
    Bool,
    /// Interned strings (dictionary + id array).
    #[serde(rename = "string")]
    Text,
}

/// Externally-owned column descriptor; read-only inside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Key used to look cell values up in the row model.
    pub id: String,
    /// Declared width in logical pixels.
    pub width: f32,
    /// Pinned storage classification; `None` means infer from the data.
    #[serde(default)]
    pub kind: Option<ColumnKind>,
    /// Whether cells in this column participate in selection.
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

fn default_selectable() -> bool {
    true
}

impl ColumnSpec {
    /// Descriptor with inferred kind and default flags.
    pub fn new(id: impl Into<String>, width: f32) -> Self {
        Self {
            id: id.into(),
            width,
            kind: None,
            selectable: true,
        }
    }
}

/// Read access to the host's row data.
///
/// An out-of-bounds row index is programmer misuse and surfaces as
/// [`GridError::RowIndex`]; a column the row has no entry for is ordinary
/// data (`Ok(None)`).
pub trait RowSource {
    /// Number of rows in the model.
    fn row_count(&self) -> usize;

    /// Borrowed cell value, `None` when the row has no entry for the column.
    fn datum(&self, row: usize, column: &str) -> Result<Option<&Datum>>;
}

/// Row model backed by one map per row, the shape row-object data
/// deserializes into.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectRows(pub Vec<HashMap<String, Datum>>);

impl RowSource for ObjectRows {
    fn row_count(&self) -> usize {
        self.0.len()
    }

    fn datum(&self, row: usize, column: &str) -> Result<Option<&Datum>> {
        let entry = self.0.get(row).ok_or(GridError::RowIndex {
            index: row,
            len: self.0.len(),
        })?;
        Ok(entry.get(column))
    }
}
