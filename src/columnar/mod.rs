//! Row-object data → typed columns for the layout engine.
//!
//! One ingestion is one uninterrupted engine call sequence:
//! `init_columnar` → one `ingest_*_column` per column, in declaration order →
//! `finalize_columnar`. Nothing is retried; a failed engine call propagates
//! and the ingestion is considered void.

mod interner;

pub use interner::StringInterner;

use crate::engine::LayoutEngine;
use crate::error::Result;
use crate::types::{ColumnKind, ColumnSpec, Datum, RowSource};

/// Classify a column from its data: the first non-null value decides, and an
/// all-null column defaults to the string path.
pub fn classify_column(rows: &dyn RowSource, column: &str) -> Result<ColumnKind> {
    for row in 0..rows.row_count() {
        match rows.datum(row, column)? {
            Some(Datum::Bool(_)) => return Ok(ColumnKind::Bool),
            Some(Datum::Number(_)) => return Ok(ColumnKind::Float64),
            Some(Datum::Text(_)) => return Ok(ColumnKind::Text),
            Some(Datum::Null) | None => {}
        }
    }
    Ok(ColumnKind::Text)
}

fn encode_float(rows: &dyn RowSource, column: &str) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(rows.row_count());
    for row in 0..rows.row_count() {
        let value = match rows.datum(row, column)? {
            Some(Datum::Number(n)) => *n,
            Some(Datum::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Datum::Text(_)) | Some(Datum::Null) | None => f64::NAN,
        };
        values.push(value);
    }
    Ok(values)
}

// JS truthiness for stray numbers in a bool column: exactly 0 is false.
#[allow(clippy::float_cmp)]
fn encode_bool(rows: &dyn RowSource, column: &str) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(rows.row_count());
    for row in 0..rows.row_count() {
        let value = match rows.datum(row, column)? {
            Some(Datum::Bool(true)) => 1.0,
            Some(Datum::Bool(false)) => 0.0,
            Some(Datum::Number(n)) => {
                if *n == 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Some(Datum::Text(_)) | Some(Datum::Null) | None => f64::NAN,
        };
        values.push(value);
    }
    Ok(values)
}

fn encode_strings(rows: &dyn RowSource, column: &str) -> Result<(Vec<String>, Vec<u32>)> {
    let mut interner = StringInterner::new();
    let mut ids = Vec::with_capacity(rows.row_count());
    for row in 0..rows.row_count() {
        let id = match rows.datum(row, column)? {
            Some(Datum::Text(s)) => interner.intern(s),
            Some(Datum::Number(n)) => interner.intern(&n.to_string()),
            Some(Datum::Bool(true)) => interner.intern("true"),
            Some(Datum::Bool(false)) => interner.intern("false"),
            Some(Datum::Null) | None => 0,
        };
        ids.push(id);
    }
    Ok((interner.into_unique(), ids))
}

/// Push the whole dataset to the engine in columnar form.
///
/// A descriptor's pinned `kind` wins over inference. Returns the
/// classification actually used per column, in declaration order.
#[allow(clippy::cast_possible_truncation)]
pub fn ingest_columns(
    engine: &mut dyn LayoutEngine,
    columns: &[ColumnSpec],
    rows: &dyn RowSource,
) -> Result<Vec<ColumnKind>> {
    engine.init_columnar(columns.len() as u32, rows.row_count() as u32)?;

    let mut kinds = Vec::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        let index = index as u32;
        let kind = match column.kind {
            Some(kind) => kind,
            None => classify_column(rows, &column.id)?,
        };
        match kind {
            ColumnKind::Float64 => {
                engine.ingest_float64_column(index, &encode_float(rows, &column.id)?)?;
            }
            ColumnKind::Bool => {
                engine.ingest_bool_column(index, &encode_bool(rows, &column.id)?)?;
            }
            ColumnKind::Text => {
                let (unique, ids) = encode_strings(rows, &column.id)?;
                engine.ingest_string_column(index, &unique, &ids)?;
            }
        }
        kinds.push(kind);
    }

    engine.finalize_columnar()?;
    Ok(kinds)
}
