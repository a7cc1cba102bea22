//! Hit-test results and record-range descriptors.

use serde::{Deserialize, Serialize};

/// A contiguous run of layout records, e.g. the header block or the data
/// block of the current virtualized window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordRange {
    /// Index of the first record in the run.
    pub start: u32,
    /// Number of records in the run.
    pub count: u32,
}

impl RecordRange {
    /// Range covering `count` records starting at `start`.
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    /// True when the range holds no records.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// The record a point resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellHit {
    /// Index of the record in the layout buffer.
    pub record_index: u32,
    /// Logical row of the cell.
    pub row: u32,
    /// Logical column of the cell.
    pub col: u32,
    /// Record rectangle, content coordinates.
    pub x: f32,
    /// Record rectangle, content coordinates.
    pub y: f32,
    /// Record width.
    pub width: f32,
    /// Record height.
    pub height: f32,
}

/// Outcome of hit-testing a point against the current layout.
///
/// A miss is ordinary data, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitResult {
    /// Point landed in a header record.
    Header(CellHit),
    /// Point landed in a data record.
    Cell(CellHit),
    /// Point landed in no record.
    Miss,
}

impl HitResult {
    /// The hit payload for either header or cell, `None` on a miss.
    pub fn hit(&self) -> Option<&CellHit> {
        match self {
            HitResult::Header(hit) | HitResult::Cell(hit) => Some(hit),
            HitResult::Miss => None,
        }
    }

    /// True when the point resolved to no record.
    pub fn is_miss(&self) -> bool {
        matches!(self, HitResult::Miss)
    }
}
