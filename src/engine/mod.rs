//! Call contract of the native layout engine.
//!
//! The engine owns layout, sorting and filtering; this crate only feeds it
//! columnar data and reads the layout records it publishes to shared memory.
//! The trait mirrors the module's exports one-to-one so host tests can run
//! against a mock while wasm builds bind to the real module via
//! [`JsLayoutEngine`].

pub mod bridge;
#[cfg(target_arch = "wasm32")]
pub mod js;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ColumnSpec;

#[cfg(target_arch = "wasm32")]
pub use js::JsLayoutEngine;
pub use bridge::ViewCache;
#[cfg(target_arch = "wasm32")]
pub use bridge::MemoryBridge;

/// Location of a typed view inside the engine's linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferInfo {
    /// Offset of the region in bytes.
    pub byte_offset: u32,
    /// Length of the region in elements (f32 or u32, per view).
    pub length: u32,
}

/// What the engine reports back after a frame submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
    /// Total layout records published (headers + data).
    pub cell_record_count: u32,
    /// Row offset of the first data record in the virtualized window.
    pub first_visible_row_offset: u32,
}

/// Scroll position and size of the visible area, content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Horizontal scroll position.
    pub scroll_x: f32,
    /// Vertical scroll position.
    pub scroll_y: f32,
    /// Visible width in logical pixels.
    pub width: f32,
    /// Visible height in logical pixels.
    pub height: f32,
}

/// Per-frame submission: everything the engine needs to rebuild the
/// virtualized window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInput<'a> {
    /// Current viewport.
    pub viewport: Viewport,
    /// Registered columns, in declaration order.
    pub columns: &'a [ColumnSpec],
    /// Total rows in the dataset (pre-filter).
    pub row_count: u32,
}

/// The native layout module, consumed strictly through this contract.
///
/// Calls are not retried; a failed call propagates to the caller uncaught.
pub trait LayoutEngine {
    /// Begin a columnar ingestion of `column_count` × `row_count` cells.
    fn init_columnar(&mut self, column_count: u32, row_count: u32) -> Result<()>;

    /// Ingest column `index` as f64 data (nulls already encoded as NaN).
    fn ingest_float64_column(&mut self, index: u32, values: &[f64]) -> Result<()>;

    /// Ingest column `index` as bool data encoded 0.0/1.0 (nulls NaN).
    fn ingest_bool_column(&mut self, index: u32, values: &[f64]) -> Result<()>;

    /// Ingest column `index` as an interned string dictionary plus per-row ids.
    fn ingest_string_column(&mut self, index: u32, unique: &[String], ids: &[u32]) -> Result<()>;

    /// Finish the ingestion started by `init_columnar`.
    fn finalize_columnar(&mut self) -> Result<()>;

    /// Where the f32 layout record block currently lives.
    fn layout_buffer_info(&self) -> Result<BufferInfo>;

    /// Where the u32 columnar view-indices block currently lives.
    fn view_indices_info(&self) -> Result<BufferInfo>;

    /// Submit viewport/columns for this frame; the engine lays out, sorts and
    /// filters internally and republishes the record block before returning.
    fn submit_frame(&mut self, frame: &FrameInput<'_>) -> Result<FrameStats>;
}
