//! flashgrid - virtualized canvas data-grid core
//!
//! Keeps the host side of a wasm-accelerated data grid thin and exact:
//! - Columnar ingestion of row-object data for the native layout engine
//! - Zero-copy typed views over the engine's shared memory, revalidated
//!   against buffer growth on every access
//! - A fixed-stride layout record codec with hit-testing
//! - A drag-range selection state machine with TSV clipboard export
//! - Pointer/touch/keyboard/wheel translation into semantic grid events
//!
//! Layout, sorting and filtering live in the engine and are consumed only
//! through the [`engine::LayoutEngine`] contract; drawing a decoded record
//! is the render layer's job.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { version } from 'flashgrid';
//! await init();
//! // Rust hosts: see `SurfaceBinding`, `SelectionManager`, `ingest_columns`.
//! ```

pub mod columnar;
pub mod engine;
pub mod error;
pub mod events;
pub mod layout;
pub mod selection;
pub mod types;

use wasm_bindgen::prelude::*;

pub use columnar::{classify_column, ingest_columns, StringInterner};
pub use engine::{BufferInfo, FrameInput, FrameStats, LayoutEngine, ViewCache, Viewport};
pub use error::{GridError, Result};
pub use events::{EventManager, GridEvent, GridHandlers, KeyEvent, ScrollEvent};
pub use layout::record::{hit_test, nearest_record, RecordBuffer, RECORD_STRIDE};
pub use selection::{
    build_tsv, NormalizedRange, SelectionManager, SelectionRange, SharedSelection,
};
pub use types::*;

/// Install the panic hook that reports Rust panics to the browser console.
#[wasm_bindgen(js_name = "initPanicHook")]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
