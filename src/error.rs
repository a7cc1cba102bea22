//! Structured error types for flashgrid.
//!
//! Only programmer-misuse conditions surface as errors; data-driven
//! conditions (empty datasets, zero-length buffers, hit-test misses)
//! are represented in the types themselves.

/// All errors that can occur in the flashgrid core.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A row index past the end of the row model.
    #[error("row index {index} out of bounds (row count {len})")]
    RowIndex {
        /// Requested row index.
        index: usize,
        /// Number of rows in the model.
        len: usize,
    },

    /// A layout-engine call failed.
    #[error("layout engine: {0}")]
    Engine(String),

    /// Catch-all for string errors at the JS boundary.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
