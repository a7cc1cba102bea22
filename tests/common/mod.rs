//! Common test utilities: synthetic record buffers, a recording mock
//! engine, and a recording handler table.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use flashgrid::engine::{BufferInfo, FrameInput, FrameStats, LayoutEngine};
use flashgrid::error::{GridError, Result};
use flashgrid::events::{GridEvent, GridHandlers, KeyEvent, ScrollEvent};
use flashgrid::types::{HitResult, RecordRange};
use flashgrid::RECORD_STRIDE;

// ============================================================================
// Record buffer builders
// ============================================================================

/// Append one layout record with default padding/border fields.
pub fn push_record(buf: &mut Vec<f32>, row: u32, col: u32, x: f32, y: f32, w: f32, h: f32) {
    buf.extend_from_slice(&[
        row as f32, col as f32, x, y, w, h, // row, col, rect
        0.0, // align
        2.0, 2.0, 2.0, 2.0, // padding
        1.0, 1.0, 1.0, 1.0, // border widths
        0.0, // reserved
    ]);
    assert_eq!(buf.len() % RECORD_STRIDE, 0);
}

/// Uniform grid layout: `cols` header records in a strip at y=0, then
/// `rows`×`cols` data records beneath. Returns (buffer, headers, data).
pub fn grid_records(
    cols: u32,
    rows: u32,
    cell_w: f32,
    cell_h: f32,
) -> (Vec<f32>, RecordRange, RecordRange) {
    let mut buf = Vec::new();
    for c in 0..cols {
        push_record(&mut buf, 0, c, c as f32 * cell_w, 0.0, cell_w, cell_h);
    }
    for r in 0..rows {
        for c in 0..cols {
            push_record(
                &mut buf,
                r,
                c,
                c as f32 * cell_w,
                (r + 1) as f32 * cell_h,
                cell_w,
                cell_h,
            );
        }
    }
    (
        buf,
        RecordRange::new(0, cols),
        RecordRange::new(cols, rows * cols),
    )
}

// ============================================================================
// Mock layout engine
// ============================================================================

/// One recorded engine call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Init { columns: u32, rows: u32 },
    Float { index: u32, values: Vec<f64> },
    Bool { index: u32, values: Vec<f64> },
    Strings { index: u32, unique: Vec<String>, ids: Vec<u32> },
    Finalize,
    Frame,
}

/// Engine double that records every call and can be told to fail.
#[derive(Debug, Default)]
pub struct MockEngine {
    pub calls: Vec<EngineCall>,
    pub fail_ingest_at: Option<u32>,
}

impl LayoutEngine for MockEngine {
    fn init_columnar(&mut self, column_count: u32, row_count: u32) -> Result<()> {
        self.calls.push(EngineCall::Init {
            columns: column_count,
            rows: row_count,
        });
        Ok(())
    }

    fn ingest_float64_column(&mut self, index: u32, values: &[f64]) -> Result<()> {
        if self.fail_ingest_at == Some(index) {
            return Err(GridError::Engine("ingest rejected".to_string()));
        }
        self.calls.push(EngineCall::Float {
            index,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn ingest_bool_column(&mut self, index: u32, values: &[f64]) -> Result<()> {
        if self.fail_ingest_at == Some(index) {
            return Err(GridError::Engine("ingest rejected".to_string()));
        }
        self.calls.push(EngineCall::Bool {
            index,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn ingest_string_column(&mut self, index: u32, unique: &[String], ids: &[u32]) -> Result<()> {
        if self.fail_ingest_at == Some(index) {
            return Err(GridError::Engine("ingest rejected".to_string()));
        }
        self.calls.push(EngineCall::Strings {
            index,
            unique: unique.to_vec(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    fn finalize_columnar(&mut self) -> Result<()> {
        self.calls.push(EngineCall::Finalize);
        Ok(())
    }

    fn layout_buffer_info(&self) -> Result<BufferInfo> {
        Ok(BufferInfo::default())
    }

    fn view_indices_info(&self) -> Result<BufferInfo> {
        Ok(BufferInfo::default())
    }

    fn submit_frame(&mut self, _frame: &FrameInput<'_>) -> Result<FrameStats> {
        self.calls.push(EngineCall::Frame);
        Ok(FrameStats::default())
    }
}

// ============================================================================
// Recording handler table
// ============================================================================

fn describe_hit(hit: &HitResult) -> String {
    match hit {
        HitResult::Header(h) => format!("header({},{})", h.row, h.col),
        HitResult::Cell(h) => format!("cell({},{})", h.row, h.col),
        HitResult::Miss => "miss".to_string(),
    }
}

/// Handler table that records every dispatch as a readable string.
#[derive(Default)]
pub struct Recorder {
    pub log: Vec<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dispatches whose label starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.log.iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl GridHandlers for Recorder {
    fn on_cell_click(&mut self, event: &GridEvent) {
        self.log.push(format!("click:{}", describe_hit(&event.hit)));
    }

    fn on_cell_double_click(&mut self, event: &GridEvent) {
        self.log
            .push(format!("dblclick:{}", describe_hit(&event.hit)));
    }

    fn on_cell_mouse_down(&mut self, event: &GridEvent) {
        self.log.push(format!("down:{}", describe_hit(&event.hit)));
    }

    fn on_cell_mouse_move(&mut self, event: &GridEvent) {
        self.log.push(format!("move:{}", describe_hit(&event.hit)));
    }

    fn on_cell_mouse_up(&mut self, event: &GridEvent) {
        self.log.push(format!("up:{}", describe_hit(&event.hit)));
    }

    fn on_header_click(&mut self, event: &GridEvent) {
        self.log
            .push(format!("headerclick:{}", describe_hit(&event.hit)));
    }

    fn on_context_menu(&mut self, event: &GridEvent) {
        self.log
            .push(format!("contextmenu:{}", describe_hit(&event.hit)));
    }

    fn on_scroll(&mut self, event: &ScrollEvent) {
        self.log
            .push(format!("scroll:{},{}", event.delta_x, event.delta_y));
    }

    fn on_key_down(&mut self, event: &KeyEvent) {
        self.log.push(format!(
            "key:{}:ctrl={},shift={}",
            event.key, event.ctrl, event.shift
        ));
    }

    fn on_touch_start(&mut self, event: &GridEvent) {
        self.log
            .push(format!("touchstart:{}", describe_hit(&event.hit)));
    }

    fn on_touch_move(&mut self, event: &GridEvent) {
        self.log
            .push(format!("touchmove:{}", describe_hit(&event.hit)));
    }

    fn on_touch_end(&mut self, event: &GridEvent) {
        self.log
            .push(format!("touchend:{}", describe_hit(&event.hit)));
    }
}
