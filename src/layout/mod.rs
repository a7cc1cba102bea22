//! Decoding of the engine-produced cell layout, plus hit-testing over it.

pub mod record;

pub use record::{
    hit_test, nearest_record, read_align, read_border, read_col, read_height, read_padding,
    read_row, read_width, read_x, read_y, Align, RecordBuffer, Side, RECORD_STRIDE,
};
