//! Binding of the [`LayoutEngine`] contract to a JS/wasm module instance.
//!
//! The engine module is handed over as an opaque object; its methods are
//! looked up and invoked reflectively, so any module shape that exposes the
//! expected exports works without a static binding.

use js_sys::{Array, Float64Array, Function, Reflect, Uint32Array};
use wasm_bindgen::prelude::*;

use super::{BufferInfo, FrameInput, FrameStats, LayoutEngine};
use crate::error::{GridError, Result};

/// A layout engine living on the JS side of the boundary.
pub struct JsLayoutEngine {
    module: JsValue,
}

fn engine_err(name: &str, err: JsValue) -> GridError {
    let detail = err
        .as_string()
        .unwrap_or_else(|| format!("{err:?}"));
    GridError::Engine(format!("{name}: {detail}"))
}

impl JsLayoutEngine {
    /// Wrap a module instance exposing the columnar/layout exports.
    pub fn new(module: JsValue) -> Self {
        Self { module }
    }

    fn call(&self, name: &str, args: &Array) -> Result<JsValue> {
        let method = Reflect::get(&self.module, &JsValue::from_str(name))
            .map_err(|err| engine_err(name, err))?;
        let method: Function = method
            .dyn_into()
            .map_err(|_| GridError::Engine(format!("{name} is not a function")))?;
        method
            .apply(&self.module, args)
            .map_err(|err| engine_err(name, err))
    }

    fn call_info(&self, name: &str) -> Result<BufferInfo> {
        let value = self.call(name, &Array::new())?;
        serde_wasm_bindgen::from_value(value).map_err(|err| engine_err(name, err.into()))
    }

    /// The engine's current linear-memory buffer.
    ///
    /// Fetched fresh on every access: memory growth swaps the buffer object
    /// out from under us, and the bridge keys its cache on that identity.
    pub fn memory_buffer(&self) -> Result<js_sys::ArrayBuffer> {
        let memory = Reflect::get(&self.module, &JsValue::from_str("memory"))
            .map_err(|err| engine_err("memory", err))?;
        let buffer = if memory.is_undefined() {
            Reflect::get(&self.module, &JsValue::from_str("buffer"))
                .map_err(|err| engine_err("buffer", err))?
        } else {
            Reflect::get(&memory, &JsValue::from_str("buffer"))
                .map_err(|err| engine_err("memory.buffer", err))?
        };
        buffer
            .dyn_into()
            .map_err(|_| GridError::Engine("engine exposes no ArrayBuffer".to_string()))
    }
}

impl LayoutEngine for JsLayoutEngine {
    fn init_columnar(&mut self, column_count: u32, row_count: u32) -> Result<()> {
        let args = Array::of2(&column_count.into(), &row_count.into());
        self.call("initColumnar", &args).map(|_| ())
    }

    fn ingest_float64_column(&mut self, index: u32, values: &[f64]) -> Result<()> {
        let args = Array::of2(&index.into(), &Float64Array::from(values).into());
        self.call("ingestFloat64Column", &args).map(|_| ())
    }

    fn ingest_bool_column(&mut self, index: u32, values: &[f64]) -> Result<()> {
        let args = Array::of2(&index.into(), &Float64Array::from(values).into());
        self.call("ingestBoolColumn", &args).map(|_| ())
    }

    fn ingest_string_column(&mut self, index: u32, unique: &[String], ids: &[u32]) -> Result<()> {
        let unique = serde_wasm_bindgen::to_value(unique)
            .map_err(|err| engine_err("ingestStringColumn", err.into()))?;
        let args = Array::of3(&index.into(), &unique, &Uint32Array::from(ids).into());
        self.call("ingestStringColumn", &args).map(|_| ())
    }

    fn finalize_columnar(&mut self) -> Result<()> {
        self.call("finalizeColumnar", &Array::new()).map(|_| ())
    }

    fn layout_buffer_info(&self) -> Result<BufferInfo> {
        self.call_info("getLayoutBufferInfo")
    }

    fn view_indices_info(&self) -> Result<BufferInfo> {
        self.call_info("getColumnarViewIndicesInfo")
    }

    fn submit_frame(&mut self, frame: &FrameInput<'_>) -> Result<FrameStats> {
        let payload = serde_wasm_bindgen::to_value(frame)
            .map_err(|err| engine_err("submitFrame", err.into()))?;
        let value = self.call("submitFrame", &Array::of1(&payload))?;
        serde_wasm_bindgen::from_value(value).map_err(|err| engine_err("submitFrame", err.into()))
    }
}
