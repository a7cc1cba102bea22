//! Zero-copy views over the engine's shared memory.
//!
//! Wasm linear memory may grow between frames, which silently detaches every
//! typed-array view into the old buffer. Worse, a region in the *new* buffer
//! can coincidentally report the same offset and length as before. The cache
//! therefore checks offset, length AND buffer identity on every fetch, and
//! consumers never hold a view past one frame.

use super::BufferInfo;

/// Single-slot view cache keyed by (offset, length, buffer identity).
///
/// The generation check is target-independent; the wasm [`MemoryBridge`]
/// instantiates it over `ArrayBuffer` handles with `Object.is` identity.
pub struct ViewCache<B, V> {
    entry: Option<Entry<B, V>>,
}

struct Entry<B, V> {
    info: BufferInfo,
    buffer: B,
    view: V,
}

impl<B, V> Default for ViewCache<B, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, V> ViewCache<B, V> {
    /// Empty cache; the first fetch always builds.
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Drop the cached view unconditionally.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Return the cached view, rebuilding it unless offset, length and
    /// buffer identity all match the previous fetch.
    pub fn fetch(
        &mut self,
        info: BufferInfo,
        buffer: B,
        same_buffer: impl Fn(&B, &B) -> bool,
        build: impl FnOnce(&B, BufferInfo) -> V,
    ) -> &V {
        let entry = match self.entry.take() {
            Some(entry) if entry.info == info && same_buffer(&entry.buffer, &buffer) => entry,
            _ => {
                let view = build(&buffer, info);
                Entry { info, buffer, view }
            }
        };
        &self.entry.insert(entry).view
    }
}

/// Cached typed views into the engine's linear memory (wasm only).
#[cfg(target_arch = "wasm32")]
pub struct MemoryBridge {
    layout: ViewCache<js_sys::ArrayBuffer, js_sys::Float32Array>,
    indices: ViewCache<js_sys::ArrayBuffer, js_sys::Uint32Array>,
}

#[cfg(target_arch = "wasm32")]
impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl MemoryBridge {
    /// Bridge with empty caches.
    pub fn new() -> Self {
        Self {
            layout: ViewCache::new(),
            indices: ViewCache::new(),
        }
    }

    /// Current f32 view over the layout record block.
    ///
    /// Engine-reported geometry is trusted by contract; no range validation
    /// happens here.
    pub fn layout_buffer(
        &mut self,
        engine: &super::JsLayoutEngine,
    ) -> crate::error::Result<&js_sys::Float32Array> {
        let info = super::LayoutEngine::layout_buffer_info(engine)?;
        let buffer = engine.memory_buffer()?;
        Ok(self.layout.fetch(
            info,
            buffer,
            |a, b| js_sys::Object::is(a, b),
            |buffer, info| {
                js_sys::Float32Array::new_with_byte_offset_and_length(
                    buffer,
                    info.byte_offset,
                    info.length,
                )
            },
        ))
    }

    /// Current u32 view over the columnar view-indices block.
    pub fn view_indices(
        &mut self,
        engine: &super::JsLayoutEngine,
    ) -> crate::error::Result<&js_sys::Uint32Array> {
        let info = super::LayoutEngine::view_indices_info(engine)?;
        let buffer = engine.memory_buffer()?;
        Ok(self.indices.fetch(
            info,
            buffer,
            |a, b| js_sys::Object::is(a, b),
            |buffer, info| {
                js_sys::Uint32Array::new_with_byte_offset_and_length(
                    buffer,
                    info.byte_offset,
                    info.length,
                )
            },
        ))
    }

    /// Forget both cached views (e.g. after the engine reloads its dataset).
    pub fn invalidate(&mut self) {
        self.layout.invalidate();
        self.indices.invalidate();
    }
}
