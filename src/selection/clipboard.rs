//! TSV export and system clipboard access.
//!
//! The TSV builder is pure; the writer is wasm-only and never surfaces a
//! failure: a rejected async clipboard write falls back to selecting text
//! in a hidden offscreen input and issuing a synchronous copy command.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

use super::NormalizedRange;

/// Escape one cell for TSV: values containing tabs, newlines, or quotes are
/// wrapped in quotes with internal quotes doubled, the way spreadsheet apps
/// write clipboard data.
pub fn escape_cell_text(value: &str) -> String {
    let needs_quoting = value.contains('\t')
        || value.contains('\n')
        || value.contains('\r')
        || value.contains('"');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Render a normalized range as TSV, row-major: tabs within a row, newlines
/// between rows. `get_text` supplies the display text per cell.
pub fn build_tsv<F>(range: &NormalizedRange, get_text: F) -> String
where
    F: Fn(u32, u32) -> String,
{
    let mut out = String::new();
    for row in range.min_row..=range.max_row {
        if row > range.min_row {
            out.push('\n');
        }
        for col in range.min_col..=range.max_col {
            if col > range.min_col {
                out.push('\t');
            }
            out.push_str(&escape_cell_text(&get_text(row, col)));
        }
    }
    out
}

/// System clipboard writer with a hidden-input fallback (wasm only).
#[cfg(target_arch = "wasm32")]
pub struct ClipboardWriter {
    fallback: Option<web_sys::HtmlInputElement>,
}

#[cfg(target_arch = "wasm32")]
impl Default for ClipboardWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl ClipboardWriter {
    /// Writer with no fallback element; `attach` installs one.
    pub fn new() -> Self {
        Self { fallback: None }
    }

    /// Create the offscreen fallback input under `container`. Re-attaching
    /// moves the element to the new container.
    pub fn attach(&mut self, container: &web_sys::HtmlElement) {
        self.detach();
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Ok(element) = document.create_element("input") else {
            return;
        };
        let Ok(input) = element.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        let style = input.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("left", "-9999px");
        let _ = style.set_property("top", "0");
        let _ = input.set_attribute("aria-hidden", "true");
        let _ = input.set_attribute("tabindex", "-1");
        if container.append_child(&input).is_ok() {
            self.fallback = Some(input);
        }
    }

    /// Remove the fallback element. Idempotent.
    pub fn detach(&mut self) {
        if let Some(input) = self.fallback.take() {
            input.remove();
        }
    }

    /// Write `text` to the system clipboard, fire-and-forget.
    ///
    /// Tries the async Clipboard API first; on rejection or when no window
    /// is available, runs the synchronous hidden-input fallback. Failures
    /// never reach the caller.
    pub fn write_text(&self, text: &str) {
        let Some(window) = web_sys::window() else {
            self.copy_via_fallback(text);
            return;
        };
        let clipboard = window.navigator().clipboard();
        let promise = clipboard.write_text(text);
        let fallback = self.fallback.clone();
        let text = text.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            if wasm_bindgen_futures::JsFuture::from(promise).await.is_err() {
                fallback_copy(fallback.as_ref(), &text);
            }
        });
    }

    fn copy_via_fallback(&self, text: &str) {
        fallback_copy(self.fallback.as_ref(), text);
    }

    /// Copy the current selection as TSV, the Ctrl/Cmd+C path.
    ///
    /// Returns false (and writes nothing) when the selection is empty, so
    /// key handlers can let the browser's own copy proceed.
    pub fn copy_selection<F>(&self, selection: &super::SelectionManager, get_text: F) -> bool
    where
        F: Fn(u32, u32) -> String,
    {
        let Some(range) = selection.normalized() else {
            return false;
        };
        self.write_text(&build_tsv(&range, get_text));
        true
    }
}

#[cfg(target_arch = "wasm32")]
fn fallback_copy(input: Option<&web_sys::HtmlInputElement>, text: &str) {
    let Some(input) = input else {
        return;
    };
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    input.set_value(text);
    input.select();
    let _ = document.exec_command("copy");
    input.set_value("");
}
