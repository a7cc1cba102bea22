//! Browser listener glue for one rendering surface (wasm only).
//!
//! `SurfaceBinding` owns the listener group and the long-press timer; the
//! target-independent [`EventManager`] owns all gesture logic. Listeners
//! re-fetch the record buffer through the caller-supplied provider on every
//! event, so hit-testing always sees same-frame engine state.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent, TouchEvent, WheelEvent};

use super::gesture::LONG_PRESS_MS;
use super::{
    Dispatch, EventManager, GridEvent, GridHandlers, InputKind, KeyEvent, RawDispatch, RawObserver,
    ScrollEvent,
};
use crate::layout::record::RecordBuffer;
use crate::types::{HitResult, RecordRange};

/// Fetches the current layout record view; called once per input event.
/// `None` (engine not ready) hit-tests against an empty buffer.
pub type LayoutProvider = Box<dyn FnMut() -> Option<js_sys::Float32Array>>;

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

struct LongPress {
    timer: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

struct Shared {
    core: RefCell<EventManager>,
    handlers: RefCell<Box<dyn GridHandlers>>,
    provider: RefCell<Option<LayoutProvider>>,
    long_press: RefCell<LongPress>,
}

fn with_records<R>(shared: &Shared, f: impl FnOnce(&dyn RecordBuffer) -> R) -> R {
    let view = match shared.provider.borrow_mut().as_mut() {
        Some(provider) => provider(),
        None => None,
    };
    match view {
        Some(view) => f(&view),
        None => {
            let empty: &[f32] = &[];
            f(empty)
        }
    }
}

fn surface_coords(surface: &HtmlElement, client_x: i32, client_y: i32) -> (f32, f32) {
    let rect = surface.get_bounding_client_rect();
    (
        client_x as f32 - rect.left() as f32,
        client_y as f32 - rect.top() as f32,
    )
}

fn first_touch_coords(surface: &HtmlElement, event: &TouchEvent) -> Option<(f32, f32)> {
    let touch = event.touches().item(0)?;
    Some(surface_coords(surface, touch.client_x(), touch.client_y()))
}

fn cancel_long_press(shared: &Shared) {
    if let Some(timer) = shared.long_press.borrow_mut().timer.take() {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(timer);
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn arm_long_press(shared: &Rc<Shared>) {
    cancel_long_press(shared);
    let Some(window) = web_sys::window() else {
        return;
    };
    {
        let mut long_press = shared.long_press.borrow_mut();
        if long_press.closure.is_none() {
            let weak = Rc::downgrade(shared);
            long_press.closure = Some(Closure::wrap(Box::new(move || {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                shared.long_press.borrow_mut().timer = None;
                with_records(&shared, |records| {
                    shared
                        .core
                        .borrow_mut()
                        .long_press_fired(records, shared.handlers.borrow_mut().as_mut());
                });
            }) as Box<dyn FnMut()>));
        }
    }
    let long_press = shared.long_press.borrow();
    let Some(closure) = long_press.closure.as_ref() else {
        return;
    };
    let timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            LONG_PRESS_MS as i32,
        )
        .ok();
    drop(long_press);
    shared.long_press.borrow_mut().timer = timer;
}

type Listener = (&'static str, Closure<dyn FnMut(web_sys::Event)>);

/// One cancelable listener group on one rendering surface.
///
/// Attaching twice detaches first; detaching is idempotent and leaves no
/// live listeners or pending gesture timers behind.
pub struct SurfaceBinding {
    shared: Rc<Shared>,
    surface: Option<HtmlElement>,
    listeners: Vec<Listener>,
}

impl Default for SurfaceBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceBinding {
    /// Binding with an idle manager and nothing attached.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                core: RefCell::new(EventManager::new()),
                handlers: RefCell::new(Box::new(NoHandlers)),
                provider: RefCell::new(None),
                long_press: RefCell::new(LongPress {
                    timer: None,
                    closure: None,
                }),
            }),
            surface: None,
            listeners: Vec::new(),
        }
    }

    /// Replace the record ranges used for hit-testing.
    pub fn set_layouts(&self, headers: RecordRange, data: RecordRange) {
        self.shared.core.borrow_mut().set_layouts(headers, data);
    }

    /// Horizontal scroll offset for viewport → content correction.
    pub fn set_scroll_offset(&self, x: f32) {
        self.shared.core.borrow_mut().set_scroll_offset(x);
    }

    /// Install or remove the raw observer on the underlying manager.
    pub fn set_raw_observer(&self, observer: Option<RawObserver>) {
        self.shared.core.borrow_mut().set_raw_observer(observer);
    }

    /// Re-hit-test the last stored move position against current layouts.
    pub fn hit_test_at_last_pos(&self) -> HitResult {
        with_records(&self.shared, |records| {
            self.shared.core.borrow().hit_test_at_last_pos(records)
        })
    }

    /// Register the listener group on `surface`. Always detaches first.
    pub fn attach(
        &mut self,
        surface: &HtmlElement,
        handlers: Box<dyn GridHandlers>,
        provider: LayoutProvider,
    ) {
        self.detach();
        *self.shared.handlers.borrow_mut() = handlers;
        *self.shared.provider.borrow_mut() = Some(provider);

        self.add_mouse_listener(surface, "mousedown", |shared, x, y, event| {
            let primary = event.button() == 0;
            with_records(shared, |records| {
                shared.core.borrow_mut().pointer_down(
                    x,
                    y,
                    primary,
                    records,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(event.clone().into()),
                );
            });
        });
        self.add_mouse_listener(surface, "mousemove", |shared, x, y, event| {
            let primary_held = event.buttons() & 1 != 0;
            with_records(shared, |records| {
                shared.core.borrow_mut().pointer_move(
                    x,
                    y,
                    primary_held,
                    records,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(event.clone().into()),
                );
            });
        });
        self.add_mouse_listener(surface, "mouseup", |shared, x, y, event| {
            with_records(shared, |records| {
                shared.core.borrow_mut().pointer_up(
                    x,
                    y,
                    records,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(event.clone().into()),
                );
            });
        });
        self.add_mouse_listener(surface, "click", |shared, x, y, event| {
            with_records(shared, |records| {
                shared.core.borrow_mut().click(
                    x,
                    y,
                    records,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(event.clone().into()),
                );
            });
        });
        self.add_mouse_listener(surface, "dblclick", |shared, x, y, event| {
            with_records(shared, |records| {
                shared.core.borrow_mut().double_click(
                    x,
                    y,
                    records,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(event.clone().into()),
                );
            });
        });
        self.add_mouse_listener(surface, "contextmenu", |shared, x, y, event| {
            with_records(shared, |records| {
                shared.core.borrow_mut().context_menu(
                    x,
                    y,
                    records,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(event.clone().into()),
                );
            });
        });

        // Wheel
        {
            let shared = Rc::clone(&self.shared);
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Ok(wheel) = event.dyn_into::<WheelEvent>() else {
                    return;
                };
                #[allow(clippy::cast_possible_truncation)]
                shared.core.borrow_mut().wheel(
                    wheel.delta_x() as f32,
                    wheel.delta_y() as f32,
                    shared.handlers.borrow_mut().as_mut(),
                    Some(wheel.into()),
                );
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.register(surface, "wheel", closure);
        }

        // Keyboard (the surface must be focusable, e.g. tabindex="0")
        {
            let shared = Rc::clone(&self.shared);
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Ok(key) = event.dyn_into::<KeyboardEvent>() else {
                    return;
                };
                shared.core.borrow_mut().key_down(
                    &key.key(),
                    key.ctrl_key(),
                    key.shift_key(),
                    key.alt_key(),
                    key.meta_key(),
                    shared.handlers.borrow_mut().as_mut(),
                    Some(key.into()),
                );
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.register(surface, "keydown", closure);
        }

        // Touch
        {
            let shared = Rc::clone(&self.shared);
            let surface_ref = surface.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Ok(touch) = event.dyn_into::<TouchEvent>() else {
                    return;
                };
                touch.prevent_default();
                let count = touch.touches().length();
                let Some((x, y)) = first_touch_coords(&surface_ref, &touch) else {
                    return;
                };
                let arm = with_records(&shared, |records| {
                    shared.core.borrow_mut().touch_start(
                        x,
                        y,
                        count,
                        records,
                        shared.handlers.borrow_mut().as_mut(),
                        Some(touch.clone().into()),
                    )
                });
                if arm {
                    arm_long_press(&shared);
                } else {
                    cancel_long_press(&shared);
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.register(surface, "touchstart", closure);
        }
        {
            let shared = Rc::clone(&self.shared);
            let surface_ref = surface.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Ok(touch) = event.dyn_into::<TouchEvent>() else {
                    return;
                };
                touch.prevent_default();
                let count = touch.touches().length();
                let Some((x, y)) = first_touch_coords(&surface_ref, &touch) else {
                    return;
                };
                with_records(&shared, |records| {
                    shared.core.borrow_mut().touch_move(
                        x,
                        y,
                        count,
                        records,
                        shared.handlers.borrow_mut().as_mut(),
                        Some(touch.clone().into()),
                    );
                });
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.register(surface, "touchmove", closure);
        }
        {
            let shared = Rc::clone(&self.shared);
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Ok(touch) = event.dyn_into::<TouchEvent>() else {
                    return;
                };
                cancel_long_press(&shared);
                with_records(&shared, |records| {
                    shared.core.borrow_mut().touch_end(
                        now_ms(),
                        records,
                        shared.handlers.borrow_mut().as_mut(),
                        Some(touch.clone().into()),
                    );
                });
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.register(surface, "touchend", closure);
        }
        {
            let shared = Rc::clone(&self.shared);
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                cancel_long_press(&shared);
                shared.core.borrow_mut().touch_cancel();
            }) as Box<dyn FnMut(web_sys::Event)>);
            self.register(surface, "touchcancel", closure);
        }

        self.surface = Some(surface.clone());
    }

    /// Remove every listener and cancel pending gesture timers. Idempotent.
    pub fn detach(&mut self) {
        cancel_long_press(&self.shared);
        if let Some(surface) = self.surface.take() {
            for (name, closure) in self.listeners.drain(..) {
                let _ = surface
                    .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
        } else {
            self.listeners.clear();
        }
        *self.shared.provider.borrow_mut() = None;
        self.shared.core.borrow_mut().cancel_gestures();
    }

    fn register(
        &mut self,
        surface: &HtmlElement,
        name: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    ) {
        let _ = surface.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        self.listeners.push((name, closure));
    }

    fn add_mouse_listener(
        &mut self,
        surface: &HtmlElement,
        name: &'static str,
        handle: impl Fn(&Shared, f32, f32, &MouseEvent) + 'static,
    ) {
        let shared = Rc::clone(&self.shared);
        let surface_ref = surface.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Ok(mouse) = event.dyn_into::<MouseEvent>() else {
                return;
            };
            let (x, y) = surface_coords(&surface_ref, mouse.client_x(), mouse.client_y());
            handle(&shared, x, y, &mouse);
        }) as Box<dyn FnMut(web_sys::Event)>);
        self.register(surface, name, closure);
    }
}

impl Drop for SurfaceBinding {
    fn drop(&mut self) {
        self.detach();
    }
}

struct NoHandlers;

impl GridHandlers for NoHandlers {}

fn input_kind_name(kind: InputKind) -> &'static str {
    match kind {
        InputKind::PointerDown => "mousedown",
        InputKind::PointerMove => "mousemove",
        InputKind::PointerUp => "mouseup",
        InputKind::Click => "click",
        InputKind::DoubleClick => "dblclick",
        InputKind::ContextMenu => "contextmenu",
        InputKind::Wheel => "wheel",
        InputKind::KeyDown => "keydown",
        InputKind::TouchStart => "touchstart",
        InputKind::TouchMove => "touchmove",
        InputKind::TouchEnd => "touchend",
    }
}

fn set_prop(target: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

fn grid_event_js(event: &GridEvent) -> JsValue {
    let obj = Object::new();
    let hit = serde_wasm_bindgen::to_value(&event.hit).unwrap_or(JsValue::NULL);
    set_prop(&obj, "hit", &hit);
    set_prop(&obj, "viewportX", &event.viewport_x.into());
    set_prop(&obj, "viewportY", &event.viewport_y.into());
    set_prop(&obj, "contentX", &event.content_x.into());
    set_prop(&obj, "contentY", &event.content_y.into());
    if let Some(native) = &event.native {
        set_prop(&obj, "native", native);
    }
    obj.into()
}

/// Semantic handler table backed by JS callbacks.
///
/// Built from a plain object whose properties (`onCellClick`,
/// `onCellMouseDown`, …) are functions; missing properties are skipped.
#[derive(Default)]
pub struct JsHandlerTable {
    on_cell_click: Option<Function>,
    on_cell_double_click: Option<Function>,
    on_cell_mouse_down: Option<Function>,
    on_cell_mouse_move: Option<Function>,
    on_cell_mouse_up: Option<Function>,
    on_header_click: Option<Function>,
    on_context_menu: Option<Function>,
    on_scroll: Option<Function>,
    on_key_down: Option<Function>,
    on_touch_start: Option<Function>,
    on_touch_move: Option<Function>,
    on_touch_end: Option<Function>,
    observe_raw: Option<Function>,
}

fn function_prop(source: &JsValue, key: &str) -> Option<Function> {
    Reflect::get(source, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

impl JsHandlerTable {
    /// Read the callback properties off a JS object.
    pub fn from_object(source: &JsValue) -> Self {
        Self {
            on_cell_click: function_prop(source, "onCellClick"),
            on_cell_double_click: function_prop(source, "onCellDoubleClick"),
            on_cell_mouse_down: function_prop(source, "onCellMouseDown"),
            on_cell_mouse_move: function_prop(source, "onCellMouseMove"),
            on_cell_mouse_up: function_prop(source, "onCellMouseUp"),
            on_header_click: function_prop(source, "onHeaderClick"),
            on_context_menu: function_prop(source, "onContextMenu"),
            on_scroll: function_prop(source, "onScroll"),
            on_key_down: function_prop(source, "onKeyDown"),
            on_touch_start: function_prop(source, "onTouchStart"),
            on_touch_move: function_prop(source, "onTouchMove"),
            on_touch_end: function_prop(source, "onTouchEnd"),
            observe_raw: function_prop(source, "observeRaw"),
        }
    }

    /// Raw observer bridging to the table's `observeRaw` callback; a truthy
    /// return value cancels default handling for that input.
    pub fn raw_observer(&self) -> Option<RawObserver> {
        let observe = self.observe_raw.clone()?;
        Some(Box::new(move |raw: &RawDispatch| {
            let obj = Object::new();
            set_prop(&obj, "kind", &JsValue::from_str(input_kind_name(raw.kind)));
            let hit = serde_wasm_bindgen::to_value(&raw.hit).unwrap_or(JsValue::NULL);
            set_prop(&obj, "hit", &hit);
            set_prop(&obj, "viewportX", &raw.viewport_x.into());
            set_prop(&obj, "viewportY", &raw.viewport_y.into());
            set_prop(&obj, "contentX", &raw.content_x.into());
            set_prop(&obj, "contentY", &raw.content_y.into());
            if let Some(native) = &raw.native {
                set_prop(&obj, "native", native);
            }
            match observe.call1(&JsValue::NULL, &obj) {
                Ok(verdict) if verdict.is_truthy() => Dispatch::Cancel,
                _ => Dispatch::Continue,
            }
        }))
    }

    fn invoke(callback: Option<&Function>, payload: &JsValue) {
        if let Some(callback) = callback {
            let _ = callback.call1(&JsValue::NULL, payload);
        }
    }
}

impl GridHandlers for JsHandlerTable {
    fn on_cell_click(&mut self, event: &GridEvent) {
        Self::invoke(self.on_cell_click.as_ref(), &grid_event_js(event));
    }

    fn on_cell_double_click(&mut self, event: &GridEvent) {
        Self::invoke(self.on_cell_double_click.as_ref(), &grid_event_js(event));
    }

    fn on_cell_mouse_down(&mut self, event: &GridEvent) {
        Self::invoke(self.on_cell_mouse_down.as_ref(), &grid_event_js(event));
    }

    fn on_cell_mouse_move(&mut self, event: &GridEvent) {
        Self::invoke(self.on_cell_mouse_move.as_ref(), &grid_event_js(event));
    }

    fn on_cell_mouse_up(&mut self, event: &GridEvent) {
        Self::invoke(self.on_cell_mouse_up.as_ref(), &grid_event_js(event));
    }

    fn on_header_click(&mut self, event: &GridEvent) {
        Self::invoke(self.on_header_click.as_ref(), &grid_event_js(event));
    }

    fn on_context_menu(&mut self, event: &GridEvent) {
        Self::invoke(self.on_context_menu.as_ref(), &grid_event_js(event));
    }

    fn on_scroll(&mut self, event: &ScrollEvent) {
        let obj = Object::new();
        set_prop(&obj, "deltaX", &event.delta_x.into());
        set_prop(&obj, "deltaY", &event.delta_y.into());
        if let Some(native) = &event.native {
            set_prop(&obj, "native", native);
        }
        Self::invoke(self.on_scroll.as_ref(), &obj.into());
    }

    fn on_key_down(&mut self, event: &KeyEvent) {
        let obj = Object::new();
        set_prop(&obj, "key", &JsValue::from_str(&event.key));
        set_prop(&obj, "ctrl", &event.ctrl.into());
        set_prop(&obj, "shift", &event.shift.into());
        set_prop(&obj, "alt", &event.alt.into());
        set_prop(&obj, "meta", &event.meta.into());
        if let Some(native) = &event.native {
            set_prop(&obj, "native", native);
        }
        Self::invoke(self.on_key_down.as_ref(), &obj.into());
    }

    fn on_touch_start(&mut self, event: &GridEvent) {
        Self::invoke(self.on_touch_start.as_ref(), &grid_event_js(event));
    }

    fn on_touch_move(&mut self, event: &GridEvent) {
        Self::invoke(self.on_touch_move.as_ref(), &grid_event_js(event));
    }

    fn on_touch_end(&mut self, event: &GridEvent) {
        Self::invoke(self.on_touch_end.as_ref(), &grid_event_js(event));
    }
}
