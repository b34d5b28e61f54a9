use crate::app::{with_app, Shared};
use pano_core::{key_action, wheel_action, ViewerAction};
use std::rc::Weak;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_all(canvas: &web::HtmlCanvasElement, weak: Weak<Shared>) {
    // keyboard focus lives on the canvas, so the host page keeps its keys
    _ = canvas.set_attribute("tabindex", "0");
    _ = canvas.style().set_property("touch-action", "none");
    wire_pointer(canvas, weak.clone());
    wire_wheel(canvas, weak.clone());
    wire_keydown(canvas, weak.clone());
    wire_resize(weak);
}

#[inline]
fn pointer_css_px(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    )
}

fn listen<E: FromWasmAbi + 'static>(
    target: &web::EventTarget,
    name: &str,
    handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointer(canvas: &web::HtmlCanvasElement, weak: Weak<Shared>) {
    {
        let weak = weak.clone();
        let c = canvas.clone();
        listen(canvas, "pointerdown", move |ev: web::PointerEvent| {
            let Some(shared) = weak.upgrade() else { return };
            _ = c.set_pointer_capture(ev.pointer_id());
            _ = c.focus();
            let (x, y) = pointer_css_px(&ev, &c);
            with_app(&shared, |app| {
                app.resume_audio();
                app.viewer.pointer_down(x, y);
            });
        });
    }
    {
        let weak = weak.clone();
        let c = canvas.clone();
        listen(canvas, "pointermove", move |ev: web::PointerEvent| {
            let Some(shared) = weak.upgrade() else { return };
            // hover moves never reach the viewer
            if !shared.app.borrow().viewer.is_dragging() {
                return;
            }
            let (x, y) = pointer_css_px(&ev, &c);
            with_app(&shared, |app| {
                app.viewer.pointer_move(x, y);
            });
        });
    }
    for name in ["pointerup", "pointercancel"] {
        let weak = weak.clone();
        let c = canvas.clone();
        listen(canvas, name, move |ev: web::PointerEvent| {
            let Some(shared) = weak.upgrade() else { return };
            _ = c.release_pointer_capture(ev.pointer_id());
            with_app(&shared, |app| app.viewer.pointer_up());
        });
    }
}

fn wire_wheel(canvas: &web::HtmlCanvasElement, weak: Weak<Shared>) {
    listen(canvas, "wheel", move |ev: web::WheelEvent| {
        let Some(shared) = weak.upgrade() else { return };
        let Some(action) = wheel_action(ev.delta_y()) else {
            return;
        };
        ev.prevent_default();
        with_app(&shared, |app| {
            app.viewer.apply_action(action);
        });
    });
}

fn wire_keydown(canvas: &web::HtmlCanvasElement, weak: Weak<Shared>) {
    listen(canvas, "keydown", move |ev: web::KeyboardEvent| {
        if ev.ctrl_key() || ev.meta_key() || ev.alt_key() || (ev.repeat() && !is_nudge(&ev)) {
            return;
        }
        let Some(shared) = weak.upgrade() else { return };
        let Some(action) = key_action(&ev.key()) else {
            return;
        };
        // arrows and space would otherwise scroll the host page
        ev.prevent_default();
        with_app(&shared, |app| {
            app.resume_audio();
            app.viewer.apply_action(action);
        });
    });
}

#[inline]
fn is_nudge(ev: &web::KeyboardEvent) -> bool {
    matches!(key_action(&ev.key()), Some(ViewerAction::Nudge { .. }))
}

fn wire_resize(weak: Weak<Shared>) {
    let Some(window) = web::window() else { return };
    listen(&window, "resize", move |_ev: web::Event| {
        if let Some(shared) = weak.upgrade() {
            with_app(&shared, |app| app.resize());
        }
    });
}
