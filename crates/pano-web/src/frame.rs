use crate::app::{with_app, Shared};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// requestAnimationFrame loop. Stops once the viewer is dropped.
pub fn start_loop(weak: Weak<Shared>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        with_app(&shared, |app| app.frame());
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else { return };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Fires [`pano_core::Viewer::autoplay_elapsed`] after the settle delay.
pub fn schedule_autoplay(weak: Weak<Shared>, generation: u64, delay_ms: u32) {
    let Some(w) = web::window() else { return };
    let cb = Closure::once_into_js(move || {
        if let Some(shared) = weak.upgrade() {
            with_app(&shared, |app| {
                app.viewer.autoplay_elapsed(generation);
            });
        }
    });
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    if let Err(e) =
        w.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay)
    {
        log::warn!("[narration] could not schedule autoplay: {:?}", e);
    }
}
