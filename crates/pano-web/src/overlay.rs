//! DOM layer over the canvas: hotspot markers and the load/error status.

use crate::dom;
use anyhow::anyhow;
use pano_core::{Hotspot, Marker};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct Overlay {
    document: web::Document,
    layer: web::HtmlElement,
    status: web::HtmlElement,
    markers: Vec<(String, web::HtmlElement)>,
}

impl Overlay {
    /// Inserts the layer next to `canvas`, sharing its parent.
    pub fn attach(
        document: &web::Document,
        canvas: &web::HtmlCanvasElement,
    ) -> anyhow::Result<Self> {
        let parent = canvas
            .parent_element()
            .ok_or_else(|| anyhow!("canvas has no parent element"))?;
        let layer = dom::create_div(document, "pano-overlay")?;
        let style = layer.style();
        _ = style.set_property("position", "absolute");
        _ = style.set_property("inset", "0");
        _ = style.set_property("pointer-events", "none");
        _ = style.set_property("overflow", "hidden");

        let status = dom::create_div(document, "pano-status")?;
        dom::set_hidden(&status, true);
        layer.append_child(&status).map_err(dom::js_err)?;
        parent.append_child(&layer).map_err(dom::js_err)?;
        Ok(Self {
            document: document.clone(),
            layer,
            status,
            markers: Vec::new(),
        })
    }

    /// Replaces every marker with one element per hotspot. `on_click`
    /// receives the hotspot id.
    pub fn build_markers(
        &mut self,
        hotspots: &[Hotspot],
        on_click: impl Fn(String) + Clone + 'static,
    ) {
        self.clear_markers();
        for h in hotspots {
            let el = match dom::create_div(&self.document, "pano-hotspot") {
                Ok(el) => el,
                Err(e) => {
                    log::warn!("[overlay] marker {}: {:?}", h.id, e);
                    continue;
                }
            };
            el.set_title(&h.title);
            _ = el.set_attribute("data-hotspot-id", &h.id);
            _ = el.set_attribute("role", "button");
            let style = el.style();
            _ = style.set_property("position", "absolute");
            _ = style.set_property("pointer-events", "auto");
            _ = style.set_property("transform", "translate(-50%, -50%)");

            let id = h.id.clone();
            let handler = on_click.clone();
            let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
                ev.stop_propagation();
                handler(id.clone());
            }) as Box<dyn FnMut(_)>);
            _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();

            dom::set_hidden(&el, true);
            if self.layer.append_child(&el).is_ok() {
                self.markers.push((h.id.clone(), el));
            }
        }
    }

    pub fn sync(&self, markers: &[Marker]) {
        for m in markers {
            let Some((_, el)) = self.markers.iter().find(|(id, _)| *id == m.hotspot_id) else {
                continue;
            };
            dom::set_hidden(el, !m.visible);
            if !m.visible {
                continue;
            }
            let style = el.style();
            _ = style.set_property("left", &format!("{:.1}px", m.screen.x));
            _ = style.set_property("top", &format!("{:.1}px", m.screen.y));
            _ = el.class_list().toggle_with_force("open", m.open);
        }
    }

    pub fn clear_markers(&mut self) {
        for (_, el) in self.markers.drain(..) {
            el.remove();
        }
    }

    pub fn show_loading(&self) {
        self.show_status("pano-status loading", "Loading panorama…");
    }

    pub fn show_failed(&self, reason: &str) {
        self.show_status("pano-status failed", reason);
    }

    pub fn show_fatal(&self, message: &str) {
        self.show_status("pano-status fatal", message);
    }

    pub fn hide_status(&self) {
        dom::set_hidden(&self.status, true);
    }

    fn show_status(&self, class: &str, text: &str) {
        self.status.set_class_name(class);
        self.status.set_text_content(Some(text));
        dom::set_hidden(&self.status, false);
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.layer.remove();
    }
}
