#![cfg(target_arch = "wasm32")]
//! Embeddable panorama viewer for the browser.
//!
//! ```js
//! const viewer = new PanoramaViewer("pano-canvas", { narration: { lang: "en-IN" } });
//! viewer.onHotspotToggled((id) => showPanel(id));
//! viewer.openScene(sceneFromContentStore);
//! ```

use pano_core::{SceneDescriptor, ViewerConfig, ViewerError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

mod app;
mod audio;
mod dom;
mod events;
mod frame;
mod overlay;
mod speech;

use app::{with_app, Handle};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("pano-web starting");
    Ok(())
}

#[inline]
fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerView {
    hotspot_id: String,
    x: f32,
    y: f32,
    visible: bool,
    open: bool,
}

#[wasm_bindgen]
pub struct PanoramaViewer {
    shared: Handle,
}

#[wasm_bindgen]
impl PanoramaViewer {
    /// `config` may be `undefined`; missing fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config: JsValue) -> Result<PanoramaViewer, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<ViewerConfig>(config)
                .map_err(|e| to_js(ViewerError::InvalidConfig(e.to_string())))?
        };
        let shared = app::build(canvas_id, config).map_err(|e| {
            log::error!("[viewer] init error: {:#}", e);
            JsValue::from_str(&format!("{:#}", e))
        })?;
        {
            let app = shared.app.borrow();
            events::wire_all(app.canvas(), std::rc::Rc::downgrade(&shared));
        }
        Ok(PanoramaViewer { shared })
    }

    #[wasm_bindgen(js_name = openScene)]
    pub fn open_scene(&self, scene: JsValue) -> Result<(), JsValue> {
        let desc: SceneDescriptor = serde_wasm_bindgen::from_value(scene)
            .map_err(|e| to_js(ViewerError::InvalidScene(e.to_string())))?;
        with_app(&self.shared, |app| app.viewer.open_scene(desc))
            .map(|_| ())
            .map_err(to_js)
    }

    pub fn close(&self) {
        with_app(&self.shared, |app| {
            app.viewer.close();
        });
    }

    #[wasm_bindgen(js_name = setNarrationEnabled)]
    pub fn set_narration_enabled(&self, enabled: bool) {
        with_app(&self.shared, |app| {
            app.resume_audio();
            app.viewer.set_narration_enabled(enabled);
        });
    }

    #[wasm_bindgen(js_name = setSpatialAudioEnabled)]
    pub fn set_spatial_audio_enabled(&self, enabled: bool) {
        with_app(&self.shared, |app| {
            app.resume_audio();
            app.viewer.set_spatial_audio_enabled(enabled);
        });
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.zoom_in())
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.zoom_out())
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        with_app(&self.shared, |app| app.viewer.reset_view());
    }

    /// Returns whether markers are now shown.
    #[wasm_bindgen(js_name = toggleHotspots)]
    pub fn toggle_hotspots(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.toggle_hotspots())
    }

    /// Returns the id of the open hotspot afterwards, if any.
    #[wasm_bindgen(js_name = selectHotspot)]
    pub fn select_hotspot(&self, hotspot_id: &str) -> Option<String> {
        with_app(&self.shared, |app| app.viewer.select_hotspot(hotspot_id))
    }

    #[wasm_bindgen(js_name = closeHotspot)]
    pub fn close_hotspot(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.close_hotspot())
    }

    #[wasm_bindgen(js_name = narrateHotspot)]
    pub fn narrate_hotspot(&self, hotspot_id: &str) -> bool {
        with_app(&self.shared, |app| {
            app.resume_audio();
            app.viewer.narrate_hotspot(hotspot_id)
        })
    }

    #[wasm_bindgen(js_name = playClip)]
    pub fn play_clip(&self, clip_id: &str) -> bool {
        with_app(&self.shared, |app| app.viewer.play_clip(clip_id))
    }

    #[wasm_bindgen(js_name = playNext)]
    pub fn play_next(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.play_next())
    }

    #[wasm_bindgen(js_name = pauseNarration)]
    pub fn pause_narration(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.pause_narration())
    }

    #[wasm_bindgen(js_name = resumeNarration)]
    pub fn resume_narration(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.resume_narration())
    }

    #[wasm_bindgen(js_name = stopNarration)]
    pub fn stop_narration(&self) -> bool {
        with_app(&self.shared, |app| app.viewer.stop_narration())
    }

    #[wasm_bindgen(js_name = isNarrationPlaying)]
    pub fn is_narration_playing(&self) -> bool {
        self.shared.app.borrow().viewer.narration_audible()
    }

    /// Current marker placement as `[{hotspotId, x, y, visible, open}]`,
    /// for hosts that draw their own markers.
    pub fn markers(&self) -> Result<JsValue, JsValue> {
        let views: Vec<MarkerView> = self
            .shared
            .app
            .borrow()
            .viewer
            .markers()
            .into_iter()
            .map(|m| MarkerView {
                hotspot_id: m.hotspot_id,
                x: m.screen.x,
                y: m.screen.y,
                visible: m.visible,
                open: m.open,
            })
            .collect();
        serde_wasm_bindgen::to_value(&views).map_err(to_js)
    }

    #[wasm_bindgen(js_name = onHotspotToggled)]
    pub fn on_hotspot_toggled(&self, callback: Option<js_sys::Function>) {
        self.shared.callbacks.borrow_mut().hotspot_toggled = callback;
    }

    #[wasm_bindgen(js_name = onNarrationPlayingChanged)]
    pub fn on_narration_playing_changed(&self, callback: Option<js_sys::Function>) {
        self.shared.callbacks.borrow_mut().narration_playing = callback;
    }

    #[wasm_bindgen(js_name = onClosed)]
    pub fn on_closed(&self, callback: Option<js_sys::Function>) {
        self.shared.callbacks.borrow_mut().closed = callback;
    }

    /// Fatal initialization errors, e.g. no WebGPU adapter.
    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&self, callback: Option<js_sys::Function>) {
        self.shared.callbacks.borrow_mut().error = callback;
    }
}
