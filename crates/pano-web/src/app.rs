use crate::audio::WebAmbient;
use crate::dom;
use crate::frame;
use crate::overlay::Overlay;
use crate::speech::{SpeechSink, WebSpeech};
use anyhow::anyhow;
use pano_core::{TextureState, Viewer, ViewerConfig, ViewerError, ViewerEvent};
use pano_render::{decode_panorama, Renderer};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type WebViewer = Viewer<WebAmbient, WebSpeech>;

/// Host callbacks, invoked only after the app borrow is released so they
/// may call straight back into the viewer.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub hotspot_toggled: Option<js_sys::Function>,
    pub narration_playing: Option<js_sys::Function>,
    pub closed: Option<js_sys::Function>,
    pub error: Option<js_sys::Function>,
}

pub enum Notice {
    HotspotToggled(Option<String>),
    NarrationPlaying(bool),
    Closed,
    Error(String),
}

impl Callbacks {
    fn dispatch(&self, notices: Vec<Notice>) {
        for notice in notices {
            let (cb, arg) = match notice {
                Notice::HotspotToggled(id) => (
                    &self.hotspot_toggled,
                    id.map(|id| JsValue::from_str(&id)).unwrap_or(JsValue::NULL),
                ),
                Notice::NarrationPlaying(playing) => {
                    (&self.narration_playing, JsValue::from_bool(playing))
                }
                Notice::Closed => (&self.closed, JsValue::UNDEFINED),
                Notice::Error(msg) => (&self.error, JsValue::from_str(&msg)),
            };
            if let Some(f) = cb {
                if let Err(e) = f.call1(&JsValue::NULL, &arg) {
                    log::warn!("[viewer] host callback threw: {:?}", e);
                }
            }
        }
    }
}

pub struct App {
    pub viewer: WebViewer,
    renderer: Option<Renderer<'static>>,
    canvas: web::HtmlCanvasElement,
    overlay: Overlay,
    /// Bytes that arrived before the GPU was ready.
    pending_bytes: Option<(u64, Vec<u8>)>,
    force_redraw: bool,
    markers_stale: bool,
    notices: Vec<Notice>,
}

pub struct Shared {
    pub app: RefCell<App>,
    pub callbacks: RefCell<Callbacks>,
}

pub type Handle = Rc<Shared>;

/// Runs `f` against the app, then routes the viewer's events and fires
/// host callbacks.
pub fn with_app<R>(shared: &Handle, f: impl FnOnce(&mut App) -> R) -> R {
    let (out, notices) = {
        let mut app = shared.app.borrow_mut();
        let out = f(&mut app);
        let notices = app.flush(shared);
        (out, notices)
    };
    if !notices.is_empty() {
        let callbacks = shared.callbacks.borrow().clone();
        callbacks.dispatch(notices);
    }
    out
}

pub fn build(canvas_id: &str, config: ViewerConfig) -> anyhow::Result<Handle> {
    let document = dom::window_document().ok_or_else(|| anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, canvas_id)?;
    dom::sync_canvas_backing_size(&canvas);
    let overlay = Overlay::attach(&document, &canvas)?;

    // speech callbacks reach the viewer through this slot once it exists
    let slot: Rc<RefCell<Weak<Shared>>> = Rc::new(RefCell::new(Weak::new()));
    let sink_slot = slot.clone();
    let sink: SpeechSink = Rc::new(move |token, signal| {
        let weak = sink_slot.borrow().clone();
        spawn_local(async move {
            if let Some(shared) = weak.upgrade() {
                with_app(&shared, |app| app.viewer.on_speech_signal(token, signal));
            }
        });
    });

    let ambient = WebAmbient::new(config.audio.master_gain);
    let speech = WebSpeech::new(sink);
    let mut viewer = Viewer::new(config, ambient, speech)?;
    let (w, h) = dom::css_size(&canvas);
    viewer.resize(w, h);

    let shared = Rc::new(Shared {
        app: RefCell::new(App {
            viewer,
            renderer: None,
            canvas: canvas.clone(),
            overlay,
            pending_bytes: None,
            force_redraw: true,
            markers_stale: true,
            notices: Vec::new(),
        }),
        callbacks: RefCell::new(Callbacks::default()),
    });
    *slot.borrow_mut() = Rc::downgrade(&shared);

    spawn_local(init_gpu(Rc::downgrade(&shared), canvas));
    frame::start_loop(Rc::downgrade(&shared));
    Ok(shared)
}

async fn init_gpu(weak: Weak<Shared>, canvas: web::HtmlCanvasElement) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mesh = shared.app.borrow().viewer.mesh().clone();
    drop(shared);
    let (w, h) = (canvas.width(), canvas.height());
    let result = Renderer::new(wgpu::SurfaceTarget::Canvas(canvas), w, h, &mesh).await;
    let Some(shared) = weak.upgrade() else {
        return;
    };
    with_app(&shared, |app| match result {
        Ok(renderer) => app.renderer_ready(renderer),
        Err(e) => {
            let err: ViewerError = e.into();
            log::error!("[render] {}", err);
            app.overlay.show_fatal(&err.to_string());
            app.notices.push(Notice::Error(err.to_string()));
        }
    });
}

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(dom::js_err)?
        .dyn_into()
        .map_err(dom::js_err)?;
    if !resp.ok() {
        anyhow::bail!("HTTP {} for {}", resp.status(), url);
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(dom::js_err)?)
        .await
        .map_err(dom::js_err)?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

async fn load_texture(weak: Weak<Shared>, url: String, generation: u64) {
    let result = fetch_bytes(&url).await;
    let Some(shared) = weak.upgrade() else {
        return;
    };
    with_app(&shared, |app| match result {
        Ok(bytes) => app.install_panorama(generation, bytes),
        Err(e) => {
            app.viewer.texture_failed(generation, &format!("{:#}", e));
        }
    });
}

impl App {
    fn renderer_ready(&mut self, renderer: Renderer<'static>) {
        log::info!("[render] WebGPU ready {:?}", renderer.size());
        self.renderer = Some(renderer);
        if let Some((generation, bytes)) = self.pending_bytes.take() {
            self.install_panorama(generation, bytes);
        }
        self.force_redraw = true;
    }

    fn install_panorama(&mut self, generation: u64, bytes: Vec<u8>) {
        if !self.viewer.is_open() || generation != self.viewer.generation() {
            log::debug!("[scene] dropping stale image for gen {}", generation);
            return;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            self.pending_bytes = Some((generation, bytes));
            return;
        };
        match decode_panorama(&bytes, renderer.max_texture_dimension()) {
            Ok(image) => {
                renderer.upload_panorama(&image);
                self.viewer.texture_loaded(generation);
            }
            Err(e) => {
                let err: ViewerError = e.into();
                self.viewer.texture_failed(generation, &err.to_string());
            }
        }
    }

    pub fn resume_audio(&self) {
        if let Some(ambient) = self.viewer.spatial().backend() {
            ambient.resume();
        }
    }

    pub fn resize(&mut self) {
        dom::sync_canvas_backing_size(&self.canvas);
        if let Some(r) = self.renderer.as_mut() {
            r.resize(self.canvas.width(), self.canvas.height());
        }
        let (w, h) = dom::css_size(&self.canvas);
        self.viewer.resize(w, h);
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    /// One animation frame; draws only when something changed.
    pub fn frame(&mut self) {
        let redraw = self.viewer.take_redraw() | std::mem::take(&mut self.force_redraw);
        if !redraw {
            return;
        }
        self.markers_stale = true;
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match renderer.render(&self.viewer.camera()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                renderer.reconfigure();
                self.force_redraw = true;
            }
            Err(e) => log::warn!("[render] frame skipped: {:?}", e),
        }
    }

    fn flush(&mut self, shared: &Handle) -> Vec<Notice> {
        for ev in self.viewer.take_events() {
            self.markers_stale = true;
            match ev {
                ViewerEvent::SceneOpened {
                    scene_id,
                    generation,
                } => {
                    log::info!("[scene] {} active (gen {})", scene_id, generation);
                    if let Some(scene) = self.viewer.scene() {
                        let weak = Rc::downgrade(shared);
                        self.overlay.build_markers(&scene.hotspots, move |id| {
                            if let Some(shared) = weak.upgrade() {
                                with_app(&shared, |app| {
                                    app.viewer.select_hotspot(&id);
                                });
                            }
                        });
                        let url = scene.image_url.clone();
                        spawn_local(load_texture(Rc::downgrade(shared), url, generation));
                    }
                }
                ViewerEvent::TextureStateChanged(state) => match state {
                    TextureState::Empty => {
                        self.pending_bytes = None;
                        if let Some(r) = self.renderer.as_mut() {
                            r.release_panorama();
                        }
                        self.overlay.hide_status();
                        self.force_redraw = true;
                    }
                    TextureState::Loading => self.overlay.show_loading(),
                    TextureState::Ready => self.overlay.hide_status(),
                    TextureState::Failed(reason) => self.overlay.show_failed(&reason),
                },
                ViewerEvent::HotspotToggled(id) => self.notices.push(Notice::HotspotToggled(id)),
                ViewerEvent::NarrationPlayingChanged(playing) => {
                    self.notices.push(Notice::NarrationPlaying(playing))
                }
                ViewerEvent::ScheduleAutoplay {
                    generation,
                    delay_ms,
                } => frame::schedule_autoplay(Rc::downgrade(shared), generation, delay_ms),
                ViewerEvent::Closed => {
                    self.overlay.clear_markers();
                    self.notices.push(Notice::Closed);
                }
            }
        }
        if std::mem::take(&mut self.markers_stale) {
            self.overlay.sync(&self.viewer.markers());
        }
        std::mem::take(&mut self.notices)
    }
}
