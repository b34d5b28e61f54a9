//! Desktop harness: `pano-native <scenes.json> [config.json]`.
//!
//! Drag to look around, scroll or `+`/`-` to zoom, `[`/`]` to switch
//! scenes, `p` for the next narration clip, click a marker to open it.

use anyhow::{anyhow, Context};
use glam::Vec2;
use pano_core::{
    key_action, wheel_action, SceneDescriptor, SpeechSignal, TextureState, Viewer, ViewerConfig,
    ViewerError, ViewerEvent,
};
use pano_render::{PanoramaImage, Renderer};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

mod loader;
mod mixer;
mod speech;

use mixer::CpalAmbient;
use speech::TimedSpeech;

/// Results marshalled back onto the event loop thread.
pub enum UserEvent {
    Texture {
        generation: u64,
        result: Result<PanoramaImage, String>,
    },
    Speech {
        token: u64,
        signal: SpeechSignal,
    },
    AutoplayDue {
        generation: u64,
    },
}

// a press that moves less than this is a click, not a drag
const CLICK_SLOP_PX: f32 = 4.0;
const MARKER_PICK_RADIUS_PX: f32 = 24.0;

type NativeViewer = Viewer<CpalAmbient, TimedSpeech>;

struct Harness<'w> {
    window: &'w Window,
    viewer: NativeViewer,
    renderer: Renderer<'w>,
    proxy: EventLoopProxy<UserEvent>,
    scenes: Vec<SceneDescriptor>,
    scene_index: usize,
    scene_dir: PathBuf,
    cursor: Vec2,
    press: Option<Vec2>,
}

impl<'w> Harness<'w> {
    fn open(&mut self, index: usize) {
        let Some(desc) = self.scenes.get(index).cloned() else {
            return;
        };
        match self.viewer.open_scene(desc) {
            Ok(_) => self.scene_index = index,
            Err(e) => log::warn!("[scene] {}", e),
        }
        self.pump();
    }

    fn step_scene(&mut self, forward: bool) {
        let n = self.scenes.len();
        let next = if forward {
            (self.scene_index + 1) % n
        } else {
            (self.scene_index + n - 1) % n
        };
        self.open(next);
    }

    /// Routes viewer events to the renderer, worker threads and window.
    fn pump(&mut self) {
        for ev in self.viewer.take_events() {
            match ev {
                ViewerEvent::SceneOpened {
                    scene_id,
                    generation,
                } => {
                    let Some(scene) = self.viewer.scene() else {
                        continue;
                    };
                    self.window
                        .set_title(&format!("{} · pano-native", scene.name));
                    log::info!("[scene] {} open (gen {})", scene_id, generation);
                    match loader::resolve_image(&self.scene_dir, &scene.image_url) {
                        Ok(path) => loader::spawn_decode(
                            self.proxy.clone(),
                            path,
                            generation,
                            self.renderer.max_texture_dimension(),
                        ),
                        Err(reason) => {
                            self.viewer.texture_failed(generation, &reason);
                        }
                    }
                }
                ViewerEvent::TextureStateChanged(state) => match state {
                    TextureState::Empty => self.renderer.release_panorama(),
                    TextureState::Loading => log::info!("[scene] loading panorama…"),
                    TextureState::Ready => {}
                    TextureState::Failed(reason) => {
                        log::error!("[scene] panorama unavailable: {}", reason)
                    }
                },
                ViewerEvent::HotspotToggled(id) => self.show_hotspot(id.as_deref()),
                ViewerEvent::NarrationPlayingChanged(playing) => {
                    log::info!("[narration] playing={}", playing)
                }
                ViewerEvent::ScheduleAutoplay {
                    generation,
                    delay_ms,
                } => schedule_autoplay(self.proxy.clone(), generation, delay_ms),
                ViewerEvent::Closed => log::info!("[viewer] closed"),
            }
        }
        // texture_failed above may have queued more
        if self.viewer.take_redraw() {
            self.window.request_redraw();
        }
    }

    fn show_hotspot(&self, id: Option<&str>) {
        let hotspot = id.and_then(|id| self.viewer.scene().and_then(|s| s.hotspot(id)));
        match hotspot {
            Some(h) => log::info!("[overlay] {}: {}", h.title, h.narration_text()),
            None => log::info!("[overlay] panel closed"),
        }
    }

    fn texture_ready(&mut self, generation: u64, result: Result<PanoramaImage, String>) {
        if !self.viewer.is_open() || generation != self.viewer.generation() {
            log::debug!("[scene] dropping stale image for gen {}", generation);
            return;
        }
        match result {
            Ok(image) => {
                self.renderer.upload_panorama(&image);
                self.viewer.texture_loaded(generation);
            }
            Err(reason) => {
                self.viewer.texture_failed(generation, &reason);
            }
        }
    }

    fn click(&mut self, at: Vec2) {
        let hit = self
            .viewer
            .markers()
            .into_iter()
            .filter(|m| m.visible)
            .map(|m| (m.screen.distance(at), m.hotspot_id))
            .filter(|(d, _)| *d <= MARKER_PICK_RADIUS_PX)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, id)) = hit {
            self.viewer.select_hotspot(&id);
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let key = match &event.logical_key {
            Key::Named(NamedKey::ArrowLeft) => "ArrowLeft",
            Key::Named(NamedKey::ArrowRight) => "ArrowRight",
            Key::Named(NamedKey::ArrowUp) => "ArrowUp",
            Key::Named(NamedKey::ArrowDown) => "ArrowDown",
            Key::Named(NamedKey::Escape) => "Escape",
            Key::Named(NamedKey::Space) => " ",
            Key::Character(s) => s.as_str(),
            _ => return,
        };
        if event.repeat && !key.starts_with("Arrow") {
            return;
        }
        match key {
            "]" => self.step_scene(true),
            "[" => self.step_scene(false),
            "p" | "P" => {
                self.viewer.play_next();
            }
            "t" | "T" => {
                let open = self.viewer.overlay().open_id().map(str::to_owned);
                if let Some(id) = open {
                    self.viewer.narrate_hotspot(&id);
                }
            }
            _ => {
                if let Some(action) = key_action(key) {
                    self.viewer.apply_action(action);
                }
            }
        }
    }

    fn render(&mut self) {
        match self.renderer.render(&self.viewer.camera()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.renderer.reconfigure();
                self.window.request_redraw();
            }
            Err(e) => log::warn!("[render] frame skipped: {:?}", e),
        }
    }
}

fn schedule_autoplay(proxy: EventLoopProxy<UserEvent>, generation: u64, delay_ms: u32) {
    let spawned = thread::Builder::new()
        .name("pano-autoplay".into())
        .spawn(move || {
            thread::sleep(Duration::from_millis(delay_ms as u64));
            _ = proxy.send_event(UserEvent::AutoplayDue { generation });
        });
    if let Err(e) = spawned {
        log::warn!("[narration] could not schedule autoplay: {}", e);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let scene_path = PathBuf::from(
        args.next()
            .ok_or_else(|| anyhow!("usage: pano-native <scenes.json> [config.json]"))?,
    );
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            ViewerConfig::from_json(&json)?
        }
        None => ViewerConfig::default(),
    };
    let scenes = loader::read_scenes(&scene_path)?;
    let scene_dir = scene_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();
    let window = WindowBuilder::new()
        .with_title("pano-native")
        .with_inner_size(LogicalSize::new(1280.0, 720.0))
        .build(&event_loop)?;

    let ambient = CpalAmbient::new(config.audio.master_gain);
    let speech = TimedSpeech::new(proxy.clone());
    let mut viewer = Viewer::new(config, ambient, speech)?;

    let size = window.inner_size();
    let renderer = pollster::block_on(Renderer::new(
        &window,
        size.width,
        size.height,
        viewer.mesh(),
    ))
    .map_err(ViewerError::from)?;
    viewer.resize(size.width, size.height);

    let mut harness = Harness {
        window: &window,
        viewer,
        renderer,
        proxy,
        scenes,
        scene_index: 0,
        scene_dir,
        cursor: Vec2::ZERO,
        press: None,
    };
    harness.open(0);

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    harness.viewer.close();
                    harness.pump();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    harness.renderer.resize(size.width, size.height);
                    harness.viewer.resize(size.width, size.height);
                }
                WindowEvent::CursorMoved {
                    position: PhysicalPosition { x, y },
                    ..
                } => {
                    harness.cursor = Vec2::new(x as f32, y as f32);
                    harness.viewer.pointer_move(x as f32, y as f32);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => {
                        harness.press = Some(harness.cursor);
                        harness
                            .viewer
                            .pointer_down(harness.cursor.x, harness.cursor.y);
                    }
                    ElementState::Released => {
                        harness.viewer.pointer_up();
                        if let Some(start) = harness.press.take() {
                            if start.distance(harness.cursor) < CLICK_SLOP_PX {
                                harness.click(harness.cursor);
                            }
                        }
                    }
                },
                WindowEvent::MouseWheel { delta, .. } => {
                    // winit reports scroll-up as positive, the DOM as negative
                    let dy = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y as f64,
                        MouseScrollDelta::PixelDelta(p) => -p.y,
                    };
                    if let Some(action) = wheel_action(dy) {
                        harness.viewer.apply_action(action);
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => harness.on_key(&event),
                WindowEvent::RedrawRequested => harness.render(),
                _ => {}
            },
            Event::UserEvent(user) => match user {
                UserEvent::Texture { generation, result } => {
                    harness.texture_ready(generation, result)
                }
                UserEvent::Speech { token, signal } => {
                    harness.viewer.on_speech_signal(token, signal)
                }
                UserEvent::AutoplayDue { generation } => {
                    harness.viewer.autoplay_elapsed(generation);
                }
            },
            Event::AboutToWait => harness.pump(),
            _ => {}
        }
    })?;
    Ok(())
}
