//! The embeddable viewer: one active Scene plus every component that
//! hangs off it.
//!
//! Frontends translate platform input into calls on [`Viewer`], drain
//! [`ViewerEvent`]s after each call and redraw when [`Viewer::take_redraw`]
//! says so. Texture loading and timers stay on the frontend; results come
//! back tagged with the Scene generation they were started for, and stale
//! ones are dropped.

use crate::arbiter::{AudioArbiter, AudioCommand, Commands};
use crate::camera::{CameraState, OrbitController};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::geometry::{self, Mesh};
use crate::input::ViewerAction;
use crate::narration::{NarrationController, NarrationEvent, SpeechBackend, SpeechSignal};
use crate::overlay::{HotspotOverlay, Marker, Viewport};
use crate::scene::{ClipCategory, NarrationClip, Scene, SceneDescriptor};
use crate::spatial::{AmbientBackend, ListenerState, SpatialAudioEngine};
use glam::Vec2;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TextureState {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    SceneOpened { scene_id: String, generation: u64 },
    TextureStateChanged(TextureState),
    HotspotToggled(Option<String>),
    NarrationPlayingChanged(bool),
    /// Ask the frontend to call [`Viewer::autoplay_elapsed`] after `delay_ms`.
    ScheduleAutoplay { generation: u64, delay_ms: u32 },
    Closed,
}

pub struct Viewer<A: AmbientBackend, S: SpeechBackend> {
    config: ViewerConfig,
    mesh: Mesh,
    camera: OrbitController,
    overlay: HotspotOverlay,
    spatial: SpatialAudioEngine<A>,
    narration: NarrationController<S>,
    arbiter: AudioArbiter,
    scene: Option<Scene>,
    generation: u64,
    texture: TextureState,
    viewport: Viewport,
    pending_autoplay: Option<u64>,
    narration_playing: bool,
    dirty: bool,
    events: Vec<ViewerEvent>,
}

impl<A: AmbientBackend, S: SpeechBackend> Viewer<A, S> {
    pub fn new(
        config: ViewerConfig,
        ambient: std::result::Result<A, ViewerError>,
        speech: std::result::Result<S, ViewerError>,
    ) -> Result<Self> {
        config.validate()?;
        let mesh = geometry::build(
            config.geometry.width_segments,
            config.geometry.height_segments,
        )?;
        log::info!(
            "[viewer] sphere {}x{}: {} vertices, {} triangles",
            config.geometry.width_segments,
            config.geometry.height_segments,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        let arbiter = AudioArbiter::new(config.audio.enabled, config.narration.enabled);
        Ok(Self {
            camera: OrbitController::new(config.camera.clone()),
            overlay: HotspotOverlay::new(config.overlay.mode),
            spatial: SpatialAudioEngine::new(config.audio.clone(), ambient),
            narration: NarrationController::new(config.narration.clone(), speech),
            arbiter,
            mesh,
            config,
            scene: None,
            generation: 0,
            texture: TextureState::Empty,
            viewport: Viewport::new(1.0, 1.0),
            pending_autoplay: None,
            narration_playing: false,
            dirty: false,
            events: Vec::new(),
        })
    }

    // ---------------- accessors ----------------

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn camera(&self) -> CameraState {
        self.camera.state()
    }

    pub fn listener(&self) -> ListenerState {
        ListenerState::from_camera(&self.camera.state(), self.config.audio.listener_offset)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn texture_state(&self) -> &TextureState {
        &self.texture
    }

    /// Drawing is gated on the panorama being resident.
    pub fn can_render(&self) -> bool {
        self.texture == TextureState::Ready
    }

    pub fn arbiter(&self) -> &AudioArbiter {
        &self.arbiter
    }

    pub fn spatial(&self) -> &SpatialAudioEngine<A> {
        &self.spatial
    }

    pub fn narration(&self) -> &NarrationController<S> {
        &self.narration
    }

    pub fn overlay(&self) -> &HotspotOverlay {
        &self.overlay
    }

    pub fn is_open(&self) -> bool {
        self.scene.is_some()
    }

    pub fn ambient_audible(&self) -> bool {
        self.spatial.is_audible()
    }

    pub fn narration_audible(&self) -> bool {
        self.narration.is_speaking()
    }

    pub fn markers(&self) -> Vec<Marker> {
        match &self.scene {
            Some(scene) => self
                .overlay
                .markers(&scene.hotspots, self.viewport, &self.camera.state()),
            None => Vec::new(),
        }
    }

    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ---------------- scene lifecycle ----------------

    /// Tears down the current Scene and activates `desc`. Returns the new
    /// generation; the frontend tags its texture load with it.
    pub fn open_scene(&mut self, desc: SceneDescriptor) -> Result<u64> {
        let scene = Scene::from_descriptor(desc)?;
        self.teardown_scene();

        self.generation += 1;
        let generation = self.generation;
        log::info!(
            "[scene] opening {} ({} hotspots, {} clips) gen={}",
            scene.id,
            scene.hotspots.len(),
            scene.narration.len(),
            generation
        );

        self.camera.reset();
        self.overlay.load(&scene.hotspots);
        self.set_texture(TextureState::Loading);

        let listener = self.listener();
        self.spatial.activate(&scene.hotspots, &listener);
        let cmds = self.arbiter.scene_activated();
        self.apply(cmds);

        let wants_autoplay = self.config.narration.autoplay
            && self.arbiter.narration_enabled()
            && self.narration.is_available()
            && scene.narration.autoplay_choice().is_some();
        let scene_id = scene.id.clone();
        self.scene = Some(scene);

        self.events.push(ViewerEvent::SceneOpened {
            scene_id,
            generation,
        });
        if wants_autoplay {
            self.pending_autoplay = Some(generation);
            self.events.push(ViewerEvent::ScheduleAutoplay {
                generation,
                delay_ms: self.config.narration.settle_delay_ms,
            });
        }
        self.dirty = true;
        Ok(generation)
    }

    /// Closes the viewer. Returns false when nothing was open.
    pub fn close(&mut self) -> bool {
        if self.scene.is_none() && !self.arbiter.is_open() {
            return false;
        }
        self.teardown_scene();
        let cmds = self.arbiter.closed();
        self.apply(cmds);
        self.events.push(ViewerEvent::Closed);
        log::info!("[viewer] closed");
        true
    }

    /// Stop narration, release the ambient graph and drop the texture.
    /// Safe to run when parts were never created.
    fn teardown_scene(&mut self) {
        self.pending_autoplay = None;
        if let Some(ev) = self.narration.stop() {
            self.handle_narration_event(ev);
        }
        self.spatial.deactivate();
        if self.overlay.close() {
            self.events.push(ViewerEvent::HotspotToggled(None));
        }
        self.overlay.clear();
        if self.texture != TextureState::Empty {
            self.set_texture(TextureState::Empty);
        }
        self.scene = None;
    }

    pub fn texture_loaded(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            log::debug!("[scene] dropping stale texture for gen {}", generation);
            return false;
        }
        self.set_texture(TextureState::Ready);
        self.dirty = true;
        true
    }

    pub fn texture_failed(&mut self, generation: u64, reason: &str) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        log::warn!("[scene] texture failed: {}", reason);
        self.set_texture(TextureState::Failed(reason.to_owned()));
        self.dirty = true;
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.scene.is_some() && generation == self.generation
    }

    fn set_texture(&mut self, state: TextureState) {
        self.texture = state.clone();
        self.events.push(ViewerEvent::TextureStateChanged(state));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport::new(width as f32, height as f32);
        self.dirty = true;
    }

    /// Runs a key or wheel action. Returns whether anything changed.
    pub fn apply_action(&mut self, action: ViewerAction) -> bool {
        match action {
            ViewerAction::Nudge { dx, dy } => {
                if !self.is_open() {
                    return false;
                }
                self.nudge(dx, dy);
                true
            }
            ViewerAction::ZoomIn => self.zoom_in(),
            ViewerAction::ZoomOut => self.zoom_out(),
            ViewerAction::ResetView => {
                self.reset_view();
                true
            }
            ViewerAction::ToggleHotspots => {
                self.toggle_hotspots();
                true
            }
            ViewerAction::ToggleNarration => {
                let enabled = !self.arbiter.narration_enabled();
                self.set_narration_enabled(enabled)
            }
            ViewerAction::PauseOrResume => {
                if self.narration.is_speaking() {
                    self.pause_narration()
                } else {
                    self.resume_narration()
                }
            }
            ViewerAction::CloseHotspot => self.close_hotspot(),
        }
    }

    // ---------------- camera ----------------

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.camera.on_drag_start(Vec2::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let moved = self.camera.on_drag_move(Vec2::new(x, y));
        if moved {
            self.camera_rotated();
        }
        moved
    }

    pub fn pointer_up(&mut self) {
        self.camera.on_drag_end();
    }

    pub fn is_dragging(&self) -> bool {
        self.camera.is_dragging()
    }

    pub fn nudge(&mut self, dx: f32, dy: f32) {
        self.camera.nudge(Vec2::new(dx, dy));
        self.camera_rotated();
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.camera.zoom_in();
        self.dirty |= changed;
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.camera.zoom_out();
        self.dirty |= changed;
        changed
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.camera_rotated();
    }

    fn camera_rotated(&mut self) {
        self.dirty = true;
        let listener = self.listener();
        self.spatial.update(&listener);
    }

    // ---------------- hotspots ----------------

    pub fn toggle_hotspots(&mut self) -> bool {
        let had_open = self.overlay.open_id().is_some();
        let visible = self.overlay.toggle_visibility();
        if had_open {
            self.events.push(ViewerEvent::HotspotToggled(None));
        }
        visible
    }

    pub fn select_hotspot(&mut self, hotspot_id: &str) -> Option<String> {
        if self.overlay.select(hotspot_id) {
            let open = self.overlay.open_id().map(str::to_owned);
            self.events.push(ViewerEvent::HotspotToggled(open.clone()));
            open
        } else {
            self.overlay.open_id().map(str::to_owned)
        }
    }

    pub fn close_hotspot(&mut self) -> bool {
        let closed = self.overlay.close();
        if closed {
            self.events.push(ViewerEvent::HotspotToggled(None));
        }
        closed
    }

    // ---------------- audio ----------------

    pub fn set_narration_enabled(&mut self, enabled: bool) -> bool {
        if self.arbiter.narration_enabled() == enabled {
            return false;
        }
        log::info!("[viewer] narration enabled={}", enabled);
        let cmds = self.arbiter.set_narration_enabled(enabled);
        self.apply(cmds);
        self.pending_autoplay = None;
        if enabled {
            let choice = self
                .scene
                .as_ref()
                .and_then(|s| s.narration.autoplay_choice())
                .cloned();
            if let Some(clip) = choice {
                self.play(clip);
            }
        } else if let Some(ev) = self.narration.stop() {
            // a paused clip does not hold the speaker but must not linger
            self.handle_narration_event(ev);
        }
        true
    }

    pub fn set_spatial_audio_enabled(&mut self, enabled: bool) -> bool {
        if self.arbiter.ambient_enabled() == enabled {
            return false;
        }
        let cmds = self.arbiter.set_ambient_enabled(enabled);
        self.apply(cmds);
        true
    }

    /// Settle delay for `generation` has passed.
    pub fn autoplay_elapsed(&mut self, generation: u64) -> bool {
        if self.pending_autoplay != Some(generation) || !self.is_current(generation) {
            return false;
        }
        self.pending_autoplay = None;
        if self.narration.current_clip().is_some() {
            return false;
        }
        let choice = self
            .scene
            .as_ref()
            .and_then(|s| s.narration.autoplay_choice())
            .cloned();
        match choice {
            Some(clip) => self.play(clip),
            None => false,
        }
    }

    pub fn play_clip(&mut self, clip_id: &str) -> bool {
        let clip = self
            .scene
            .as_ref()
            .and_then(|s| s.narration.get(clip_id))
            .cloned();
        match clip {
            Some(clip) => self.play(clip),
            None => false,
        }
    }

    pub fn play_next(&mut self) -> bool {
        let current = self.narration.current_clip().map(str::to_owned);
        let clip = self
            .scene
            .as_ref()
            .and_then(|s| s.narration.next_after(current.as_deref()))
            .cloned();
        match clip {
            Some(clip) => self.play(clip),
            None => false,
        }
    }

    /// Speak a hotspot's description as an ad-hoc clip.
    pub fn narrate_hotspot(&mut self, hotspot_id: &str) -> bool {
        let clip = self.scene.as_ref().and_then(|s| s.hotspot(hotspot_id)).map(|h| {
            NarrationClip {
                id: format!("hotspot:{}", h.id),
                title: h.title.clone(),
                text: h.narration_text(),
                category: ClipCategory::Hotspot,
                priority: 0,
            }
        });
        match clip {
            Some(clip) => self.play(clip),
            None => false,
        }
    }

    pub fn pause_narration(&mut self) -> bool {
        match self.narration.pause() {
            Some(ev) => {
                self.handle_narration_event(ev);
                true
            }
            None => false,
        }
    }

    pub fn resume_narration(&mut self) -> bool {
        if !self.arbiter.narration_enabled() {
            return false;
        }
        match self.narration.resume() {
            Some(ev) => {
                self.handle_narration_event(ev);
                true
            }
            None => false,
        }
    }

    pub fn stop_narration(&mut self) -> bool {
        match self.narration.stop() {
            Some(ev) => {
                self.handle_narration_event(ev);
                true
            }
            None => false,
        }
    }

    /// Completion or error callback from the speech backend.
    pub fn on_speech_signal(&mut self, token: u64, signal: SpeechSignal) {
        if let Some(ev) = self.narration.on_signal(token, signal) {
            self.handle_narration_event(ev);
        }
    }

    fn play(&mut self, clip: NarrationClip) -> bool {
        if self.scene.is_none() || !self.arbiter.narration_enabled() {
            return false;
        }
        self.pending_autoplay = None;
        let ev = self.narration.play(&clip);
        let started = matches!(ev, NarrationEvent::Started { .. });
        self.handle_narration_event(ev);
        started
    }

    fn handle_narration_event(&mut self, ev: NarrationEvent) {
        log::debug!("[viewer] narration event {:?}", ev);
        let cmds = if ev.is_audible() {
            self.arbiter.narration_started()
        } else {
            self.arbiter.narration_finished()
        };
        self.apply(cmds);
        let playing = self.narration.is_speaking();
        if playing != self.narration_playing {
            self.narration_playing = playing;
            self.events.push(ViewerEvent::NarrationPlayingChanged(playing));
        }
    }

    fn apply(&mut self, cmds: Commands) {
        for cmd in cmds {
            match cmd {
                AudioCommand::MuteAmbient => self.spatial.set_muted(true),
                AudioCommand::UnmuteAmbient => self.spatial.set_muted(false),
                AudioCommand::StopNarration => {
                    if let Some(ev) = self.narration.stop() {
                        self.handle_narration_event(ev);
                    }
                }
            }
        }
    }
}
