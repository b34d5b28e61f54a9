//! Spatial ambient bed.
//!
//! Each hotspot becomes an emitter on the same sphere the panorama is
//! painted on. The listener stays at the centre, leaning slightly toward
//! the view direction, so turning toward a hotspot brings its sound closer.
//! Gains are computed here; the backend only renders them.

use crate::camera::CameraState;
use crate::config::{AudioConfig, DistanceModel};
use crate::error::ViewerError;
use crate::geometry::panorama_direction;
use crate::scene::{Hotspot, HotspotCategory};
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
}

/// Procedural tone used for one emitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioProfile {
    pub waveform: Waveform,
    pub base_hz: f32,
    /// Lowpass cutoff applied after the oscillator.
    pub filter_hz: f32,
    /// Share of filtered noise mixed with the tone, `0..1`.
    pub noise: f32,
    pub level: f32,
}

pub fn profile_for(category: HotspotCategory) -> AudioProfile {
    match category {
        // low, steady drone for built structures
        HotspotCategory::Landmark => AudioProfile {
            waveform: Waveform::Triangle,
            base_hz: 110.0,
            filter_hz: 600.0,
            noise: 0.1,
            level: 0.5,
        },
        // airy, noisy bed: rustle and calls
        HotspotCategory::Wildlife => AudioProfile {
            waveform: Waveform::Sine,
            base_hz: 880.0,
            filter_hz: 3200.0,
            noise: 0.6,
            level: 0.35,
        },
        HotspotCategory::Culture => AudioProfile {
            waveform: Waveform::Saw,
            base_hz: 196.0,
            filter_hz: 900.0,
            noise: 0.05,
            level: 0.3,
        },
        // wind / water
        HotspotCategory::Nature => AudioProfile {
            waveform: Waveform::Sine,
            base_hz: 220.0,
            filter_hz: 1400.0,
            noise: 0.8,
            level: 0.45,
        },
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AudioSource {
    pub hotspot_id: String,
    pub position: Vec3,
    pub ref_distance: f32,
    pub max_distance: f32,
    pub rolloff: f32,
    pub distance_model: DistanceModel,
    pub profile: AudioProfile,
}

/// Emitter position for a hotspot at `(u, v)` on a sphere of `radius`.
#[inline]
pub fn source_position(u: f32, v: f32, radius: f32) -> Vec3 {
    panorama_direction(u, v) * radius
}

pub fn derive_sources(hotspots: &[Hotspot], config: &AudioConfig) -> Vec<AudioSource> {
    hotspots
        .iter()
        .map(|h| AudioSource {
            hotspot_id: h.id.clone(),
            position: source_position(h.position.u, h.position.v, config.radius),
            ref_distance: config.ref_distance,
            max_distance: config.max_distance,
            rolloff: config.rolloff,
            distance_model: config.distance_model,
            profile: profile_for(h.category),
        })
        .collect()
}

/// Gain in `[0, 1]` for an emitter `distance` away. Follows the WebAudio
/// distance formulas below `max_distance` and is silent at or beyond it.
pub fn distance_gain(
    model: DistanceModel,
    distance: f32,
    ref_distance: f32,
    max_distance: f32,
    rolloff: f32,
) -> f32 {
    if !distance.is_finite() || distance >= max_distance {
        return 0.0;
    }
    let d = distance.max(ref_distance);
    let g = match model {
        DistanceModel::Linear => {
            1.0 - rolloff * (d - ref_distance) / (max_distance - ref_distance)
        }
        DistanceModel::Inverse => ref_distance / (ref_distance + rolloff * (d - ref_distance)),
        DistanceModel::Exponential => (d / ref_distance).powf(-rolloff),
    };
    g.clamp(0.0, 1.0)
}

impl AudioSource {
    pub fn gain_for(&self, listener: &ListenerState) -> f32 {
        distance_gain(
            self.distance_model,
            self.position.distance(listener.position),
            self.ref_distance,
            self.max_distance,
            self.rolloff,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListenerState {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl Default for ListenerState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl ListenerState {
    pub fn from_camera(camera: &CameraState, forward_offset: f32) -> Self {
        let forward = camera.forward();
        Self {
            position: forward * forward_offset,
            forward,
            up: camera.up(),
        }
    }

    /// Stereo position of `point` in `[-1, 1]`, negative to the left.
    pub fn pan_for(&self, point: Vec3) -> f32 {
        let right = self.forward.cross(self.up).normalize_or_zero();
        let to = (point - self.position).normalize_or_zero();
        to.dot(right).clamp(-1.0, 1.0)
    }
}

/// Renders the ambient bed. Implementations own every audio node and must
/// make `stop` safe to call repeatedly.
pub trait AmbientBackend {
    /// Build one emitter per source, initially silent.
    fn start(&mut self, sources: &[AudioSource]) -> Result<(), ViewerError>;
    fn set_listener(&mut self, listener: &ListenerState);
    fn set_source_gain(&mut self, index: usize, gain: f32);
    fn set_muted(&mut self, muted: bool);
    fn stop(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Inactive,
    Active,
    /// Backend missing or failed; the viewer carries on without ambient audio.
    Disabled,
}

pub struct SpatialAudioEngine<B: AmbientBackend> {
    backend: Option<B>,
    config: AudioConfig,
    sources: Vec<AudioSource>,
    gains: Vec<f32>,
    status: EngineStatus,
    muted: bool,
}

impl<B: AmbientBackend> SpatialAudioEngine<B> {
    pub fn new(config: AudioConfig, backend: Result<B, ViewerError>) -> Self {
        let backend = match backend {
            Ok(b) => Some(b),
            Err(e) => {
                log::warn!("[audio] spatial audio disabled: {}", e);
                None
            }
        };
        let status = if backend.is_some() {
            EngineStatus::Inactive
        } else {
            EngineStatus::Disabled
        };
        Self {
            backend,
            config,
            sources: Vec::new(),
            gains: Vec::new(),
            status,
            muted: false,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status != EngineStatus::Disabled
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Active and not muted.
    pub fn is_audible(&self) -> bool {
        self.status == EngineStatus::Active && !self.muted
    }

    pub fn sources(&self) -> &[AudioSource] {
        &self.sources
    }

    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Derive emitters for a Scene and start rendering them. Returns false
    /// when ambient audio is unavailable.
    pub fn activate(&mut self, hotspots: &[Hotspot], listener: &ListenerState) -> bool {
        self.deactivate();
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        let sources = derive_sources(hotspots, &self.config);
        if let Err(e) = backend.start(&sources) {
            log::warn!("[audio] backend failed to start, disabling spatial audio: {}", e);
            backend.stop();
            self.backend = None;
            self.status = EngineStatus::Disabled;
            return false;
        }
        backend.set_muted(self.muted);
        self.gains = vec![0.0; sources.len()];
        self.sources = sources;
        self.status = EngineStatus::Active;
        log::info!("[audio] activated {} emitters", self.sources.len());
        self.update(listener);
        true
    }

    /// Recompute per-emitter gains for a new listener pose.
    pub fn update(&mut self, listener: &ListenerState) {
        if self.status != EngineStatus::Active {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        backend.set_listener(listener);
        for (i, src) in self.sources.iter().enumerate() {
            let g = src.gain_for(listener) * src.profile.level;
            self.gains[i] = g;
            backend.set_source_gain(i, g);
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if self.status == EngineStatus::Active {
            if let Some(b) = self.backend.as_mut() {
                b.set_muted(muted);
            }
        }
    }

    /// Stops and releases every emitter. Safe before `activate` and when
    /// called more than once.
    pub fn deactivate(&mut self) {
        if self.status == EngineStatus::Active {
            if let Some(b) = self.backend.as_mut() {
                b.stop();
            }
            self.status = EngineStatus::Inactive;
            log::debug!("[audio] deactivated");
        }
        self.sources.clear();
        self.gains.clear();
    }
}
