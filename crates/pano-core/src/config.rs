//! Viewer configuration.
//!
//! Every field has a default, so hosts only pass what they want to change.
//! Web hosts hand over a plain JS object, the native harness a JSON file;
//! both decode into [`ViewerConfig`] through serde.

use crate::constants::*;
use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub geometry: GeometryConfig,
    pub audio: AudioConfig,
    pub narration: NarrationConfig,
    pub overlay: OverlayConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub sensitivity: f32,
    pub default_fov: f32,
    pub min_fov: f32,
    pub max_fov: f32,
    pub zoom_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: DRAG_SENSITIVITY_DEG_PER_PX,
            default_fov: DEFAULT_FOV_DEG,
            min_fov: MIN_FOV_DEG,
            max_fov: MAX_FOV_DEG,
            zoom_step: ZOOM_STEP_DEG,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeometryConfig {
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            width_segments: DEFAULT_WIDTH_SEGMENTS,
            height_segments: DEFAULT_HEIGHT_SEGMENTS,
        }
    }
}

/// Attenuation curve, named after the WebAudio `DistanceModelType` values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    Linear,
    #[default]
    Inverse,
    Exponential,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConfig {
    pub enabled: bool,
    pub radius: f32,
    pub ref_distance: f32,
    pub max_distance: f32,
    pub rolloff: f32,
    pub distance_model: DistanceModel,
    pub listener_offset: f32,
    pub master_gain: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: AUDIO_SPHERE_RADIUS,
            ref_distance: AUDIO_REF_DISTANCE,
            max_distance: AUDIO_MAX_DISTANCE,
            rolloff: AUDIO_ROLLOFF,
            distance_model: DistanceModel::Inverse,
            listener_offset: LISTENER_FORWARD_OFFSET,
            master_gain: MASTER_GAIN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NarrationConfig {
    pub enabled: bool,
    pub autoplay: bool,
    pub settle_delay_ms: u32,
    pub rate: f32,
    pub pitch: f32,
    pub lang: Option<String>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autoplay: true,
            settle_delay_ms: NARRATION_SETTLE_DELAY_MS,
            rate: 1.0,
            pitch: 1.0,
            lang: None,
        }
    }
}

/// Where hotspot markers are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    /// Fixed screen fractions taken straight from the hotspot's `(u, v)`.
    #[default]
    Fixed,
    /// Sphere direction reprojected through the live camera every frame.
    Projected,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub mode: OverlayMode,
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewerConfig =
            serde_json::from_str(json).map_err(|e| ViewerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if !(cam.min_fov > 0.0 && cam.min_fov < cam.max_fov && cam.max_fov < 180.0) {
            return Err(invalid(format!(
                "fov range must satisfy 0 < min < max < 180 (got {}..{})",
                cam.min_fov, cam.max_fov
            )));
        }
        if cam.default_fov < cam.min_fov || cam.default_fov > cam.max_fov {
            return Err(invalid(format!(
                "default fov {} outside {}..{}",
                cam.default_fov, cam.min_fov, cam.max_fov
            )));
        }
        if cam.sensitivity <= 0.0 || cam.zoom_step <= 0.0 {
            return Err(invalid("sensitivity and zoom step must be positive".into()));
        }
        if self.geometry.width_segments < 3 || self.geometry.height_segments < 2 {
            return Err(invalid(format!(
                "sphere needs at least 3x2 segments (got {}x{})",
                self.geometry.width_segments, self.geometry.height_segments
            )));
        }
        let audio = &self.audio;
        if audio.radius <= 0.0 || audio.ref_distance <= 0.0 || audio.rolloff < 0.0 {
            return Err(invalid(
                "audio radius and reference distance must be positive, rolloff non-negative"
                    .into(),
            ));
        }
        if audio.max_distance <= audio.ref_distance {
            return Err(invalid(format!(
                "max distance {} must exceed reference distance {}",
                audio.max_distance, audio.ref_distance
            )));
        }
        if !(0.0..=1.0).contains(&audio.master_gain) {
            return Err(invalid(format!(
                "master gain {} outside 0..1",
                audio.master_gain
            )));
        }
        if self.narration.rate <= 0.0 {
            return Err(invalid("narration rate must be positive".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ViewerError {
    ViewerError::InvalidConfig(msg)
}
