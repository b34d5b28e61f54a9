//! Orbit camera: pointer drags and zoom steps folded into yaw/pitch/FOV.
//!
//! The camera sits at the sphere centre and only rotates. The same
//! [`CameraState`] feeds the renderer's view matrix and the audio
//! listener's orientation, so both agree on where the user is looking.

use crate::config::CameraConfig;
use crate::constants::{PITCH_LIMIT_DEG, Z_FAR, Z_NEAR};
use glam::{Mat4, Quat, Vec2, Vec3};

/// Camera orientation in degrees. Copy-able so readers always take a
/// consistent snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Horizontal angle, kept in `[0, 360)`.
    pub yaw: f32,
    /// Vertical angle in `[-90, 90]`; positive looks down.
    pub pitch: f32,
    /// Vertical field of view.
    pub fov: f32,
}

impl CameraState {
    pub fn new(fov: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov,
        }
    }

    /// World rotation of the camera body: yaw about +Y, then pitch about
    /// the turned horizontal axis.
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(-self.yaw.to_radians())
            * Quat::from_rotation_x(-self.pitch.to_radians())
    }

    /// Rotation-only view matrix (`R_x(pitch) · R_y(yaw)`).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.pitch.to_radians())
            * Mat4::from_rotation_y(self.yaw.to_radians())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect.max(1e-4), Z_NEAR, Z_FAR)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        last: Vec2,
    },
}

/// Single writer of [`CameraState`].
#[derive(Clone, Debug)]
pub struct OrbitController {
    state: CameraState,
    phase: DragPhase,
    config: CameraConfig,
}

impl OrbitController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            state: CameraState::new(config.default_fov),
            phase: DragPhase::Idle,
            config,
        }
    }

    #[inline]
    pub fn state(&self) -> CameraState {
        self.state
    }

    #[inline]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    pub fn on_drag_start(&mut self, pointer: Vec2) {
        self.phase = DragPhase::Dragging { last: pointer };
    }

    /// Applies the delta since the previous sample. Returns whether the
    /// camera moved; moves outside a drag are ignored.
    pub fn on_drag_move(&mut self, pointer: Vec2) -> bool {
        let DragPhase::Dragging { last } = self.phase else {
            return false;
        };
        self.phase = DragPhase::Dragging { last: pointer };
        let delta = pointer - last;
        if delta == Vec2::ZERO || !delta.is_finite() {
            return false;
        }
        self.rotate_by(delta);
        true
    }

    pub fn on_drag_end(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Rotate as if the pointer had been dragged by `delta` pixels.
    pub fn nudge(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.rotate_by(delta);
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_fov(self.state.fov - self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_fov(self.state.fov + self.config.zoom_step)
    }

    pub fn reset(&mut self) {
        self.state = CameraState::new(self.config.default_fov);
        self.phase = DragPhase::Idle;
    }

    fn rotate_by(&mut self, delta: Vec2) {
        let s = self.config.sensitivity;
        self.state.yaw = normalize_yaw(self.state.yaw + delta.x * s);
        self.state.pitch =
            (self.state.pitch - delta.y * s).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    fn set_fov(&mut self, fov: f32) -> bool {
        let clamped = fov.clamp(self.config.min_fov, self.config.max_fov);
        let changed = clamped != self.state.fov;
        self.state.fov = clamped;
        changed
    }
}

#[inline]
pub fn normalize_yaw(yaw: f32) -> f32 {
    let y = yaw.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if y >= 360.0 {
        0.0
    } else {
        y
    }
}
