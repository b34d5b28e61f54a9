use glam::Vec3;

// Shared camera/audio tuning constants used by both web and native frontends.

// Camera
pub const DRAG_SENSITIVITY_DEG_PER_PX: f32 = 0.2;
pub const DEFAULT_FOV_DEG: f32 = 75.0;
pub const MIN_FOV_DEG: f32 = 30.0;
pub const MAX_FOV_DEG: f32 = 120.0;
pub const ZOOM_STEP_DEG: f32 = 10.0;
pub const PITCH_LIMIT_DEG: f32 = 90.0;
pub const KEY_NUDGE_PX: f32 = 25.0; // arrow keys move the camera as if dragged this far

// Projection planes
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

// Sphere tessellation
pub const DEFAULT_WIDTH_SEGMENTS: u32 = 64;
pub const DEFAULT_HEIGHT_SEGMENTS: u32 = 32;

// Panorama sphere is viewed from inside, so the exterior UV sphere is mirrored on x.
pub const INTERIOR_MIRROR: Vec3 = Vec3::new(-1.0, 1.0, 1.0);

// Spatial audio
pub const AUDIO_SPHERE_RADIUS: f32 = 8.0;
pub const AUDIO_REF_DISTANCE: f32 = 1.0;
pub const AUDIO_MAX_DISTANCE: f32 = 20.0;
pub const AUDIO_ROLLOFF: f32 = 1.0;
pub const LISTENER_FORWARD_OFFSET: f32 = 0.5; // listener leans toward where the camera looks
pub const MASTER_GAIN: f32 = 0.6;

// Narration
pub const NARRATION_SETTLE_DELAY_MS: u32 = 800;
