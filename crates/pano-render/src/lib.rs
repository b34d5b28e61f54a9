//! GPU side of the viewer: one textured sphere, drawn from its centre.

pub mod error;
pub mod renderer;
pub mod texture;

pub use error::RenderError;
pub use renderer::{model_view_projection, Renderer};
pub use texture::{decode_panorama, PanoramaImage};

pub const PANORAMA_WGSL: &str = include_str!("../shaders/panorama.wgsl");
