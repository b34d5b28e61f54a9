pub mod arbiter;
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod narration;
pub mod overlay;
pub mod scene;
pub mod spatial;
pub mod viewer;

pub use arbiter::*;
pub use camera::*;
pub use config::*;
pub use constants::*;
pub use error::{ErrorClass, ViewerError};
pub use geometry::{Mesh, SphereVertex};
pub use input::*;
pub use narration::*;
pub use overlay::*;
pub use scene::*;
pub use spatial::*;
pub use viewer::*;
