use pano_core::ViewerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("could not open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("panorama pipeline rejected: {0}")]
    Pipeline(String),
    #[error("could not decode panorama: {0}")]
    Decode(#[from] image::ImageError),
    #[error("panorama image has no pixels")]
    EmptyImage,
}

impl From<RenderError> for ViewerError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Decode(_) | RenderError::EmptyImage => {
                ViewerError::TextureLoad(e.to_string())
            }
            other => ViewerError::Initialization(other.to_string()),
        }
    }
}
