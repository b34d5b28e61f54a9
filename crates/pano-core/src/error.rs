use thiserror::Error;

/// How a failure affects the viewer once it crosses into the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The viewer cannot proceed; the host shows an initialization error.
    FatalToFeature,
    /// Only the current Scene is affected; the host may retry or navigate.
    RecoverableAsset,
    /// A non-essential subsystem switched itself off.
    DegradedFeature,
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("segment counts must be positive (got {width}x{height})")]
    InvalidSegments { width: u32, height: u32 },
    #[error("could not start 3D viewer: {0}")]
    Initialization(String),
    #[error("panorama image failed to load: {0}")]
    TextureLoad(String),
    #[error("audio backend unavailable: {0}")]
    AudioUnavailable(String),
    #[error("speech synthesis unavailable: {0}")]
    SpeechUnavailable(String),
    #[error("invalid viewer config: {0}")]
    InvalidConfig(String),
    #[error("scene descriptor rejected: {0}")]
    InvalidScene(String),
}

impl ViewerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ViewerError::Initialization(_)
            | ViewerError::InvalidConfig(_)
            | ViewerError::InvalidSegments { .. } => ErrorClass::FatalToFeature,
            ViewerError::TextureLoad(_) | ViewerError::InvalidScene(_) => {
                ErrorClass::RecoverableAsset
            }
            ViewerError::AudioUnavailable(_) | ViewerError::SpeechUnavailable(_) => {
                ErrorClass::DegradedFeature
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
