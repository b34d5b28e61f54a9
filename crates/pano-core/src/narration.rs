//! Spoken narration, one clip at a time.
//!
//! `idle → speaking → (paused ⇄ speaking) → idle`. The controller is the only
//! source of truth for "is speaking". Every utterance carries a token; a
//! backend callback for anything but the current token is stale (the clip
//! was cancelled or replaced) and is dropped.

use crate::config::NarrationConfig;
use crate::error::ViewerError;
use crate::scene::NarrationClip;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NarrationState {
    #[default]
    Idle,
    Speaking {
        clip_id: String,
        token: u64,
    },
    Paused {
        clip_id: String,
        token: u64,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrationEvent {
    Started { clip_id: String },
    Paused { clip_id: String },
    Resumed { clip_id: String },
    Completed { clip_id: String },
    Stopped { clip_id: String },
    Failed { clip_id: String, reason: String },
}

impl NarrationEvent {
    pub fn clip_id(&self) -> &str {
        match self {
            NarrationEvent::Started { clip_id }
            | NarrationEvent::Paused { clip_id }
            | NarrationEvent::Resumed { clip_id }
            | NarrationEvent::Completed { clip_id }
            | NarrationEvent::Stopped { clip_id }
            | NarrationEvent::Failed { clip_id, .. } => clip_id,
        }
    }

    /// Whether narration is audible after this event.
    pub fn is_audible(&self) -> bool {
        matches!(
            self,
            NarrationEvent::Started { .. } | NarrationEvent::Resumed { .. }
        )
    }
}

/// What the backend is asked to speak.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance<'a> {
    pub token: u64,
    pub text: &'a str,
    pub rate: f32,
    pub pitch: f32,
    pub lang: Option<&'a str>,
}

/// Asynchronous completion reported by a speech backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechSignal {
    Ended,
    Error(String),
}

pub trait SpeechBackend {
    fn speak(&mut self, utterance: &Utterance<'_>) -> Result<(), ViewerError>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn cancel(&mut self);
}

pub struct NarrationController<S: SpeechBackend> {
    backend: Option<S>,
    config: NarrationConfig,
    state: NarrationState,
    next_token: u64,
}

impl<S: SpeechBackend> NarrationController<S> {
    pub fn new(config: NarrationConfig, backend: Result<S, ViewerError>) -> Self {
        let backend = match backend {
            Ok(b) => Some(b),
            Err(e) => {
                log::warn!("[narration] speech disabled: {}", e);
                None
            }
        };
        Self {
            backend,
            config,
            state: NarrationState::Idle,
            next_token: 1,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn state(&self) -> &NarrationState {
        &self.state
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.state, NarrationState::Speaking { .. })
    }

    pub fn current_clip(&self) -> Option<&str> {
        match &self.state {
            NarrationState::Idle => None,
            NarrationState::Speaking { clip_id, .. } | NarrationState::Paused { clip_id, .. } => {
                Some(clip_id)
            }
        }
    }

    pub fn current_token(&self) -> Option<u64> {
        match &self.state {
            NarrationState::Idle => None,
            NarrationState::Speaking { token, .. } | NarrationState::Paused { token, .. } => {
                Some(*token)
            }
        }
    }

    pub fn backend(&self) -> Option<&S> {
        self.backend.as_ref()
    }

    /// Cancels whatever is in flight and starts `clip`. Yields `Started`,
    /// or `Failed` when speech is unavailable or rejects the utterance.
    pub fn play(&mut self, clip: &NarrationClip) -> NarrationEvent {
        let Some(backend) = self.backend.as_mut() else {
            self.state = NarrationState::Idle;
            return NarrationEvent::Failed {
                clip_id: clip.id.clone(),
                reason: "speech synthesis unavailable".into(),
            };
        };
        if self.state != NarrationState::Idle {
            backend.cancel();
            self.state = NarrationState::Idle;
        }
        let token = self.next_token;
        self.next_token += 1;
        let utterance = Utterance {
            token,
            text: &clip.text,
            rate: self.config.rate,
            pitch: self.config.pitch,
            lang: self.config.lang.as_deref(),
        };
        match backend.speak(&utterance) {
            Ok(()) => {
                log::info!("[narration] speaking {} (token {})", clip.id, token);
                self.state = NarrationState::Speaking {
                    clip_id: clip.id.clone(),
                    token,
                };
                NarrationEvent::Started {
                    clip_id: clip.id.clone(),
                }
            }
            Err(e) => {
                log::warn!("[narration] could not speak {}: {}", clip.id, e);
                NarrationEvent::Failed {
                    clip_id: clip.id.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn pause(&mut self) -> Option<NarrationEvent> {
        let NarrationState::Speaking { clip_id, token } = &self.state else {
            return None;
        };
        let (clip_id, token) = (clip_id.clone(), *token);
        if let Some(b) = self.backend.as_mut() {
            b.pause();
        }
        self.state = NarrationState::Paused {
            clip_id: clip_id.clone(),
            token,
        };
        Some(NarrationEvent::Paused { clip_id })
    }

    pub fn resume(&mut self) -> Option<NarrationEvent> {
        let NarrationState::Paused { clip_id, token } = &self.state else {
            return None;
        };
        let (clip_id, token) = (clip_id.clone(), *token);
        if let Some(b) = self.backend.as_mut() {
            b.resume();
        }
        self.state = NarrationState::Speaking {
            clip_id: clip_id.clone(),
            token,
        };
        Some(NarrationEvent::Resumed { clip_id })
    }

    /// Cancels from any state. A no-op when already idle.
    pub fn stop(&mut self) -> Option<NarrationEvent> {
        let clip_id = self.current_clip()?.to_owned();
        if let Some(b) = self.backend.as_mut() {
            b.cancel();
        }
        self.state = NarrationState::Idle;
        log::debug!("[narration] stopped {}", clip_id);
        Some(NarrationEvent::Stopped { clip_id })
    }

    /// Feed a backend callback. Stale tokens are ignored.
    pub fn on_signal(&mut self, token: u64, signal: SpeechSignal) -> Option<NarrationEvent> {
        if self.current_token() != Some(token) {
            log::debug!("[narration] ignoring stale signal for token {}", token);
            return None;
        }
        let clip_id = self.current_clip()?.to_owned();
        self.state = NarrationState::Idle;
        match signal {
            SpeechSignal::Ended => {
                log::info!("[narration] completed {}", clip_id);
                Some(NarrationEvent::Completed { clip_id })
            }
            SpeechSignal::Error(reason) => {
                log::warn!("[narration] {} failed mid-utterance: {}", clip_id, reason);
                Some(NarrationEvent::Failed { clip_id, reason })
            }
        }
    }
}
