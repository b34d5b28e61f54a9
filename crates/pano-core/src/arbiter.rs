//! Decides which of the ambient bed and narration holds the speaker.
//!
//! The arbiter owns no audio component. It reacts to explicit events and
//! answers with [`AudioCommand`]s that the viewer applies to the spatial
//! engine and the narration controller it owns.

use smallvec::{smallvec, SmallVec};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Speaker {
    #[default]
    Ambient,
    Narration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCommand {
    MuteAmbient,
    UnmuteAmbient,
    StopNarration,
}

pub type Commands = SmallVec<[AudioCommand; 2]>;

#[derive(Clone, Debug)]
pub struct AudioArbiter {
    speaker: Speaker,
    /// Ambient was muted by a narration hand-over and comes back when
    /// narration lets go.
    resume_pending: bool,
    ambient_enabled: bool,
    narration_enabled: bool,
    open: bool,
}

impl Default for AudioArbiter {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl AudioArbiter {
    pub fn new(ambient_enabled: bool, narration_enabled: bool) -> Self {
        Self {
            speaker: Speaker::Ambient,
            resume_pending: false,
            ambient_enabled,
            narration_enabled,
            open: false,
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn resume_pending(&self) -> bool {
        self.resume_pending
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn ambient_enabled(&self) -> bool {
        self.ambient_enabled
    }

    pub fn narration_enabled(&self) -> bool {
        self.narration_enabled
    }

    /// Whether the ambient bed should currently be unmuted.
    pub fn ambient_audible(&self) -> bool {
        self.open && self.ambient_enabled && self.speaker == Speaker::Ambient
    }

    pub fn narration_audible(&self) -> bool {
        self.open && self.narration_enabled && self.speaker == Speaker::Narration
    }

    /// New Scene: ambient takes the speaker.
    pub fn scene_activated(&mut self) -> Commands {
        self.open = true;
        self.speaker = Speaker::Ambient;
        self.resume_pending = false;
        smallvec![self.ambient_command()]
    }

    /// Narration began or resumed speaking.
    pub fn narration_started(&mut self) -> Commands {
        if !self.open || !self.narration_enabled {
            log::warn!("[arbiter] narration started while not allowed, stopping it");
            return smallvec![AudioCommand::StopNarration];
        }
        if self.speaker == Speaker::Narration {
            return smallvec![AudioCommand::MuteAmbient];
        }
        log::info!("[arbiter] speaker -> narration");
        self.speaker = Speaker::Narration;
        self.resume_pending = true;
        smallvec![AudioCommand::MuteAmbient]
    }

    /// Narration completed, was stopped, failed or paused.
    pub fn narration_finished(&mut self) -> Commands {
        if self.speaker != Speaker::Narration {
            return Commands::new();
        }
        log::info!("[arbiter] speaker -> ambient");
        self.speaker = Speaker::Ambient;
        self.resume_pending = false;
        if self.open {
            smallvec![self.ambient_command()]
        } else {
            Commands::new()
        }
    }

    /// User toggle for the audio guide. Turning it off hands the speaker
    /// straight back to ambient; turning it on waits for narration to start.
    pub fn set_narration_enabled(&mut self, enabled: bool) -> Commands {
        if self.narration_enabled == enabled {
            return Commands::new();
        }
        self.narration_enabled = enabled;
        if !enabled && self.speaker == Speaker::Narration {
            self.speaker = Speaker::Ambient;
            self.resume_pending = false;
            let mut cmds = smallvec![AudioCommand::StopNarration];
            if self.open {
                cmds.push(self.ambient_command());
            }
            return cmds;
        }
        Commands::new()
    }

    /// User toggle for the spatial bed. Only takes effect on the output
    /// while ambient holds the speaker.
    pub fn set_ambient_enabled(&mut self, enabled: bool) -> Commands {
        if self.ambient_enabled == enabled {
            return Commands::new();
        }
        self.ambient_enabled = enabled;
        if self.speaker == Speaker::Ambient && self.open {
            smallvec![self.ambient_command()]
        } else {
            Commands::new()
        }
    }

    /// Viewer closed: silence both.
    pub fn closed(&mut self) -> Commands {
        self.open = false;
        self.speaker = Speaker::Ambient;
        self.resume_pending = false;
        smallvec![AudioCommand::StopNarration, AudioCommand::MuteAmbient]
    }

    fn ambient_command(&self) -> AudioCommand {
        if self.ambient_enabled {
            AudioCommand::UnmuteAmbient
        } else {
            AudioCommand::MuteAmbient
        }
    }
}
