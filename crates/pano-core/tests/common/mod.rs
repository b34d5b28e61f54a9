// Recording fakes for the audio seams plus small scene builders.

#![allow(dead_code)]

use pano_core::*;

#[derive(Default, Debug)]
pub struct RecordingAmbient {
    pub fail_start: bool,
    pub starts: usize,
    pub stops: usize,
    pub emitters: usize,
    pub muted: bool,
    pub gains: Vec<f32>,
    pub listener: Option<ListenerState>,
}

impl RecordingAmbient {
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Default::default()
        }
    }
}

impl AmbientBackend for RecordingAmbient {
    fn start(&mut self, sources: &[AudioSource]) -> Result<(), ViewerError> {
        if self.fail_start {
            return Err(ViewerError::AudioUnavailable("no output device".into()));
        }
        self.starts += 1;
        self.emitters = sources.len();
        self.gains = vec![0.0; sources.len()];
        Ok(())
    }

    fn set_listener(&mut self, listener: &ListenerState) {
        self.listener = Some(*listener);
    }

    fn set_source_gain(&mut self, index: usize, gain: f32) {
        self.gains[index] = gain;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.emitters = 0;
        self.gains.clear();
    }
}

#[derive(Default, Debug)]
pub struct RecordingSpeech {
    pub fail_speak: bool,
    pub spoken: Vec<(u64, String)>,
    pub cancels: usize,
    pub pauses: usize,
    pub resumes: usize,
}

impl RecordingSpeech {
    pub fn last_token(&self) -> u64 {
        self.spoken.last().map(|(t, _)| *t).unwrap_or(0)
    }
}

impl SpeechBackend for RecordingSpeech {
    fn speak(&mut self, utterance: &Utterance<'_>) -> Result<(), ViewerError> {
        if self.fail_speak {
            return Err(ViewerError::SpeechUnavailable("synthesis-failed".into()));
        }
        self.spoken.push((utterance.token, utterance.text.to_owned()));
        Ok(())
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn resume(&mut self) {
        self.resumes += 1;
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}

pub type TestViewer = Viewer<RecordingAmbient, RecordingSpeech>;

pub fn viewer() -> TestViewer {
    viewer_with(ViewerConfig::default())
}

pub fn viewer_with(config: ViewerConfig) -> TestViewer {
    Viewer::new(
        config,
        Ok(RecordingAmbient::default()),
        Ok(RecordingSpeech::default()),
    )
    .expect("default config is valid")
}

pub fn hotspot(id: &str, category: HotspotCategory, u: f32, v: f32) -> Hotspot {
    Hotspot {
        id: id.into(),
        title: format!("{id} title"),
        description: format!("{id} description"),
        category,
        facts: vec![],
        best_time: None,
        position: PanoPosition::new(u, v),
    }
}

pub fn clip(id: &str, category: ClipCategory, priority: i32) -> NarrationClip {
    NarrationClip {
        id: id.into(),
        title: format!("{id} title"),
        text: format!("{id} text"),
        category,
        priority,
    }
}

/// Scene with three hotspots and an introduction clip.
pub fn temple_scene() -> SceneDescriptor {
    SceneDescriptor {
        id: "temple".into(),
        name: "Sun Temple".into(),
        kind: "heritage".into(),
        description: "A 13th century temple".into(),
        image_url: "temple.jpg".into(),
        hotspots: vec![
            hotspot("wheel", HotspotCategory::Landmark, 0.5, 0.5),
            hotspot("garden", HotspotCategory::Nature, 0.2, 0.6),
            hotspot("dance", HotspotCategory::Culture, 0.8, 0.45),
        ],
        narration_clips: vec![
            clip("history", ClipCategory::History, 5),
            clip("intro", ClipCategory::Introduction, 1),
        ],
    }
}

pub fn forest_scene() -> SceneDescriptor {
    SceneDescriptor {
        id: "forest".into(),
        name: "Mangrove Forest".into(),
        kind: "nature".into(),
        description: String::new(),
        image_url: "forest.jpg".into(),
        hotspots: vec![hotspot("tiger", HotspotCategory::Wildlife, 0.3, 0.55)],
        narration_clips: vec![clip("tides", ClipCategory::Nature, 2)],
    }
}

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
