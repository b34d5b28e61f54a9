//! In-memory Scene shape supplied by the host.
//!
//! Descriptors arrive from a content store the viewer knows nothing about;
//! [`Scene::from_descriptor`] checks them once so the rest of the engine can
//! treat hotspots and clips as immutable, already-validated data.

use crate::error::{Result, ViewerError};
use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
    #[serde(default)]
    pub narration_clips: Vec<NarrationClip>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotCategory {
    #[default]
    Landmark,
    Wildlife,
    Culture,
    Nature,
}

/// Normalized panorama coordinates: `u` is the longitude fraction, `v` the
/// latitude fraction of the equirectangular image, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PanoPosition {
    pub u: f32,
    pub v: f32,
}

impl PanoPosition {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: HotspotCategory,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub best_time: Option<String>,
    pub position: PanoPosition,
}

impl Hotspot {
    /// Text spoken when a visitor asks the guide about this hotspot.
    pub fn narration_text(&self) -> String {
        let mut text = format!("{}. {}", self.title, self.description);
        for fact in &self.facts {
            text.push(' ');
            text.push_str(fact);
        }
        if let Some(best) = &self.best_time {
            text.push_str(" Best time to visit: ");
            text.push_str(best);
            text.push('.');
        }
        text
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipCategory {
    Introduction,
    History,
    Culture,
    Nature,
    Hotspot,
    #[default]
    #[serde(other)]
    General,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationClip {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "body")]
    pub text: String,
    #[serde(default)]
    pub category: ClipCategory,
    #[serde(default)]
    pub priority: i32,
}

impl NarrationClip {
    pub fn is_introduction(&self) -> bool {
        self.category == ClipCategory::Introduction
    }
}

/// Ordered clips of one Scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NarrationQueue {
    clips: Vec<NarrationClip>,
}

impl NarrationQueue {
    pub fn new(clips: Vec<NarrationClip>) -> Self {
        Self { clips }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NarrationClip> {
        self.clips.iter()
    }

    pub fn get(&self, id: &str) -> Option<&NarrationClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// The introduction clip, or failing that the highest-priority clip.
    /// Ties keep queue order.
    pub fn autoplay_choice(&self) -> Option<&NarrationClip> {
        if let Some(intro) = self.clips.iter().find(|c| c.is_introduction()) {
            return Some(intro);
        }
        let mut best: Option<&NarrationClip> = None;
        for clip in &self.clips {
            match best {
                Some(b) if clip.priority <= b.priority => {}
                _ => best = Some(clip),
            }
        }
        best
    }

    /// The clip after `id` in queue order, wrapping to the first.
    pub fn next_after(&self, id: Option<&str>) -> Option<&NarrationClip> {
        let start = id
            .and_then(|id| self.clips.iter().position(|c| c.id == id))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.clips.get(start).or_else(|| self.clips.first())
    }
}

/// The currently displayed panorama.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub description: String,
    pub image_url: String,
    pub hotspots: Vec<Hotspot>,
    pub narration: NarrationQueue,
}

impl Scene {
    pub fn from_descriptor(desc: SceneDescriptor) -> Result<Self> {
        if desc.id.trim().is_empty() {
            return Err(ViewerError::InvalidScene("scene id is empty".into()));
        }
        if desc.image_url.trim().is_empty() {
            return Err(ViewerError::InvalidScene(format!(
                "scene {} has no image",
                desc.id
            )));
        }

        let mut seen = FnvHashSet::default();
        let mut hotspots = Vec::with_capacity(desc.hotspots.len());
        for mut h in desc.hotspots {
            if !seen.insert(h.id.clone()) {
                return Err(ViewerError::InvalidScene(format!(
                    "duplicate hotspot id {}",
                    h.id
                )));
            }
            let PanoPosition { u, v } = h.position;
            if !u.is_finite() || !v.is_finite() {
                return Err(ViewerError::InvalidScene(format!(
                    "hotspot {} has a non-finite position",
                    h.id
                )));
            }
            if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
                log::warn!(
                    "[scene] hotspot {} position ({:.3},{:.3}) clamped into [0,1]",
                    h.id,
                    u,
                    v
                );
                h.position = PanoPosition::new(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
            }
            hotspots.push(h);
        }

        let mut clip_ids = FnvHashSet::default();
        for clip in &desc.narration_clips {
            if !clip_ids.insert(clip.id.as_str()) {
                return Err(ViewerError::InvalidScene(format!(
                    "duplicate narration clip id {}",
                    clip.id
                )));
            }
        }

        Ok(Self {
            id: desc.id,
            name: desc.name,
            kind: desc.kind,
            description: desc.description,
            image_url: desc.image_url,
            hotspots,
            narration: NarrationQueue::new(desc.narration_clips),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let desc: SceneDescriptor =
            serde_json::from_str(json).map_err(|e| ViewerError::InvalidScene(e.to_string()))?;
        Self::from_descriptor(desc)
    }

    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }
}
