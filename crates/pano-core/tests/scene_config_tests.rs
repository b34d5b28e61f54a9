// Host-supplied JSON: Scene descriptors and viewer config.

mod common;

use common::{clip, temple_scene};
use pano_core::*;

const SCENE_JSON: &str = r#"{
    "id": "ghats",
    "name": "Varanasi Ghats",
    "type": "heritage",
    "imageUrl": "/panos/ghats.jpg",
    "hotspots": [
        {
            "id": "aarti",
            "title": "Evening Aarti",
            "description": "Fire ceremony on the river steps.",
            "category": "culture",
            "facts": ["Held every evening."],
            "bestTime": "Sunset",
            "position": { "u": 0.42, "v": 0.55 }
        },
        {
            "id": "boats",
            "title": "Boats",
            "position": { "u": 1.3, "v": -0.2 }
        }
    ],
    "narrationClips": [
        { "id": "welcome", "title": "Welcome", "body": "Welcome to the ghats.", "category": "introduction" },
        { "id": "river", "text": "The river...", "category": "spiritual", "priority": 3 }
    ]
}"#;

#[test]
fn scene_json_decodes_with_aliases_and_defaults() {
    let scene = Scene::from_json(SCENE_JSON).unwrap();
    assert_eq!(scene.kind, "heritage");
    assert_eq!(scene.image_url, "/panos/ghats.jpg");
    assert_eq!(scene.hotspots.len(), 2);

    let aarti = scene.hotspot("aarti").unwrap();
    assert_eq!(aarti.category, HotspotCategory::Culture);
    assert_eq!(aarti.best_time.as_deref(), Some("Sunset"));
    let text = aarti.narration_text();
    assert!(text.starts_with("Evening Aarti. Fire ceremony"));
    assert!(text.contains("Held every evening."));
    assert!(text.ends_with("Best time to visit: Sunset."));

    // missing category falls back, out-of-range positions are clamped
    let boats = scene.hotspot("boats").unwrap();
    assert_eq!(boats.category, HotspotCategory::Landmark);
    assert_eq!(boats.position, PanoPosition::new(1.0, 0.0));

    let welcome = scene.narration.get("welcome").unwrap();
    assert_eq!(welcome.text, "Welcome to the ghats.");
    assert!(welcome.is_introduction());
    // unrecognised categories become general
    assert_eq!(scene.narration.get("river").unwrap().category, ClipCategory::General);
}

#[test]
fn scene_validation_rejects_bad_descriptors() {
    let mut dup = temple_scene();
    dup.hotspots[1].id = "wheel".into();
    assert!(matches!(
        Scene::from_descriptor(dup),
        Err(ViewerError::InvalidScene(_))
    ));

    let mut dup_clip = temple_scene();
    dup_clip.narration_clips.push(clip("intro", ClipCategory::General, 0));
    assert!(Scene::from_descriptor(dup_clip).is_err());

    let mut nan = temple_scene();
    nan.hotspots[0].position.u = f32::NAN;
    assert!(Scene::from_descriptor(nan).is_err());

    let mut no_id = temple_scene();
    no_id.id = "  ".into();
    assert!(Scene::from_descriptor(no_id).is_err());

    assert!(matches!(
        Scene::from_json("{ not json"),
        Err(ViewerError::InvalidScene(_))
    ));
}

#[test]
fn empty_hotspot_and_clip_lists_are_fine() {
    let scene = Scene::from_json(r#"{"id":"x","name":"X","imageUrl":"x.jpg"}"#).unwrap();
    assert!(scene.hotspots.is_empty());
    assert!(scene.narration.is_empty());
    assert!(scene.narration.autoplay_choice().is_none());
}

#[test]
fn autoplay_prefers_introduction_then_priority() {
    let queue = NarrationQueue::new(vec![
        clip("a", ClipCategory::History, 2),
        clip("b", ClipCategory::Culture, 7),
        clip("c", ClipCategory::Nature, 7),
    ]);
    assert_eq!(queue.autoplay_choice().unwrap().id, "b");

    let with_intro = NarrationQueue::new(vec![
        clip("a", ClipCategory::History, 9),
        clip("intro", ClipCategory::Introduction, 0),
    ]);
    assert_eq!(with_intro.autoplay_choice().unwrap().id, "intro");
}

#[test]
fn next_after_wraps() {
    let queue = NarrationQueue::new(vec![
        clip("a", ClipCategory::General, 0),
        clip("b", ClipCategory::General, 0),
    ]);
    assert_eq!(queue.next_after(None).unwrap().id, "a");
    assert_eq!(queue.next_after(Some("a")).unwrap().id, "b");
    assert_eq!(queue.next_after(Some("b")).unwrap().id, "a");
    assert_eq!(queue.next_after(Some("hotspot:x")).unwrap().id, "a");
    assert!(NarrationQueue::default().next_after(None).is_none());
}

#[test]
fn partial_config_json_keeps_defaults() {
    let config = ViewerConfig::from_json(
        r#"{
            "camera": { "minFov": 40 },
            "audio": { "distanceModel": "linear", "enabled": false },
            "narration": { "settleDelayMs": 1200, "lang": "en-IN" },
            "overlay": { "mode": "projected" }
        }"#,
    )
    .unwrap();
    assert_eq!(config.camera.min_fov, 40.0);
    assert_eq!(config.camera.default_fov, DEFAULT_FOV_DEG);
    assert_eq!(config.audio.distance_model, DistanceModel::Linear);
    assert!(!config.audio.enabled);
    assert_eq!(config.audio.radius, AUDIO_SPHERE_RADIUS);
    assert_eq!(config.narration.settle_delay_ms, 1200);
    assert_eq!(config.narration.lang.as_deref(), Some("en-IN"));
    assert!(config.narration.enabled);
    assert_eq!(config.overlay.mode, OverlayMode::Projected);
    assert_eq!(config.geometry.width_segments, DEFAULT_WIDTH_SEGMENTS);
}

#[test]
fn config_validation() {
    assert!(ViewerConfig::default().validate().is_ok());

    let mut c = ViewerConfig::default();
    c.camera.max_fov = 200.0;
    assert!(c.validate().is_err());

    let mut c = ViewerConfig::default();
    c.geometry.height_segments = 1;
    assert!(c.validate().is_err());

    let mut c = ViewerConfig::default();
    c.audio.max_distance = 0.5;
    assert!(c.validate().is_err());

    let mut c = ViewerConfig::default();
    c.audio.master_gain = 1.5;
    assert!(c.validate().is_err());

    let mut c = ViewerConfig::default();
    c.camera.sensitivity = 0.0;
    let err = c.validate().unwrap_err();
    assert_eq!(err.class(), ErrorClass::FatalToFeature);

    assert!(matches!(
        ViewerConfig::from_json(r#"{"camera": {"minFov": "wide"}}"#),
        Err(ViewerError::InvalidConfig(_))
    ));
}
