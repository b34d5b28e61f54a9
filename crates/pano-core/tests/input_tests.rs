// Key/wheel mapping and the actions it drives.

mod common;

use common::*;
use pano_core::*;

#[test]
fn arrow_keys_map_to_nudges() {
    assert_eq!(
        key_action("ArrowLeft"),
        Some(ViewerAction::Nudge {
            dx: -KEY_NUDGE_PX,
            dy: 0.0
        })
    );
    assert_eq!(
        key_action("ArrowDown"),
        Some(ViewerAction::Nudge {
            dx: 0.0,
            dy: -KEY_NUDGE_PX
        })
    );
}

#[test]
fn both_spellings_of_zoom_and_toggles() {
    for key in ["+", "="] {
        assert_eq!(key_action(key), Some(ViewerAction::ZoomIn));
    }
    for key in ["-", "_"] {
        assert_eq!(key_action(key), Some(ViewerAction::ZoomOut));
    }
    assert_eq!(key_action("h"), key_action("H"));
    assert_eq!(key_action("N"), Some(ViewerAction::ToggleNarration));
    assert_eq!(key_action("0"), Some(ViewerAction::ResetView));
    assert_eq!(key_action("Escape"), Some(ViewerAction::CloseHotspot));
    assert_eq!(key_action(" "), Some(ViewerAction::PauseOrResume));
    assert_eq!(key_action("q"), None);
    assert_eq!(key_action(""), None);
}

#[test]
fn wheel_direction() {
    assert_eq!(wheel_action(120.0), Some(ViewerAction::ZoomOut));
    assert_eq!(wheel_action(-3.0), Some(ViewerAction::ZoomIn));
    assert_eq!(wheel_action(0.0), None);
    assert_eq!(wheel_action(f64::NAN), None);
}

#[test]
fn arrows_turn_the_camera_like_a_drag() {
    let mut v = viewer();
    v.open_scene(temple_scene()).unwrap();

    assert!(v.apply_action(key_action("ArrowRight").unwrap()));
    assert!(approx(v.camera().yaw, KEY_NUDGE_PX * DRAG_SENSITIVITY_DEG_PER_PX, 1e-4));

    v.apply_action(key_action("ArrowUp").unwrap());
    assert!(v.camera().pitch < 0.0);

    v.apply_action(ViewerAction::ResetView);
    assert_eq!(v.camera(), CameraState::new(DEFAULT_FOV_DEG));
}

#[test]
fn nudging_a_closed_viewer_does_nothing() {
    let mut v = viewer();
    assert!(!v.apply_action(key_action("ArrowLeft").unwrap()));
    assert_eq!(v.camera().yaw, 0.0);
}

#[test]
fn zoom_actions_report_clamping() {
    let mut v = viewer();
    v.open_scene(temple_scene()).unwrap();
    let mut steps = 0;
    while v.apply_action(ViewerAction::ZoomOut) {
        steps += 1;
    }
    assert_eq!(v.camera().fov, MAX_FOV_DEG);
    assert!(steps > 0);
}

#[test]
fn narration_toggle_and_pause_keys() {
    let mut v = viewer();
    let generation = v.open_scene(temple_scene()).unwrap();
    v.autoplay_elapsed(generation);
    assert!(v.narration_audible());

    assert!(v.apply_action(ViewerAction::PauseOrResume));
    assert!(!v.narration_audible());
    assert!(v.ambient_audible());
    assert!(v.apply_action(ViewerAction::PauseOrResume));
    assert!(v.narration_audible());

    assert!(v.apply_action(ViewerAction::ToggleNarration));
    assert!(!v.arbiter().narration_enabled());
    assert!(v.ambient_audible());

    // turning it back on starts the scene's opening clip again
    assert!(v.apply_action(ViewerAction::ToggleNarration));
    assert_eq!(v.narration().current_clip(), Some("intro"));
}

#[test]
fn escape_closes_the_open_hotspot() {
    let mut v = viewer();
    v.open_scene(temple_scene()).unwrap();
    assert!(!v.apply_action(ViewerAction::CloseHotspot));
    v.select_hotspot("garden");
    v.take_events();
    assert!(v.apply_action(key_action("Escape").unwrap()));
    assert_eq!(v.take_events(), vec![ViewerEvent::HotspotToggled(None)]);
}
