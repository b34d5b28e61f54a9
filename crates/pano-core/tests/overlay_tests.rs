// Hotspot overlay selection and marker placement.

mod common;

use common::{approx, hotspot};
use pano_core::*;

fn hotspots() -> Vec<Hotspot> {
    vec![
        hotspot("gate", HotspotCategory::Landmark, 0.75, 0.5),
        hotspot("pond", HotspotCategory::Nature, 0.25, 0.5),
        hotspot("stall", HotspotCategory::Culture, 0.1, 0.9),
    ]
}

fn overlay(mode: OverlayMode) -> HotspotOverlay {
    let mut o = HotspotOverlay::new(mode);
    o.load(&hotspots());
    o
}

#[test]
fn select_is_a_toggle() {
    let mut o = overlay(OverlayMode::Fixed);
    assert!(o.select("gate"));
    assert_eq!(o.open_id(), Some("gate"));
    assert!(o.select("gate"));
    assert_eq!(o.open_id(), None);
}

#[test]
fn at_most_one_panel_open() {
    let mut o = overlay(OverlayMode::Fixed);
    o.select("gate");
    o.select("pond");
    assert_eq!(o.open_id(), Some("pond"));

    let markers = o.markers(&hotspots(), Viewport::new(800.0, 600.0), &CameraState::new(75.0));
    assert_eq!(markers.iter().filter(|m| m.open).count(), 1);
}

#[test]
fn unknown_ids_and_hidden_markers_are_ignored() {
    let mut o = overlay(OverlayMode::Fixed);
    assert!(!o.select("nope"));
    assert_eq!(o.open_id(), None);

    o.select("stall");
    assert!(!o.toggle_visibility());
    // hiding closes the panel
    assert_eq!(o.open_id(), None);
    assert!(!o.select("gate"));
    assert_eq!(o.open_id(), None);

    assert!(o.toggle_visibility());
    assert!(o.select("gate"));
}

#[test]
fn close_reports_whether_anything_was_open() {
    let mut o = overlay(OverlayMode::Fixed);
    assert!(!o.close());
    o.select("pond");
    assert!(o.close());
    assert!(!o.close());
}

#[test]
fn loading_a_scene_resets_session_state() {
    let mut o = overlay(OverlayMode::Fixed);
    o.select("pond");
    o.toggle_visibility();
    o.load(&hotspots()[..1]);
    assert!(o.is_visible());
    assert_eq!(o.open_id(), None);
    assert!(!o.select("pond"));
}

#[test]
fn fixed_markers_use_screen_fractions() {
    let o = overlay(OverlayMode::Fixed);
    let vp = Viewport::new(1000.0, 500.0);
    let mut cam = CameraState::new(75.0);
    let before = o.markers(&hotspots(), vp, &cam);
    cam.yaw = 140.0;
    let after = o.markers(&hotspots(), vp, &cam);
    assert_eq!(before, after);

    let stall = &before[2];
    assert!(approx(stall.screen.x, 100.0, 1e-3));
    assert!(approx(stall.screen.y, 450.0, 1e-3));
    assert!(before.iter().all(|m| m.visible));
}

#[test]
fn projected_markers_follow_the_camera() {
    let o = overlay(OverlayMode::Projected);
    let vp = Viewport::new(800.0, 600.0);
    let cam = CameraState::new(75.0);
    let markers = o.markers(&hotspots(), vp, &cam);

    // straight ahead lands in the middle of the viewport
    let gate = &markers[0];
    assert!(gate.visible);
    assert!(approx(gate.screen.x, 400.0, 0.5), "{:?}", gate.screen);
    assert!(approx(gate.screen.y, 300.0, 0.5), "{:?}", gate.screen);

    // directly behind is hidden
    assert!(!markers[1].visible);

    // turn around and the two swap
    let mut back = cam;
    back.yaw = 180.0;
    let markers = o.markers(&hotspots(), vp, &back);
    assert!(!markers[0].visible);
    assert!(markers[1].visible);
}

#[test]
fn hidden_overlay_hides_every_marker() {
    let mut o = overlay(OverlayMode::Fixed);
    o.toggle_visibility();
    let markers = o.markers(&hotspots(), Viewport::new(640.0, 480.0), &CameraState::new(75.0));
    assert!(markers.iter().all(|m| !m.visible));
}
