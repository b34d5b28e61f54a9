// Orbit camera: drag mapping, clamps and zoom limits.

mod common;

use common::approx;
use glam::Vec2;
use pano_core::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn controller() -> OrbitController {
    OrbitController::new(CameraConfig::default())
}

#[test]
fn drag_right_turns_right_and_drag_down_looks_up() {
    let mut cam = controller();
    cam.on_drag_start(Vec2::new(100.0, 100.0));
    assert!(cam.on_drag_move(Vec2::new(150.0, 100.0)));
    // 50px at 0.2 deg/px
    assert!(approx(cam.state().yaw, 10.0, 1e-4));
    assert!(approx(cam.state().pitch, 0.0, 1e-6));

    assert!(cam.on_drag_move(Vec2::new(150.0, 200.0)));
    assert!(approx(cam.state().pitch, -20.0, 1e-4));
}

#[test]
fn moves_without_a_drag_are_ignored() {
    let mut cam = controller();
    assert!(!cam.on_drag_move(Vec2::new(500.0, 500.0)));
    assert_eq!(cam.state(), CameraState::new(DEFAULT_FOV_DEG));

    cam.on_drag_start(Vec2::new(0.0, 0.0));
    cam.on_drag_end();
    assert!(!cam.is_dragging());
    assert!(!cam.on_drag_move(Vec2::new(10.0, 0.0)));
    assert!(approx(cam.state().yaw, 0.0, 1e-6));
}

#[test]
fn zero_and_non_finite_deltas_do_not_move() {
    let mut cam = controller();
    cam.on_drag_start(Vec2::new(10.0, 10.0));
    assert!(!cam.on_drag_move(Vec2::new(10.0, 10.0)));
    assert!(!cam.on_drag_move(Vec2::new(f32::NAN, 10.0)));
    assert!(cam.state().yaw.is_finite());
    cam.nudge(Vec2::new(f32::INFINITY, 0.0));
    assert!(cam.state().yaw.is_finite());
}

#[test]
fn pitch_clamps_at_the_poles() {
    let mut cam = controller();
    cam.on_drag_start(Vec2::ZERO);
    cam.on_drag_move(Vec2::new(0.0, -10_000.0));
    assert!(approx(cam.state().pitch, PITCH_LIMIT_DEG, 1e-6));
    cam.on_drag_move(Vec2::new(0.0, 20_000.0));
    assert!(approx(cam.state().pitch, -PITCH_LIMIT_DEG, 1e-6));
}

#[test]
fn yaw_wraps_after_long_drags() {
    let mut cam = controller();
    cam.on_drag_start(Vec2::ZERO);
    // 36000 degrees right, then a little more
    let mut x = 0.0;
    for _ in 0..1800 {
        x += 100.0;
        cam.on_drag_move(Vec2::new(x, 0.0));
    }
    let yaw = cam.state().yaw;
    assert!((0.0..360.0).contains(&yaw), "yaw {yaw}");
    assert!(yaw < 0.5 || yaw > 359.5, "yaw {yaw}");

    cam.on_drag_move(Vec2::new(x - 50.0, 0.0));
    let yaw = cam.state().yaw;
    assert!((0.0..360.0).contains(&yaw));
    assert!(approx(yaw, 350.0, 0.5), "yaw {yaw}");

    // orientation matches the unwound angle as well as the reduced one
    let state = cam.state();
    let unwound = CameraState {
        yaw: 35_990.0,
        ..state
    };
    let reduced = CameraState {
        yaw: 35_990.0f32.rem_euclid(360.0),
        ..state
    };
    assert!(state.view_matrix().abs_diff_eq(reduced.view_matrix(), 1e-3));
    assert!(state.view_matrix().abs_diff_eq(unwound.view_matrix(), 1e-3));
    assert!(state.forward().abs_diff_eq(reduced.forward(), 1e-3));
}

#[test]
fn normalize_yaw_stays_in_range() {
    assert_eq!(normalize_yaw(0.0), 0.0);
    assert_eq!(normalize_yaw(360.0), 0.0);
    assert!(approx(normalize_yaw(-90.0), 270.0, 1e-4));
    assert!(approx(normalize_yaw(725.0), 5.0, 1e-3));
    let tiny = normalize_yaw(-1e-7);
    assert!((0.0..360.0).contains(&tiny));
}

#[test]
fn random_interaction_keeps_state_in_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut cam = controller();
    let mut pos = Vec2::ZERO;
    for _ in 0..5_000 {
        match rng.gen_range(0..6) {
            0 => cam.on_drag_start(pos),
            1 => cam.on_drag_end(),
            2 => {
                cam.zoom_in();
            }
            3 => {
                cam.zoom_out();
            }
            4 => cam.nudge(Vec2::new(
                rng.gen_range(-500.0..500.0),
                rng.gen_range(-500.0..500.0),
            )),
            _ => {
                pos += Vec2::new(rng.gen_range(-800.0..800.0), rng.gen_range(-800.0..800.0));
                cam.on_drag_move(pos);
            }
        }
        let s = cam.state();
        assert!((0.0..360.0).contains(&s.yaw), "yaw {}", s.yaw);
        assert!((-90.0..=90.0).contains(&s.pitch), "pitch {}", s.pitch);
        assert!((MIN_FOV_DEG..=MAX_FOV_DEG).contains(&s.fov), "fov {}", s.fov);
    }
}

#[test]
fn six_zoom_ins_from_default_hit_the_minimum() {
    let mut cam = controller();
    for _ in 0..6 {
        cam.zoom_in();
    }
    let expected = (DEFAULT_FOV_DEG - 60.0).max(MIN_FOV_DEG);
    assert!(approx(cam.state().fov, expected, 1e-6));
    assert!(approx(cam.state().fov, 30.0, 1e-6));
    // already at the limit
    assert!(!cam.zoom_in());
}

#[test]
fn zoom_out_stops_at_the_maximum() {
    let mut cam = controller();
    let mut steps = 0;
    while cam.zoom_out() {
        steps += 1;
        assert!(cam.state().fov <= MAX_FOV_DEG);
    }
    // 75 -> 85 -> 95 -> 105 -> 115 -> 120
    assert_eq!(steps, 5);
    assert!(approx(cam.state().fov, MAX_FOV_DEG, 1e-6));
    assert!(!cam.zoom_out());
}

#[test]
fn reset_is_idempotent() {
    let mut cam = controller();
    cam.on_drag_start(Vec2::ZERO);
    cam.on_drag_move(Vec2::new(321.0, -77.0));
    cam.zoom_in();
    cam.reset();
    let once = cam.state();
    cam.reset();
    assert_eq!(once, cam.state());
    assert_eq!(once, CameraState::new(DEFAULT_FOV_DEG));
    assert!(!cam.is_dragging());
}

#[test]
fn forward_follows_yaw_and_pitch() {
    let mut s = CameraState::new(75.0);
    let f = s.forward();
    assert!(approx(f.z, -1.0, 1e-5));

    // turning right by 90 degrees faces +X
    s.yaw = 90.0;
    let f = s.forward();
    assert!(approx(f.x, 1.0, 1e-5) && approx(f.z, 0.0, 1e-5), "{f:?}");

    // positive pitch looks down
    s.yaw = 0.0;
    s.pitch = 45.0;
    assert!(s.forward().y < -0.5);
}

#[test]
fn view_matrix_maps_forward_onto_negative_z() {
    let mut s = CameraState::new(75.0);
    s.yaw = 123.0;
    s.pitch = -31.0;
    let in_view = s.view_matrix().transform_vector3(s.forward());
    assert!(approx(in_view.x, 0.0, 1e-4), "{in_view:?}");
    assert!(approx(in_view.y, 0.0, 1e-4), "{in_view:?}");
    assert!(approx(in_view.z, -1.0, 1e-4), "{in_view:?}");
}
