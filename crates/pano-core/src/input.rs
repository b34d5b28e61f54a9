//! Platform-neutral key and wheel mapping. Frontends translate their own
//! key names into the DOM `KeyboardEvent.key` spelling before calling in.

use crate::constants::KEY_NUDGE_PX;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewerAction {
    /// Pixels of simulated drag.
    Nudge { dx: f32, dy: f32 },
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleHotspots,
    ToggleNarration,
    PauseOrResume,
    CloseHotspot,
}

#[inline]
pub fn key_action(key: &str) -> Option<ViewerAction> {
    let action = match key {
        "ArrowLeft" => ViewerAction::Nudge {
            dx: -KEY_NUDGE_PX,
            dy: 0.0,
        },
        "ArrowRight" => ViewerAction::Nudge {
            dx: KEY_NUDGE_PX,
            dy: 0.0,
        },
        // pitch follows a downward drag the opposite way, so "up" is +dy
        "ArrowUp" => ViewerAction::Nudge {
            dx: 0.0,
            dy: KEY_NUDGE_PX,
        },
        "ArrowDown" => ViewerAction::Nudge {
            dx: 0.0,
            dy: -KEY_NUDGE_PX,
        },
        "+" | "=" => ViewerAction::ZoomIn,
        "-" | "_" => ViewerAction::ZoomOut,
        "0" => ViewerAction::ResetView,
        "h" | "H" => ViewerAction::ToggleHotspots,
        "n" | "N" => ViewerAction::ToggleNarration,
        " " => ViewerAction::PauseOrResume,
        "Escape" => ViewerAction::CloseHotspot,
        _ => return None,
    };
    Some(action)
}

/// Scrolling down (positive delta) widens the view.
#[inline]
pub fn wheel_action(delta_y: f64) -> Option<ViewerAction> {
    if !delta_y.is_finite() || delta_y == 0.0 {
        None
    } else if delta_y > 0.0 {
        Some(ViewerAction::ZoomOut)
    } else {
        Some(ViewerAction::ZoomIn)
    }
}
