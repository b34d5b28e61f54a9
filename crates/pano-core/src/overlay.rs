//! Hotspot markers: where they sit on screen and which panel is open.

use crate::camera::CameraState;
use crate::config::OverlayMode;
use crate::geometry::panorama_direction;
use crate::scene::Hotspot;
use glam::{Vec2, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}

/// On-screen marker for one hotspot, in viewport pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub hotspot_id: String,
    pub screen: Vec2,
    pub visible: bool,
    pub open: bool,
}

/// Owns the overlay's session state for the active Scene.
#[derive(Clone, Debug, Default)]
pub struct HotspotOverlay {
    mode: OverlayMode,
    ids: Vec<String>,
    visible: bool,
    open: Option<usize>,
}

impl HotspotOverlay {
    pub fn new(mode: OverlayMode) -> Self {
        Self {
            mode,
            ids: Vec::new(),
            visible: true,
            open: None,
        }
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    /// Bind to a new Scene's hotspots; markers shown, nothing open.
    pub fn load(&mut self, hotspots: &[Hotspot]) {
        self.ids = hotspots.iter().map(|h| h.id.clone()).collect();
        self.visible = true;
        self.open = None;
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.open = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open_id(&self) -> Option<&str> {
        self.open.map(|i| self.ids[i].as_str())
    }

    /// Shows or hides every marker and closes any open panel.
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.open = None;
        self.visible
    }

    /// Toggle semantics: selecting the open hotspot closes it. Unknown ids
    /// and selections while markers are hidden are ignored. Returns whether
    /// the open selection changed.
    pub fn select(&mut self, hotspot_id: &str) -> bool {
        if !self.visible {
            return false;
        }
        let Some(idx) = self.ids.iter().position(|id| id == hotspot_id) else {
            log::debug!("[overlay] ignoring unknown hotspot {}", hotspot_id);
            return false;
        };
        self.open = if self.open == Some(idx) {
            None
        } else {
            Some(idx)
        };
        true
    }

    pub fn close(&mut self) -> bool {
        self.open.take().is_some()
    }

    /// Screen positions for the current viewport.
    pub fn markers(
        &self,
        hotspots: &[Hotspot],
        viewport: Viewport,
        camera: &CameraState,
    ) -> Vec<Marker> {
        let view_proj = camera.view_projection(viewport.aspect());
        hotspots
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let (screen, on_screen) = match self.mode {
                    OverlayMode::Fixed => (fixed_position(h, viewport), true),
                    OverlayMode::Projected => project_position(h, viewport, view_proj),
                };
                Marker {
                    hotspot_id: h.id.clone(),
                    screen,
                    visible: self.visible && on_screen,
                    open: self.open == Some(i),
                }
            })
            .collect()
    }
}

#[inline]
fn fixed_position(h: &Hotspot, viewport: Viewport) -> Vec2 {
    Vec2::new(h.position.u * viewport.width, h.position.v * viewport.height)
}

/// Projects the hotspot's sphere direction; hidden when behind the camera
/// or outside the viewport.
fn project_position(h: &Hotspot, viewport: Viewport, view_proj: glam::Mat4) -> (Vec2, bool) {
    let dir = panorama_direction(h.position.u, h.position.v);
    let clip = view_proj * Vec4::new(dir.x, dir.y, dir.z, 1.0);
    if clip.w <= 1e-6 {
        return (Vec2::splat(-1.0), false);
    }
    let ndc = clip.truncate() / clip.w;
    let screen = Vec2::new(
        (ndc.x * 0.5 + 0.5) * viewport.width,
        (1.0 - (ndc.y * 0.5 + 0.5)) * viewport.height,
    );
    let inside = ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0;
    (screen, inside)
}
