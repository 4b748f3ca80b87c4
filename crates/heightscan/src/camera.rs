//! Orthographic viewer camera.
//!
//! The camera looks straight down `-Z` at the XY plane. The visible height is
//! the mesh's XY diagonal scaled by the zoom factor, so callers pass the
//! diagonal into every operation instead of the camera caching it.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Smallest and largest zoom factor.
pub const ZOOM_RANGE: (f32, f32) = (0.01, 100.0);

/// Zoom multiplier per wheel step toward the scene.
const ZOOM_IN_STEP: f32 = 0.9;
/// Zoom multiplier per wheel step away from the scene.
const ZOOM_OUT_STEP: f32 = 1.1;
/// Degrees of rotation per pixel dragged.
const ROTATION_PER_PIXEL: f32 = 0.5;

const EYE_HEIGHT: f32 = 10.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Zoom, pan and tilt state of the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewCamera {
    /// Viewport size in pixels.
    pub viewport: Vec2,
    /// Visible height as a multiple of the diagonal; smaller is closer.
    pub zoom: f32,
    /// World-space XY point at the viewport center.
    pub pan: Vec2,
    /// Tilt about X, in degrees.
    pub rotation_x: f32,
    /// Turn about Y, in degrees.
    pub rotation_y: f32,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl ViewCamera {
    /// Creates a camera for a `width` x `height` pixel viewport.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Vec2::new(width, height),
            zoom: 1.0,
            pan: Vec2::ZERO,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// Updates the viewport after a resize.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Width over height; 1 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.viewport.x > 0.0 && self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// Visible world width and height.
    pub fn view_extent(&self, diag: f32) -> Vec2 {
        let height = diag * self.zoom;
        Vec2::new(height * self.aspect(), height)
    }

    /// World XY under a cursor position given in pixels from the top-left.
    pub fn world_at(&self, diag: f32, cursor: Vec2) -> Vec2 {
        let norm = cursor / self.viewport.max(Vec2::ONE);
        let extent = self.view_extent(diag);
        Vec2::new(
            (norm.x - 0.5) * extent.x + self.pan.x,
            (0.5 - norm.y) * extent.y + self.pan.y,
        )
    }

    /// Zooms one wheel step about the cursor.
    ///
    /// Positive `delta` zooms in. The world point under the cursor stays put.
    pub fn zoom_at(&mut self, diag: f32, cursor: Vec2, delta: i32) {
        let before = self.world_at(diag, cursor);

        let step = if delta > 0 { ZOOM_IN_STEP } else { ZOOM_OUT_STEP };
        self.zoom = (self.zoom * step).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);

        let after = self.world_at(diag, cursor);
        self.pan += before - after;
    }

    /// Drags the view by a pixel delta; the scene follows the cursor.
    pub fn pan(&mut self, diag: f32, dx_pixels: f32, dy_pixels: f32) {
        let extent = self.view_extent(diag);
        let viewport = self.viewport.max(Vec2::ONE);
        let dx = dx_pixels / viewport.x * extent.x;
        let dy = dy_pixels / viewport.y * extent.y;
        self.pan -= Vec2::new(dx, -dy);
    }

    /// Tilts and turns the model by a pixel drag.
    pub fn rotate(&mut self, dx_pixels: f32, dy_pixels: f32) {
        self.rotation_y += dx_pixels * ROTATION_PER_PIXEL;
        self.rotation_x += dy_pixels * ROTATION_PER_PIXEL;
    }

    /// Restores zoom 1, no pan and no rotation. The viewport is kept.
    pub fn reset(&mut self) {
        *self = Self {
            viewport: self.viewport,
            ..Self::default()
        };
    }

    /// Camera position, for specular lighting.
    pub fn eye(&self) -> Vec3 {
        self.pan.extend(EYE_HEIGHT)
    }

    /// Rotation and vertical exaggeration applied to the mesh.
    pub fn model_matrix(&self, z_scale: f32) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y.to_radians())
            * Mat4::from_rotation_x(self.rotation_x.to_radians())
            * Mat4::from_scale(Vec3::new(1.0, 1.0, z_scale))
    }

    /// Orthographic projection times view, without the model transform.
    pub fn view_projection(&self, diag: f32) -> Mat4 {
        let half = self.view_extent(diag) * 0.5;
        let projection = Mat4::orthographic_rh_gl(-half.x, half.x, -half.y, half.y, NEAR, FAR);
        let view = Mat4::look_at_rh(self.eye(), self.pan.extend(0.0), Vec3::Y);
        projection * view
    }

    /// Full model-view-projection matrix.
    pub fn model_view_projection(&self, diag: f32, z_scale: f32) -> Mat4 {
        self.view_projection(diag) * self.model_matrix(z_scale)
    }
}
