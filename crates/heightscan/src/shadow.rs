//! Textured drop-shadow quad placed under a mesh.

use glam::{Vec2, Vec3};
use heightscan_core::Aabb;

/// Horizontal padding as a fraction of the box width.
const PAD_X: f32 = 0.08;
/// Vertical padding as a fraction of the box depth.
const PAD_Y: f32 = 0.1;
/// Drop below the mesh as a fraction of its height range.
const DROP_Z: f32 = 0.1;

/// Four corners, counter-clockwise from bottom-left, and two triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowQuad {
    pub positions: [Vec3; 4],
    pub uvs: [Vec2; 4],
    pub indices: [u32; 6],
}

/// Builds the shadow quad for a mesh's bounding box.
///
/// The quad lies flat below the mesh and is padded so the blurred shadow
/// texture extends past the mesh outline.
pub fn drop_shadow_quad(bounds: &Aabb) -> ShadowQuad {
    let size = bounds.size();
    let z = bounds.min.z - size.z * DROP_Z;
    let pad = Vec2::new(size.x * PAD_X, size.y * PAD_Y);
    let min = bounds.min.truncate() - pad;
    let max = bounds.max.truncate() + pad;

    ShadowQuad {
        positions: [
            Vec3::new(min.x, min.y, z),
            Vec3::new(max.x, min.y, z),
            Vec3::new(max.x, max.y, z),
            Vec3::new(min.x, max.y, z),
        ],
        uvs: [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ],
        indices: [0, 1, 2, 2, 3, 0],
    }
}
