//! CPU depth rasterization.
//!
//! A small scanline-free rasterizer that fills a depth buffer by testing pixel
//! centers against triangle edge functions. It follows the same screen mapping
//! as [`OcclusionSampler`](crate::OcclusionSampler), so bakes produced here
//! compare exactly against reprojected vertices. Used for tests and for hosts
//! without a GPU.

use glam::{Mat4, Vec3};

use crate::bake::{DepthRenderer, DepthTarget};
use crate::error::{HeightscanError, Result};
use crate::mesh::MeshTopology;

/// In-memory depth target.
#[derive(Debug, Clone)]
pub struct SoftwareDepthTarget {
    width: u32,
    height: u32,
    depth: Vec<f32>,
}

impl SoftwareDepthTarget {
    /// Allocates a `width` x `height` target cleared to the far plane.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HeightscanError::FramebufferSetup(format!(
                "cannot allocate a {width}x{height} depth target"
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                HeightscanError::FramebufferSetup(format!("{width}x{height} depth target overflows"))
            })?;

        Ok(Self {
            width,
            height,
            depth: vec![1.0; len],
        })
    }

    /// Current depth values, row-major, top row first.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Depth-tested write of one fragment.
    #[inline]
    fn write(&mut self, x: u32, y: u32, depth: f32) {
        let idx = y as usize * self.width as usize + x as usize;
        if depth < self.depth[idx] {
            self.depth[idx] = depth;
        }
    }
}

impl DepthTarget for SoftwareDepthTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) -> Result<()> {
        self.depth.fill(1.0);
        Ok(())
    }

    fn read_back(&mut self) -> Result<Vec<f32>> {
        Ok(self.depth.clone())
    }
}

/// Rasterizes a mesh's triangles into a [`SoftwareDepthTarget`].
///
/// Triangles with a corner behind the camera (`w <= 0`) or with non-finite
/// coordinates are dropped whole; there is no polygon clipping. Fragments
/// whose depth falls outside `[0, 1]` are discarded, which clips against the
/// near and far planes per pixel. Both windings are drawn.
#[derive(Debug, Clone)]
pub struct SoftwareRasterizer {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl SoftwareRasterizer {
    /// Captures the positions and triangles of `mesh`.
    pub fn new(mesh: &MeshTopology) -> Self {
        Self {
            positions: mesh.positions().collect(),
            triangles: mesh.triangles().collect(),
        }
    }

    fn draw_triangle(target: &mut SoftwareDepthTarget, corners: [Vec3; 3]) {
        let [a, b, c] = corners;
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }

        let w = target.width as f32;
        let h = target.height as f32;
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0);
        let max_x = a.x.max(b.x).max(c.x).ceil().min(w);
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0);
        let max_y = a.y.max(b.y).max(c.y).ceil().min(h);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let inv_area = 1.0 / area;
        for py in min_y as u32..max_y as u32 {
            let sy = py as f32 + 0.5;
            for px in min_x as u32..max_x as u32 {
                let p = Vec3::new(px as f32 + 0.5, sy, 0.0);
                let w0 = edge(b, c, p) * inv_area;
                let w1 = edge(c, a, p) * inv_area;
                let w2 = edge(a, b, p) * inv_area;
                // Normalized weights are all non-negative inside either winding.
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * a.z + w1 * b.z + w2 * c.z;
                if (0.0..=1.0).contains(&depth) {
                    target.write(px, py, depth);
                }
            }
        }
    }
}

/// Twice the signed area of triangle `(a, b, p)` in screen XY.
#[inline]
fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl DepthRenderer<SoftwareDepthTarget> for SoftwareRasterizer {
    fn render(&mut self, target: &mut SoftwareDepthTarget, view_proj: Mat4) -> Result<()> {
        let w = target.width as f32;
        let h = target.height as f32;

        // Screen-space x, y in pixels and z as stored depth, or None if unusable.
        let screen: Vec<Option<Vec3>> = self
            .positions
            .iter()
            .map(|&p| {
                let clip = view_proj * p.extend(1.0);
                if clip.w <= 0.0 {
                    return None;
                }
                let ndc = clip.truncate() / clip.w;
                ndc.is_finite().then(|| {
                    Vec3::new(
                        (ndc.x * 0.5 + 0.5) * w,
                        (0.5 - ndc.y * 0.5) * h,
                        ndc.z * 0.5 + 0.5,
                    )
                })
            })
            .collect();

        for tri in &self.triangles {
            let corners = [
                screen[tri[0] as usize],
                screen[tri[1] as usize],
                screen[tri[2] as usize],
            ];
            if let [Some(a), Some(b), Some(c)] = corners {
                Self::draw_triangle(target, [a, b, c]);
            }
        }
        Ok(())
    }
}
