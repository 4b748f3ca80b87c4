//! Multi-view depth baking.
//!
//! The baker places nine orthographic cameras on the upper hemisphere around a
//! mesh, renders each into an off-screen depth target and reads the result
//! back. Rasterization is not done here: the baker owns the target and its
//! clear/readback cycle, and a [`DepthRenderer`] draws the mesh for a given
//! view-projection matrix.

use glam::{Mat4, Vec3};

use crate::bounds::BoundingSphere;
use crate::error::{HeightscanError, Result};
use crate::mesh::MeshTopology;

/// Unnormalized view directions, pointing from the mesh toward each camera.
///
/// Eight tilted directions around the horizon plus one straight overhead.
pub const HEMISPHERE_DIRECTIONS: [Vec3; 9] = [
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(0.0, 0.0, 1.0),
];

/// Off-screen depth attachment a bake renders into.
pub trait DepthTarget {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Resets every texel to the far depth (1.0).
    fn clear(&mut self) -> Result<()>;

    /// Returns the depth values row-major, top row first.
    ///
    /// Must not return before rendering into the target has completed.
    fn read_back(&mut self) -> Result<Vec<f32>>;
}

/// Draws the current mesh into a depth target.
///
/// Depth must follow the OpenGL convention remapped to [0, 1]: a point with
/// normalized device depth `z` in [-1, 1] stores `z * 0.5 + 0.5`, with a
/// `Less` depth test.
pub trait DepthRenderer<T: DepthTarget + ?Sized> {
    /// Rasterizes the mesh with `view_proj` into `target`.
    fn render(&mut self, target: &mut T, view_proj: Mat4) -> Result<()>;
}

impl<T, F> DepthRenderer<T> for F
where
    T: DepthTarget + ?Sized,
    F: FnMut(&mut T, Mat4) -> Result<()>,
{
    fn render(&mut self, target: &mut T, view_proj: Mat4) -> Result<()> {
        self(target, view_proj)
    }
}

/// Depth values read back from one baking view.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    /// Wraps row-major depth data.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(HeightscanError::Render(format!(
                "depth readback holds {} values, expected {width}x{height} = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major depth values, top row first.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Depth at pixel `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }
}

/// Depth buffers and the view-projection matrices that produced them.
///
/// `depth_buffers()[i]` was rendered with `view_projections()[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakedViews {
    depth_buffers: Vec<DepthBuffer>,
    view_projections: Vec<Mat4>,
}

impl BakedViews {
    /// Builds a view set from paired sequences.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (DepthBuffer, Mat4)>) -> Self {
        let mut views = Self::default();
        for (buffer, view_proj) in pairs {
            views.push(buffer, view_proj);
        }
        views
    }

    fn push(&mut self, buffer: DepthBuffer, view_proj: Mat4) {
        self.depth_buffers.push(buffer);
        self.view_projections.push(view_proj);
    }

    fn clear(&mut self) {
        self.depth_buffers.clear();
        self.view_projections.clear();
    }

    pub fn depth_buffers(&self) -> &[DepthBuffer] {
        &self.depth_buffers
    }

    pub fn view_projections(&self) -> &[Mat4] {
        &self.view_projections
    }

    /// Iterates `(buffer, matrix)` pairs in bake order.
    pub fn iter(&self) -> impl Iterator<Item = (&DepthBuffer, &Mat4)> {
        self.depth_buffers.iter().zip(&self.view_projections)
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.depth_buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth_buffers.is_empty()
    }
}

/// Computes the view-projection matrix for every hemisphere direction.
///
/// Each camera sits `radius` away from the sphere center and looks at it with
/// `+Z` up (`+Y` for the overhead view, where `+Z` is parallel to the view
/// direction). The orthographic volume is `2 * radius` wide and tall with
/// near `0.1 * radius` and far `2 * radius`, OpenGL clip depth.
pub fn hemisphere_view_projections(sphere: &BoundingSphere) -> Vec<Mat4> {
    let BoundingSphere { center, radius } = *sphere;
    let proj = Mat4::orthographic_rh_gl(-radius, radius, -radius, radius, radius * 0.1, radius * 2.0);

    HEMISPHERE_DIRECTIONS
        .iter()
        .map(|dir| {
            let dir = dir.normalize();
            let eye = center + dir * radius;
            let up = if dir.z.abs() > 0.99 { Vec3::Y } else { Vec3::Z };
            proj * Mat4::look_at_rh(eye, center, up)
        })
        .collect()
}

/// Renders a mesh from the hemisphere views into depth buffers.
///
/// Owns the off-screen target. A bake takes `&mut self`, so one baker never
/// runs two bakes at once.
pub struct DepthBaker<T: DepthTarget> {
    target: T,
    views: BakedViews,
}

impl<T: DepthTarget> DepthBaker<T> {
    /// Creates a baker around `target`.
    ///
    /// Fails with [`HeightscanError::FramebufferSetup`] if the target has a
    /// zero dimension.
    pub fn new(target: T) -> Result<Self> {
        if target.width() == 0 || target.height() == 0 {
            return Err(HeightscanError::FramebufferSetup(format!(
                "depth target is {}x{}",
                target.width(),
                target.height()
            )));
        }
        Ok(Self {
            target,
            views: BakedViews::default(),
        })
    }

    /// The depth target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Results of the most recent bake.
    pub fn views(&self) -> &BakedViews {
        &self.views
    }

    /// Consumes the baker, returning the last bake results.
    pub fn into_views(self) -> BakedViews {
        self.views
    }

    /// Bakes depth for every hemisphere view of `mesh`.
    ///
    /// Results of any previous bake are discarded first. Views are rendered one
    /// at a time: clear, render, read back.
    pub fn bake<R>(&mut self, mesh: &MeshTopology, renderer: &mut R) -> Result<&BakedViews>
    where
        R: DepthRenderer<T> + ?Sized,
    {
        self.views.clear();

        let sphere = mesh.bounding_sphere();
        if sphere.radius <= 0.0 {
            log::warn!("baking a mesh with zero bounding radius; occlusion will be zero");
        }

        let (width, height) = (self.target.width(), self.target.height());
        for view_proj in hemisphere_view_projections(&sphere) {
            self.target.clear()?;
            renderer.render(&mut self.target, view_proj)?;
            let depth = DepthBuffer::new(width, height, self.target.read_back()?)?;
            self.views.push(depth, view_proj);
        }

        log::debug!(
            "baked {} depth views at {width}x{height} (radius {:.4})",
            self.views.len(),
            sphere.radius
        );
        Ok(&self.views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Vertex;

    /// Target that fills each readback with the index of the view it belongs to.
    struct CountingTarget {
        size: u32,
        clears: usize,
        value: f32,
    }

    impl DepthTarget for CountingTarget {
        fn width(&self) -> u32 {
            self.size
        }
        fn height(&self) -> u32 {
            self.size
        }
        fn clear(&mut self) -> Result<()> {
            self.clears += 1;
            self.value = 1.0;
            Ok(())
        }
        fn read_back(&mut self) -> Result<Vec<f32>> {
            Ok(vec![self.value; (self.size * self.size) as usize])
        }
    }

    fn unit_mesh() -> MeshTopology {
        let verts = vec![
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::Z),
        ];
        MeshTopology::new(verts, vec![0, 1, 2]).unwrap()
    }

    #[test]
    fn test_directions_are_upper_hemisphere() {
        for dir in HEMISPHERE_DIRECTIONS {
            assert!(dir.z > 0.0);
        }
        assert_eq!(HEMISPHERE_DIRECTIONS.len(), 9);
    }

    #[test]
    fn test_view_projections_are_finite() {
        let sphere = BoundingSphere {
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 2.0,
        };
        let mats = hemisphere_view_projections(&sphere);
        assert_eq!(mats.len(), 9);
        for m in &mats {
            assert!(m.is_finite(), "{m:?}");
        }
    }

    #[test]
    fn test_center_projects_mid_depth() {
        let sphere = BoundingSphere {
            center: Vec3::new(0.5, -0.5, 0.25),
            radius: 1.5,
        };
        for m in hemisphere_view_projections(&sphere) {
            let clip = m * sphere.center.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
            // Center is radius away: depth (r - 0.1r) / (2r - 0.1r)
            let depth = ndc.z * 0.5 + 0.5;
            assert!((depth - 0.9 / 1.9).abs() < 1e-4, "depth {depth}");
        }
    }

    #[test]
    fn test_bake_pairs_buffers_with_views() {
        let mut baker = DepthBaker::new(CountingTarget {
            size: 4,
            clears: 0,
            value: 1.0,
        })
        .unwrap();

        let mut seen = Vec::new();
        let mut renderer = |target: &mut CountingTarget, vp: Mat4| -> Result<()> {
            target.value = seen.len() as f32;
            seen.push(vp);
            Ok(())
        };
        let views = baker.bake(&unit_mesh(), &mut renderer).unwrap();

        assert_eq!(views.len(), 9);
        assert_eq!(views.depth_buffers().len(), views.view_projections().len());
        for (i, (buffer, vp)) in views.iter().enumerate() {
            assert_eq!(buffer.get(0, 0), Some(i as f32));
            assert_eq!(*vp, seen[i]);
        }
        assert_eq!(baker.target().clears, 9);
    }

    #[test]
    fn test_rebake_replaces_results() {
        let mut baker = DepthBaker::new(CountingTarget {
            size: 2,
            clears: 0,
            value: 1.0,
        })
        .unwrap();
        let mut noop = |_: &mut CountingTarget, _: Mat4| -> Result<()> { Ok(()) };

        baker.bake(&unit_mesh(), &mut noop).unwrap();
        let views = baker.bake(&unit_mesh(), &mut noop).unwrap();
        assert_eq!(views.len(), 9);
    }

    #[test]
    fn test_zero_sized_target_is_framebuffer_error() {
        let result = DepthBaker::new(CountingTarget {
            size: 0,
            clears: 0,
            value: 1.0,
        });
        assert!(matches!(result, Err(HeightscanError::FramebufferSetup(_))));
    }

    #[test]
    fn test_renderer_error_propagates() {
        let mut baker = DepthBaker::new(CountingTarget {
            size: 2,
            clears: 0,
            value: 1.0,
        })
        .unwrap();
        let mut failing = |_: &mut CountingTarget, _: Mat4| -> Result<()> {
            Err(HeightscanError::Render("device lost".to_string()))
        };
        assert!(baker.bake(&unit_mesh(), &mut failing).is_err());
    }

    #[test]
    fn test_depth_buffer_bounds() {
        let buffer = DepthBuffer::new(2, 3, vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]).unwrap();
        assert_eq!(buffer.get(1, 2), Some(0.5));
        assert_eq!(buffer.get(2, 0), None);
        assert_eq!(buffer.get(0, 3), None);
        assert!(DepthBuffer::new(2, 2, vec![0.0; 3]).is_err());
    }
}
