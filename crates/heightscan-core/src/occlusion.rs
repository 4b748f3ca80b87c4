//! Per-vertex ambient occlusion from baked depth views.

use glam::Vec3;
use rayon::prelude::*;

use crate::bake::BakedViews;
use crate::mesh::Vertex;

/// Depth tolerance used when comparing a reprojected point against a buffer.
pub const DEFAULT_DEPTH_EPSILON: f32 = 0.001;

/// Reprojects world positions into baked views and counts the views that see them.
///
/// The result is `visible / total_views`. A view is skipped when the point lies
/// behind its camera (`w <= 0`) or falls outside the buffer, and skipped views
/// still count in the denominator: a point seen by no view scores 0.
#[derive(Debug, Clone, Copy)]
pub struct OcclusionSampler<'a> {
    views: &'a BakedViews,
    epsilon: f32,
}

impl<'a> OcclusionSampler<'a> {
    pub fn new(views: &'a BakedViews) -> Self {
        Self {
            views,
            epsilon: DEFAULT_DEPTH_EPSILON,
        }
    }

    /// Overrides the depth comparison tolerance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Occlusion factor in `[0, 1]` for one world position.
    pub fn sample_one(&self, world_pos: Vec3) -> f32 {
        let total = self.views.len();
        if total == 0 {
            return 0.0;
        }

        let point = world_pos.extend(1.0);
        let visible = self
            .views
            .iter()
            .filter(|(buffer, view_proj)| {
                let clip = **view_proj * point;
                if clip.w <= 0.0 {
                    return false;
                }
                let ndc = clip.truncate() / clip.w;
                if !ndc.is_finite() {
                    return false;
                }

                let sx = ((ndc.x * 0.5 + 0.5) * buffer.width() as f32).floor();
                let sy = ((0.5 - ndc.y * 0.5) * buffer.height() as f32).floor();
                if sx < 0.0 || sy < 0.0 {
                    return false;
                }
                let Some(stored) = buffer.get(sx as u32, sy as u32) else {
                    return false;
                };

                let depth = ndc.z * 0.5 + 0.5;
                depth <= stored + self.epsilon
            })
            .count();

        visible as f32 / total as f32
    }

    /// Writes the occlusion factor of every vertex in place.
    ///
    /// Only `occlusion` is touched; positions and normals are read.
    pub fn sample_all(&self, vertices: &mut [Vertex]) {
        vertices.par_iter_mut().for_each(|v| {
            v.occlusion = self.sample_one(v.position);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::DepthBuffer;
    use glam::Mat4;
    use proptest::prelude::*;

    fn flat_view(depth: f32, view_proj: Mat4) -> (DepthBuffer, Mat4) {
        (DepthBuffer::new(4, 4, vec![depth; 16]).unwrap(), view_proj)
    }

    #[test]
    fn test_no_views_is_zero() {
        let views = BakedViews::default();
        assert_eq!(OcclusionSampler::new(&views).sample_one(Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_visible_when_in_front_of_stored_depth() {
        // Identity: ndc == world, depth of the origin is 0.5
        let views = BakedViews::from_pairs([flat_view(0.6, Mat4::IDENTITY)]);
        let sampler = OcclusionSampler::new(&views);
        assert_eq!(sampler.sample_one(Vec3::ZERO), 1.0);
    }

    #[test]
    fn test_occluded_when_behind_stored_depth() {
        let views = BakedViews::from_pairs([flat_view(0.4, Mat4::IDENTITY)]);
        assert_eq!(OcclusionSampler::new(&views).sample_one(Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_epsilon_tolerance() {
        let views = BakedViews::from_pairs([flat_view(0.4995, Mat4::IDENTITY)]);
        let sampler = OcclusionSampler::new(&views);
        assert_eq!(sampler.sample_one(Vec3::ZERO), 1.0);
        assert_eq!(sampler.with_epsilon(0.0).sample_one(Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_skipped_views_count_in_denominator() {
        let behind = Mat4::from_cols_array(&[
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, -1.0,
        ]);
        let views = BakedViews::from_pairs([
            flat_view(1.0, Mat4::IDENTITY),
            flat_view(1.0, behind),
            flat_view(1.0, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))),
            flat_view(1.0, Mat4::IDENTITY),
        ]);
        let sampler = OcclusionSampler::new(&views);
        assert!((sampler.sample_one(Vec3::ZERO) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_screen_mapping_flips_y() {
        // Only the top-left pixel is near; ndc (-0.75, 0.75) lands on it.
        let mut data = vec![0.0; 16];
        data[0] = 1.0;
        let views =
            BakedViews::from_pairs([(DepthBuffer::new(4, 4, data).unwrap(), Mat4::IDENTITY)]);
        let sampler = OcclusionSampler::new(&views);
        assert_eq!(sampler.sample_one(Vec3::new(-0.75, 0.75, 0.0)), 1.0);
        assert_eq!(sampler.sample_one(Vec3::new(-0.75, -0.75, 0.0)), 0.0);
    }

    #[test]
    fn test_sample_all_writes_only_occlusion() {
        let views = BakedViews::from_pairs([flat_view(0.5, Mat4::IDENTITY)]);
        let mut verts = vec![
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(0.0, 0.0, 0.5), Vec3::Z),
        ];
        OcclusionSampler::new(&views).sample_all(&mut verts);

        assert_eq!(verts[0].occlusion, 1.0);
        assert_eq!(verts[1].occlusion, 0.0);
        assert_eq!(verts[1].position, Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(verts[1].normal, Vec3::Z);
    }

    proptest! {
        #[test]
        fn prop_occlusion_in_unit_range(
            x in -3.0f32..3.0, y in -3.0f32..3.0, z in -3.0f32..3.0,
            depths in prop::collection::vec(0.0f32..1.0, 1..9),
        ) {
            let views = BakedViews::from_pairs(
                depths.iter().map(|&d| flat_view(d, Mat4::IDENTITY)),
            );
            let ao = OcclusionSampler::new(&views).sample_one(Vec3::new(x, y, z));
            prop_assert!((0.0..=1.0).contains(&ao));
        }
    }
}
