//! Headless depth rendering tests.
//!
//! These need a GPU adapter (real or software fallback). Without one the
//! test prints a notice and returns early.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use heightscan_core::{
    DepthRenderer, DepthTarget, MeshTopology, SoftwareDepthTarget, SoftwareRasterizer, Vertex,
};
use heightscan_render::{GpuContext, GpuDepthTarget, MeshDepthRenderer, RenderError};
use pollster::FutureExt;

fn quad(z: f32) -> MeshTopology {
    let verts = vec![
        Vertex::new(Vec3::new(-0.5, 0.5, z), Vec3::Z),
        Vertex::new(Vec3::new(0.5, 0.5, z), Vec3::Z),
        Vertex::new(Vec3::new(-0.5, -0.5, z), Vec3::Z),
        Vertex::new(Vec3::new(0.5, -0.5, z), Vec3::Z),
    ];
    MeshTopology::new(verts, vec![0, 1, 2, 1, 3, 2]).unwrap()
}

/// Combined into one test so the device is only created once.
#[test]
fn headless_depth_tests() {
    let ctx = match GpuContext::new_headless().block_on() {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            eprintln!("Skipping headless depth tests: no GPU adapter available ({e})");
            return;
        }
    };

    // --- Invalid sizes ---
    {
        assert!(matches!(
            GpuDepthTarget::new(ctx.clone(), 0, 16),
            Err(RenderError::FramebufferSetup(_))
        ));
        let too_big = ctx.max_texture_dimension() + 1;
        assert!(matches!(
            GpuDepthTarget::new(ctx.clone(), too_big, 16),
            Err(RenderError::FramebufferSetup(_))
        ));
    }

    // --- Clear reads back as far plane ---
    {
        // Width not a multiple of the row alignment exercises padding removal
        let mut target = GpuDepthTarget::new(ctx.clone(), 37, 11).unwrap();
        target.clear().unwrap();
        let depth = target.read_back().unwrap();
        assert_eq!(depth.len(), 37 * 11);
        assert!(depth.iter().all(|&d| d == 1.0));
    }

    // --- Quad matches the software rasterizer ---
    {
        let mesh = quad(0.0);
        let mut target = GpuDepthTarget::new(ctx.clone(), 64, 64).unwrap();
        let mut renderer = MeshDepthRenderer::new(ctx.clone(), &mesh);
        target.clear().unwrap();
        renderer.render(&mut target, Mat4::IDENTITY).unwrap();
        let gpu = target.read_back().unwrap();

        let mut cpu_target = SoftwareDepthTarget::new(64, 64).unwrap();
        SoftwareRasterizer::new(&mesh)
            .render(&mut cpu_target, Mat4::IDENTITY)
            .unwrap();
        let cpu = cpu_target.read_back().unwrap();

        // Center and well-outside pixels; edges may differ by fill rules
        for (x, y) in [(32, 32), (20, 20), (43, 43), (2, 2), (61, 61)] {
            let i = y * 64 + x;
            assert!(
                (gpu[i] - cpu[i]).abs() < 1e-5,
                "pixel ({x}, {y}): gpu {} cpu {}",
                gpu[i],
                cpu[i]
            );
        }
        assert!((gpu[32 * 64 + 32] - 0.5).abs() < 1e-5);
    }

    // --- Empty mesh draws nothing ---
    {
        let mesh = MeshTopology::new(Vec::new(), Vec::new()).unwrap();
        let mut target = GpuDepthTarget::new(ctx.clone(), 8, 8).unwrap();
        let mut renderer = MeshDepthRenderer::new(ctx, &mesh);
        target.clear().unwrap();
        renderer.render(&mut target, Mat4::IDENTITY).unwrap();
        assert!(target.read_back().unwrap().iter().all(|&d| d == 1.0));
    }
}
