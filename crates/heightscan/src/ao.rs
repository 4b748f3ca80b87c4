//! One-call ambient occlusion bakes.

use std::sync::Arc;
use std::time::Instant;

use heightscan_core::{
    BakeOptions, BakedViews, DepthBaker, MeshTopology, OcclusionSampler, Result,
    SoftwareDepthTarget, SoftwareRasterizer,
};
use heightscan_render::{GpuContext, GpuDepthTarget, MeshDepthRenderer};
use pollster::FutureExt;

/// Bakes occlusion on the CPU and writes it into every vertex.
///
/// Returns the depth views the occlusion was sampled from.
pub fn bake_ambient_occlusion(mesh: &mut MeshTopology, options: &BakeOptions) -> Result<BakedViews> {
    let start = Instant::now();

    let target = SoftwareDepthTarget::new(options.width, options.height)?;
    let mut baker = DepthBaker::new(target)?;
    let mut rasterizer = SoftwareRasterizer::new(mesh);
    baker.bake(mesh, &mut rasterizer)?;
    let views = baker.into_views();

    sample(mesh, &views, options);
    log::info!(
        "software AO bake of {} vertices took {:.1?}",
        mesh.vertices.len(),
        start.elapsed()
    );
    Ok(views)
}

/// Bakes occlusion on a headless GPU device created for this call.
pub fn bake_ambient_occlusion_gpu(
    mesh: &mut MeshTopology,
    options: &BakeOptions,
) -> Result<BakedViews> {
    let ctx = Arc::new(GpuContext::new_headless().block_on()?);
    bake_ambient_occlusion_with_context(ctx, mesh, options)
}

/// Bakes occlusion on an existing GPU device.
pub fn bake_ambient_occlusion_with_context(
    ctx: Arc<GpuContext>,
    mesh: &mut MeshTopology,
    options: &BakeOptions,
) -> Result<BakedViews> {
    let start = Instant::now();

    let target = GpuDepthTarget::new(ctx.clone(), options.width, options.height)?;
    let mut baker = DepthBaker::new(target)?;
    let mut renderer = MeshDepthRenderer::new(ctx, mesh);
    baker.bake(mesh, &mut renderer)?;
    let views = baker.into_views();

    sample(mesh, &views, options);
    log::info!(
        "GPU AO bake of {} vertices took {:.1?}",
        mesh.vertices.len(),
        start.elapsed()
    );
    Ok(views)
}

fn sample(mesh: &mut MeshTopology, views: &BakedViews, options: &BakeOptions) {
    OcclusionSampler::new(views)
        .with_epsilon(options.depth_epsilon)
        .sample_all(&mut mesh.vertices);
}
