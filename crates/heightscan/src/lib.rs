//! heightscan: viewer core for height-field surface scans.
//!
//! Loads tab-separated XYZ measurements, turns them into a shaded triangle
//! mesh and bakes per-vertex ambient occlusion from nine fixed hemisphere
//! views, on the CPU or on a headless GPU.
//!
//! # Quick Start
//!
//! ```no_run
//! use heightscan::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mut measurement = Measurement::from_file("scan.xyz")?;
//!     bake_ambient_occlusion(measurement.mesh_mut(), &BakeOptions::default())?;
//!
//!     let mut camera = ViewCamera::new(1280.0, 720.0);
//!     camera.zoom_at(measurement.diagonal(), Vec2::new(640.0, 360.0), 1);
//!     let _mvp = camera.model_view_projection(measurement.diagonal(), 1.0);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! - [`xyz`] parses samples, converting millimetres to metres
//! - [`GridBuilder`] snaps them onto a [`HeightGrid`]
//! - [`MeshSynthesizer`] builds a centered [`MeshTopology`] with smooth normals
//! - [`bake_ambient_occlusion`] / [`bake_ambient_occlusion_gpu`] fill `Vertex::occlusion`
//!
//! Drawing is left to the host; [`ViewCamera`], [`drop_shadow_quad`] and
//! [`ShadingOptions`] provide the matrices and parameters it needs.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod ao;
pub mod camera;
pub mod measurement;
pub mod shadow;
pub mod xyz;

pub use ao::{bake_ambient_occlusion, bake_ambient_occlusion_gpu, bake_ambient_occlusion_with_context};
pub use camera::{ViewCamera, ZOOM_RANGE};
pub use measurement::Measurement;
pub use shadow::{drop_shadow_quad, ShadowQuad};

// Re-export core types
pub use heightscan_core::{
    hemisphere_view_projections, Aabb, BakeOptions, BakedViews, BoundingSphere, DepthBaker,
    DepthBuffer, DepthRenderer, DepthTarget, GridBuilder, HeightGrid, HeightscanError,
    HeightscanOptions, MeshSynthesizer, MeshTopology, OcclusionSampler, Result, Sample,
    ShadingOptions, SoftwareDepthTarget, SoftwareRasterizer, Vertex, DEFAULT_DEPTH_EPSILON,
    HEMISPHERE_DIRECTIONS,
};
pub use heightscan_render::{
    save_depth_image, GpuContext, GpuDepthTarget, MeshDepthRenderer, RenderError,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Initializes `env_logger` from `RUST_LOG`.
///
/// Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
