//! Core pipeline for heightscan.
//!
//! Turns an unordered cloud of surface-scan samples into a shaded, occlusion-baked
//! triangle mesh:
//! - [`GridBuilder`] snaps samples onto a dense [`HeightGrid`]
//! - [`MeshSynthesizer`] derives positions, central-difference normals and indices
//! - [`DepthBaker`] renders the mesh from nine fixed hemisphere views into depth buffers
//! - [`OcclusionSampler`] reprojects vertices into every view and counts visibility
//!
//! Rasterization is behind the [`DepthRenderer`] / [`DepthTarget`] seam. The
//! [`raster`] module ships a CPU implementation; the wgpu one lives in
//! `heightscan-render`.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Grid and pixel indices are converted between usize/u32/f32 throughout
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

pub mod bake;
pub mod bounds;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod occlusion;
pub mod options;
pub mod raster;

pub use bake::{
    hemisphere_view_projections, BakedViews, DepthBaker, DepthBuffer, DepthRenderer, DepthTarget,
    HEMISPHERE_DIRECTIONS,
};
pub use bounds::{Aabb, BoundingSphere};
pub use error::{HeightscanError, Result};
pub use grid::{GridBuilder, HeightGrid, Sample};
pub use mesh::{MeshSynthesizer, MeshTopology, Vertex};
pub use occlusion::{OcclusionSampler, DEFAULT_DEPTH_EPSILON};
pub use options::{BakeOptions, HeightscanOptions, ShadingOptions};
pub use raster::{SoftwareDepthTarget, SoftwareRasterizer};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
