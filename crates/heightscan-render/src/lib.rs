//! wgpu backend for heightscan.
//!
//! This crate provides the GPU side of ambient occlusion baking:
//! - A headless device ([`GpuContext`])
//! - An off-screen `Depth32Float` target with readback ([`GpuDepthTarget`])
//! - A depth-only mesh pipeline ([`MeshDepthRenderer`])
//! - Greyscale export of baked depth buffers for debugging

// Pixel and index counts move between u32/usize/f32 freely
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]

pub mod context;
pub mod depth_image;
pub mod depth_renderer;
pub mod depth_target;
pub mod error;
pub mod vertex;

pub use context::GpuContext;
pub use depth_image::{depth_to_image, save_depth_image};
pub use depth_renderer::{MeshDepthRenderer, ViewUniforms};
pub use depth_target::{GpuDepthTarget, DEPTH_FORMAT};
pub use error::{RenderError, RenderResult};
pub use vertex::GpuVertex;
