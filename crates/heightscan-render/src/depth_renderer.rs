//! Depth-only mesh rendering for ambient occlusion bakes.

use std::num::NonZeroU64;
use std::sync::Arc;

use glam::Mat4;
use heightscan_core::{DepthRenderer, MeshTopology};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::depth_target::{GpuDepthTarget, DEPTH_FORMAT};
use crate::vertex::GpuVertex;

/// GPU representation of the bake camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl Default for ViewUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Draws one mesh into a [`GpuDepthTarget`] with a depth-only pipeline.
pub struct MeshDepthRenderer {
    ctx: Arc<GpuContext>,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// `None` for meshes without triangles; those render nothing.
    mesh: Option<MeshBuffers>,
}

impl MeshDepthRenderer {
    /// Uploads `mesh` and builds the pipeline.
    pub fn new(ctx: Arc<GpuContext>, mesh: &MeshTopology) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("AO Bake Depth Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/depth_only.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("AO Bake Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(64),
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("AO Bake View Uniforms"),
            contents: bytemuck::cast_slice(&[ViewUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("AO Bake Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("AO Bake Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("AO Bake Depth Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None, // Depth-only
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // Height fields are seen from both sides
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let mesh = Self::upload(device, mesh);

        Self {
            ctx,
            pipeline,
            uniform_buffer,
            bind_group,
            mesh,
        }
    }

    fn upload(device: &wgpu::Device, mesh: &MeshTopology) -> Option<MeshBuffers> {
        if mesh.indices.is_empty() {
            return None;
        }

        let gpu_vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("AO Bake Vertex Buffer"),
            contents: bytemuck::cast_slice(&gpu_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("AO Bake Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Some(MeshBuffers {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        })
    }
}

impl DepthRenderer<GpuDepthTarget> for MeshDepthRenderer {
    fn render(&mut self, target: &mut GpuDepthTarget, view_proj: Mat4) -> heightscan_core::Result<()> {
        let Some(mesh) = &self.mesh else {
            return Ok(());
        };

        let uniforms = ViewUniforms {
            view_proj: view_proj.to_cols_array_2d(),
        };
        self.ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("AO bake render encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("AO Bake Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load, // Cleared by the target
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertices.slice(..));
            pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
