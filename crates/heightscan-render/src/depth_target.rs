//! Off-screen depth target with clear and readback.

use std::sync::Arc;

use heightscan_core::DepthTarget;

use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};

/// Depth format of the bake target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const BYTES_PER_TEXEL: u32 = 4;

/// A `Depth32Float` render target that can be copied back to the CPU.
pub struct GpuDepthTarget {
    ctx: Arc<GpuContext>,
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    bytes_per_row: u32,
}

impl GpuDepthTarget {
    /// Allocates the depth texture and its readback buffer.
    ///
    /// Fails with [`RenderError::FramebufferSetup`] for zero-sized targets or
    /// targets larger than the device allows.
    pub fn new(ctx: Arc<GpuContext>, width: u32, height: u32) -> RenderResult<Self> {
        let max = ctx.max_texture_dimension();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::FramebufferSetup(format!(
                "depth target {width}x{height} outside supported range 1..={max}"
            )));
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("AO Bake Depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bytes_per_row = aligned_bytes_per_row(width);
        let readback = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("AO Bake Depth Readback"),
            size: u64::from(bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            ctx,
            width,
            height,
            texture,
            view,
            readback,
            bytes_per_row,
        })
    }

    /// View to attach as the depth-stencil attachment.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Shared GPU context.
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    fn clear_pass(&self) {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("AO bake clear encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("AO Bake Clear Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copies the texture into the readback buffer and waits for the result.
    fn copy_depth(&self) -> RenderResult<Vec<f32>> {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("AO bake readback encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.ctx
            .device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|_| RenderError::Timeout)?;
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // Copy data, removing row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (self.width * BYTES_PER_TEXEL) as usize;
        let mut depth = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * self.bytes_per_row as usize;
            depth.extend(
                data[start..start + row_bytes]
                    .chunks_exact(4)
                    .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]])),
            );
        }

        drop(data);
        self.readback.unmap();
        Ok(depth)
    }
}

impl DepthTarget for GpuDepthTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) -> heightscan_core::Result<()> {
        self.clear_pass();
        Ok(())
    }

    fn read_back(&mut self) -> heightscan_core::Result<Vec<f32>> {
        Ok(self.copy_depth()?)
    }
}

/// Bytes per row padded to wgpu's copy alignment.
fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * BYTES_PER_TEXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}
