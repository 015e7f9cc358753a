//! wgpu implementation of the render backend
//!
//! Every [`RenderBackend`] call records and submits its own command buffer,
//! so a submitted vertex slice can be reused as soon as the call returns.
//! Pipelines are created lazily, one per distinct blend state.

use std::path::Path;

use easel_core::{BlendMode, Color};
use easel_paint::{RenderBackend, TargetId, Vertex};
use rustc_hash::FxHashMap;

use crate::blend::blend_state;
use crate::error::{GpuError, Result};
use crate::shaders::TRIANGLE_SHADER;
use crate::target::{padded_bytes_per_row, RenderTarget, TARGET_FORMAT};

/// Configuration for creating a backend
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Color format of every render target
    pub format: wgpu::TextureFormat,
    /// Initial vertex buffer capacity, in vertices
    pub initial_vertex_capacity: usize,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            format: TARGET_FORMAT,
            initial_vertex_capacity: 1024,
            power_preference: wgpu::PowerPreference::HighPerformance,
        }
    }
}

/// Growable GPU vertex buffer
struct VertexBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl VertexBuffer {
    fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let capacity = capacity.max(3);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Easel Vertex Buffer"),
            size: (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, capacity }
    }

    /// Make room for `count` vertices, doubling the capacity as needed
    fn ensure(&mut self, device: &wgpu::Device, count: usize) {
        if count <= self.capacity {
            return;
        }
        let mut capacity = self.capacity;
        while capacity < count {
            capacity *= 2;
        }
        tracing::trace!(from = self.capacity, to = capacity, "vertex buffer grown");
        *self = Self::new(device, capacity);
    }
}

/// Offscreen wgpu renderer
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: FxHashMap<wgpu::BlendState, wgpu::RenderPipeline>,
    vertices: VertexBuffer,
    targets: FxHashMap<TargetId, RenderTarget>,
    next_id: u32,
    presented: Option<TargetId>,
    draw_calls: u64,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("format", &self.format)
            .field("targets", &self.targets.len())
            .field("pipelines", &self.pipelines.len())
            .field("vertex_capacity", &self.vertices.capacity)
            .field("presented", &self.presented)
            .field("draw_calls", &self.draw_calls)
            .finish()
    }
}

impl WgpuBackend {
    /// Create a backend on the first suitable adapter
    pub async fn new(config: BackendConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        let info = adapter.get_info();
        tracing::debug!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Easel GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        Ok(Self::from_device(device, queue, config))
    }

    /// Blocking variant of [`new`](Self::new)
    pub fn new_blocking(config: BackendConfig) -> Result<Self> {
        pollster::block_on(Self::new(config))
    }

    /// Build on an existing device, e.g. one shared with a windowing layer
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, config: BackendConfig) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Easel Triangle Shader"),
            source: wgpu::ShaderSource::Wgsl(TRIANGLE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Easel Viewport Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Easel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertices = VertexBuffer::new(&device, config.initial_vertex_capacity);

        Self {
            device,
            queue,
            format: config.format,
            shader,
            bind_group_layout,
            pipeline_layout,
            pipelines: FxHashMap::default(),
            vertices,
            targets: FxHashMap::default(),
            next_id: 0,
            presented: None,
            draw_calls: 0,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Most recently presented target
    pub fn presented(&self) -> Option<TargetId> {
        self.presented
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity
    }

    pub fn render_target(&self, id: TargetId) -> Option<&RenderTarget> {
        self.targets.get(&id)
    }

    fn get(&self, id: TargetId) -> Result<&RenderTarget> {
        self.targets.get(&id).ok_or(GpuError::UnknownTarget(id))
    }

    fn encoder(&self, label: &'static str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Create the pipeline for `mode` if needed and return its cache key
    fn ensure_pipeline(&mut self, mode: BlendMode) -> wgpu::BlendState {
        let state = blend_state(mode);
        let Self {
            device,
            shader,
            pipeline_layout,
            format,
            pipelines,
            ..
        } = self;
        pipelines.entry(state).or_insert_with(|| {
            tracing::debug!(?mode, "creating blend pipeline");
            create_pipeline(device, shader, pipeline_layout, *format, state)
        });
        state
    }

    /// Copy a target's pixels back to the CPU
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_pixels(&self, id: TargetId) -> Result<image::RgbaImage> {
        let target = self.get(id)?;
        let (width, height) = target.dimensions();
        let (width, height) = (width.max(1), height.max(1));
        let bytes_per_row = padded_bytes_per_row(width);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Easel Readback Buffer"),
            size: bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.encoder("Easel Readback Encoder");
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv().unwrap_or(Err(wgpu::BufferAsyncError))?;

        let row = (width * 4) as usize;
        let mut pixels = Vec::with_capacity(row * height as usize);
        {
            let data = slice.get_mapped_range();
            for chunk in data.chunks_exact(bytes_per_row as usize) {
                pixels.extend_from_slice(&chunk[..row]);
            }
        }
        buffer.unmap();

        if target.format() == wgpu::TextureFormat::Bgra8Unorm
            || target.format() == wgpu::TextureFormat::Bgra8UnormSrgb
        {
            for px in pixels.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or(GpuError::Readback { width, height })
    }

    /// Read a target back and write it as a PNG
    pub fn save_png(&self, id: TargetId, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.read_pixels(id)?.save(path)?;
        tracing::debug!(target_id = id.0, path = %path.display(), "frame saved");
        Ok(())
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position: vec2<f32>
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            },
            // color: vec4<f32>
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: 8,
                shader_location: 1,
            },
        ],
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Easel Triangle Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: std::slice::from_ref(&vertex_layout),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // winding depends on the current transform
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

impl RenderBackend for WgpuBackend {
    fn create_target(&mut self, width: u32, height: u32) -> easel_paint::Result<TargetId> {
        let id = TargetId(self.next_id);
        self.next_id += 1;

        let target = RenderTarget::new(
            &self.device,
            &self.bind_group_layout,
            width,
            height,
            self.format,
        );
        target.write_viewport(&self.queue);
        self.targets.insert(id, target);

        tracing::debug!(target_id = id.0, width, height, "render target created");
        Ok(id)
    }

    fn resize_target(
        &mut self,
        id: TargetId,
        width: u32,
        height: u32,
    ) -> easel_paint::Result<()> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(GpuError::UnknownTarget(id))?;
        target.resize(&self.device, &self.queue, width, height);
        tracing::debug!(target_id = id.0, width, height, "render target resized");
        Ok(())
    }

    fn clear_target(&mut self, id: TargetId, color: Color) -> easel_paint::Result<()> {
        let mut encoder = self.encoder("Easel Clear Encoder");
        self.get(id)?.clear(&mut encoder, color);
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn blit(&mut self, src: TargetId, dst: TargetId) -> easel_paint::Result<()> {
        let src = self.get(src)?;
        let dst = self.get(dst)?;
        if src.dimensions() != dst.dimensions() {
            tracing::warn!(
                src = ?src.dimensions(),
                dst = ?dst.dimensions(),
                "blit between targets of different size, copying the overlap"
            );
        }
        let mut encoder = self.encoder("Easel Blit Encoder");
        src.copy_to(&mut encoder, dst);
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn submit(
        &mut self,
        id: TargetId,
        vertices: &[Vertex],
        blend: BlendMode,
    ) -> easel_paint::Result<()> {
        if !self.targets.contains_key(&id) {
            return Err(GpuError::UnknownTarget(id).into());
        }
        if vertices.is_empty() {
            return Ok(());
        }

        self.vertices.ensure(&self.device, vertices.len());
        self.queue
            .write_buffer(&self.vertices.buffer, 0, bytemuck::cast_slice(vertices));

        let key = self.ensure_pipeline(blend);
        let pipeline = &self.pipelines[&key];
        let target = self.get(id)?;
        let byte_len = std::mem::size_of_val(vertices) as wgpu::BufferAddress;

        let mut encoder = self.encoder("Easel Draw Encoder");
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Easel Draw Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, target.bind_group(), &[]);
            pass.set_vertex_buffer(0, self.vertices.buffer.slice(..byte_len));
            pass.draw(0..vertices.len() as u32, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.draw_calls += 1;
        tracing::trace!(
            target_id = id.0,
            vertices = vertices.len(),
            ?blend,
            "draw submitted"
        );
        Ok(())
    }

    fn present(&mut self, id: TargetId) -> easel_paint::Result<()> {
        self.get(id)?;
        self.presented = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::ShapeMode;
    use easel_paint::{Sketch, SketchConfig};

    // These tests require a GPU adapter and are ignored by default.
    // Run with: cargo test -p easel_gpu -- --ignored

    fn backend() -> WgpuBackend {
        WgpuBackend::new_blocking(BackendConfig::default()).expect("GPU adapter")
    }

    fn vertex(x: f32, y: f32, color: Color) -> Vertex {
        Vertex {
            position: [x, y],
            color: color.to_array(),
        }
    }

    #[test]
    #[ignore]
    fn test_clear_and_read_back() {
        let mut gpu = backend();
        let target = gpu.create_target(8, 4).unwrap();
        gpu.clear_target(target, Color::rgb(10, 20, 30)).unwrap();

        let image = gpu.read_pixels(target).unwrap();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.get_pixel(3, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    #[ignore]
    fn test_submit_covers_triangle() {
        let mut gpu = backend();
        let target = gpu.create_target(16, 16).unwrap();
        gpu.clear_target(target, Color::BLACK).unwrap();

        let red = Color::RED;
        let quad = [
            vertex(0.0, 0.0, red),
            vertex(8.0, 0.0, red),
            vertex(8.0, 16.0, red),
            vertex(0.0, 0.0, red),
            vertex(8.0, 16.0, red),
            vertex(0.0, 16.0, red),
        ];
        gpu.submit(target, &quad, BlendMode::Blend).unwrap();

        let image = gpu.read_pixels(target).unwrap();
        assert_eq!(image.get_pixel(2, 8).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(12, 8).0, [0, 0, 0, 255]);
        assert_eq!(gpu.draw_calls(), 1);
    }

    #[test]
    #[ignore]
    fn test_pipelines_are_shared_between_equal_blend_states() {
        let mut gpu = backend();
        let target = gpu.create_target(4, 4).unwrap();
        let tri = [vertex(0.0, 0.0, Color::WHITE); 3];
        for mode in [BlendMode::Blend, BlendMode::Overlay, BlendMode::Burn, BlendMode::Add] {
            gpu.submit(target, &tri, mode).unwrap();
        }
        // overlay and burn fall back to the alpha pipeline
        assert_eq!(gpu.pipeline_count(), 2);
    }

    #[test]
    #[ignore]
    fn test_vertex_buffer_grows() {
        let mut gpu = WgpuBackend::new_blocking(BackendConfig {
            initial_vertex_capacity: 6,
            ..Default::default()
        })
        .unwrap();
        let target = gpu.create_target(4, 4).unwrap();
        let many = vec![vertex(1.0, 1.0, Color::WHITE); 30];
        gpu.submit(target, &many, BlendMode::Blend).unwrap();
        assert_eq!(gpu.vertex_capacity(), 48);
    }

    #[test]
    #[ignore]
    fn test_unknown_target_is_an_error() {
        let mut gpu = backend();
        assert!(gpu.clear_target(TargetId(99), Color::WHITE).is_err());
    }

    #[test]
    #[ignore]
    fn test_sketch_renders_through_wgpu() {
        let config = SketchConfig::default().with_size(32, 32);
        let mut sketch = Sketch::new(backend(), config).unwrap();
        sketch.no_stroke();
        sketch.fill(Color::BLUE);
        sketch.rect_mode(ShapeMode::Corner);
        sketch
            .frame(|s| {
                s.background(Color::WHITE)?;
                s.rect(0.0, 0.0, 16.0, 32.0)
            })
            .unwrap();

        let last = sketch.last_frame();
        assert_eq!(sketch.backend().presented(), Some(last));
        let image = sketch.backend().read_pixels(last).unwrap();
        assert_eq!(image.get_pixel(4, 16).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(28, 16).0, [255, 255, 255, 255]);
    }
}
