//! WebGPU instanced sprite pipeline
//!
//! Owns the device-side resources and turns a [`BatchedFrame`] into one
//! instanced `draw_indexed` per batch.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::batch::{BatchedFrame, SpriteBatch};
use super::texture::{GpuTexture, TextureHandle};
use super::vertex::{QUAD_INDICES, QUAD_VERTICES, QuadVertex, SpriteInstance};
use crate::settings::Settings;

/// GPU setup failures
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("can't acquire GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CameraUniform {
    scale: [f32; 2],
    _pad: [f32; 2],
}

/// World → clip scale keeping the square court square
pub fn camera_scale(width: u32, height: u32) -> [f32; 2] {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    if aspect > 1.0 {
        // Wider than tall
        [1.0 / aspect, 1.0]
    } else {
        // Taller than wide
        [1.0, aspect]
    }
}

/// Instance range of `batch`, or `None` (with a warning) when it runs past
/// the `uploaded` instances
fn uploaded_range(batch: &SpriteBatch, uploaded: usize) -> Option<std::ops::Range<u32>> {
    let range = batch.instances();
    if range.end as usize > uploaded {
        log::warn!(
            "Skipping batch {:?} past {} uploaded instances",
            range,
            uploaded
        );
        return None;
    }
    Some(range)
}

/// Main render state
pub struct SpriteRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Indexed by `TextureHandle::id`
    textures: Vec<GpuTexture>,

    clear_color: wgpu::Color,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl SpriteRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        settings: &Settings,
    ) -> Result<Self, SetupError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sprite-pong-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(SetupError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: settings.present_mode(),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_layout"),
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

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera"),
            contents: bytemuck::bytes_of(&CameraUniform {
                scale: camera_scale(width, height),
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&texture_layout, &camera_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::desc(), SpriteInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Sized once for the worst case, overwritten every frame
        let instance_capacity = settings.max_draw_commands;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_instances"),
            size: (std::mem::size_of::<SpriteInstance>() * instance_capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Pixel-art atlas: nearest filtering keeps cell edges crisp
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            instance_capacity,
            camera_buffer,
            camera_bind_group,
            texture_layout,
            sampler,
            textures: Vec::new(),
            clear_color: settings.clear_wgpu_color(),
            size: (width, height),
        };

        let white = state.upload_texture("white", 1, 1, &[255, 255, 255, 255]);
        debug_assert_eq!(white, TextureHandle::WHITE);

        Ok(state)
    }

    /// Upload RGBA8 pixels; handles are handed out in creation order
    pub fn upload_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> TextureHandle {
        let handle = TextureHandle::new(self.textures.len() as u32);
        self.textures.push(GpuTexture::from_rgba(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            label,
            width,
            height,
            rgba,
        ));
        log::info!("Uploaded texture {:?} '{}' ({}x{})", handle, label, width, height);
        handle
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);

            let camera = CameraUniform {
                scale: camera_scale(new_width, new_height),
                _pad: [0.0; 2],
            };
            self.queue
                .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));
        }
    }

    /// Upload instances and issue one instanced draw per batch
    pub fn render(&mut self, frame: &BatchedFrame) -> Result<(), wgpu::SurfaceError> {
        let instance_count = frame.instances.len().min(self.instance_capacity);
        if instance_count < frame.instances.len() {
            log::error!(
                "Frame has {} instances, buffer holds {}",
                frame.instances.len(),
                self.instance_capacity
            );
        }
        if instance_count > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&frame.instances[..instance_count]),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(1, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            for batch in &frame.batches {
                let Some(texture) = self.textures.get(batch.texture.id() as usize) else {
                    log::warn!("Skipping batch with unknown texture {:?}", batch.texture);
                    continue;
                };
                let Some(range) = uploaded_range(batch, instance_count) else {
                    continue;
                };
                render_pass.set_bind_group(0, &texture.bind_group, &[]);
                render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, range);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_scale_keeps_court_square() {
        let wide = camera_scale(640, 480);
        assert!((wide[0] - 0.75).abs() < 1e-6);
        assert_eq!(wide[1], 1.0);
        assert_eq!(camera_scale(480, 640), [1.0, 0.75]);
        assert_eq!(camera_scale(500, 500), [1.0, 1.0]);
    }

    #[test]
    fn test_batch_past_uploaded_instances_is_skipped() {
        let batch = SpriteBatch {
            instance_offset: 3,
            instance_count: 2,
            texture: TextureHandle::WHITE,
        };
        assert_eq!(uploaded_range(&batch, 5), Some(3..5));
        assert_eq!(uploaded_range(&batch, 4), None);
    }

    #[test]
    fn test_camera_scale_survives_zero_size() {
        let scale = camera_scale(0, 0);
        assert!(scale[0].is_finite() && scale[1].is_finite());
    }
}
