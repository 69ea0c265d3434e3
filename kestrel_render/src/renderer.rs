//! Forward renderer drawing one [`DrawList`] per frame.
//!
//! Owns the surface, the depth buffer and the uniform plumbing: one camera
//! uniform per frame, one model matrix per draw call through a dynamic
//! uniform offset.

use crate::cache::AssetCache;
use crate::draw::{DrawList, ModelUniform};
use crate::state::{State, StateError};
use kestrel_asset::AssetStore;
use std::sync::Arc;
use tracing::{error, warn};
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, Buffer, BufferBinding,
    BufferBindingType, BufferDescriptor, BufferSize, BufferUsages, Color,
    CommandEncoderDescriptor, Device, Extent3d, LoadOp, Operations, PipelineLayout,
    PipelineLayoutDescriptor, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, ShaderStages, StoreOp, SurfaceConfiguration, SurfaceError,
    SurfaceTexture, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    TextureView, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Mid-grey clear, the engine's traditional background.
pub const CLEAR_COLOR: Color = Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

// Dynamic uniform offsets must be 256-byte aligned on all backends.
const MODEL_UNIFORM_STRIDE: u64 = 256;
const INITIAL_MODEL_CAPACITY: u32 = 64;

pub struct Renderer {
    state: State,
    surface: wgpu::Surface<'static>,
    config: SurfaceConfiguration,
    depth_view: TextureView,
    cache: AssetCache,

    pipeline_layout: PipelineLayout,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    model_bgl: BindGroupLayout,
    model_buffer: Buffer,
    model_bind_group: BindGroup,
    model_capacity: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, store: Arc<AssetStore>) -> Result<Renderer, StateError> {
        let (state, surface, config) = State::new(window)?;
        surface.configure(&state.device, &config);

        let depth_view = Self::create_depth_view(&state.device, &config);

        let camera_bgl = state
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX_FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let model_bgl = state
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: BufferSize::new(size_of::<ModelUniform>() as u64),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = state
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some("Scene Pipeline Layout"),
                bind_group_layouts: &[&camera_bgl, &model_bgl],
                immediate_size: 0,
            });

        let camera_buffer = state.device.create_buffer(&BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: size_of::<crate::CameraUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = state.device.create_bind_group(&BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let (model_buffer, model_bind_group) =
            Self::create_model_buffer(&state.device, &model_bgl, INITIAL_MODEL_CAPACITY);

        let cache = AssetCache::new(store);

        Ok(Renderer {
            state,
            surface,
            config,
            depth_view,
            cache,
            pipeline_layout,
            camera_buffer,
            camera_bind_group,
            model_bgl,
            model_buffer,
            model_bind_group,
            model_capacity: INITIAL_MODEL_CAPACITY,
        })
    }

    fn create_depth_view(device: &Device, config: &SurfaceConfiguration) -> TextureView {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("Depth Texture"),
            size: Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Depth32Float,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&TextureViewDescriptor::default())
    }

    fn create_model_buffer(
        device: &Device,
        layout: &BindGroupLayout,
        capacity: u32,
    ) -> (Buffer, BindGroup) {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: capacity as u64 * MODEL_UNIFORM_STRIDE,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: BufferSize::new(size_of::<ModelUniform>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    fn grow_model_buffer(&mut self, needed: u32) {
        let mut capacity = self.model_capacity.max(1);
        while capacity < needed {
            capacity *= 2;
        }

        let (buffer, bind_group) =
            Self::create_model_buffer(&self.state.device, &self.model_bgl, capacity);
        self.model_buffer = buffer;
        self.model_bind_group = bind_group;
        self.model_capacity = capacity;
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.state.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.state.device, &self.config);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    pub fn device(&self) -> &Device {
        &self.state.device
    }

    fn acquire_frame(&mut self) -> Result<Option<SurfaceTexture>, ()> {
        match self.surface.get_current_texture() {
            Ok(output) => Ok(Some(output)),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.state.device, &self.config);
                Ok(None)
            }
            Err(SurfaceError::Timeout) => Ok(None),
            Err(SurfaceError::OutOfMemory) => {
                error!("The application ran out of GPU memory!");
                Err(())
            }
            Err(e @ SurfaceError::Other) => {
                error!("Surface acquisition failed: {e}");
                Err(())
            }
        }
    }

    /// Draws one frame. Returns `false` on fatal errors; recoverable
    /// surface hiccups skip the frame and return `true`.
    pub fn render(&mut self, frame: &DrawList) -> bool {
        let draw_count = frame.calls.len() as u32;
        if draw_count > self.model_capacity {
            self.grow_model_buffer(draw_count);
        }

        // Make every referenced asset resident before recording the pass.
        let mut resolved = Vec::with_capacity(frame.calls.len());
        for call in &frame.calls {
            let shader = self.cache.ensure_shader(
                &self.state.device,
                call.shader,
                &self.pipeline_layout,
                self.config.format,
            );
            let has_mesh = self.cache.ensure_mesh(&self.state.device, call.mesh);
            resolved.push((shader, has_mesh));
        }

        self.state
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&frame.camera));

        if !frame.calls.is_empty() {
            let mut staging = vec![0u8; frame.calls.len() * MODEL_UNIFORM_STRIDE as usize];
            for (i, call) in frame.calls.iter().enumerate() {
                let uniform = ModelUniform { model: call.model };
                let offset = i * MODEL_UNIFORM_STRIDE as usize;
                staging[offset..offset + size_of::<ModelUniform>()]
                    .copy_from_slice(bytemuck::bytes_of(&uniform));
            }
            self.state
                .queue
                .write_buffer(&self.model_buffer, 0, &staging);
        }

        let output = match self.acquire_frame() {
            Ok(Some(output)) => output,
            Ok(None) => return true,
            Err(()) => return false,
        };

        let view = output.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = self
            .state
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..RenderPassDescriptor::default()
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            for (i, call) in frame.calls.iter().enumerate() {
                let (shader_handle, has_mesh) = resolved[i];
                if !has_mesh {
                    continue;
                }

                let Some(shader) = self.cache.shader(shader_handle) else {
                    warn!("Shader {shader_handle:?} vanished from the cache");
                    continue;
                };
                let Some(mesh) = self.cache.mesh(call.mesh) else {
                    continue;
                };

                let offset = (i as u64 * MODEL_UNIFORM_STRIDE) as u32;
                pass.set_pipeline(&shader.pipeline);
                pass.set_bind_group(1, &self.model_bind_group, &[offset]);
                mesh.draw(&mut pass);
            }
        }

        self.state.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        true
    }
}
