//! Lazily-built GPU twins of the cold assets in the store.
//!
//! The first draw call that references a mesh or shader uploads it; later
//! frames reuse the cached buffers and pipelines.

use kestrel_asset::shader::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use kestrel_asset::{AssetStore, HMesh, HShader, Mesh, Shader, Vertex3D};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{
    BlendState, Buffer, BufferUsages, ColorTargetState, ColorWrites, CompareFunction,
    DepthBiasState, DepthStencilState, Device, Face, FragmentState, IndexFormat,
    MultisampleState, PipelineCompilationOptions, PipelineLayout, PrimitiveState, RenderPass,
    RenderPipeline, RenderPipelineDescriptor, ShaderModule, ShaderModuleDescriptor, ShaderSource,
    StencilFaceState, StencilState, TextureFormat, VertexBufferLayout, VertexState,
};

const VERTEX_BUFFERS: [VertexBufferLayout<'static>; 1] = [Vertex3D::continuous_descriptor()];

// Depth test Less with writes on, no stencil.
const DEPTH_STENCIL: DepthStencilState = DepthStencilState {
    format: TextureFormat::Depth32Float,
    depth_write_enabled: true,
    depth_compare: CompareFunction::Less,
    stencil: StencilState {
        front: StencilFaceState::IGNORE,
        back: StencilFaceState::IGNORE,
        read_mask: 0,
        write_mask: 0,
    },
    bias: DepthBiasState {
        constant: 0,
        slope_scale: 0.0,
        clamp: 0.0,
    },
};

#[derive(Debug)]
pub struct GpuMesh {
    vertex_buffer: Buffer,
    vertex_count: u32,
    index_buffer: Option<Buffer>,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &Device, mesh: &Mesh) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: BufferUsages::VERTEX,
        });

        let index_buffer = mesh.indices().map(|indices| {
            device.create_buffer_init(&BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: BufferUsages::INDEX,
            })
        });

        GpuMesh {
            vertex_buffer,
            vertex_count: mesh.vertex_count() as u32,
            index_buffer,
            index_count: mesh.indices_count() as u32,
        }
    }

    pub fn draw(&self, pass: &mut RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        if let Some(index_buffer) = &self.index_buffer {
            pass.set_index_buffer(index_buffer.slice(..), IndexFormat::Uint32);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        } else {
            pass.draw(0..self.vertex_count, 0..1);
        }
    }
}

#[derive(Debug)]
pub struct RuntimeShader {
    name: String,
    pub module: ShaderModule,
    pub pipeline: RenderPipeline,
}

impl RuntimeShader {
    fn upload(
        device: &Device,
        shader: &Shader,
        layout: &PipelineLayout,
        format: TextureFormat,
    ) -> RuntimeShader {
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(shader.name()),
            source: ShaderSource::Wgsl(Cow::Borrowed(shader.code())),
        });

        let label = format!("{} Pipeline", shader.name());
        let color_target = [Some(ColorTargetState {
            format,
            blend: Some(BlendState::REPLACE),
            write_mask: ColorWrites::all(),
        })];

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),

            vertex: VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &VERTEX_BUFFERS,
            },
            primitive: PrimitiveState {
                topology: shader.topology(),
                cull_mode: Some(Face::Back),
                polygon_mode: shader.polygon_mode(),
                ..PrimitiveState::default()
            },
            depth_stencil: Some(DEPTH_STENCIL),
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &color_target,
            }),
            multiview_mask: None,
            cache: None,
        });

        RuntimeShader {
            name: shader.name().to_string(),
            module,
            pipeline,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct AssetCache {
    store: Arc<AssetStore>,
    meshes: HashMap<HMesh, GpuMesh>,
    shaders: HashMap<HShader, RuntimeShader>,
}

impl AssetCache {
    pub fn new(store: Arc<AssetStore>) -> Self {
        AssetCache {
            store,
            meshes: HashMap::new(),
            shaders: HashMap::new(),
        }
    }

    /// Uploads the mesh if it isn't resident yet. Returns `false` when the
    /// handle no longer resolves in the store.
    pub fn ensure_mesh(&mut self, device: &Device, handle: HMesh) -> bool {
        if self.meshes.contains_key(&handle) {
            return true;
        }

        let Some(mesh) = self.store.meshes.try_get(handle) else {
            warn!("Mesh {handle:?} is not in the asset store");
            return false;
        };

        let gpu = GpuMesh::upload(device, &mesh);
        drop(mesh);
        self.meshes.insert(handle, gpu);
        true
    }

    /// Uploads the shader pipeline if needed, falling back to the default
    /// shader for dangling handles. Returns the handle that was actually
    /// made resident.
    pub fn ensure_shader(
        &mut self,
        device: &Device,
        handle: HShader,
        layout: &PipelineLayout,
        format: TextureFormat,
    ) -> HShader {
        let handle = if self.store.shaders.contains(handle) {
            handle
        } else {
            warn!("Shader {handle:?} is not in the asset store, using the default");
            HShader::DEFAULT
        };

        if !self.shaders.contains_key(&handle) {
            let shader = self
                .store
                .shaders
                .try_get(handle)
                .expect("default shader is always present");
            let runtime = RuntimeShader::upload(device, &shader, layout, format);
            drop(shader);
            self.shaders.insert(handle, runtime);
        }

        handle
    }

    pub fn mesh(&self, handle: HMesh) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }

    pub fn shader(&self, handle: HShader) -> Option<&RuntimeShader> {
        self.shaders.get(&handle)
    }
}
