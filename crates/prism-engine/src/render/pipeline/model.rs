use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::device::{DEPTH_FORMAT, Texture, TextureData};
use crate::mesh::MeshFile;

use super::super::compose::{Light, Material, UniformSlot, UniformSpec, UniformValue, VertexFormat};
use super::super::registry::{ResourceId, ResourceRegistry};

/// Static description of one model pipeline variant.
///
/// The same pipeline type serves both the unlit textured interface and the
/// Phong-lit interface; only the shader source and the enabled slot sets
/// differ.
pub struct PipelineConfig {
    pub label: &'static str,
    pub shader: &'static str,
    pub vertex_format: VertexFormat,
    pub uniform_spec: UniformSpec,
}

struct GpuModel {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    ubo: wgpu::Buffer,
    uniform_group: wgpu::BindGroup,
    texture_group: Option<wgpu::BindGroup>,
    model_matrix: Mat4,
    material: Material,
}

/// Pipeline drawing indexed, textured meshes.
///
/// Each loaded model owns its buffers and bind groups; per-frame state is
/// limited to writing the packed uniform block before its draw. Draws are
/// issued in id order.
pub struct ModelPipeline {
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: Option<wgpu::BindGroupLayout>,
    sampler: wgpu::Sampler,
    vertex_format: VertexFormat,
    uniform_spec: UniformSpec,
    models: ResourceRegistry<GpuModel>,
    scratch: Vec<u8>,
    pub ambient: glam::Vec3,
    pub light: Light,
}

impl ModelPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        config: PipelineConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(config.label),
            source: wgpu::ShaderSource::Wgsl(config.shader.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(config.label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        config.uniform_spec.byte_len() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = config.uniform_spec.has_texture().then(|| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(config.label),
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
            })
        });

        let mut group_layouts = vec![&uniform_layout];
        if let Some(tl) = texture_layout.as_ref() {
            group_layouts.push(tl);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(config.label),
            bind_group_layouts: &group_layouts,
            immediate_size: 0,
        });

        let attributes = config.vertex_format.attributes();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(config.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[config.vertex_format.layout(&attributes)],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(config.label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            label: config.label,
            pipeline,
            uniform_layout,
            texture_layout,
            sampler,
            vertex_format: config.vertex_format,
            uniform_spec: config.uniform_spec,
            models: ResourceRegistry::new(),
            scratch: Vec::new(),
            ambient: glam::Vec3::splat(0.1),
            light: Light::default(),
        }
    }

    /// Uploads a mesh with its texture and returns the new model's id.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &MeshFile,
        texture: &TextureData,
        model_matrix: Mat4,
        material: Material,
    ) -> ResourceId {
        let model = self.build_model(device, queue, mesh, texture, model_matrix, material);
        self.models.insert(model)
    }

    /// Swaps the resource behind `id` for a freshly uploaded one. The old
    /// GPU objects are released before the new ones take the slot.
    pub fn replace(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: ResourceId,
        mesh: &MeshFile,
        texture: &TextureData,
        model_matrix: Mat4,
        material: Material,
    ) {
        let model = self.build_model(device, queue, mesh, texture, model_matrix, material);
        self.models.replace(id, model);
    }

    pub fn remove(&mut self, id: ResourceId) {
        self.models.remove(id);
    }

    pub fn set_model_matrix(&mut self, id: ResourceId, model_matrix: Mat4) {
        if let Some(model) = self.models.get_mut(id) {
            model.model_matrix = model_matrix;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Draws every model, refreshing its uniform block first.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        rpass: &mut wgpu::RenderPass<'_>,
        proj: Mat4,
        view: Mat4,
    ) {
        if self.models.is_empty() {
            return;
        }

        rpass.set_pipeline(&self.pipeline);
        for (_, model) in self.models.iter() {
            let slots = self.uniform_spec.slots();
            let values: Vec<UniformValue> = slots
                .iter()
                .map(|&slot| match slot {
                    UniformSlot::Mvp => {
                        UniformValue::Matrix(proj * view * model.model_matrix)
                    }
                    UniformSlot::ViewSpace => UniformValue::Matrix(view * model.model_matrix),
                    UniformSlot::TextureUnit => UniformValue::Texture,
                    UniformSlot::FlatColor => UniformValue::Color([1.0, 1.0, 1.0, 1.0]),
                    UniformSlot::Ambient => UniformValue::Intensity(self.ambient),
                    UniformSlot::Material => UniformValue::Material(model.material),
                    UniformSlot::Light => {
                        // The shader lights in view space.
                        let mut light = self.light;
                        light.position = view.transform_point3(light.position);
                        UniformValue::Light(light)
                    }
                })
                .collect();
            self.uniform_spec.update(&values, &mut self.scratch);
            queue.write_buffer(&model.ubo, 0, &self.scratch);

            rpass.set_bind_group(0, &model.uniform_group, &[]);
            if let Some(group) = model.texture_group.as_ref() {
                rpass.set_bind_group(1, group, &[]);
            }
            rpass.set_vertex_buffer(0, model.vertex_buffer.slice(..));
            rpass.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..model.index_count, 0, 0..1);
        }
    }

    fn build_model(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &MeshFile,
        texture: &TextureData,
        model_matrix: Mat4,
        material: Material,
    ) -> GpuModel {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(self.label),
            contents: &self.vertex_format.pack(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(self.label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: self.uniform_spec.byte_len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        let texture_group = self.texture_layout.as_ref().map(|layout| {
            let gpu_texture = Texture::from_rgba8(device, queue, texture);
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(self.label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&gpu_texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
        });

        GpuModel {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            ubo,
            uniform_group,
            texture_group,
            model_matrix,
            material,
        }
    }
}
