use wgpu::util::DeviceExt;

use crate::device::{DEPTH_FORMAT, Texture};
use crate::mesh::MeshVertex;
use crate::text::FontLibrary;
use crate::Result;

use super::super::compose::{UniformSpec, UniformValue, VertexFormat};
use super::super::registry::{ResourceId, ResourceRegistry};

/// Screen corner a text quad is positioned against.
///
/// The `(x, y)` offsets given to the load call always point inward from the
/// chosen corner, so a quad stays glued to its corner across resizes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextAnchor {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
    Center,
}

const TEXT_VERTEX_FORMAT: VertexFormat = VertexFormat::new(true, false, true, false);
// TextureUnit + FlatColor.
const TEXT_UNIFORM_SPEC: UniformSpec =
    UniformSpec::new(false, false, true, true, false, false, false);

struct TextQuad {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    anchor: TextAnchor,
    uniform_group: wgpu::BindGroup,
    texture_group: wgpu::BindGroup,
    first_vertex: u32,
}

/// Pipeline drawing pre-composed text bitmaps as screen-space quads.
///
/// All quads share one growable vertex buffer. Structural changes (load,
/// replace, remove, shift, resize) only mark the buffer dirty; it is
/// rebuilt at most once per frame, before the first text draw.
pub struct TextPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quads: ResourceRegistry<TextQuad>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: u64,
    dirty: bool,
    surface_size: (u32, u32),
    library: FontLibrary,
}

impl TextPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        surface_size: (u32, u32),
        shader: &'static str,
        library: FontLibrary,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism text pipeline"),
            source: wgpu::ShaderSource::Wgsl(shader.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism text pipeline"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        TEXT_UNIFORM_SPEC.byte_len() as u64,
                    ),
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism text pipeline"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism text pipeline"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let attributes = TEXT_VERTEX_FORMAT.attributes();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism text pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[TEXT_VERTEX_FORMAT.layout(&attributes)],
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
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Text draws over everything already in the frame.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("prism text pipeline"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            uniform_layout,
            texture_layout,
            sampler,
            quads: ResourceRegistry::new(),
            vertex_buffer: None,
            vertex_capacity: 0,
            dirty: false,
            surface_size,
            library,
        }
    }

    /// Selects the font face used by subsequent load calls.
    pub fn set_font(&mut self, name: &str, size: u32) -> Result<()> {
        self.library.select(name, size)
    }

    /// Changes the point size of the active face.
    pub fn set_size(&mut self, size: u32) -> Result<()> {
        self.library.set_size(size)
    }

    /// Rasterizes `text` with the active face and registers a quad for it.
    pub fn load_text(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        text: &str,
        x: i32,
        y: i32,
        anchor: TextAnchor,
        color: [f32; 4],
    ) -> Result<ResourceId> {
        let quad = self.build_quad(device, queue, text, x, y, anchor, color)?;
        self.dirty = true;
        Ok(self.quads.insert(quad))
    }

    /// Re-rasterizes the quad behind `id` with new text.
    ///
    /// The new quad is fully built before the old one is released, so a
    /// rasterization failure leaves the old text in place.
    pub fn replace_text(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: ResourceId,
        text: &str,
        x: i32,
        y: i32,
        anchor: TextAnchor,
        color: [f32; 4],
    ) -> Result<()> {
        let quad = self.build_quad(device, queue, text, x, y, anchor, color)?;
        self.quads.replace(id, quad);
        self.dirty = true;
        Ok(())
    }

    /// Moves a quad without re-rasterizing its bitmap.
    pub fn shift_text(&mut self, id: ResourceId, dx: i32, dy: i32) {
        if let Some(quad) = self.quads.get_mut(id) {
            quad.x += dx;
            quad.y += dy;
            self.dirty = true;
        }
    }

    pub fn remove_text(&mut self, id: ResourceId) {
        self.quads.remove(id);
        self.dirty = true;
    }

    /// Records the new surface size; quad positions are recomputed at the
    /// next rebuild.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
        self.dirty = true;
    }

    /// Draws every quad, rebuilding the shared vertex buffer first if any
    /// structural change happened since the last frame.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rpass: &mut wgpu::RenderPass<'_>,
    ) {
        if self.dirty {
            self.rebuild(device, queue);
        }
        let Some(buffer) = self.vertex_buffer.as_ref() else {
            return;
        };
        if self.quads.is_empty() {
            return;
        }

        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, buffer.slice(..));
        for (_, quad) in self.quads.iter() {
            rpass.set_bind_group(0, &quad.uniform_group, &[]);
            rpass.set_bind_group(1, &quad.texture_group, &[]);
            rpass.draw(quad.first_vertex..quad.first_vertex + 6, 0..1);
        }
    }

    fn build_quad(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        text: &str,
        x: i32,
        y: i32,
        anchor: TextAnchor,
        color: [f32; 4],
    ) -> Result<TextQuad> {
        let bitmap = self.library.render_line(text, true)?;
        let (width, height) = (bitmap.width().max(0) as u32, bitmap.height().max(0) as u32);

        // Control-only strings compose to a null bitmap; keep a zero-sized
        // quad over a blank texel so the id stays live.
        let texture = if bitmap.is_null() {
            Texture::from_coverage(device, queue, 1, 1, &[0])
        } else {
            Texture::from_coverage(device, queue, width, height, bitmap.data())
        };

        let mut color_bytes = Vec::new();
        TEXT_UNIFORM_SPEC.update(
            &[UniformValue::Texture, UniformValue::Color(color)],
            &mut color_bytes,
        );
        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism text color"),
            contents: &color_bytes,
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let uniform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism text color"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });
        let texture_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism text texture"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Ok(TextQuad {
            width,
            height,
            x,
            y,
            anchor,
            uniform_group,
            texture_group,
            first_vertex: 0,
        })
    }

    fn rebuild(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.dirty = false;

        let (sw, sh) = self.surface_size;
        let mut vertices = Vec::with_capacity(self.quads.len() * 6);
        for (_, quad) in self.quads.iter_mut() {
            quad.first_vertex = vertices.len() as u32;
            vertices.extend_from_slice(&quad_vertices(
                quad.anchor,
                quad.x,
                quad.y,
                quad.width,
                quad.height,
                sw,
                sh,
            ));
        }

        let bytes = TEXT_VERTEX_FORMAT.pack(&vertices);
        let needed = bytes.len() as u64;
        if needed == 0 {
            return;
        }

        if self.vertex_buffer.is_none() || self.vertex_capacity < needed {
            let capacity = needed.next_power_of_two();
            self.vertex_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("prism text vertices"),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = capacity;
        }
        if let Some(buffer) = self.vertex_buffer.as_ref() {
            queue.write_buffer(buffer, 0, &bytes);
        }
    }
}

/// Pixel-space rectangle of a quad, top-left origin.
fn quad_rect(
    anchor: TextAnchor,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    sw: u32,
    sh: u32,
) -> (i32, i32) {
    let (w, h) = (width as i32, height as i32);
    let (sw, sh) = (sw as i32, sh as i32);
    match anchor {
        TextAnchor::TopLeft => (x, y),
        TextAnchor::TopRight => (sw - x - w, y),
        TextAnchor::BottomLeft => (x, sh - y - h),
        TextAnchor::BottomRight => (sw - x - w, sh - y - h),
        TextAnchor::Center => ((sw - w) / 2 + x, (sh - h) / 2 + y),
    }
}

/// Two triangles (v0 v1 v2, v3 v0 v2) covering the quad in clip space.
fn quad_vertices(
    anchor: TextAnchor,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    sw: u32,
    sh: u32,
) -> [MeshVertex; 6] {
    let (left, top) = quad_rect(anchor, x, y, width, height, sw, sh);
    let (sw, sh) = (sw.max(1) as f32, sh.max(1) as f32);

    let x0 = left as f32 / sw * 2.0 - 1.0;
    let x1 = (left + width as i32) as f32 / sw * 2.0 - 1.0;
    let y0 = 1.0 - top as f32 / sh * 2.0;
    let y1 = 1.0 - (top + height as i32) as f32 / sh * 2.0;

    let v = |px: f32, py: f32, u: f32, t: f32| MeshVertex {
        position: [px, py, 0.0],
        texcoord: [u, t],
        normal: [0.0, 0.0, 1.0],
    };
    let v0 = v(x0, y0, 0.0, 0.0);
    let v1 = v(x0, y1, 0.0, 1.0);
    let v2 = v(x1, y1, 1.0, 1.0);
    let v3 = v(x1, y0, 1.0, 0.0);
    [v0, v1, v2, v3, v0, v2]
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── anchor math ────────────────────────────────────────────────────────

    #[test]
    fn offsets_point_inward_from_each_corner() {
        assert_eq!(quad_rect(TextAnchor::TopLeft, 10, 20, 100, 50, 800, 600), (10, 20));
        assert_eq!(
            quad_rect(TextAnchor::TopRight, 10, 20, 100, 50, 800, 600),
            (800 - 10 - 100, 20)
        );
        assert_eq!(
            quad_rect(TextAnchor::BottomLeft, 10, 20, 100, 50, 800, 600),
            (10, 600 - 20 - 50)
        );
        assert_eq!(
            quad_rect(TextAnchor::BottomRight, 10, 20, 100, 50, 800, 600),
            (800 - 10 - 100, 600 - 20 - 50)
        );
    }

    #[test]
    fn center_anchor_centers_then_offsets() {
        assert_eq!(
            quad_rect(TextAnchor::Center, 0, 0, 100, 50, 800, 600),
            (350, 275)
        );
        assert_eq!(
            quad_rect(TextAnchor::Center, 5, -5, 100, 50, 800, 600),
            (355, 270)
        );
    }

    // ── quad geometry ──────────────────────────────────────────────────────

    #[test]
    fn full_screen_quad_spans_clip_space() {
        let verts = quad_vertices(TextAnchor::TopLeft, 0, 0, 800, 600, 800, 600);
        // Top-left corner.
        assert_eq!(verts[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(verts[0].texcoord, [0.0, 0.0]);
        // Bottom-right corner.
        assert_eq!(verts[2].position, [1.0, -1.0, 0.0]);
        assert_eq!(verts[2].texcoord, [1.0, 1.0]);
        // Shared vertices close the second triangle.
        assert_eq!(verts[4].position, verts[0].position);
        assert_eq!(verts[5].position, verts[2].position);
    }
}
