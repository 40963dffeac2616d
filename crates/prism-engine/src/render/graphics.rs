use std::path::PathBuf;

use glam::{Mat4, Vec3};

use crate::device::{Gpu, SurfaceErrorAction, TextureData};
use crate::error::EngineError;
use crate::mesh::MeshFile;
use crate::text::FontLibrary;
use crate::Result;

use super::compose::{Material, UniformSpec, VertexFormat};
use super::pipeline::{ModelPipeline, PipelineConfig, TextAnchor, TextPipeline};
use super::registry::ResourceId;

const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

fn plane_config() -> PipelineConfig {
    PipelineConfig {
        label: "prism plane pipeline",
        shader: include_str!("shaders/plane.wgsl"),
        // Position + TexCoord.
        vertex_format: VertexFormat::new(true, false, true, false),
        // Mvp + TextureUnit.
        uniform_spec: UniformSpec::new(true, false, true, false, false, false, false),
    }
}

fn lit_config() -> PipelineConfig {
    PipelineConfig {
        label: "prism lit pipeline",
        shader: include_str!("shaders/lit.wgsl"),
        // Position + TexCoord + Normal.
        vertex_format: VertexFormat::new(true, false, true, true),
        // Mvp + ViewSpace + TextureUnit + Ambient + Material + Light.
        uniform_spec: UniformSpec::new(true, true, true, false, true, true, true),
    }
}

/// Facade over the render pipelines and the shared camera matrices.
///
/// Lives on the render thread; applications talk to it through the frame
/// context. Asset paths are resolved against a data directory laid out as
/// `models/`, `textures/` and `fonts/`.
pub struct Graphics {
    device: wgpu::Device,
    queue: wgpu::Queue,
    lit: ModelPipeline,
    plane: ModelPipeline,
    text: TextPipeline,
    proj: Mat4,
    view: Mat4,
    assets: PathBuf,
}

impl Graphics {
    pub fn new(gpu: &Gpu, assets: impl Into<PathBuf>) -> Self {
        let assets = assets.into();
        let device = gpu.device().clone();
        let queue = gpu.queue().clone();
        let format = gpu.surface_format();
        let size = gpu.size();

        let lit = ModelPipeline::new(&device, format, lit_config());
        let plane = ModelPipeline::new(&device, format, plane_config());
        let text = TextPipeline::new(
            &device,
            format,
            (size.width, size.height),
            include_str!("shaders/text.wgsl"),
            FontLibrary::new(assets.join("fonts")),
        );

        Self {
            device,
            queue,
            lit,
            plane,
            text,
            proj: perspective(size.width, size.height),
            view: Mat4::IDENTITY,
            assets,
        }
    }

    /// Adopts a new drawable size: projection aspect and text placement.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.proj = perspective(width, height);
        self.text.resize(width, height);
    }

    /// Camera matrix for the next rendered frame.
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    // ── models ─────────────────────────────────────────────────────────────

    /// Loads a Phong-lit model from the data directory.
    pub fn load_model(
        &mut self,
        mesh_name: &str,
        texture_name: &str,
        model_matrix: Mat4,
        material: Material,
    ) -> Result<ResourceId> {
        let (mesh, texture) = self.read_assets(mesh_name, texture_name)?;
        Ok(self.lit.load(
            &self.device,
            &self.queue,
            &mesh,
            &texture,
            model_matrix,
            material,
        ))
    }

    /// Loads an unlit textured model from the data directory.
    pub fn load_plane_model(
        &mut self,
        mesh_name: &str,
        texture_name: &str,
        model_matrix: Mat4,
    ) -> Result<ResourceId> {
        let (mesh, texture) = self.read_assets(mesh_name, texture_name)?;
        Ok(self.plane.load(
            &self.device,
            &self.queue,
            &mesh,
            &texture,
            model_matrix,
            Material::default(),
        ))
    }

    pub fn set_model_matrix(&mut self, id: ResourceId, model_matrix: Mat4) {
        self.lit.set_model_matrix(id, model_matrix);
    }

    pub fn set_plane_model_matrix(&mut self, id: ResourceId, model_matrix: Mat4) {
        self.plane.set_model_matrix(id, model_matrix);
    }

    pub fn remove_model(&mut self, id: ResourceId) {
        self.lit.remove(id);
    }

    pub fn remove_plane_model(&mut self, id: ResourceId) {
        self.plane.remove(id);
    }

    // ── lighting ───────────────────────────────────────────────────────────

    pub fn set_light_pos(&mut self, position: Vec3) {
        self.lit.light.position = position;
    }

    pub fn set_ambient_color(&mut self, color: Vec3) {
        self.lit.ambient = color;
    }

    pub fn set_diffuse_color(&mut self, color: Vec3) {
        self.lit.light.diffuse = color;
    }

    pub fn set_specular_color(&mut self, color: Vec3) {
        self.lit.light.specular = color;
    }

    // ── text ───────────────────────────────────────────────────────────────

    pub fn set_font(&mut self, name: &str, size: u32) -> Result<()> {
        self.text.set_font(name, size)
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        self.text.set_size(size)
    }

    pub fn load_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        anchor: TextAnchor,
        color: [f32; 4],
    ) -> Result<ResourceId> {
        self.text
            .load_text(&self.device, &self.queue, text, x, y, anchor, color)
    }

    pub fn replace_text(
        &mut self,
        id: ResourceId,
        text: &str,
        x: i32,
        y: i32,
        anchor: TextAnchor,
        color: [f32; 4],
    ) -> Result<()> {
        self.text
            .replace_text(&self.device, &self.queue, id, text, x, y, anchor, color)
    }

    pub fn shift_text(&mut self, id: ResourceId, dx: i32, dy: i32) {
        self.text.shift_text(id, dx, dy);
    }

    pub fn remove_text(&mut self, id: ResourceId) {
        self.text.remove_text(id);
    }

    // ── frame ──────────────────────────────────────────────────────────────

    /// Renders one frame: lit models, then planes, then text on top.
    ///
    /// Transient surface errors skip the frame; only an unrecoverable
    /// surface loss is reported as an error.
    pub fn render(&mut self, gpu: &mut Gpu) -> Result<()> {
        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let message = err.to_string();
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::debug!("skipping frame after surface error: {message}");
                        Ok(())
                    }
                    SurfaceErrorAction::Fatal => {
                        Err(EngineError::context(format!("surface lost: {message}")))
                    }
                };
            }
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.lit.render(&self.queue, &mut rpass, self.proj, self.view);
            self.plane.render(&self.queue, &mut rpass, self.proj, self.view);
            self.text.render(&self.device, &self.queue, &mut rpass);
        }

        gpu.submit(frame);
        Ok(())
    }

    fn read_assets(&self, mesh_name: &str, texture_name: &str) -> Result<(MeshFile, TextureData)> {
        let mesh = MeshFile::read_from(&self.assets.join("models").join(mesh_name))?;
        let texture = TextureData::read_from(&self.assets.join("textures").join(texture_name))?;
        Ok((mesh, texture))
    }
}

fn perspective(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(FOV_Y, aspect, Z_NEAR, Z_FAR)
}
