use glam::{Mat4, Vec3};

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::input::Key;
use prism_engine::render::compose::Material;
use prism_engine::render::{ResourceId, TextAnchor};
use prism_engine::Result;

use crate::camera::Camera;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const LIGHT_POS: Vec3 = Vec3::new(10.0, 10.0, 10.0);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stage {
    /// First frame: put up the loading banner before any asset touches disk.
    Loading,
    /// Second frame: load the scene while the banner is on screen.
    LoadAssets,
    Running,
}

/// Scene: a lit chair, a small cube marking the light, and a frame-time
/// readout that reuses the loading banner's text slot.
pub struct DemoApp {
    stage: Stage,
    camera: Camera,
    text: Option<ResourceId>,
}

impl DemoApp {
    pub fn new() -> Self {
        Self {
            stage: Stage::Loading,
            camera: Camera::new(),
            text: None,
        }
    }
}

impl App for DemoApp {
    fn frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        match self.stage {
            Stage::Loading => {
                ctx.graphics.set_font_size(64)?;
                self.text = Some(ctx.graphics.load_text(
                    "LOADING",
                    0,
                    0,
                    TextAnchor::Center,
                    WHITE,
                )?);
                ctx.graphics.set_font_size(12)?;
                self.stage = Stage::LoadAssets;
            }
            Stage::LoadAssets => {
                ctx.graphics.load_model(
                    "chair.mesh",
                    "chair.tex",
                    Mat4::IDENTITY,
                    Material { shininess: 64.0 },
                )?;
                let marker = Mat4::from_scale(Vec3::splat(0.3))
                    * Mat4::from_translation(LIGHT_POS);
                ctx.graphics.load_plane_model("cube.mesh", "cube.tex", marker)?;

                ctx.graphics.set_light_pos(LIGHT_POS);
                ctx.graphics.set_diffuse_color(Vec3::ONE);
                ctx.graphics.set_specular_color(Vec3::ONE);

                log::info!("scene loaded");
                self.stage = Stage::Running;
            }
            Stage::Running => {
                if let Some(id) = self.text {
                    let label = format_frame_time(ctx.time.dt);
                    ctx.graphics
                        .replace_text(id, &label, 1, 1, TextAnchor::TopRight, WHITE)?;
                }
            }
        }

        self.camera.update(ctx);

        if ctx.input.key(Key::Escape) {
            return Ok(AppControl::Exit);
        }
        Ok(AppControl::Continue)
    }
}

/// Frame time with a precision that tracks its magnitude: three significant
/// digits for slow frames, fewer as frames get shorter.
fn format_frame_time(dt: f32) -> String {
    if dt <= 0.0 {
        return "frame: 0 s".to_string();
    }
    let significant = if dt >= 0.1 {
        3
    } else if dt >= 0.01 {
        2
    } else {
        1
    };
    let decimals = (significant - 1 - dt.log10().floor() as i32).max(0) as usize;
    format!("frame: {dt:.decimals$} s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_time_precision_follows_magnitude() {
        assert_eq!(format_frame_time(0.5), "frame: 0.500 s");
        assert_eq!(format_frame_time(0.016), "frame: 0.016 s");
        assert_eq!(format_frame_time(0.005), "frame: 0.005 s");
        assert_eq!(format_frame_time(0.0), "frame: 0 s");
    }
}
