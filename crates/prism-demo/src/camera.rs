use glam::{Mat4, Vec3};

use prism_engine::core::FrameCtx;
use prism_engine::input::Key;

use crate::physics;

const LOOK_SPEED: f32 = 0.0015;
const MOVE_SPEED: f32 = 6.0;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.1;
const TWO_PI: f32 = std::f32::consts::TAU;

/// Free-flying camera in a z-up world.
///
/// WASD moves along the view plane, space and left shift move vertically,
/// mouse motion looks around. Writes the view matrix every frame.
pub struct Camera {
    pos: Vec3,
    yaw: f32,
    pitch: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            pos: Vec3::new(-2.0, 0.0, 1.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn update(&mut self, ctx: &mut FrameCtx<'_>) {
        let input = ctx.input;
        let dt = ctx.time.dt;

        let mut vdot = Vec3::ZERO;
        if input.key(Key::W) {
            vdot += Vec3::new(
                self.yaw.cos() * self.pitch.cos(),
                self.yaw.sin(),
                self.pitch.sin(),
            );
        }
        if input.key(Key::S) {
            vdot -= Vec3::new(
                self.yaw.cos() * self.pitch.cos(),
                self.yaw.sin(),
                self.pitch.sin(),
            );
        }
        if input.key(Key::A) {
            let side = self.yaw + std::f32::consts::FRAC_PI_2;
            vdot += Vec3::new(side.cos(), side.sin(), 0.0);
        }
        if input.key(Key::D) {
            let side = self.yaw + std::f32::consts::FRAC_PI_2;
            vdot -= Vec3::new(side.cos(), side.sin(), 0.0);
        }
        if input.key(Key::Space) {
            vdot.z += 1.0;
        }
        if input.key(Key::ShiftLeft) {
            vdot.z -= 1.0;
        }

        if vdot != Vec3::ZERO {
            self.pos += physics::linear::dv(vdot.normalize() * MOVE_SPEED, dt);
        }

        let (dx, dy) = input.pointer_delta();
        // Yaw slows near the poles so vertical aiming stays controllable.
        self.yaw -= dx as f32 * LOOK_SPEED * self.pitch.cos();
        while self.yaw > TWO_PI {
            self.yaw -= TWO_PI;
        }
        self.pitch = (self.pitch - dy as f32 * LOOK_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let direction = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.yaw.sin(),
            self.pitch.sin(),
        );
        ctx.graphics
            .set_view(Mat4::look_at_rh(self.pos, self.pos + direction, Vec3::Z));
    }
}
