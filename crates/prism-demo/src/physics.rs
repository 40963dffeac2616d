//! Minimal kinematics helpers.

pub mod linear {
    use glam::Vec3;

    /// Position change from a constant velocity over `dt` seconds.
    pub fn dv(velocity: Vec3, dt: f32) -> Vec3 {
        velocity * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn displacement_scales_with_time() {
        let v = Vec3::new(2.0, 0.0, -4.0);
        assert_eq!(linear::dv(v, 0.5), Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(linear::dv(v, 0.0), Vec3::ZERO);
    }
}
