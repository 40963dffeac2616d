use glam::{Mat3, Mat4, Vec3};

/// Phong material parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { shininess: 32.0 }
    }
}

/// Point light in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
        }
    }
}

/// Uniform slots, in their canonical buffer order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformSlot {
    /// Full model-view-projection matrix.
    Mvp,
    /// Model-view matrix; the shader-side normal matrix is derived from it
    /// at update time.
    ViewSpace,
    /// Bound texture. Occupies a position in the update list but no
    /// uniform-buffer bytes.
    TextureUnit,
    /// Constant output color.
    FlatColor,
    /// Ambient light intensity.
    Ambient,
    /// Material parameters.
    Material,
    /// Point light parameters.
    Light,
}

const SLOT_ORDER: [UniformSlot; 7] = [
    UniformSlot::Mvp,
    UniformSlot::ViewSpace,
    UniformSlot::TextureUnit,
    UniformSlot::FlatColor,
    UniformSlot::Ambient,
    UniformSlot::Material,
    UniformSlot::Light,
];

/// Buffer footprint of a slot under std140 rules: vec3s round up to 16
/// bytes and the derived mat3 is stored as three vec4 columns.
fn slot_size(slot: UniformSlot) -> usize {
    match slot {
        UniformSlot::Mvp => 64,
        UniformSlot::ViewSpace => 64 + 48,
        UniformSlot::TextureUnit => 0,
        UniformSlot::FlatColor => 16,
        UniformSlot::Ambient => 16,
        UniformSlot::Material => 16,
        UniformSlot::Light => 48,
    }
}

/// Per-frame value for one enabled slot.
#[derive(Debug, Copy, Clone)]
pub enum UniformValue {
    Matrix(Mat4),
    Texture,
    Color([f32; 4]),
    Intensity(Vec3),
    Material(Material),
    Light(Light),
}

/// Set of enabled uniform slots.
///
/// The buffer layout packs enabled slots densely in canonical order, and
/// [`update`](Self::update) consumes one value per enabled slot in that
/// same order. A wrong value count or a value of the wrong kind is a
/// caller bug and panics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSpec {
    mvp: bool,
    view_space: bool,
    texture_unit: bool,
    flat_color: bool,
    ambient: bool,
    material: bool,
    light: bool,
}

impl UniformSpec {
    pub const fn new(
        mvp: bool,
        view_space: bool,
        texture_unit: bool,
        flat_color: bool,
        ambient: bool,
        material: bool,
        light: bool,
    ) -> Self {
        Self {
            mvp,
            view_space,
            texture_unit,
            flat_color,
            ambient,
            material,
            light,
        }
    }

    fn enabled(&self, slot: UniformSlot) -> bool {
        match slot {
            UniformSlot::Mvp => self.mvp,
            UniformSlot::ViewSpace => self.view_space,
            UniformSlot::TextureUnit => self.texture_unit,
            UniformSlot::FlatColor => self.flat_color,
            UniformSlot::Ambient => self.ambient,
            UniformSlot::Material => self.material,
            UniformSlot::Light => self.light,
        }
    }

    /// Enabled slots in canonical order.
    pub fn slots(&self) -> Vec<UniformSlot> {
        SLOT_ORDER.iter().copied().filter(|&s| self.enabled(s)).collect()
    }

    /// Byte offset of an enabled slot within the uniform buffer.
    pub fn offset_of(&self, slot: UniformSlot) -> Option<usize> {
        if !self.enabled(slot) {
            return None;
        }
        let mut offset = 0;
        for s in SLOT_ORDER {
            if s == slot {
                return Some(offset);
            }
            if self.enabled(s) {
                offset += slot_size(s);
            }
        }
        None
    }

    /// Total uniform-buffer size. Every slot footprint is a multiple of 16,
    /// so the sum already satisfies buffer alignment.
    pub fn byte_len(&self) -> usize {
        self.slots().iter().map(|&s| slot_size(s)).sum()
    }

    pub fn has_texture(&self) -> bool {
        self.texture_unit
    }

    /// Serializes one value per enabled slot into `out`.
    ///
    /// Values are matched positionally against the enabled slots in
    /// canonical order; `TextureUnit` takes a [`UniformValue::Texture`]
    /// placeholder and writes nothing.
    pub fn update(&self, values: &[UniformValue], out: &mut Vec<u8>) {
        let slots = self.slots();
        assert_eq!(
            values.len(),
            slots.len(),
            "uniform update expects one value per enabled slot"
        );

        out.clear();
        out.resize(self.byte_len(), 0);

        let mut offset = 0;
        for (&slot, &value) in slots.iter().zip(values) {
            match (slot, value) {
                (UniformSlot::Mvp, UniformValue::Matrix(m)) => {
                    write_f32s(out, offset, &m.to_cols_array());
                }
                (UniformSlot::ViewSpace, UniformValue::Matrix(m)) => {
                    write_f32s(out, offset, &m.to_cols_array());
                    let normal = Mat3::from_mat4(m).inverse().transpose();
                    for (i, col) in [normal.x_axis, normal.y_axis, normal.z_axis]
                        .into_iter()
                        .enumerate()
                    {
                        write_f32s(out, offset + 64 + i * 16, &col.to_array());
                    }
                }
                (UniformSlot::TextureUnit, UniformValue::Texture) => {}
                (UniformSlot::FlatColor, UniformValue::Color(c)) => {
                    write_f32s(out, offset, &c);
                }
                (UniformSlot::Ambient, UniformValue::Intensity(v)) => {
                    write_f32s(out, offset, &v.to_array());
                }
                (UniformSlot::Material, UniformValue::Material(m)) => {
                    write_f32s(out, offset, &[m.shininess]);
                }
                (UniformSlot::Light, UniformValue::Light(l)) => {
                    write_f32s(out, offset, &l.position.to_array());
                    write_f32s(out, offset + 16, &l.diffuse.to_array());
                    write_f32s(out, offset + 32, &l.specular.to_array());
                }
                (slot, value) => {
                    panic!("uniform slot {slot:?} given mismatched value {value:?}")
                }
            }
            offset += slot_size(slot);
        }
    }
}

fn write_f32s(out: &mut [u8], offset: usize, values: &[f32]) {
    for (i, v) in values.iter().enumerate() {
        out[offset + i * 4..offset + i * 4 + 4].copy_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_spec() -> UniformSpec {
        // Mvp + ViewSpace + Ambient + Material + Light.
        UniformSpec::new(true, true, false, false, true, true, true)
    }

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn offsets_pack_enabled_slots_densely() {
        let spec = lit_spec();
        assert_eq!(spec.offset_of(UniformSlot::Mvp), Some(0));
        assert_eq!(spec.offset_of(UniformSlot::ViewSpace), Some(64));
        assert_eq!(spec.offset_of(UniformSlot::Ambient), Some(176));
        assert_eq!(spec.offset_of(UniformSlot::Material), Some(192));
        assert_eq!(spec.offset_of(UniformSlot::Light), Some(208));
        assert_eq!(spec.byte_len(), 256);

        assert_eq!(spec.offset_of(UniformSlot::FlatColor), None);
        assert_eq!(spec.offset_of(UniformSlot::TextureUnit), None);
    }

    #[test]
    fn texture_unit_takes_a_position_but_no_bytes() {
        // Mvp + TextureUnit, the unlit textured interface.
        let spec = UniformSpec::new(true, false, true, false, false, false, false);
        assert_eq!(spec.byte_len(), 64);
        assert!(spec.has_texture());
        assert_eq!(
            spec.slots(),
            vec![UniformSlot::Mvp, UniformSlot::TextureUnit]
        );

        let mut out = Vec::new();
        spec.update(
            &[
                UniformValue::Matrix(Mat4::IDENTITY),
                UniformValue::Texture,
            ],
            &mut out,
        );
        assert_eq!(out.len(), 64);
        assert_eq!(read_f32(&out, 0), 1.0);
    }

    #[test]
    fn view_space_derives_the_normal_matrix() {
        let spec = UniformSpec::new(false, true, false, false, false, false, false);
        let mut out = Vec::new();
        spec.update(
            &[UniformValue::Matrix(Mat4::from_scale(Vec3::splat(2.0)))],
            &mut out,
        );
        assert_eq!(out.len(), 112);

        // The matrix itself.
        assert_eq!(read_f32(&out, 0), 2.0);
        // Inverse-transpose of a uniform scale of 2 is a uniform scale of
        // 0.5, stored as three vec4 columns after the mat4.
        assert_eq!(read_f32(&out, 64), 0.5);
        assert_eq!(read_f32(&out, 64 + 20), 0.5);
        assert_eq!(read_f32(&out, 64 + 40), 0.5);
        assert_eq!(read_f32(&out, 64 + 4), 0.0);
    }

    #[test]
    fn update_routes_values_to_their_offsets() {
        let spec = lit_spec();
        let light = Light {
            position: Vec3::new(1.0, 2.0, 3.0),
            diffuse: Vec3::new(0.5, 0.5, 0.5),
            specular: Vec3::new(0.25, 0.25, 0.25),
        };
        let mut out = Vec::new();
        spec.update(
            &[
                UniformValue::Matrix(Mat4::IDENTITY),
                UniformValue::Matrix(Mat4::IDENTITY),
                UniformValue::Intensity(Vec3::new(0.1, 0.2, 0.3)),
                UniformValue::Material(Material { shininess: 64.0 }),
                UniformValue::Light(light),
            ],
            &mut out,
        );

        assert_eq!(read_f32(&out, 176), 0.1);
        assert_eq!(read_f32(&out, 180), 0.2);
        assert_eq!(read_f32(&out, 192), 64.0);
        assert_eq!(read_f32(&out, 208), 1.0);
        assert_eq!(read_f32(&out, 224), 0.5);
        assert_eq!(read_f32(&out, 240), 0.25);
    }

    #[test]
    #[should_panic(expected = "one value per enabled slot")]
    fn wrong_value_count_panics() {
        let spec = lit_spec();
        let mut out = Vec::new();
        spec.update(&[UniformValue::Matrix(Mat4::IDENTITY)], &mut out);
    }

    #[test]
    #[should_panic(expected = "mismatched value")]
    fn wrong_value_kind_panics() {
        let spec = UniformSpec::new(true, false, false, false, false, false, false);
        let mut out = Vec::new();
        spec.update(&[UniformValue::Texture], &mut out);
    }
}
