use crate::mesh::MeshVertex;

/// Vertex attribute slots, in their canonical interleaving order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexSlot {
    /// `vec3` object-space position.
    Position,
    /// `vec3` per-vertex color.
    Color,
    /// `vec2` texture coordinates.
    TexCoord,
    /// `vec3` object-space normal.
    Normal,
}

const SLOT_ORDER: [VertexSlot; 4] = [
    VertexSlot::Position,
    VertexSlot::Color,
    VertexSlot::TexCoord,
    VertexSlot::Normal,
];

/// Per-vertex color written when the Color slot is enabled; mesh files do
/// not carry colors.
const DEFAULT_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

fn slot_size(slot: VertexSlot) -> u64 {
    match slot {
        VertexSlot::Position | VertexSlot::Color | VertexSlot::Normal => 12,
        VertexSlot::TexCoord => 8,
    }
}

fn slot_format(slot: VertexSlot) -> wgpu::VertexFormat {
    match slot {
        VertexSlot::Position | VertexSlot::Color | VertexSlot::Normal => {
            wgpu::VertexFormat::Float32x3
        }
        VertexSlot::TexCoord => wgpu::VertexFormat::Float32x2,
    }
}

/// Set of enabled vertex slots.
///
/// Shader locations and buffer offsets are assigned to enabled slots only,
/// counted in canonical order, so `(position, tex_coord)` yields locations
/// 0 and 1 regardless of the disabled slots between them.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexFormat {
    position: bool,
    color: bool,
    tex_coord: bool,
    normal: bool,
}

impl VertexFormat {
    pub const fn new(position: bool, color: bool, tex_coord: bool, normal: bool) -> Self {
        Self {
            position,
            color,
            tex_coord,
            normal,
        }
    }

    fn enabled(&self, slot: VertexSlot) -> bool {
        match slot {
            VertexSlot::Position => self.position,
            VertexSlot::Color => self.color,
            VertexSlot::TexCoord => self.tex_coord,
            VertexSlot::Normal => self.normal,
        }
    }

    /// Enabled slots in canonical order.
    pub fn slots(&self) -> Vec<VertexSlot> {
        SLOT_ORDER.iter().copied().filter(|&s| self.enabled(s)).collect()
    }

    /// Bytes per interleaved vertex.
    pub fn stride(&self) -> u64 {
        self.slots().iter().map(|&s| slot_size(s)).sum()
    }

    /// Vertex attributes with remapped locations and packed offsets.
    pub fn attributes(&self) -> Vec<wgpu::VertexAttribute> {
        let mut attrs = Vec::new();
        let mut offset = 0u64;
        for (location, slot) in self.slots().into_iter().enumerate() {
            attrs.push(wgpu::VertexAttribute {
                format: slot_format(slot),
                offset,
                shader_location: location as u32,
            });
            offset += slot_size(slot);
        }
        attrs
    }

    /// Buffer layout over attributes previously produced by
    /// [`attributes`](Self::attributes).
    pub fn layout<'a>(&self, attrs: &'a [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attrs,
        }
    }

    /// Interleaves mesh vertices into this format, dropping disabled slots.
    pub fn pack(&self, vertices: &[MeshVertex]) -> Vec<u8> {
        let slots = self.slots();
        let mut out = Vec::with_capacity(vertices.len() * self.stride() as usize);
        for v in vertices {
            for &slot in &slots {
                match slot {
                    VertexSlot::Position => push_f32s(&mut out, &v.position),
                    VertexSlot::Color => push_f32s(&mut out, &DEFAULT_COLOR),
                    VertexSlot::TexCoord => push_f32s(&mut out, &v.texcoord),
                    VertexSlot::Normal => push_f32s(&mut out, &v.normal),
                }
            }
        }
        out
    }
}

fn push_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_counts_enabled_slots_only() {
        let plane = VertexFormat::new(true, false, true, false);
        assert_eq!(plane.stride(), 12 + 8);

        let lit = VertexFormat::new(true, false, true, true);
        assert_eq!(lit.stride(), 12 + 8 + 12);
    }

    #[test]
    fn locations_and_offsets_are_remapped_past_disabled_slots() {
        let format = VertexFormat::new(true, false, true, true);
        let attrs = format.attributes();
        assert_eq!(attrs.len(), 3);

        // Position at location 0.
        assert_eq!(attrs[0].shader_location, 0);
        assert_eq!(attrs[0].offset, 0);
        // TexCoord takes location 1, not 2, because Color is disabled.
        assert_eq!(attrs[1].shader_location, 1);
        assert_eq!(attrs[1].offset, 12);
        assert_eq!(attrs[1].format, wgpu::VertexFormat::Float32x2);
        // Normal follows.
        assert_eq!(attrs[2].shader_location, 2);
        assert_eq!(attrs[2].offset, 20);
    }

    #[test]
    fn pack_interleaves_in_canonical_order() {
        let format = VertexFormat::new(true, false, true, false);
        let vertices = [MeshVertex {
            position: [1.0, 2.0, 3.0],
            texcoord: [0.5, 0.25],
            normal: [9.0, 9.0, 9.0],
        }];

        let bytes = format.pack(&vertices);
        assert_eq!(bytes.len() as u64, format.stride());

        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        // Normal is disabled and must not appear.
        assert_eq!(floats, vec![1.0, 2.0, 3.0, 0.5, 0.25]);
    }
}
