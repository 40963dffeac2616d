//! Mesh assets.
//!
//! The engine's on-disk mesh format is a flat native-endian dump: a header
//! of two `u64` counts, then `vertex_count` interleaved vertex records
//! (position, texcoord, normal as `f32`), then `index_count` `u32` indices.
//! The [`from_obj_str`](MeshFile::from_obj_str) converter produces it from
//! Wavefront OBJ offline.

use std::collections::HashMap;
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::error::EngineError;
use crate::Result;

/// One interleaved vertex record, exactly as stored on disk and uploaded
/// to vertex buffers.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshHeader {
    vertex_count: u64,
    index_count: u64,
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshFile {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshFile {
    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            EngineError::graphics(format!("unable to open model file {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
            .map_err(|e| EngineError::graphics(format!("{} in {}", e.message, path.display())))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()).map_err(|e| {
            EngineError::graphics(format!("unable to write model file {}: {e}", path.display()))
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header_len = std::mem::size_of::<MeshHeader>();
        if bytes.len() < header_len {
            return Err(EngineError::graphics("truncated mesh header"));
        }

        let mut header = MeshHeader::zeroed();
        bytemuck::bytes_of_mut(&mut header).copy_from_slice(&bytes[..header_len]);

        let vertex_bytes = header.vertex_count as usize * std::mem::size_of::<MeshVertex>();
        let index_bytes = header.index_count as usize * std::mem::size_of::<u32>();
        if bytes.len() != header_len + vertex_bytes + index_bytes {
            return Err(EngineError::graphics("mesh payload does not match header counts"));
        }

        let vertex_end = header_len + vertex_bytes;
        let mut vertices = vec![MeshVertex::zeroed(); header.vertex_count as usize];
        bytemuck::cast_slice_mut::<MeshVertex, u8>(&mut vertices)
            .copy_from_slice(&bytes[header_len..vertex_end]);

        let mut indices = vec![0u32; header.index_count as usize];
        bytemuck::cast_slice_mut::<u32, u8>(&mut indices)
            .copy_from_slice(&bytes[vertex_end..]);

        Ok(Self { vertices, indices })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = MeshHeader {
            vertex_count: self.vertices.len() as u64,
            index_count: self.indices.len() as u64,
        };

        let mut out = Vec::with_capacity(
            std::mem::size_of::<MeshHeader>()
                + self.vertices.len() * std::mem::size_of::<MeshVertex>()
                + self.indices.len() * std::mem::size_of::<u32>(),
        );
        out.extend_from_slice(bytemuck::bytes_of(&header));
        out.extend_from_slice(bytemuck::cast_slice(&self.vertices));
        out.extend_from_slice(bytemuck::cast_slice(&self.indices));
        out
    }

    /// Converts Wavefront OBJ text into an indexed mesh.
    ///
    /// Faces with more than three corners are fan-triangulated. A vertex is
    /// emitted once per distinct position/texcoord/normal triple; faces that
    /// reuse a triple share the index.
    pub fn from_obj_str(src: &str) -> Result<Self> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut texcoords: Vec<[f32; 2]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();

        let mut mesh = MeshFile::default();
        let mut dedup: HashMap<(usize, usize, usize), u32> = HashMap::new();

        for (line_no, line) in src.lines().enumerate() {
            let line = line.trim();
            let mut fields = line.split_whitespace();
            let bad = |what: &str| {
                EngineError::graphics(format!("malformed {what} on OBJ line {}", line_no + 1))
            };

            match fields.next() {
                Some("v") => positions.push(parse_vec3(&mut fields).ok_or_else(|| bad("v"))?),
                Some("vt") => texcoords.push(parse_vec2(&mut fields).ok_or_else(|| bad("vt"))?),
                Some("vn") => normals.push(parse_vec3(&mut fields).ok_or_else(|| bad("vn"))?),
                Some("f") => {
                    let corners: Vec<&str> = fields.collect();
                    if corners.len() < 3 {
                        return Err(bad("f"));
                    }
                    let mut resolved = Vec::with_capacity(corners.len());
                    for corner in corners {
                        let key = parse_face_corner(corner).ok_or_else(|| bad("f"))?;
                        let index = match dedup.get(&key) {
                            Some(&i) => i,
                            None => {
                                let (pi, ti, ni) = key;
                                let vertex = MeshVertex {
                                    position: *positions.get(pi).ok_or_else(|| bad("f"))?,
                                    texcoord: match ti {
                                        usize::MAX => [0.0, 0.0],
                                        _ => *texcoords.get(ti).ok_or_else(|| bad("f"))?,
                                    },
                                    normal: match ni {
                                        usize::MAX => [0.0, 0.0, 1.0],
                                        _ => *normals.get(ni).ok_or_else(|| bad("f"))?,
                                    },
                                };
                                let i = mesh.vertices.len() as u32;
                                mesh.vertices.push(vertex);
                                dedup.insert(key, i);
                                i
                            }
                        };
                        resolved.push(index);
                    }
                    for i in 1..resolved.len() - 1 {
                        mesh.indices.push(resolved[0]);
                        mesh.indices.push(resolved[i]);
                        mesh.indices.push(resolved[i + 1]);
                    }
                }
                _ => {}
            }
        }

        if mesh.indices.is_empty() {
            return Err(EngineError::graphics("OBJ source contains no faces"));
        }
        Ok(mesh)
    }
}

fn parse_vec3<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    Some([
        fields.next()?.parse().ok()?,
        fields.next()?.parse().ok()?,
        fields.next()?.parse().ok()?,
    ])
}

fn parse_vec2<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 2]> {
    Some([fields.next()?.parse().ok()?, fields.next()?.parse().ok()?])
}

/// Parses `pos`, `pos/tex`, `pos//norm`, or `pos/tex/norm` into zero-based
/// indices. Missing components map to `usize::MAX`.
fn parse_face_corner(corner: &str) -> Option<(usize, usize, usize)> {
    let mut parts = corner.split('/');
    let pos = parts.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    let tex = match parts.next() {
        None | Some("") => usize::MAX,
        Some(t) => t.parse::<usize>().ok()?.checked_sub(1)?,
    };
    let norm = match parts.next() {
        None | Some("") => usize::MAX,
        Some(n) => n.parse::<usize>().ok()?.checked_sub(1)?,
    };
    Some((pos, tex, norm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mesh() -> MeshFile {
        MeshFile {
            vertices: vec![
                MeshVertex {
                    position: [0.0, 0.0, 0.0],
                    texcoord: [0.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                },
                MeshVertex {
                    position: [1.0, 0.0, 0.0],
                    texcoord: [1.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                },
                MeshVertex {
                    position: [0.0, 1.0, 0.0],
                    texcoord: [0.0, 1.0],
                    normal: [0.0, 0.0, 1.0],
                },
            ],
            indices: vec![0, 1, 2],
        }
    }

    // ── binary format ─────────────────────────────────────────────────────

    #[test]
    fn file_round_trip_is_byte_exact() {
        let mesh = sample_mesh();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.mesh");

        mesh.write_to(&path).unwrap();
        let restored = MeshFile::read_from(&path).unwrap();
        assert_eq!(restored, mesh);

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, mesh.to_bytes());
    }

    #[test]
    fn counts_mismatching_payload_are_rejected() {
        let mut bytes = sample_mesh().to_bytes();
        bytes.truncate(bytes.len() - 1);
        assert!(MeshFile::from_bytes(&bytes).is_err());

        assert!(MeshFile::from_bytes(&[0u8; 4]).is_err());
    }

    // ── OBJ conversion ────────────────────────────────────────────────────

    #[test]
    fn obj_quad_is_fan_triangulated() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
";
        let mesh = MeshFile::from_obj_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn obj_shared_corners_are_deduplicated() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
f 2/1/1 4/1/1 3/1/1
";
        let mesh = MeshFile::from_obj_str(src).unwrap();
        // Corners 2 and 3 are shared between the two triangles.
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn obj_without_faces_is_an_error() {
        let err = MeshFile::from_obj_str("v 0 0 0\n").unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Graphics);
    }

    #[test]
    fn obj_face_with_missing_texcoord_gets_defaults() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";
        let mesh = MeshFile::from_obj_str(src).unwrap();
        assert_eq!(mesh.vertices[0].texcoord, [0.0, 0.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }
}
