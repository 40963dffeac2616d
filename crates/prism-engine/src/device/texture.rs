use std::path::Path;

use crate::error::EngineError;
use crate::Result;

/// CPU-side RGBA8 image.
///
/// On disk this is the engine's raw texture format: two little-endian `u32`
/// dimensions followed by `width * height * 4` bytes of RGBA data. Asset
/// pipelines convert source images into this format offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(EngineError::graphics(format!(
                "texture data is {} bytes, expected {expected}",
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }

    /// 1x1 image of a single color. Placeholder for text quads and tests.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            EngineError::graphics(format!("unable to open texture file {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes).map_err(|e| {
            EngineError::graphics(format!("{} in {}", e.message, path.display()))
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(EngineError::graphics("truncated texture header"));
        }
        let width = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let height = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        Self::new(width, height, bytes[8..].to_vec())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.rgba.len());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.rgba);
        out
    }
}

/// GPU texture plus its default view.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Uploads an RGBA8 image as a sampled texture.
    pub fn from_rgba8(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> Self {
        Self::upload(
            device,
            queue,
            data.width,
            data.height,
            &data.rgba,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            4,
            "prism rgba texture",
        )
    }

    /// Uploads a single-channel coverage image (text glyphs).
    pub fn from_coverage(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        Self::upload(
            device,
            queue,
            width,
            height,
            pixels,
            wgpu::TextureFormat::R8Unorm,
            1,
            "prism coverage texture",
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
        format: wgpu::TextureFormat,
        bytes_per_pixel: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_pixel),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_data_round_trips_through_bytes() {
        let data = TextureData::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let restored = TextureData::from_bytes(&data.to_bytes()).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let err = TextureData::new(2, 2, vec![0; 3]).unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Graphics);
    }
}
