//! Texture loading and procedural generation

use crate::backend::traits::*;
use crate::backend::types::*;
use image::GenericImageView;
use std::path::Path;

/// CPU-side texture data ready for upload
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load a texture from an image file. `srgb` selects gamma-corrected
    /// sampling (color maps yes, normal maps no).
    pub fn from_file<P: AsRef<Path>>(path: P, srgb: bool) -> Result<Self, String> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|e| e.to_string())?;
        let (width, height) = img.dimensions();
        let data = img.to_rgba8().into_raw();

        Ok(Self {
            width,
            height,
            format: if srgb {
                TextureFormat::Rgba8UnormSrgb
            } else {
                TextureFormat::Rgba8Unorm
            },
            data,
            name,
        })
    }

    /// Procedural two-tone checkerboard, sRGB
    pub fn checkerboard(size: u32, squares: u32, light: [u8; 4], dark: [u8; 4]) -> Self {
        let square = (size / squares).max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let on = ((x / square) + (y / square)) % 2 == 0;
                data.extend_from_slice(if on { &light } else { &dark });
            }
        }
        Self {
            width: size,
            height: size,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
            name: "checkerboard".to_string(),
        }
    }

    /// Uniform up-facing normal map (tangent space +Z), linear
    pub fn flat_normal(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for _ in 0..size * size {
            data.extend_from_slice(&[128, 128, 255, 255]);
        }
        Self {
            width: size,
            height: size,
            format: TextureFormat::Rgba8Unorm,
            data,
            name: "flat_normal".to_string(),
        }
    }

    /// Upload to the GPU, returning the texture and a shader view
    pub fn upload<B: GraphicsBackend>(
        &self,
        backend: &mut B,
    ) -> BackendResult<(TextureHandle, TextureViewHandle)> {
        let texture = backend.create_texture(&TextureDescriptor {
            label: Some(self.name.clone()),
            width: self.width,
            height: self.height,
            mip_levels: 1,
            sample_count: 1,
            format: self.format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        backend.write_texture(texture, &self.data, self.width, self.height);
        let view = backend.create_texture_view(texture, &TextureViewDescriptor::default())?;
        Ok((texture, view))
    }
}
