//! Screenshot capture: convert read-back pixels to RGBA8 and encode PNG

use crate::backend::traits::TextureReadback;
use crate::backend::types::TextureFormat;
use std::path::Path;

/// File name prefix for captured frames
pub const SCREENSHOT_PREFIX: &str = "LightPrepass_";

/// Unpack one Rgb10a2Unorm texel (red in the least significant bits) into
/// 8-bit RGBA
pub fn unpack_rgb10a2(word: u32) -> [u8; 4] {
    let r = word & 0x3FF;
    let g = (word >> 10) & 0x3FF;
    let b = (word >> 20) & 0x3FF;
    let a = (word >> 30) & 0x3;
    [
        ((r * 255 + 511) / 1023) as u8,
        ((g * 255 + 511) / 1023) as u8,
        ((b * 255 + 511) / 1023) as u8,
        (a * 85) as u8,
    ]
}

/// Convert read-back pixel data to tightly packed RGBA8
pub fn to_rgba8(readback: &TextureReadback) -> Result<Vec<u8>, String> {
    match readback.format {
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => Ok(readback.data.clone()),
        TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => Ok(readback
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0], px[3]])
            .collect()),
        TextureFormat::Rgb10a2Unorm => Ok(readback
            .data
            .chunks_exact(4)
            .flat_map(|px| unpack_rgb10a2(u32::from_le_bytes([px[0], px[1], px[2], px[3]])))
            .collect()),
        other => Err(format!("Unsupported screenshot format {:?}", other)),
    }
}

/// Encode the readback as a PNG at `path`
pub fn save(readback: &TextureReadback, path: &Path) -> Result<(), String> {
    let rgba = to_rgba8(readback)?;
    image::save_buffer(
        path,
        &rgba,
        readback.width,
        readback.height,
        image::ColorType::Rgba8,
    )
    .map_err(|e| e.to_string())
}
