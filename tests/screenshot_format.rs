//! Pixel format conversion for screenshot encoding

use prepass_renderer::backend::traits::TextureReadback;
use prepass_renderer::backend::types::TextureFormat;
use prepass_renderer::screenshot::{to_rgba8, unpack_rgb10a2};

#[test]
fn unpack_rgb10a2_endpoints() {
    assert_eq!(unpack_rgb10a2(0), [0, 0, 0, 0]);

    // All channels saturated
    let max = 0x3FF | (0x3FF << 10) | (0x3FF << 20) | (0x3 << 30);
    assert_eq!(unpack_rgb10a2(max), [255, 255, 255, 255]);
}

#[test]
fn unpack_rgb10a2_channel_isolation() {
    assert_eq!(unpack_rgb10a2(0x3FF), [255, 0, 0, 0]);
    assert_eq!(unpack_rgb10a2(0x3FF << 10), [0, 255, 0, 0]);
    assert_eq!(unpack_rgb10a2(0x3FF << 20), [0, 0, 255, 0]);
    assert_eq!(unpack_rgb10a2(0x3 << 30), [0, 0, 0, 255]);
}

#[test]
fn unpack_rgb10a2_midpoint_rounds() {
    // 511/1023 is just below one half
    let [r, _, _, _] = unpack_rgb10a2(511);
    assert_eq!(r, 127);
    // 512/1023 is just above
    let [r, _, _, _] = unpack_rgb10a2(512);
    assert_eq!(r, 128);
}

#[test]
fn to_rgba8_passes_rgba_through() {
    let readback = TextureReadback {
        width: 2,
        height: 1,
        format: TextureFormat::Rgba8Unorm,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
    };
    assert_eq!(to_rgba8(&readback).unwrap(), readback.data);
}

#[test]
fn to_rgba8_swizzles_bgra() {
    let readback = TextureReadback {
        width: 1,
        height: 1,
        format: TextureFormat::Bgra8Unorm,
        data: vec![10, 20, 30, 40],
    };
    assert_eq!(to_rgba8(&readback).unwrap(), vec![30, 20, 10, 40]);
}

#[test]
fn to_rgba8_unpacks_rgb10a2() {
    let word: u32 = 0x3FF | (0x3 << 30);
    let readback = TextureReadback {
        width: 1,
        height: 1,
        format: TextureFormat::Rgb10a2Unorm,
        data: word.to_le_bytes().to_vec(),
    };
    assert_eq!(to_rgba8(&readback).unwrap(), vec![255, 0, 0, 255]);
}

#[test]
fn to_rgba8_rejects_depth_formats() {
    let readback = TextureReadback {
        width: 1,
        height: 1,
        format: TextureFormat::Depth24PlusStencil8,
        data: vec![0; 4],
    };
    assert!(to_rgba8(&readback).is_err());
}
