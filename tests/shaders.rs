//! Structural checks on the embedded WGSL sources

use prepass_renderer::passes::composite::COMPOSITE_SHADER;
use prepass_renderer::passes::final_pass::FINAL_PASS_SHADER;
use prepass_renderer::passes::gbuffer::GBUFFER_SHADER;
use prepass_renderer::passes::lights::LIGHTS_SHADER;
use prepass_renderer::passes::SCENE_VERTEX_STAGE;

// The final pass depth test is less-equal against depth the G-Buffer pass
// wrote; both shaders must share the identical vertex stage so clip-space
// depth reproduces exactly.
#[test]
fn geometry_shaders_share_one_vertex_stage() {
    assert!(GBUFFER_SHADER.starts_with(SCENE_VERTEX_STAGE));
    assert!(FINAL_PASS_SHADER.starts_with(SCENE_VERTEX_STAGE));
}

#[test]
fn all_shaders_define_both_entry_points() {
    for source in [
        GBUFFER_SHADER,
        FINAL_PASS_SHADER,
        LIGHTS_SHADER,
        COMPOSITE_SHADER,
    ] {
        assert!(source.contains("fn vs_main"), "missing vs_main");
        assert!(source.contains("fn fs_main"), "missing fs_main");
    }
}

#[test]
fn lighting_shader_reads_multisampled_inputs() {
    assert!(LIGHTS_SHADER.contains("texture_multisampled_2d<f32>"));
    assert!(LIGHTS_SHADER.contains("texture_depth_multisampled_2d"));
}

#[test]
fn encode_and_decode_use_the_same_projection() {
    assert!(GBUFFER_SHADER.contains("spheremap_encode"));
    assert!(LIGHTS_SHADER.contains("spheremap_decode"));
}
