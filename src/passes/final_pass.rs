//! Final composite pass
//!
//! Re-renders scene geometry with the final material variant, combining
//! sampled albedo with the accumulated light buffer. Depth is bound
//! read-only and tested less-equal against the values the G-Buffer pass
//! wrote; the shared vertex stage reproduces them exactly. The color
//! attachment resolves the multisampled result into the single-sample
//! resolve target as the pass ends.

use super::{draw_geometry, scene_shader, GeometryResources, PassKind};
use crate::backend::traits::*;
use crate::scene::Scene;

/// Pass-view for the final composite phase
pub struct FinalPassView {
    final_target: RenderTarget,
    resolve_target: RenderTarget,
    depth_read_only: TextureViewHandle,
    viewport: ViewportHandle,
}

impl FinalPassView {
    pub fn new(
        final_target: RenderTarget,
        resolve_target: RenderTarget,
        depth: &DepthTarget,
        viewport: ViewportHandle,
    ) -> Self {
        Self {
            final_target,
            resolve_target,
            depth_read_only: depth.read_only_view,
            viewport,
        }
    }

    pub fn final_target(&self) -> &RenderTarget {
        &self.final_target
    }

    pub fn resolve_target(&self) -> &RenderTarget {
        &self.resolve_target
    }

    pub fn render<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        geo: &GeometryResources,
    ) {
        backend.begin_render_pass(&RenderPassDescriptor {
            label: Some("Final Pass".into()),
            color_attachments: vec![ColorAttachment {
                view: self.final_target.render_view,
                resolve_target: Some(self.resolve_target.render_view),
                load_op: LoadOp::Clear([0.0, 0.0, 0.0, 0.0]),
                store_op: StoreOp::Store,
            }],
            depth_stencil_attachment: Some(DepthStencilAttachment::load(self.depth_read_only)),
        });

        backend.apply_viewport(self.viewport);
        draw_geometry(backend, scene, geo, PassKind::FinalPass);

        backend.end_render_pass();
    }
}

/// Final pass shader: the shared scene vertex stage plus a fragment stage
/// that modulates sampled albedo with the accumulated diffuse light and
/// adds the mono specular term scaled by the material's specular albedo.
pub const FINAL_PASS_SHADER: &str = scene_shader!(
    r#"
@group(2) @binding(0) var diffuse_map: texture_2d<f32>;
@group(2) @binding(1) var aniso_sampler: sampler;
@group(2) @binding(2) var<uniform> material: MaterialUniforms;
@group(2) @binding(3) var light_buffer: texture_multisampled_2d<f32>;

const AMBIENT: vec3<f32> = vec3<f32>(0.05, 0.05, 0.06);

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let pixel = vec2<i32>(in.clip_position.xy);
    let light = textureLoad(light_buffer, pixel, 0);

    let albedo = textureSample(diffuse_map, aniso_sampler, in.uv).rgb;
    let color = albedo * (light.rgb + AMBIENT) + material.specular.x * light.a;

    return vec4<f32>(color, 1.0);
}
"#
);
