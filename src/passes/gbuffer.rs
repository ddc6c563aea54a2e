//! G-Buffer fill pass
//!
//! Renders scene geometry into the normal/specular/coverage buffer while
//! writing scene depth and marking touched pixels in the stencil buffer.

use super::{draw_geometry, scene_shader, GeometryResources, PassKind};
use crate::backend::traits::*;
use crate::scene::Scene;

/// Stencil value written for every shaded pixel; the light and final
/// passes only touch pixels carrying it
pub const GEOMETRY_STENCIL_REF: u32 = 1;

/// Pass-view for the G-Buffer phase
pub struct GBufferView {
    gbuffer: RenderTarget,
    depth: DepthTarget,
    viewport: ViewportHandle,
}

impl GBufferView {
    pub fn new(gbuffer: RenderTarget, depth: DepthTarget, viewport: ViewportHandle) -> Self {
        Self {
            gbuffer,
            depth,
            viewport,
        }
    }

    pub fn gbuffer(&self) -> &RenderTarget {
        &self.gbuffer
    }

    pub fn depth(&self) -> &DepthTarget {
        &self.depth
    }

    /// Bind the G-Buffer color target and the writable depth view, clear
    /// both, and submit the scene with the G-Buffer material variant.
    pub fn render<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        scene: &Scene,
        geo: &GeometryResources,
    ) {
        backend.begin_render_pass(&RenderPassDescriptor {
            label: Some("G-Buffer Pass".into()),
            color_attachments: vec![ColorAttachment {
                view: self.gbuffer.render_view,
                resolve_target: None,
                load_op: LoadOp::Clear([0.0, 0.0, 0.0, 0.0]),
                store_op: StoreOp::Store,
            }],
            depth_stencil_attachment: Some(DepthStencilAttachment::clear(
                self.depth.depth_view,
                1.0,
                0,
            )),
        });

        backend.apply_viewport(self.viewport);
        draw_geometry(backend, scene, geo, PassKind::GBuffer);

        backend.end_render_pass();
    }
}

/// G-Buffer shader: shared scene vertex stage plus a fragment stage that
/// packs the spheremap-encoded view-space normal, mono specular data, and
/// the sample coverage flag.
pub const GBUFFER_SHADER: &str = scene_shader!(
    r#"
@group(2) @binding(0) var normal_map: texture_2d<f32>;
@group(2) @binding(1) var aniso_sampler: sampler;
@group(2) @binding(2) var<uniform> material: MaterialUniforms;

// Specular power is stored normalized by this factor and expanded again by
// the lighting shader.
const SPECULAR_POWER_SCALE: f32 = 64.0;

// Lambert azimuthal equal-area projection of a view-space normal. The
// singularity sits at z = -1, which back-face culling keeps out of the
// G-Buffer.
fn spheremap_encode(n: vec3<f32>) -> vec2<f32> {
    let f = sqrt(8.0 * max(n.z, -0.999) + 8.0);
    return n.xy / f + 0.5;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(sample_mask) coverage_mask: u32) -> @location(0) vec4<f32> {
    let tbn = mat3x3<f32>(
        normalize(in.view_tangent),
        normalize(in.view_bitangent),
        normalize(in.view_normal),
    );
    let tangent_normal = textureSample(normal_map, aniso_sampler, in.uv).xyz * 2.0 - 1.0;
    let n = normalize(tbn * tangent_normal);

    let enc = spheremap_encode(n);
    let coverage = f32(countOneBits(coverage_mask)) / 4.0;
    return vec4<f32>(enc, material.specular.y / SPECULAR_POWER_SCALE, coverage);
}
"#
);
