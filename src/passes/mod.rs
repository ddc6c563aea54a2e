//! The three-pass light prepass pipeline
//!
//! Each pass-view binds its own target set and owns draw submission for one
//! rendering phase. The frame orchestrator runs them in strict order:
//! G-Buffer fill, per-light accumulation, final composite, then the
//! backbuffer blit of the resolved image.

pub mod composite;
pub mod final_pass;
pub mod gbuffer;
pub mod lights;

pub use composite::CompositeView;
pub use final_pass::FinalPassView;
pub use gbuffer::GBufferView;
pub use lights::LightsView;

pub use crate::resources::PassKind;

use crate::backend::traits::*;
use crate::backend::types::IndexFormat;
use crate::resources::Material;
use crate::scene::Scene;

/// GPU-resident mesh buffers
pub struct GpuMesh {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
}

/// Per-object GPU resources: the transform uniform and its bind group
pub struct GpuObject {
    pub uniform_buffer: BufferHandle,
    pub bind_group: BindGroupHandle,
}

/// Geometry-pass resources borrowed from the orchestrator for one render
/// call
pub struct GeometryResources<'a> {
    pub frame_bind_group: BindGroupHandle,
    pub meshes: &'a [GpuMesh],
    pub objects: &'a [GpuObject],
    pub materials: &'a [Material],
}

/// Submit every scene object using the material effect selected by `pass`.
/// Both geometry passes go through this one path, so the vertex work
/// submitted per object is identical between them.
pub fn draw_geometry<B: GraphicsBackend>(
    backend: &mut B,
    scene: &Scene,
    geo: &GeometryResources,
    pass: PassKind,
) {
    backend.set_bind_group(0, geo.frame_bind_group);

    for (index, object) in scene.objects.iter().enumerate() {
        let Some(material) = geo.materials.get(object.material_id) else {
            continue;
        };
        let Some(effect) = material.effect(pass) else {
            continue;
        };
        let Some(mesh) = geo.meshes.get(object.mesh_id) else {
            continue;
        };
        let Some(gpu_object) = geo.objects.get(index) else {
            continue;
        };

        backend.set_render_pipeline(effect.pipeline);
        backend.set_stencil_reference(effect.stencil_reference);
        backend.set_bind_group(1, gpu_object.bind_group);
        backend.set_bind_group(2, effect.material_bind_group);
        backend.set_vertex_buffer(0, mesh.vertex_buffer, 0);
        backend.set_index_buffer(mesh.index_buffer, 0, IndexFormat::Uint32);
        backend.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

// The vertex stage shared verbatim by the G-Buffer and final pass shaders.
// Both passes must reproduce clip-space depth bit-for-bit for the final
// pass's less-equal depth test to pass, so both shaders are assembled by
// splicing their fragment stage onto this single literal.
macro_rules! scene_shader {
    ($fragment:literal) => {
        concat!(
            r#"
struct FrameUniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    view_proj: mat4x4<f32>,
    inv_proj: mat4x4<f32>,
    time_factors: vec4<f32>,
    target_size: vec4<f32>,
}

struct ObjectUniforms {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
}

struct MaterialUniforms {
    // x: mono specular albedo, y: specular power
    specular: vec4<f32>,
}

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(1) @binding(0) var<uniform> object: ObjectUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
    @location(1) view_tangent: vec3<f32>,
    @location(2) view_bitangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;

    let world_pos = object.model * vec4<f32>(in.position, 1.0);
    out.clip_position = frame.view_proj * world_pos;

    let world_normal = (object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    let world_tangent = (object.model * vec4<f32>(in.tangent.xyz, 0.0)).xyz;
    out.view_normal = normalize((frame.view * vec4<f32>(world_normal, 0.0)).xyz);
    out.view_tangent = normalize((frame.view * vec4<f32>(world_tangent, 0.0)).xyz);
    out.view_bitangent = cross(out.view_normal, out.view_tangent) * in.tangent.w;
    out.uv = in.uv;

    return out;
}
"#,
            $fragment
        )
    };
}
pub(crate) use scene_shader;

/// The shared vertex stage source, exported so its identity in both
/// geometry shaders can be asserted
pub const SCENE_VERTEX_STAGE: &str = scene_shader!("");
