//! Backbuffer composite
//!
//! Clears the swapchain image and draws the resolved final target across
//! it as a fullscreen textured triangle. The HUD overlay is rendered on
//! top by the demo before present.

use crate::backend::traits::*;
use crate::backend::types::*;

/// Pass-view blitting the resolved image to the backbuffer
pub struct CompositeView {
    pipeline: RenderPipelineHandle,
    bind_group: BindGroupHandle,
}

impl CompositeView {
    pub fn new<B: GraphicsBackend>(
        backend: &mut B,
        resolve_target: &RenderTarget,
    ) -> BackendResult<Self> {
        let sampler = backend.create_sampler(&SamplerDescriptor {
            label: Some("Composite Sampler".into()),
            ..Default::default()
        })?;

        let layout = backend.create_bind_group_layout(&[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    multisampled: false,
                },
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Sampler { comparison: false },
            },
        ])?;

        let bind_group = backend.create_bind_group(
            layout,
            &[
                (0, BindGroupEntry::Texture(resolve_target.shader_view)),
                (1, BindGroupEntry::Sampler(sampler)),
            ],
        )?;

        let rasterizer_state = backend.create_rasterizer_state(&RasterizerStateDescriptor {
            label: Some("Composite RS".into()),
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
            sample_count: 1,
        })?;

        let pipeline = backend.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Composite Pipeline".into()),
            shader_source: COMPOSITE_SHADER.to_string(),
            vertex_layouts: vec![],
            bind_group_layouts: vec![layout],
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterizer_state,
            depth_stencil_state: None,
            color_targets: vec![ColorTargetState {
                format: backend.swapchain_format(),
                blend: None,
            }],
        })?;

        Ok(Self {
            pipeline,
            bind_group,
        })
    }

    pub fn render<B: GraphicsBackend>(&self, backend: &mut B, backbuffer: TextureViewHandle) {
        backend.begin_render_pass(&RenderPassDescriptor {
            label: Some("Composite Pass".into()),
            color_attachments: vec![ColorAttachment {
                view: backbuffer,
                resolve_target: None,
                load_op: LoadOp::Clear([0.0, 0.0, 0.0, 0.0]),
                store_op: StoreOp::Store,
            }],
            depth_stencil_attachment: None,
        });

        backend.set_render_pipeline(self.pipeline);
        backend.set_bind_group(0, self.bind_group);
        backend.draw(0..3, 0..1);

        backend.end_render_pass();
    }
}

/// Fullscreen blit of the resolved image
pub const COMPOSITE_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@group(0) @binding(0) var resolve_tex: texture_2d<f32>;
@group(0) @binding(1) var resolve_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var out: VertexOutput;

    let x = f32((vertex_index << 1u) & 2u);
    let y = f32(vertex_index & 2u);
    out.position = vec4<f32>(x * 2.0 - 1.0, y * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, 1.0 - y);

    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(resolve_tex, resolve_sampler, in.uv).rgb, 1.0);
}
"#;
