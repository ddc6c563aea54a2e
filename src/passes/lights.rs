//! Light accumulation pass
//!
//! Consumes the G-Buffer and the read-only depth view, then accumulates
//! one fullscreen draw per light into the light buffer with additive
//! blending. The blend is commutative, so accumulation order never changes
//! the result. An empty light list still clears the target: downstream
//! passes always read a defined zero contribution.

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::scene::{GpuLight, Light};

use super::gbuffer::GEOMETRY_STENCIL_REF;

/// Pass-view for the light accumulation phase
pub struct LightsView {
    light_target: RenderTarget,
    depth_read_only: TextureViewHandle,
    viewport: ViewportHandle,
    pipeline: RenderPipelineHandle,
    inputs_bind_group: BindGroupHandle,
    light_buffer: BufferHandle,
    capacity: u32,
    lights: Vec<Light>,
}

impl LightsView {
    /// Create the pass-view: the light storage buffer sized for `capacity`
    /// lights, the G-Buffer/depth input bind group, and the additive
    /// accumulation pipeline with stencil testing against the geometry
    /// mark.
    #[allow(clippy::too_many_arguments)]
    pub fn new<B: GraphicsBackend>(
        backend: &mut B,
        frame_layout: BindGroupLayoutHandle,
        gbuffer: &RenderTarget,
        depth: &DepthTarget,
        light_target: RenderTarget,
        viewport: ViewportHandle,
        sample_count: u32,
        capacity: u32,
    ) -> BackendResult<Self> {
        let buffer_size = capacity as u64 * std::mem::size_of::<GpuLight>() as u64;
        let light_buffer = backend.create_buffer(&BufferDescriptor {
            label: Some("Light List".into()),
            size: buffer_size.max(std::mem::size_of::<GpuLight>() as u64),
            usage: BufferUsage::STORAGE | BufferUsage::COPY_DST,
            mapped_at_creation: false,
        })?;

        let inputs_layout = backend.create_bind_group_layout(&[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: false },
                    multisampled: true,
                },
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Depth,
                    multisampled: true,
                },
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::StorageBuffer { read_only: true },
            },
        ])?;

        let inputs_bind_group = backend.create_bind_group(
            inputs_layout,
            &[
                (0, BindGroupEntry::Texture(gbuffer.shader_view)),
                (1, BindGroupEntry::Texture(depth.shader_view)),
                (
                    2,
                    BindGroupEntry::Buffer {
                        buffer: light_buffer,
                        offset: 0,
                        size: None,
                    },
                ),
            ],
        )?;

        // Depth writes stay off and the stencil write mask is zero: the
        // attachment is a read-only view, this state only tests.
        let depth_stencil_state = backend.create_depth_stencil_state(&DepthStencilStateDescriptor {
            label: Some("Light Accumulation DS".into()),
            format: depth.format,
            depth_write_enabled: false,
            depth_compare: CompareFunction::Always,
            stencil: Some(StencilDescriptor {
                compare: CompareFunction::Equal,
                fail_op: StencilOperation::Keep,
                depth_fail_op: StencilOperation::Keep,
                pass_op: StencilOperation::Keep,
                read_mask: 0xFF,
                write_mask: 0,
            }),
        })?;

        let rasterizer_state = backend.create_rasterizer_state(&RasterizerStateDescriptor {
            label: Some("Light Accumulation RS".into()),
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
            sample_count,
        })?;

        let pipeline = backend.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Light Accumulation Pipeline".into()),
            shader_source: LIGHTS_SHADER.to_string(),
            vertex_layouts: vec![],
            bind_group_layouts: vec![frame_layout, inputs_layout],
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterizer_state,
            depth_stencil_state: Some(depth_stencil_state),
            color_targets: vec![ColorTargetState {
                format: light_target.format,
                blend: Some(BlendState::additive()),
            }],
        })?;

        Ok(Self {
            light_target,
            depth_read_only: depth.read_only_view,
            viewport,
            pipeline,
            inputs_bind_group,
            light_buffer,
            capacity,
            lights: Vec::new(),
        })
    }

    /// Replace the per-frame light list. Lights beyond the buffer capacity
    /// are dropped with a warning.
    pub fn set_lights(&mut self, lights: &[Light]) {
        self.lights.clear();
        if lights.len() as u32 > self.capacity {
            log::warn!(
                "Light list ({}) exceeds capacity ({}); extra lights dropped",
                lights.len(),
                self.capacity
            );
        }
        self.lights
            .extend(lights.iter().take(self.capacity as usize));
    }

    /// Append a single light for this frame
    pub fn add_light(&mut self, light: Light) {
        if (self.lights.len() as u32) < self.capacity {
            self.lights.push(light);
        } else {
            log::warn!("Light list full ({}); light dropped", self.capacity);
        }
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn light_target(&self) -> &RenderTarget {
        &self.light_target
    }

    /// Upload the light list and accumulate every light into the light
    /// target with one fullscreen draw each. The light list is consumed:
    /// it is cleared once the pass has been recorded.
    pub fn render<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        frame_bind_group: BindGroupHandle,
    ) {
        if !self.lights.is_empty() {
            let gpu_lights: Vec<GpuLight> = self.lights.iter().map(Light::to_gpu).collect();
            backend.write_buffer(self.light_buffer, 0, bytemuck::cast_slice(&gpu_lights));
        }

        backend.begin_render_pass(&RenderPassDescriptor {
            label: Some("Light Accumulation Pass".into()),
            color_attachments: vec![ColorAttachment {
                view: self.light_target.render_view,
                resolve_target: None,
                load_op: LoadOp::Clear([0.0, 0.0, 0.0, 0.0]),
                store_op: StoreOp::Store,
            }],
            depth_stencil_attachment: Some(DepthStencilAttachment::load(self.depth_read_only)),
        });

        backend.apply_viewport(self.viewport);

        if !self.lights.is_empty() {
            backend.set_render_pipeline(self.pipeline);
            backend.set_stencil_reference(GEOMETRY_STENCIL_REF);
            backend.set_bind_group(0, frame_bind_group);
            backend.set_bind_group(1, self.inputs_bind_group);

            for index in 0..self.lights.len() as u32 {
                backend.draw(0..3, index..index + 1);
            }
        }

        backend.end_render_pass();

        self.lights.clear();
    }
}

/// Light accumulation shader: a fullscreen triangle per light. Surface
/// position is reconstructed from the sampled depth, the normal is
/// spheremap-decoded from the G-Buffer, and a point-light term with linear
/// distance falloff is written out as rgb diffuse plus mono specular in
/// alpha.
pub const LIGHTS_SHADER: &str = r#"
struct FrameUniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    view_proj: mat4x4<f32>,
    inv_proj: mat4x4<f32>,
    time_factors: vec4<f32>,
    target_size: vec4<f32>,
}

struct PointLight {
    // xyz = world position, w = range
    position_range: vec4<f32>,
    // xyz = color, w = unused
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(1) @binding(0) var gbuffer_tex: texture_multisampled_2d<f32>;
@group(1) @binding(1) var depth_tex: texture_depth_multisampled_2d;
@group(1) @binding(2) var<storage, read> lights: array<PointLight>;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) @interpolate(flat) light_index: u32,
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    var out: VertexOutput;

    // Fullscreen triangle; one instance per light
    let x = f32((vertex_index << 1u) & 2u);
    let y = f32(vertex_index & 2u);
    out.position = vec4<f32>(x * 2.0 - 1.0, y * 2.0 - 1.0, 0.0, 1.0);
    out.light_index = instance_index;

    return out;
}

const SPECULAR_POWER_SCALE: f32 = 64.0;

// Inverse of the G-Buffer spheremap encoding
fn spheremap_decode(enc: vec2<f32>) -> vec3<f32> {
    let fenc = enc * 4.0 - 2.0;
    let f = dot(fenc, fenc);
    let g = sqrt(max(1.0 - f / 4.0, 0.0));
    return vec3<f32>(fenc * g, 1.0 - f / 2.0);
}

fn reconstruct_view_position(pixel: vec2<f32>, depth: f32) -> vec3<f32> {
    let uv = pixel * frame.target_size.zw;
    let ndc = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, depth, 1.0);
    let pos = frame.inv_proj * ndc;
    return pos.xyz / pos.w;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let pixel = vec2<i32>(in.position.xy);

    let depth = textureLoad(depth_tex, pixel, 0);
    if depth >= 1.0 {
        return vec4<f32>(0.0);
    }

    let gbuf = textureLoad(gbuffer_tex, pixel, 0);
    let n = spheremap_decode(gbuf.xy);
    let view_pos = reconstruct_view_position(in.position.xy, depth);

    let light = lights[in.light_index];
    let light_pos = (frame.view * vec4<f32>(light.position_range.xyz, 1.0)).xyz;
    let to_light = light_pos - view_pos;
    let dist = length(to_light);
    let range = light.position_range.w;

    // Depth-bounded light volume: zero contribution past the range
    if dist >= range {
        return vec4<f32>(0.0);
    }

    let l = to_light / dist;
    let attenuation = 1.0 - dist / range;
    let ndotl = max(dot(n, l), 0.0);

    let v = normalize(-view_pos);
    let h = normalize(l + v);
    let specular_power = max(gbuf.z * SPECULAR_POWER_SCALE, 1.0);
    let specular = pow(max(dot(n, h), 0.0), specular_power);

    let diffuse = light.color.xyz * ndotl * attenuation;
    let luminance = dot(light.color.xyz, vec3<f32>(0.299, 0.587, 0.114));
    let mono_specular = specular * ndotl * attenuation * luminance;

    return vec4<f32>(diffuse, mono_specular);
}
"#;
