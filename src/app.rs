//! Frame orchestrator
//!
//! Owns the camera, the scene, the single shared material, and the four
//! pass-views, and runs the per-frame state machine in strict order:
//! timing, light list regeneration, frame-start notification, scene
//! update, then G-Buffer -> light accumulation -> final composite ->
//! backbuffer blit. The graphics backend is owned by the process entry
//! point and passed in by reference.

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::events::{Event, EventBus, FrameStamp, InputAction};
use crate::params::{
    ParameterStore, PARAM_ANISO_SAMPLER, PARAM_DIFFUSE_MAP, PARAM_NORMAL_MAP, PARAM_TIME_FACTORS,
};
use crate::passes::gbuffer::GEOMETRY_STENCIL_REF;
use crate::passes::{
    CompositeView, FinalPassView, GBufferView, GeometryResources, GpuMesh, GpuObject, LightsView,
    PassKind,
};
use crate::scene::{light_grid, Camera, LightMode, RenderObject, Scene, Transform};
use crate::resources::{Effect, Material, Mesh, TextureData};
use crate::screenshot::{self, SCREENSHOT_PREFIX};
use crate::timer::Timer;
use crate::AppConfig;
use glam::{Vec3, Vec4};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Scene root rotation speed in radians per second
const SCENE_ROTATION_RATE: f32 = 0.2;
/// Fixed timer step used on the software fallback adapter
const FALLBACK_TIME_STEP: f32 = 1.0 / 10.0;

/// Per-frame summary for the HUD and callers
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub frame: u64,
    pub framerate: f32,
    pub light_count: u32,
}

/// Input effects collected between frames by the event handler
#[derive(Debug, Default)]
struct PendingInput {
    quit: bool,
    screenshot: bool,
    light_steps: u32,
}

impl PendingInput {
    fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// The application context: all renderer state except the backend itself
pub struct App {
    config: AppConfig,

    camera: Camera,
    scene: Scene,
    materials: Vec<Material>,
    params: ParameterStore,
    events: EventBus,
    input: Rc<RefCell<PendingInput>>,
    timer: Timer,
    light_mode: LightMode,

    resolve_target: RenderTarget,
    frame_buffer: BufferHandle,
    frame_bind_group: BindGroupHandle,
    gpu_meshes: Vec<GpuMesh>,
    gpu_objects: Vec<GpuObject>,

    gbuffer_view: GBufferView,
    lights_view: LightsView,
    final_view: FinalPassView,
    composite_view: CompositeView,

    quit_requested: bool,
    screenshot_pending: bool,
}

impl App {
    /// Build every GPU resource, state object, pipeline, and pass-view.
    /// Any failure here is fatal: a missing target would invalidate all
    /// downstream passes.
    pub fn new<B: GraphicsBackend>(backend: &mut B, config: &AppConfig) -> BackendResult<Self> {
        let (width, height) = (config.width, config.height);
        let samples = config.sample_count;

        // Render targets. G-Buffer holds spheremap-encoded normals plus
        // specular and coverage data; the light buffer accumulates diffuse
        // RGB plus mono specular.
        let gbuffer_target = backend.create_render_target(&RenderTargetDescriptor {
            label: Some("G-Buffer Target".into()),
            width,
            height,
            sample_count: samples,
            format: TextureFormat::Rgba16Float,
            extra_usage: None,
        })?;
        let light_target = backend.create_render_target(&RenderTargetDescriptor {
            label: Some("Light Target".into()),
            width,
            height,
            sample_count: samples,
            format: TextureFormat::Rgba16Float,
            extra_usage: None,
        })?;
        let final_target = backend.create_render_target(&RenderTargetDescriptor {
            label: Some("Final Target".into()),
            width,
            height,
            sample_count: samples,
            format: TextureFormat::Rgb10a2Unorm,
            extra_usage: None,
        })?;
        let resolve_target = backend.create_render_target(&RenderTargetDescriptor {
            label: Some("Resolve Target".into()),
            width,
            height,
            sample_count: 1,
            format: TextureFormat::Rgb10a2Unorm,
            extra_usage: Some(TextureUsage::COPY_SRC),
        })?;
        let depth_target = backend.create_depth_target(&DepthTargetDescriptor {
            label: Some("Depth Target".into()),
            width,
            height,
            sample_count: samples,
            format: TextureFormat::Depth24PlusStencil8,
        })?;

        // One viewport shared by all three scene passes
        let viewport = backend.create_viewport(&ViewportDescriptor::full(width, height))?;

        // Named parameters resolved by the pass effects
        let mut params = ParameterStore::new();
        let sampler =
            backend.create_sampler(&SamplerDescriptor::anisotropic_wrap("Aniso Sampler", 16))?;
        params.set_sampler(PARAM_ANISO_SAMPLER, sampler);

        let diffuse = TextureData::checkerboard(256, 8, [214, 186, 132, 255], [92, 74, 50, 255]);
        let (_, diffuse_view) = diffuse.upload(backend)?;
        params.set_texture(PARAM_DIFFUSE_MAP, diffuse_view);

        let normal_map = TextureData::flat_normal(4);
        let (_, normal_view) = normal_map.upload(backend)?;
        params.set_texture(PARAM_NORMAL_MAP, normal_view);

        // Per-frame and per-object uniform plumbing
        let frame_layout = backend.create_bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX_FRAGMENT,
            ty: BindingType::UniformBuffer,
        }])?;
        let frame_buffer = backend.create_buffer(&BufferDescriptor {
            label: Some("Frame Uniforms".into()),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            mapped_at_creation: false,
        })?;
        let frame_bind_group = backend.create_bind_group(
            frame_layout,
            &[(
                0,
                BindGroupEntry::Buffer {
                    buffer: frame_buffer,
                    offset: 0,
                    size: None,
                },
            )],
        )?;

        let object_layout = backend.create_bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX,
            ty: BindingType::UniformBuffer,
        }])?;

        // Fixed-function states
        let rasterizer_msaa = backend.create_rasterizer_state(&RasterizerStateDescriptor {
            label: Some("Scene RS".into()),
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::Back,
            sample_count: samples,
        })?;

        // G-Buffer: depth test + write, stencil marks every shaded pixel
        let gbuffer_ds = backend.create_depth_stencil_state(&DepthStencilStateDescriptor {
            label: Some("G-Buffer DS".into()),
            format: depth_target.format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: Some(StencilDescriptor {
                compare: CompareFunction::Always,
                fail_op: StencilOperation::Keep,
                depth_fail_op: StencilOperation::Keep,
                pass_op: StencilOperation::Replace,
                read_mask: 0xFF,
                write_mask: 0xFF,
            }),
        })?;

        // Final pass: writes disabled, comparison relaxed to less-equal so
        // re-rendered geometry passes against its own depth
        let final_ds = backend.create_depth_stencil_state(&DepthStencilStateDescriptor {
            label: Some("Final Pass DS".into()),
            format: depth_target.format,
            depth_write_enabled: false,
            depth_compare: CompareFunction::LessEqual,
            stencil: None,
        })?;

        // The shared scene material with one effect per pass
        let mut material = Material::new("scene").with_specular(0.75, 32.0);
        let material_buffer = backend.create_buffer_init(
            &BufferDescriptor {
                label: Some("Material Uniforms".into()),
                size: std::mem::size_of::<MaterialUniform>() as u64,
                usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
                mapped_at_creation: false,
            },
            bytemuck::bytes_of(&material.uniform_data()),
        )?;

        let aniso_sampler = params
            .sampler(PARAM_ANISO_SAMPLER)
            .ok_or_else(|| BackendError::MissingParameter(PARAM_ANISO_SAMPLER.into()))?;
        let diffuse_map = params
            .texture(PARAM_DIFFUSE_MAP)
            .ok_or_else(|| BackendError::MissingParameter(PARAM_DIFFUSE_MAP.into()))?;
        let normal_map = params
            .texture(PARAM_NORMAL_MAP)
            .ok_or_else(|| BackendError::MissingParameter(PARAM_NORMAL_MAP.into()))?;

        let gbuffer_material_layout = backend.create_bind_group_layout(&[
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
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::UniformBuffer,
            },
        ])?;
        let gbuffer_material_bind_group = backend.create_bind_group(
            gbuffer_material_layout,
            &[
                (0, BindGroupEntry::Texture(normal_map)),
                (1, BindGroupEntry::Sampler(aniso_sampler)),
                (
                    2,
                    BindGroupEntry::Buffer {
                        buffer: material_buffer,
                        offset: 0,
                        size: None,
                    },
                ),
            ],
        )?;

        let final_material_layout = backend.create_bind_group_layout(&[
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
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::UniformBuffer,
            },
            BindGroupLayoutEntry {
                binding: 3,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: false },
                    multisampled: true,
                },
            },
        ])?;
        let final_material_bind_group = backend.create_bind_group(
            final_material_layout,
            &[
                (0, BindGroupEntry::Texture(diffuse_map)),
                (1, BindGroupEntry::Sampler(aniso_sampler)),
                (
                    2,
                    BindGroupEntry::Buffer {
                        buffer: material_buffer,
                        offset: 0,
                        size: None,
                    },
                ),
                (3, BindGroupEntry::Texture(light_target.shader_view)),
            ],
        )?;

        let gbuffer_pipeline = backend.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("G-Buffer Pipeline".into()),
            shader_source: crate::passes::gbuffer::GBUFFER_SHADER.to_string(),
            vertex_layouts: vec![Vertex::layout()],
            bind_group_layouts: vec![frame_layout, object_layout, gbuffer_material_layout],
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterizer_state: rasterizer_msaa,
            depth_stencil_state: Some(gbuffer_ds),
            color_targets: vec![ColorTargetState {
                format: gbuffer_target.format,
                blend: None,
            }],
        })?;

        let final_pipeline = backend.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Final Pass Pipeline".into()),
            shader_source: crate::passes::final_pass::FINAL_PASS_SHADER.to_string(),
            vertex_layouts: vec![Vertex::layout()],
            bind_group_layouts: vec![frame_layout, object_layout, final_material_layout],
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterizer_state: rasterizer_msaa,
            depth_stencil_state: Some(final_ds),
            color_targets: vec![ColorTargetState {
                format: final_target.format,
                blend: None,
            }],
        })?;

        material.set_effect(
            PassKind::GBuffer,
            Effect {
                pipeline: gbuffer_pipeline,
                material_bind_group: gbuffer_material_bind_group,
                stencil_reference: GEOMETRY_STENCIL_REF,
            },
        );
        material.set_effect(
            PassKind::FinalPass,
            Effect {
                pipeline: final_pipeline,
                material_bind_group: final_material_bind_group,
                stencil_reference: 0,
            },
        );
        let materials = vec![material];

        // Sample scene: a ground plane with a few cubes inside the light
        // grid extents
        let meshes = [Mesh::plane(12.0, 4.0), Mesh::cube(1.5)];
        let mut scene = Scene::new();
        scene.add_object(RenderObject::new(0, 0));
        scene.add_object(
            RenderObject::new(1, 0)
                .with_transform(Transform::from_position(Vec3::new(-2.0, 0.75, -2.0))),
        );
        scene.add_object(
            RenderObject::new(1, 0)
                .with_transform(Transform::from_position(Vec3::new(2.0, 0.75, 2.0))),
        );
        scene.add_object(RenderObject::new(1, 0).with_transform(
            Transform::from_position_scale(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(1.4)),
        ));

        let mut gpu_meshes = Vec::new();
        for mesh in &meshes {
            let vertex_buffer = backend.create_buffer_init(
                &BufferDescriptor {
                    label: Some(format!("{} Vertices", mesh.name)),
                    size: mesh.vertex_bytes().len() as u64,
                    usage: BufferUsage::VERTEX,
                    mapped_at_creation: false,
                },
                mesh.vertex_bytes(),
            )?;
            let index_buffer = backend.create_buffer_init(
                &BufferDescriptor {
                    label: Some(format!("{} Indices", mesh.name)),
                    size: mesh.index_bytes().len() as u64,
                    usage: BufferUsage::INDEX,
                    mapped_at_creation: false,
                },
                mesh.index_bytes(),
            )?;
            gpu_meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.index_count() as u32,
            });
        }

        let mut gpu_objects = Vec::new();
        for (index, object) in scene.objects.iter().enumerate() {
            let model = object.transform.matrix();
            let uniform = ObjectUniform {
                model,
                normal_matrix: model.inverse().transpose(),
            };
            let uniform_buffer = backend.create_buffer_init(
                &BufferDescriptor {
                    label: Some(format!("Object Uniforms {}", index)),
                    size: std::mem::size_of::<ObjectUniform>() as u64,
                    usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
                    mapped_at_creation: false,
                },
                bytemuck::bytes_of(&uniform),
            )?;
            let bind_group = backend.create_bind_group(
                object_layout,
                &[(
                    0,
                    BindGroupEntry::Buffer {
                        buffer: uniform_buffer,
                        offset: 0,
                        size: None,
                    },
                )],
            )?;
            gpu_objects.push(GpuObject {
                uniform_buffer,
                bind_group,
            });
        }

        // Pass-views. The lights view is sized for the densest light mode.
        let light_mode = LightMode::new(config.light_mode_levels);
        let max_side = 3 + 2 * (config.light_mode_levels.saturating_sub(1));
        let light_capacity = max_side * max_side * max_side;

        let gbuffer_view = GBufferView::new(gbuffer_target, depth_target, viewport);
        let lights_view = LightsView::new(
            backend,
            frame_layout,
            &gbuffer_target,
            &depth_target,
            light_target,
            viewport,
            samples,
            light_capacity,
        )?;
        let final_view = FinalPassView::new(final_target, resolve_target, &depth_target, viewport);
        let composite_view = CompositeView::new(backend, &resolve_target)?;

        let mut camera = Camera::new(Vec3::new(4.0, 4.5, -4.0), Vec3::new(0.0, 1.5, 0.0));
        camera.set_projection(
            std::f32::consts::FRAC_PI_2,
            width as f32 / height as f32,
            1.0,
            15.0,
        );

        let mut timer = Timer::new();
        if backend.is_fallback_adapter() {
            log::warn!("Running on the software fallback adapter; using a fixed time step");
            timer.set_fixed_step(FALLBACK_TIME_STEP);
        }

        let mut events = EventBus::new();
        let input = Rc::new(RefCell::new(PendingInput::default()));
        let handler_input = Rc::clone(&input);
        events.subscribe(0, move |event| match event {
            Event::ActionReleased(InputAction::Quit) => {
                handler_input.borrow_mut().quit = true;
                true
            }
            Event::ActionReleased(InputAction::CaptureScreenshot) => {
                handler_input.borrow_mut().screenshot = true;
                true
            }
            Event::ActionPressed(InputAction::CycleLightMode) => {
                handler_input.borrow_mut().light_steps += 1;
                true
            }
            _ => false,
        });

        Ok(Self {
            config: config.clone(),
            camera,
            scene,
            materials,
            params,
            events,
            input,
            timer,
            light_mode,
            resolve_target,
            frame_buffer,
            frame_bind_group,
            gpu_meshes,
            gpu_objects,
            gbuffer_view,
            lights_view,
            final_view,
            composite_view,
            quit_requested: false,
            screenshot_pending: false,
        })
    }

    /// Run one frame: steps 1-8 of the per-frame state machine, through
    /// the backbuffer composite. Present and the deferred screenshot are
    /// driven by the caller via `end_frame` and [`App::after_present`].
    /// Once termination has been requested no further updates occur.
    pub fn frame<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        ctx: &FrameContext,
    ) -> BackendResult<FrameStats> {
        self.apply_pending_input();
        if self.quit_requested {
            return Ok(self.stats());
        }

        // 1. Timing
        self.timer.tick();
        let delta = self.timer.delta();
        let time_factors = Vec4::new(
            delta,
            self.timer.framerate(),
            self.timer.runtime(),
            self.timer.frame_count() as f32,
        );
        self.params.set_vector(PARAM_TIME_FACTORS, time_factors);

        // 2. Per-frame light list
        let lights = light_grid(&self.light_mode);
        self.lights_view.set_lights(&lights);

        // 3. Frame-start notification
        self.events.publish(&Event::FrameStart(FrameStamp {
            frame: self.timer.frame_count(),
            delta,
            runtime: self.timer.runtime(),
        }));

        // 4. Scene transform update
        self.scene.root.rotate_y(delta * SCENE_ROTATION_RATE);
        self.scene.update(delta);

        // Frame and object uniforms are written once; both geometry passes
        // read the same buffers.
        let frame_uniform =
            self.camera
                .frame_uniform(time_factors, self.config.width, self.config.height);
        backend.write_buffer(self.frame_buffer, 0, bytemuck::bytes_of(&frame_uniform));
        for (index, gpu_object) in self.gpu_objects.iter().enumerate() {
            let model = self.scene.world_matrix(index);
            let uniform = ObjectUniform {
                model,
                normal_matrix: model.inverse().transpose(),
            };
            backend.write_buffer(gpu_object.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
        }

        // 5. G-Buffer pass
        let geo = GeometryResources {
            frame_bind_group: self.frame_bind_group,
            meshes: &self.gpu_meshes,
            objects: &self.gpu_objects,
            materials: &self.materials,
        };
        self.gbuffer_view.render(backend, &self.scene, &geo);

        // 6. Light accumulation pass
        self.lights_view.render(backend, self.frame_bind_group);

        // 7. Final composite pass (resolves into the resolve target)
        let geo = GeometryResources {
            frame_bind_group: self.frame_bind_group,
            meshes: &self.gpu_meshes,
            objects: &self.gpu_objects,
            materials: &self.materials,
        };
        self.final_view.render(backend, &self.scene, &geo);

        // 8. Backbuffer composite; the HUD is layered on by the caller
        self.composite_view.render(backend, ctx.swapchain_view);

        Ok(self.stats())
    }

    /// Write the deferred screenshot, if one was requested. Called after
    /// present; captures exactly once and resets the flag.
    pub fn after_present<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
    ) -> BackendResult<Option<PathBuf>> {
        if !self.screenshot_pending {
            return Ok(None);
        }
        self.screenshot_pending = false;

        let readback = backend.read_texture(self.resolve_target.texture)?;
        let path = self.config.screenshot_dir.join(format!(
            "{}{}.png",
            SCREENSHOT_PREFIX,
            self.timer.frame_count()
        ));
        screenshot::save(&readback, &path).map_err(BackendError::ReadbackFailed)?;
        log::info!("Saved screenshot to {}", path.display());
        Ok(Some(path))
    }

    fn apply_pending_input(&mut self) {
        let pending = self.input.borrow_mut().take();
        if pending.quit && !self.quit_requested {
            self.quit_requested = true;
            log::info!("Termination requested");
        }
        if pending.screenshot {
            self.screenshot_pending = true;
        }
        for _ in 0..pending.light_steps {
            self.light_mode.advance();
        }
    }

    fn stats(&self) -> FrameStats {
        FrameStats {
            frame: self.timer.frame_count(),
            framerate: self.timer.framerate(),
            light_count: self.light_mode.light_count(),
        }
    }

    /// True once escape has requested termination
    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    /// True while a screenshot capture is deferred to the next present
    pub fn screenshot_pending(&self) -> bool {
        self.screenshot_pending
    }

    /// HUD overlay lines: framerate and the light-mode summary
    pub fn hud_lines(&self) -> [String; 2] {
        [
            format!("FPS: {:.0}", self.timer.framerate()),
            self.light_mode.describe(),
        ]
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn light_mode(&self) -> &LightMode {
        &self.light_mode
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

impl Drop for App {
    fn drop(&mut self) {
        log::info!("Max FPS: {:.1}", self.timer.max_framerate());
    }
}
