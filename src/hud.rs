//! On-screen HUD overlay
//!
//! Draws the framerate and light-mode text over the composited frame via
//! egui. Positions match the classic layout: the FPS counter near the top
//! left corner, the light-mode line above the bottom edge.

use crate::backend::traits::TextureViewHandle;
use crate::backend::wgpu_backend::WgpuBackend;
use egui::ViewportId;
use egui_wgpu::ScreenDescriptor;
use winit::window::Window;

/// HUD text margin from the left edge, in points
const HUD_MARGIN_X: f32 = 30.0;
/// FPS counter distance from the top edge
const HUD_FPS_Y: f32 = 30.0;
/// Light-mode line offset from the bottom edge
const LIGHT_MODE_BOTTOM_OFFSET: f32 = 100.0;

/// egui-based HUD renderer for the wgpu backend
pub struct HudOverlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
}

impl HudOverlay {
    pub fn new(backend: &WgpuBackend, window: &Window) -> Self {
        let ctx = egui::Context::default();

        let winit_state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );

        let renderer =
            egui_wgpu::Renderer::new(backend.device(), backend.wgpu_surface_format(), None, 1);

        Self {
            ctx,
            winit_state,
            renderer,
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
        }
    }

    /// Forward a window event to egui
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Lay out the overlay text for this frame
    pub fn prepare(&mut self, window: &Window, lines: &[String], screen_height: u32) {
        let raw_input = self.winit_state.take_egui_input(window);
        self.ctx.begin_frame(raw_input);

        if let Some(fps_line) = lines.first() {
            egui::Area::new(egui::Id::new("hud_fps"))
                .fixed_pos(egui::pos2(HUD_MARGIN_X, HUD_FPS_Y))
                .show(&self.ctx, |ui| {
                    ui.label(
                        egui::RichText::new(fps_line)
                            .color(egui::Color32::WHITE)
                            .size(16.0),
                    );
                });
        }
        if let Some(light_line) = lines.get(1) {
            let y = screen_height as f32 / self.ctx.pixels_per_point() - LIGHT_MODE_BOTTOM_OFFSET;
            egui::Area::new(egui::Id::new("hud_light_mode"))
                .fixed_pos(egui::pos2(HUD_MARGIN_X, y))
                .show(&self.ctx, |ui| {
                    ui.label(
                        egui::RichText::new(light_line)
                            .color(egui::Color32::WHITE)
                            .size(16.0),
                    );
                });
        }

        let full_output = self.ctx.end_frame();
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        self.paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.textures_delta = full_output.textures_delta;
    }

    /// Render the prepared overlay onto the swapchain view
    pub fn render(
        &mut self,
        backend: &mut WgpuBackend,
        swapchain_view: TextureViewHandle,
        screen_width: u32,
        screen_height: u32,
    ) {
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [screen_width, screen_height],
            pixels_per_point: self.ctx.pixels_per_point(),
        };

        let (device, queue, encoder) = backend.device_queue_encoder();

        for (id, image_delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        if let Some(encoder) = encoder {
            self.renderer.update_buffers(
                device,
                queue,
                encoder,
                &self.paint_jobs,
                &screen_descriptor,
            );
        }

        backend.render_egui(
            &self.renderer,
            &self.paint_jobs,
            &screen_descriptor,
            swapchain_view,
        );

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta = egui::TexturesDelta::default();
    }
}
