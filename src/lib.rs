//! Light prepass renderer built on a thin graphics backend abstraction
//!
//! Renders a static scene in three strictly ordered passes per frame:
//! 1. G-Buffer fill - geometry into a normal/specular/coverage buffer with
//!    depth writes and stencil marking
//! 2. Light accumulation - one additive fullscreen draw per point light,
//!    sampling the G-Buffer and a read-only view of the scene depth
//! 3. Final composite - geometry again, combining material albedo with the
//!    accumulated light buffer, resolved from MSAA before presentation
//!
//! The resolved image is blitted to the backbuffer with an FPS/light-count
//! overlay on top. A key action cycles the density of the procedurally
//! generated light grid.

pub mod app;
pub mod backend;
pub mod events;
pub mod hud;
pub mod params;
pub mod passes;
pub mod resources;
pub mod scene;
pub mod screenshot;
pub mod timer;
pub mod window;

pub use app::{App, FrameStats};
pub use backend::wgpu_backend::WgpuBackend;
pub use events::{Event, EventBus, FrameStamp, InputAction};
pub use window::Window;

use std::path::PathBuf;

/// Configuration for the renderer application
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title
    pub title: String,
    /// Render target width
    pub width: u32,
    /// Render target height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// MSAA sample count for the scene targets
    pub sample_count: u32,
    /// Number of discrete light-mode levels (level L yields (3+2L)^3 lights)
    pub light_mode_levels: u32,
    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Light Prepass".to_string(),
            width: 1024,
            height: 576,
            vsync: true,
            sample_count: 4,
            light_mode_levels: 5,
            screenshot_dir: PathBuf::from("."),
        }
    }
}
