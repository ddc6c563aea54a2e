//! Light prepass renderer demo
//!
//! Run with:
//!   cargo run --example light_prepass
//!   cargo run --example light_prepass -- --no-vsync
//!
//! Controls:
//!   L        - Cycle light grid density
//!   S        - Save a screenshot after the next frame
//!   Escape   - Exit

use clap::Parser;
use prepass_renderer::{
    backend::{BackendError, GraphicsBackend},
    hud::HudOverlay,
    window::translate_key,
    App, AppConfig, Event as BusEvent, WgpuBackend, Window,
};
use std::path::PathBuf;
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
};

#[derive(Parser)]
#[command(about = "Light prepass deferred renderer demo")]
struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 576)]
    height: u32,

    /// Disable vsync
    #[arg(long)]
    no_vsync: bool,

    /// Directory screenshots are written to
    #[arg(long, default_value = ".")]
    screenshot_dir: PathBuf,
}

fn fatal(message: &str, error: BackendError) -> ! {
    log::error!("{message}: {error} - the program will now abort");
    eprintln!("{message}: {error} - the program will now abort");
    std::process::exit(1);
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = AppConfig {
        width: args.width,
        height: args.height,
        vsync: !args.no_vsync,
        screenshot_dir: args.screenshot_dir,
        ..Default::default()
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height);

    let mut backend = match WgpuBackend::new(window.window_arc(), config.vsync) {
        Ok(backend) => backend,
        Err(e) => fatal("Could not create a graphics device", e),
    };
    let mut app = match App::new(&mut backend, &config) {
        Ok(app) => app,
        Err(e) => fatal("Renderer initialization failed", e),
    };
    let mut hud = HudOverlay::new(&backend, window.winit_window());

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    let consumed = hud.on_window_event(window.winit_window(), &event);
                    window.handle_event(&event);

                    match &event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => {
                            backend.resize(size.width, size.height);
                        }
                        WindowEvent::KeyboardInput {
                            event: key_event, ..
                        } if !consumed && !key_event.repeat => {
                            if let Some(action) = translate_key(key_event.physical_key) {
                                let bus_event = match key_event.state {
                                    ElementState::Pressed => BusEvent::ActionPressed(action),
                                    ElementState::Released => BusEvent::ActionReleased(action),
                                };
                                app.events_mut().publish(&bus_event);
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    match backend.begin_frame() {
                        Ok(frame) => {
                            match app.frame(&mut backend, &frame) {
                                Ok(_stats) => {
                                    hud.prepare(
                                        window.winit_window(),
                                        &app.hud_lines(),
                                        frame.height,
                                    );
                                    hud.render(
                                        &mut backend,
                                        frame.swapchain_view,
                                        frame.width,
                                        frame.height,
                                    );
                                }
                                Err(e) => log::error!("Frame failed: {e}"),
                            }
                            if let Err(e) = backend.end_frame() {
                                log::error!("Present failed: {e}");
                            }
                            if let Err(e) = app.after_present(&mut backend) {
                                log::error!("Screenshot capture failed: {e}");
                            }
                        }
                        Err(BackendError::SurfaceLost) => {
                            let (w, h) = window.dimensions();
                            backend.resize(w, h);
                        }
                        Err(e) => log::error!("Could not acquire frame: {e}"),
                    }

                    if app.should_quit() || window.should_close() {
                        elwt.exit();
                    }
                    window.clear_resize_flag();
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop failed");
}
