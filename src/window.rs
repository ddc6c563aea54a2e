//! Window management using winit, plus the input-translation boundary
//! where raw key codes become semantic input actions.

use crate::events::InputAction;
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowBuilder},
};

/// Resolve a physical key to a semantic action. This is the only place
/// raw key codes are interpreted; everything downstream deals in actions.
pub fn translate_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::Escape) => Some(InputAction::Quit),
        PhysicalKey::Code(KeyCode::KeyS) => Some(InputAction::CaptureScreenshot),
        PhysicalKey::Code(KeyCode::KeyL) => Some(InputAction::CycleLightMode),
        _ => None,
    }
}

/// Wrapper around a winit window with close/resize bookkeeping
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
    resized: bool,
    close_requested: bool,
}

impl Window {
    pub fn new(event_loop: &EventLoop<()>, title: &str, width: u32, height: u32) -> Self {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(event_loop)
                .expect("Failed to create window"),
        );

        Self {
            window,
            width,
            height,
            resized: false,
            close_requested: false,
        }
    }

    /// Arc reference for backend initialization
    pub fn window_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    pub fn winit_window(&self) -> &WinitWindow {
        &self.window
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn was_resized(&self) -> bool {
        self.resized
    }

    pub fn clear_resize_flag(&mut self) {
        self.resized = false;
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.width = size.width;
                self.height = size.height;
                self.resized = true;
            }
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            _ => {}
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
