//! Event bus with priority-ordered handlers
//!
//! Raw input is translated into semantic `InputAction`s at the window
//! boundary; only actions and frame notifications travel on the bus.
//! Handlers are tried from highest to lowest priority until one reports
//! the event handled.

/// Semantic input actions, resolved once from raw key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Request application termination
    Quit,
    /// Defer a screenshot capture to after the next present
    CaptureScreenshot,
    /// Advance the light grid density level
    CycleLightMode,
}

/// Timing data carried on the frame-start notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStamp {
    pub frame: u64,
    pub delta: f32,
    pub runtime: f32,
}

/// Events published on the bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A new frame has started
    FrameStart(FrameStamp),
    /// Key press resolved to an action
    ActionPressed(InputAction),
    /// Key release resolved to an action
    ActionReleased(InputAction),
}

type HandlerFn = Box<dyn FnMut(&Event) -> bool>;

struct HandlerEntry {
    priority: i32,
    handler: HandlerFn,
}

/// Ordered list of event handlers tried until one handles the event
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<HandlerEntry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Higher priority runs first; registration order
    /// breaks ties.
    pub fn subscribe<F>(&mut self, priority: i32, handler: F)
    where
        F: FnMut(&Event) -> bool + 'static,
    {
        let entry = HandlerEntry {
            priority,
            handler: Box::new(handler),
        };
        let pos = self
            .handlers
            .iter()
            .position(|h| h.priority < priority)
            .unwrap_or(self.handlers.len());
        self.handlers.insert(pos, entry);
    }

    /// Publish an event. Returns true if some handler consumed it.
    pub fn publish(&mut self, event: &Event) -> bool {
        for entry in &mut self.handlers {
            if (entry.handler)(event) {
                return true;
            }
        }
        false
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
