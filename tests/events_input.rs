//! Event bus dispatch order and the deferred screenshot state machine

mod common;

use common::RecordingBackend;
use prepass_renderer::backend::traits::GraphicsBackend;
use prepass_renderer::{App, AppConfig, Event, EventBus, FrameStamp, InputAction};
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Bus semantics
// ---------------------------------------------------------------------------

#[test]
fn handlers_run_in_priority_order_until_one_handles() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut bus = EventBus::new();

    let log = Rc::clone(&order);
    bus.subscribe(0, move |_| {
        log.borrow_mut().push("low");
        true
    });
    let log = Rc::clone(&order);
    bus.subscribe(10, move |_| {
        log.borrow_mut().push("high");
        false
    });

    let handled = bus.publish(&Event::ActionPressed(InputAction::CycleLightMode));
    assert!(handled);
    assert_eq!(*order.borrow(), vec!["high", "low"]);
}

#[test]
fn dispatch_stops_at_the_first_handler_that_consumes() {
    let reached = Rc::new(RefCell::new(false));
    let mut bus = EventBus::new();

    bus.subscribe(10, |_| true);
    let flag = Rc::clone(&reached);
    bus.subscribe(0, move |_| {
        *flag.borrow_mut() = true;
        true
    });

    bus.publish(&Event::ActionReleased(InputAction::Quit));
    assert!(!*reached.borrow());
}

#[test]
fn unhandled_events_report_false() {
    let mut bus = EventBus::new();
    bus.subscribe(0, |_| false);
    assert!(!bus.publish(&Event::FrameStart(FrameStamp {
        frame: 1,
        delta: 0.016,
        runtime: 0.016,
    })));
}

// ---------------------------------------------------------------------------
// Frame-start notification
// ---------------------------------------------------------------------------

#[test]
fn frame_start_is_published_every_frame() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    let frames = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&frames);
    app.events_mut().subscribe(100, move |event| {
        if let Event::FrameStart(stamp) = event {
            seen.borrow_mut().push(stamp.frame);
        }
        false
    });

    for _ in 0..3 {
        let frame = backend.begin_frame().unwrap();
        app.frame(&mut backend, &frame).unwrap();
    }

    assert_eq!(*frames.borrow(), vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Screenshot deferral
// ---------------------------------------------------------------------------

fn test_config() -> AppConfig {
    let dir = std::env::temp_dir().join(format!(
        "prepass-screenshots-{}-{:?}",
        std::process::id(),
        std::thread::current().id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    AppConfig {
        width: 64,
        height: 36,
        screenshot_dir: dir,
        ..Default::default()
    }
}

#[test]
fn screenshot_is_deferred_to_after_the_next_present() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    // Frame N renders; the key arrives while it is in flight
    let frame = backend.begin_frame().unwrap();
    app.frame(&mut backend, &frame).unwrap();
    app.events_mut()
        .publish(&Event::ActionReleased(InputAction::CaptureScreenshot));

    // Nothing is written during frame N
    assert_eq!(app.after_present(&mut backend).unwrap(), None);
    assert!(!app.screenshot_pending());

    // Frame N+1 picks the request up and captures after its present
    let frame = backend.begin_frame().unwrap();
    app.frame(&mut backend, &frame).unwrap();
    assert!(app.screenshot_pending());

    let path = app
        .after_present(&mut backend)
        .unwrap()
        .expect("no screenshot written");
    assert!(path.exists());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("LightPrepass_"));
    assert!(!app.screenshot_pending());

    // Exactly once: the flag is reset
    assert_eq!(app.after_present(&mut backend).unwrap(), None);

    std::fs::remove_file(path).ok();
}
