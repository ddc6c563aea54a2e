//! Frame orchestration against the recording backend: pass order, state
//! configuration, material variant selection, and depth-view aliasing.

mod common;

use common::{Recorded, RecordingBackend};
use prepass_renderer::backend::traits::GraphicsBackend;
use prepass_renderer::backend::types::{BlendState, CompareFunction};
use prepass_renderer::{App, AppConfig, Event, InputAction};

fn test_config() -> AppConfig {
    AppConfig {
        width: 64,
        height: 36,
        screenshot_dir: std::env::temp_dir(),
        ..Default::default()
    }
}

fn run_one_frame(app: &mut App, backend: &mut RecordingBackend) {
    let frame = backend.begin_frame().expect("begin_frame");
    app.frame(backend, &frame).expect("frame");
}

// ---------------------------------------------------------------------------
// Pass sequencing
// ---------------------------------------------------------------------------

#[test]
fn passes_run_in_strict_order() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    assert_eq!(
        backend.pass_labels(),
        vec![
            "G-Buffer Pass",
            "Light Accumulation Pass",
            "Final Pass",
            "Composite Pass",
        ]
    );
}

#[test]
fn every_scene_pass_applies_the_shared_viewport() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    let viewports: Vec<Option<u64>> = ["G-Buffer Pass", "Light Accumulation Pass", "Final Pass"]
        .iter()
        .map(|label| {
            backend.pass(label).commands.iter().find_map(|c| match c {
                Recorded::SetViewport(id) => Some(*id),
                _ => None,
            })
        })
        .collect();

    let first = viewports[0].expect("G-Buffer pass sets no viewport");
    for viewport in &viewports {
        assert_eq!(*viewport, Some(first));
    }
}

// ---------------------------------------------------------------------------
// Depth binding: writable in the G-Buffer pass, read-only afterwards,
// always the same underlying texture
// ---------------------------------------------------------------------------

#[test]
fn depth_is_writable_then_read_only_over_the_same_texture() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    let gbuffer_depth = backend.pass("G-Buffer Pass").depth.clone().unwrap();
    let lights_depth = backend.pass("Light Accumulation Pass").depth.clone().unwrap();
    let final_depth = backend.pass("Final Pass").depth.clone().unwrap();

    assert!(!gbuffer_depth.read_only);
    assert!(gbuffer_depth.depth_cleared);
    assert!(lights_depth.read_only);
    assert!(final_depth.read_only);

    // Distinct views, one resource
    assert_ne!(gbuffer_depth.view, lights_depth.view);
    let texture_of = |view: u64| backend.view_meta.get(&view).unwrap().0;
    assert_eq!(texture_of(gbuffer_depth.view), texture_of(lights_depth.view));
    assert_eq!(texture_of(gbuffer_depth.view), texture_of(final_depth.view));
}

// ---------------------------------------------------------------------------
// Material variants: exactly one per geometry pass
// ---------------------------------------------------------------------------

#[test]
fn geometry_passes_use_exactly_their_own_material_variant() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    let gbuffer_pipeline = backend.pipeline_by_label("G-Buffer Pipeline");
    let final_pipeline = backend.pipeline_by_label("Final Pass Pipeline");
    assert_ne!(gbuffer_pipeline, final_pipeline);

    assert_eq!(
        backend.pass("G-Buffer Pass").pipelines_used(),
        vec![gbuffer_pipeline]
    );
    assert_eq!(
        backend.pass("Final Pass").pipelines_used(),
        vec![final_pipeline]
    );
}

#[test]
fn gbuffer_draws_carry_the_stencil_mark_reference() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    let pass = backend.pass("G-Buffer Pass");
    assert!(pass
        .commands
        .iter()
        .any(|c| matches!(c, Recorded::SetStencilReference(1))));
    assert!(pass.draw_count() > 0);
}

// ---------------------------------------------------------------------------
// Light accumulation
// ---------------------------------------------------------------------------

#[test]
fn light_pass_issues_one_draw_per_light() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    let pass = backend.pass("Light Accumulation Pass");
    // Level 0: a 3x3x3 grid
    assert_eq!(pass.draw_count(), 27);

    // Each draw covers one instance, in sequence
    let instances: Vec<(u32, u32)> = pass
        .commands
        .iter()
        .filter_map(|c| match c {
            Recorded::Draw { instances, .. } => Some(*instances),
            _ => None,
        })
        .collect();
    for (index, range) in instances.iter().enumerate() {
        assert_eq!(*range, (index as u32, index as u32 + 1));
    }

    // The light target is cleared to zero before accumulation
    assert_eq!(pass.color[0].clear, Some([0.0, 0.0, 0.0, 0.0]));

    // Stencil test against the geometry mark
    assert!(pass
        .commands
        .iter()
        .any(|c| matches!(c, Recorded::SetStencilReference(1))));
}

#[test]
fn light_accumulation_blend_is_commutative_additive() {
    let mut backend = RecordingBackend::new(64, 36);
    let _app = App::new(&mut backend, &test_config()).expect("init");

    let pipeline = backend.pipeline_by_label("Light Accumulation Pipeline");
    let desc = &backend.pipelines[&pipeline];
    assert_eq!(desc.color_targets[0].blend, Some(BlendState::additive()));

    // Stencil equality test with writes masked off
    let ds = desc.depth_stencil_state.expect("no depth-stencil state");
    let ds_desc = &backend.ds_states[&ds.raw()];
    assert!(!ds_desc.depth_write_enabled);
    let stencil = ds_desc.stencil.expect("no stencil");
    assert_eq!(stencil.compare, CompareFunction::Equal);
    assert_eq!(stencil.write_mask, 0);
}

#[test]
fn cycling_light_mode_grows_the_grid_next_frame() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);
    assert_eq!(backend.pass("Light Accumulation Pass").draw_count(), 27);

    app.events_mut()
        .publish(&Event::ActionPressed(InputAction::CycleLightMode));

    backend.passes.clear();
    run_one_frame(&mut app, &mut backend);
    assert_eq!(backend.pass("Light Accumulation Pass").draw_count(), 125);
}

#[test]
fn light_list_is_uploaded_before_the_pass() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    // 27 lights at 32 bytes each
    let uploaded = backend
        .buffer_data
        .values()
        .any(|data| data.len() == 27 * 32);
    assert!(uploaded, "no buffer holds the serialized light list");
}

// ---------------------------------------------------------------------------
// Final pass and resolve
// ---------------------------------------------------------------------------

#[test]
fn final_pass_resolves_into_a_matching_format_target() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);

    let pass = backend.pass("Final Pass");
    let attachment = &pass.color[0];
    let resolve_view = attachment.resolve_target.expect("no resolve target");

    let texture_of = |view: u64| backend.view_meta.get(&view).unwrap().0;
    let attachment_format = backend.texture_descs[&texture_of(attachment.view)].format;
    let resolve_desc = &backend.texture_descs[&texture_of(resolve_view)];
    assert_eq!(resolve_desc.format, attachment_format);
    assert_eq!(resolve_desc.sample_count, 1);
}

#[test]
fn final_pass_depth_state_is_less_equal_without_writes() {
    let mut backend = RecordingBackend::new(64, 36);
    let _app = App::new(&mut backend, &test_config()).expect("init");

    let pipeline = backend.pipeline_by_label("Final Pass Pipeline");
    let ds = backend.pipelines[&pipeline]
        .depth_stencil_state
        .expect("no depth-stencil state");
    let desc = &backend.ds_states[&ds.raw()];
    assert!(!desc.depth_write_enabled);
    assert_eq!(desc.depth_compare, CompareFunction::LessEqual);
    assert!(desc.stencil.is_none());
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

#[test]
fn escape_requests_termination_and_stops_frame_updates() {
    let mut backend = RecordingBackend::new(64, 36);
    let mut app = App::new(&mut backend, &test_config()).expect("init");

    run_one_frame(&mut app, &mut backend);
    let frames_before = backend.passes.len();

    let handled = app
        .events_mut()
        .publish(&Event::ActionReleased(InputAction::Quit));
    assert!(handled);

    run_one_frame(&mut app, &mut backend);
    assert!(app.should_quit());
    assert_eq!(backend.passes.len(), frames_before, "quit frame still rendered");

    // Still latched on subsequent frames
    run_one_frame(&mut app, &mut backend);
    assert!(app.should_quit());
    assert_eq!(backend.passes.len(), frames_before);
}
