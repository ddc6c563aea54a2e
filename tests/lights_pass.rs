//! Light accumulation pass in isolation: empty lists, capacity limits,
//! and per-frame consumption of the light list.

mod common;

use common::RecordingBackend;
use glam::Vec3;
use prepass_renderer::backend::traits::*;
use prepass_renderer::backend::types::*;
use prepass_renderer::passes::LightsView;
use prepass_renderer::scene::Light;

struct Fixture {
    backend: RecordingBackend,
    view: LightsView,
    frame_bind_group: BindGroupHandle,
}

fn fixture(capacity: u32) -> Fixture {
    let mut backend = RecordingBackend::new(64, 36);

    let gbuffer = backend
        .create_render_target(&RenderTargetDescriptor {
            label: Some("gbuffer".into()),
            width: 64,
            height: 36,
            sample_count: 4,
            format: TextureFormat::Rgba16Float,
            extra_usage: None,
        })
        .unwrap();
    let light_target = backend
        .create_render_target(&RenderTargetDescriptor {
            label: Some("light".into()),
            width: 64,
            height: 36,
            sample_count: 4,
            format: TextureFormat::Rgba16Float,
            extra_usage: None,
        })
        .unwrap();
    let depth = backend
        .create_depth_target(&DepthTargetDescriptor {
            label: Some("depth".into()),
            width: 64,
            height: 36,
            sample_count: 4,
            format: TextureFormat::Depth24PlusStencil8,
        })
        .unwrap();
    let viewport = backend
        .create_viewport(&ViewportDescriptor::full(64, 36))
        .unwrap();
    let frame_layout = backend.create_bind_group_layout(&[]).unwrap();
    let frame_bind_group = backend.create_bind_group(frame_layout, &[]).unwrap();

    let view = LightsView::new(
        &mut backend,
        frame_layout,
        &gbuffer,
        &depth,
        light_target,
        viewport,
        4,
        capacity,
    )
    .unwrap();

    Fixture {
        backend,
        view,
        frame_bind_group,
    }
}

// ---------------------------------------------------------------------------
// Empty list still clears the target
// ---------------------------------------------------------------------------

#[test]
fn empty_light_list_still_clears_the_light_target() {
    let Fixture {
        mut backend,
        mut view,
        frame_bind_group,
    } = fixture(16);

    view.render(&mut backend, frame_bind_group);

    let pass = backend.pass("Light Accumulation Pass");
    assert_eq!(pass.color[0].clear, Some([0.0, 0.0, 0.0, 0.0]));
    assert_eq!(pass.draw_count(), 0);
}

// ---------------------------------------------------------------------------
// Capacity and consumption
// ---------------------------------------------------------------------------

fn some_light(i: u32) -> Light {
    Light::point(Vec3::new(i as f32, 0.0, 0.0), Vec3::ONE, 2.0)
}

#[test]
fn lights_beyond_capacity_are_dropped() {
    let Fixture { mut view, .. } = fixture(2);

    view.set_lights(&[some_light(0), some_light(1), some_light(2), some_light(3)]);
    assert_eq!(view.light_count(), 2);
}

#[test]
fn add_light_respects_capacity() {
    let Fixture { mut view, .. } = fixture(2);

    for i in 0..4 {
        view.add_light(some_light(i));
    }
    assert_eq!(view.light_count(), 2);
}

#[test]
fn light_list_is_consumed_by_render() {
    let Fixture {
        mut backend,
        mut view,
        frame_bind_group,
    } = fixture(16);

    view.set_lights(&[some_light(0), some_light(1)]);
    assert_eq!(view.light_count(), 2);

    view.render(&mut backend, frame_bind_group);
    assert_eq!(view.light_count(), 0);

    assert_eq!(backend.pass("Light Accumulation Pass").draw_count(), 2);

    // A second render without fresh lights accumulates nothing
    backend.passes.clear();
    view.render(&mut backend, frame_bind_group);
    assert_eq!(backend.pass("Light Accumulation Pass").draw_count(), 0);
}

#[test]
fn uploaded_light_records_match_the_declared_layout() {
    let Fixture {
        mut backend,
        mut view,
        frame_bind_group,
    } = fixture(16);

    let light = Light::point(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 0.25, 0.125), 2.0);
    view.set_lights(&[light]);
    view.render(&mut backend, frame_bind_group);

    let raw = backend
        .buffer_data
        .values()
        .find(|data| data.len() == 32)
        .expect("no 32-byte light upload");
    let floats: &[f32] = bytemuck::cast_slice(raw);
    assert_eq!(&floats[0..4], &[1.0, 2.0, 3.0, 2.0]);
    assert_eq!(&floats[4..7], &[0.5, 0.25, 0.125]);
}
