//! Properties of the procedural light grid and the light-mode levels

use glam::Vec3;
use prepass_renderer::scene::{
    light_grid, LightKind, LightMode, LIGHT_GRID_INTENSITY, LIGHT_GRID_MAX_COLOR,
    LIGHT_GRID_MAX_EXTENTS, LIGHT_GRID_MIN_COLOR, LIGHT_GRID_MIN_EXTENTS,
};

// ---------------------------------------------------------------------------
// Grid dimensions per level
// ---------------------------------------------------------------------------

#[test]
fn cube_side_and_count_follow_level() {
    let mut mode = LightMode::new(5);
    for level in 0..5 {
        assert_eq!(mode.level(), level);
        let side = 3 + 2 * level;
        assert_eq!(mode.cube_side(), side);
        assert_eq!(mode.light_count(), side * side * side);
        assert_eq!(light_grid(&mode).len() as u32, mode.light_count());
        mode.advance();
    }
}

#[test]
fn level_zero_yields_27_lights_and_one_increment_yields_125() {
    let mut mode = LightMode::new(5);
    assert_eq!(light_grid(&mode).len(), 27);

    mode.advance();
    assert_eq!(light_grid(&mode).len(), 125);
}

#[test]
fn level_wraps_past_the_last() {
    let mut mode = LightMode::new(3);
    for _ in 0..3 {
        mode.advance();
    }
    assert_eq!(mode.level(), 0);
}

// ---------------------------------------------------------------------------
// Corner interpolation
// ---------------------------------------------------------------------------

fn approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-5
}

#[test]
fn corner_lights_map_exactly_to_extents_and_colors() {
    let mode = LightMode::new(5);
    let lights = light_grid(&mode);

    let min_corner = lights
        .iter()
        .find(|l| approx_eq(l.position, LIGHT_GRID_MIN_EXTENTS))
        .expect("no light at min extents");
    assert!(approx_eq(
        min_corner.color,
        LIGHT_GRID_MIN_COLOR * LIGHT_GRID_INTENSITY
    ));

    let max_corner = lights
        .iter()
        .find(|l| approx_eq(l.position, LIGHT_GRID_MAX_EXTENTS))
        .expect("no light at max extents");
    assert!(approx_eq(
        max_corner.color,
        LIGHT_GRID_MAX_COLOR * LIGHT_GRID_INTENSITY
    ));
}

#[test]
fn all_lights_are_points_within_the_extents() {
    let mode = LightMode::new(5);
    for light in light_grid(&mode) {
        assert_eq!(light.kind, LightKind::Point);
        assert_eq!(light.range, 2.0);
        for axis in 0..3 {
            assert!(light.position[axis] >= LIGHT_GRID_MIN_EXTENTS[axis] - 1e-5);
            assert!(light.position[axis] <= LIGHT_GRID_MAX_EXTENTS[axis] + 1e-5);
        }
    }
}

#[test]
fn grid_positions_are_distinct() {
    let mode = LightMode::new(5);
    let lights = light_grid(&mode);
    for (i, a) in lights.iter().enumerate() {
        for b in lights.iter().skip(i + 1) {
            assert!(!approx_eq(a.position, b.position));
        }
    }
}
