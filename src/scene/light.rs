//! Light types and the procedural light grid
//!
//! Lights are plain values rebuilt every frame by the orchestrator and
//! handed to the light accumulation pass; there is no persistent registry.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
}

/// A light constructed fresh each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub color: Vec3,
    pub range: f32,
}

impl Light {
    pub fn point(position: Vec3, color: Vec3, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            color,
            range,
        }
    }

    /// Convert to the GPU storage-buffer layout
    pub fn to_gpu(&self) -> GpuLight {
        GpuLight {
            position_range: self.position.extend(self.range),
            color: self.color.extend(0.0),
        }
    }
}

/// GPU-side light record, 32 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuLight {
    /// xyz = world position, w = range
    pub position_range: Vec4,
    /// xyz = color (intensity pre-multiplied), w = unused
    pub color: Vec4,
}

/// Discrete density level for the procedural light grid, advanced by a key
/// action and wrapping past the last level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightMode {
    level: u32,
    level_count: u32,
}

impl LightMode {
    pub fn new(level_count: u32) -> Self {
        Self {
            level: 0,
            level_count: level_count.max(1),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Advance to the next level, wrapping back to 0 past the last
    pub fn advance(&mut self) {
        self.level = (self.level + 1) % self.level_count;
    }

    /// Side length of the light cube at this level
    pub fn cube_side(&self) -> u32 {
        3 + 2 * self.level
    }

    /// Total lights generated at this level
    pub fn light_count(&self) -> u32 {
        let side = self.cube_side();
        side * side * side
    }

    /// HUD line describing the current level
    pub fn describe(&self) -> String {
        format!(
            "Light mode {} of {}: {} lights",
            self.level + 1,
            self.level_count,
            self.light_count()
        )
    }
}

/// Extents of the light grid in world space
pub const LIGHT_GRID_MIN_EXTENTS: Vec3 = Vec3::new(-4.0, 1.0, -4.0);
pub const LIGHT_GRID_MAX_EXTENTS: Vec3 = Vec3::new(4.0, 11.0, 4.0);
/// Color gradient endpoints across the grid
pub const LIGHT_GRID_MIN_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const LIGHT_GRID_MAX_COLOR: Vec3 = Vec3::new(0.0, 1.0, 1.0);
/// Intensity factor applied to the interpolated color
pub const LIGHT_GRID_INTENSITY: f32 = 1.5;
/// Range of every grid light
pub const LIGHT_GRID_RANGE: f32 = 2.0;

fn lerp3(a: Vec3, b: Vec3, s: Vec3) -> Vec3 {
    a + s * (b - a)
}

/// Generate the per-frame light list: a cube of `side^3` point lights with
/// positions and colors interpolated across the grid extents. Corner lights
/// land exactly on the extents and color endpoints.
pub fn light_grid(mode: &LightMode) -> Vec<Light> {
    let side = mode.cube_side() as i32;
    let cube_min = -(side / 2);
    let cube_max = side / 2;

    let mut lights = Vec::with_capacity(mode.light_count() as usize);
    for x in cube_min..=cube_max {
        for y in cube_min..=cube_max {
            for z in cube_min..=cube_max {
                let s = Vec3::new(
                    (x - cube_min) as f32 / (side - 1) as f32,
                    (y - cube_min) as f32 / (side - 1) as f32,
                    (z - cube_min) as f32 / (side - 1) as f32,
                );
                lights.push(Light::point(
                    lerp3(LIGHT_GRID_MIN_EXTENTS, LIGHT_GRID_MAX_EXTENTS, s),
                    lerp3(LIGHT_GRID_MIN_COLOR, LIGHT_GRID_MAX_COLOR, s) * LIGHT_GRID_INTENSITY,
                    LIGHT_GRID_RANGE,
                ));
            }
        }
    }
    lights
}
