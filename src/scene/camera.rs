//! Look-at camera with a perspective projection

use crate::backend::types::FrameUniform;
use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    pub fn set_projection(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Assemble the per-frame uniform. Called once per frame; both geometry
    /// passes read the same buffer, so their vertex transforms are
    /// bit-identical.
    pub fn frame_uniform(
        &self,
        time_factors: Vec4,
        target_width: u32,
        target_height: u32,
    ) -> FrameUniform {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        let (w, h) = (target_width as f32, target_height as f32);
        FrameUniform {
            view,
            proj,
            view_proj: proj * view,
            inv_proj: proj.inverse(),
            time_factors,
            target_size: Vec4::new(w, h, 1.0 / w, 1.0 / h),
        }
    }
}
