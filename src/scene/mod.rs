//! Scene: a rotating root transform over a flat list of renderable objects

mod camera;
mod light;
mod transform;

pub use camera::*;
pub use light::*;
pub use transform::*;

use glam::Mat4;

/// A renderable object referencing a mesh and a material by id
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub mesh_id: usize,
    pub material_id: usize,
    pub transform: Transform,
}

impl RenderObject {
    pub fn new(mesh_id: usize, material_id: usize) -> Self {
        Self {
            mesh_id,
            material_id,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// The scene: all objects hang off a single root transform that the
/// orchestrator rotates a little each frame
pub struct Scene {
    pub root: Transform,
    pub objects: Vec<RenderObject>,
    world_matrices: Vec<Mat4>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            root: Transform::default(),
            objects: Vec::new(),
            world_matrices: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: RenderObject) -> usize {
        let id = self.objects.len();
        self.objects.push(object);
        id
    }

    /// Refresh cached world matrices (root x local). Called once per frame
    /// before the object uniforms are written.
    pub fn update(&mut self, _delta: f32) {
        let root = self.root.matrix();
        self.world_matrices.clear();
        self.world_matrices
            .extend(self.objects.iter().map(|o| root * o.transform.matrix()));
    }

    pub fn world_matrix(&self, index: usize) -> Mat4 {
        self.world_matrices
            .get(index)
            .copied()
            .unwrap_or(Mat4::IDENTITY)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
