//! Resource management
//!
//! Meshes, materials, and textures consumed by the render passes.

mod material;
mod mesh;
mod texture;

pub use material::*;
pub use mesh::*;
pub use texture::*;
