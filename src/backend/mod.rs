//! Graphics backend abstraction
//!
//! The `GraphicsBackend` trait is the thin seam between the renderer and
//! the underlying graphics API; `wgpu_backend` is the implementation.

pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use traits::*;
pub use types::*;
