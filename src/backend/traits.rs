//! Backend abstraction: the resource/state factory and command contract
//! every graphics backend implements.
//!
//! Components other than the backend hold opaque handles only; the backend
//! owns the underlying GPU objects in arenas and drops them all when it is
//! torn down.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create pipeline: {0}")]
    PipelineCreationFailed(String),
    #[error("Failed to create shader: {0}")]
    ShaderCreationFailed(String),
    #[error("Failed to read back texture: {0}")]
    ReadbackFailed(String),
    #[error("Missing shader parameter: {0}")]
    MissingParameter(String),
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

macro_rules! define_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) u64);

        impl $name {
            /// Reconstruct a handle from its raw id. Intended for backend
            /// implementations outside this crate (test doubles included).
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub fn raw(&self) -> u64 {
                self.0
            }
        }
    };
}

define_handle!(
    /// Handle to a GPU buffer
    BufferHandle
);
define_handle!(
    /// Handle to a GPU texture
    TextureHandle
);
define_handle!(
    /// Handle to a texture view
    TextureViewHandle
);
define_handle!(
    /// Handle to a sampler
    SamplerHandle
);
define_handle!(
    /// Handle to a render pipeline
    RenderPipelineHandle
);
define_handle!(
    /// Handle to a bind group
    BindGroupHandle
);
define_handle!(
    /// Handle to a bind group layout
    BindGroupLayoutHandle
);
define_handle!(
    /// Handle to an immutable depth-stencil state record
    DepthStencilStateHandle
);
define_handle!(
    /// Handle to an immutable rasterizer state record
    RasterizerStateHandle
);
define_handle!(
    /// Handle to an immutable viewport record
    ViewportHandle
);

/// Bind group entry for creating bind groups
#[derive(Debug, Clone)]
pub enum BindGroupEntry {
    Buffer {
        buffer: BufferHandle,
        offset: u64,
        size: Option<u64>,
    },
    Texture(TextureViewHandle),
    Sampler(SamplerHandle),
}

/// Bind group layout entry
#[derive(Debug, Clone)]
pub struct BindGroupLayoutEntry {
    pub binding: u32,
    pub visibility: ShaderStageFlags,
    pub ty: BindingType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderStageFlags(u32);

impl ShaderStageFlags {
    pub const VERTEX: Self = Self(1 << 0);
    pub const FRAGMENT: Self = Self(1 << 1);
    pub const VERTEX_FRAGMENT: Self = Self((1 << 0) | (1 << 1));

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for ShaderStageFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Binding type
#[derive(Debug, Clone)]
pub enum BindingType {
    UniformBuffer,
    StorageBuffer {
        read_only: bool,
    },
    Texture {
        sample_type: TextureSampleType,
        multisampled: bool,
    },
    Sampler {
        comparison: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSampleType {
    Float { filterable: bool },
    Depth,
}

/// Render pipeline descriptor. Depth-stencil and rasterizer behavior is
/// referenced through state handles created by the factory; an unknown
/// handle fails pipeline creation.
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor {
    pub label: Option<String>,
    /// WGSL source containing `vs_main` and `fs_main`
    pub shader_source: String,
    pub vertex_layouts: Vec<VertexBufferLayout>,
    pub bind_group_layouts: Vec<BindGroupLayoutHandle>,
    pub primitive_topology: PrimitiveTopology,
    pub rasterizer_state: RasterizerStateHandle,
    pub depth_stencil_state: Option<DepthStencilStateHandle>,
    pub color_targets: Vec<ColorTargetState>,
}

#[derive(Debug, Clone)]
pub struct ColorTargetState {
    pub format: TextureFormat,
    pub blend: Option<BlendState>,
}

/// Color attachment for a render pass. When `resolve_target` is set the
/// multisampled attachment is resolved into it as the pass ends; the two
/// views must share the same pixel format.
#[derive(Debug, Clone)]
pub struct ColorAttachment {
    pub view: TextureViewHandle,
    pub resolve_target: Option<TextureViewHandle>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
}

#[derive(Debug, Clone)]
pub enum LoadOp {
    Clear([f32; 4]),
    Load,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    Discard,
}

/// Depth-stencil attachment for a render pass. Binding a view created with
/// `read_only` disables depth and stencil writes at the attachment level;
/// the load/store/clear fields are then ignored.
#[derive(Debug, Clone)]
pub struct DepthStencilAttachment {
    pub view: TextureViewHandle,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub depth_clear_value: f32,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub stencil_clear_value: u32,
}

impl DepthStencilAttachment {
    /// Clear depth to `depth` and stencil to `stencil` on load
    pub fn clear(view: TextureViewHandle, depth: f32, stencil: u32) -> Self {
        Self {
            view,
            depth_load_op: LoadOp::Clear([depth, 0.0, 0.0, 0.0]),
            depth_store_op: StoreOp::Store,
            depth_clear_value: depth,
            stencil_load_op: LoadOp::Clear([0.0; 4]),
            stencil_store_op: StoreOp::Store,
            stencil_clear_value: stencil,
        }
    }

    /// Preserve existing depth/stencil contents (used with read-only views)
    pub fn load(view: TextureViewHandle) -> Self {
        Self {
            view,
            depth_load_op: LoadOp::Load,
            depth_store_op: StoreOp::Store,
            depth_clear_value: 1.0,
            stencil_load_op: LoadOp::Load,
            stencil_store_op: StoreOp::Store,
            stencil_clear_value: 0,
        }
    }
}

/// Render pass descriptor
#[derive(Debug, Clone)]
pub struct RenderPassDescriptor {
    pub label: Option<String>,
    pub color_attachments: Vec<ColorAttachment>,
    pub depth_stencil_attachment: Option<DepthStencilAttachment>,
}

/// A color texture together with its derived views, created atomically
#[derive(Debug, Clone, Copy)]
pub struct RenderTarget {
    pub texture: TextureHandle,
    pub render_view: TextureViewHandle,
    pub shader_view: TextureViewHandle,
    pub format: TextureFormat,
}

#[derive(Debug, Clone)]
pub struct RenderTargetDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub format: TextureFormat,
    /// Extra usage beyond render attachment + texture binding (e.g. copy
    /// source for readback)
    pub extra_usage: Option<TextureUsage>,
}

/// A depth-stencil texture together with a writable view, a read-only view
/// aliasing the same texture, and a depth-aspect shader view
#[derive(Debug, Clone, Copy)]
pub struct DepthTarget {
    pub texture: TextureHandle,
    pub depth_view: TextureViewHandle,
    pub read_only_view: TextureViewHandle,
    pub shader_view: TextureViewHandle,
    pub format: TextureFormat,
}

#[derive(Debug, Clone)]
pub struct DepthTargetDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub format: TextureFormat,
}

/// Raw pixel data read back from a texture
#[derive(Debug, Clone)]
pub struct TextureReadback {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
}

/// Frame context returned when beginning a frame
pub struct FrameContext {
    pub swapchain_view: TextureViewHandle,
    pub width: u32,
    pub height: u32,
}

/// Graphics backend contract: resource/state factory plus single-threaded
/// command submission. All per-frame work is issued from one control thread
/// in strict pass order; pass N's writes are visible to pass N+1's reads
/// through the API's inherent pipeline ordering.
pub trait GraphicsBackend {
    /// Resize the swapchain
    fn resize(&mut self, width: u32, height: u32);

    /// Get the actual surface size (may be clamped by device limits)
    fn surface_size(&self) -> (u32, u32);

    /// Begin a new frame
    fn begin_frame(&mut self) -> BackendResult<FrameContext>;

    /// End and present the frame
    fn end_frame(&mut self) -> BackendResult<()>;

    /// Get the swapchain format
    fn swapchain_format(&self) -> TextureFormat;

    /// Whether the device is a software fallback adapter rather than
    /// hardware
    fn is_fallback_adapter(&self) -> bool {
        false
    }

    // Resource creation

    /// Create a buffer
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle>;

    /// Create a buffer with initial data
    fn create_buffer_init(&mut self, desc: &BufferDescriptor, data: &[u8])
        -> BackendResult<BufferHandle>;

    /// Write data to a buffer
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Create a texture
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle>;

    /// Create a texture view
    fn create_texture_view(
        &mut self,
        texture: TextureHandle,
        desc: &TextureViewDescriptor,
    ) -> BackendResult<TextureViewHandle>;

    /// Write data to a texture
    fn write_texture(&mut self, texture: TextureHandle, data: &[u8], width: u32, height: u32);

    /// Create a sampler
    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> BackendResult<SamplerHandle>;

    /// Create a color target with render and shader views in one call.
    /// Fails as a whole if any sub-step fails; no partially constructed
    /// target escapes.
    fn create_render_target(
        &mut self,
        desc: &RenderTargetDescriptor,
    ) -> BackendResult<RenderTarget> {
        let mut usage = TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING;
        if let Some(extra) = desc.extra_usage {
            usage = usage | extra;
        }
        let texture = self.create_texture(&TextureDescriptor {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            mip_levels: 1,
            sample_count: desc.sample_count,
            format: desc.format,
            usage,
        })?;
        let render_view = self.create_texture_view(texture, &TextureViewDescriptor::default())?;
        let shader_view = self.create_texture_view(texture, &TextureViewDescriptor::default())?;
        Ok(RenderTarget {
            texture,
            render_view,
            shader_view,
            format: desc.format,
        })
    }

    /// Create a depth-stencil target with a writable view, a read-only view
    /// over the same texture, and a depth-aspect shader view in one call.
    /// Destroying any view does not destroy the texture; they share its
    /// lifetime.
    fn create_depth_target(&mut self, desc: &DepthTargetDescriptor) -> BackendResult<DepthTarget> {
        if !desc.format.is_depth() {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?} is not a depth format",
                desc.format
            )));
        }
        let texture = self.create_texture(&TextureDescriptor {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            mip_levels: 1,
            sample_count: desc.sample_count,
            format: desc.format,
            usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        })?;
        let depth_view = self.create_texture_view(texture, &TextureViewDescriptor::default())?;
        let read_only_view = self.create_texture_view(
            texture,
            &TextureViewDescriptor {
                label: None,
                aspect: TextureAspect::All,
                read_only: true,
            },
        )?;
        let shader_view = self.create_texture_view(
            texture,
            &TextureViewDescriptor {
                label: None,
                aspect: TextureAspect::DepthOnly,
                read_only: true,
            },
        )?;
        Ok(DepthTarget {
            texture,
            depth_view,
            read_only_view,
            shader_view,
            format: desc.format,
        })
    }

    /// The texture a view was created from. Exposes the aliasing relation
    /// between writable and read-only depth views.
    fn texture_of_view(&self, view: TextureViewHandle) -> Option<TextureHandle>;

    // State objects

    /// Create an immutable depth-stencil state record
    fn create_depth_stencil_state(
        &mut self,
        desc: &DepthStencilStateDescriptor,
    ) -> BackendResult<DepthStencilStateHandle>;

    /// Create an immutable rasterizer state record
    fn create_rasterizer_state(
        &mut self,
        desc: &RasterizerStateDescriptor,
    ) -> BackendResult<RasterizerStateHandle>;

    /// Create an immutable viewport record
    fn create_viewport(&mut self, desc: &ViewportDescriptor) -> BackendResult<ViewportHandle>;

    // Pipeline creation

    /// Create a bind group layout
    fn create_bind_group_layout(
        &mut self,
        entries: &[BindGroupLayoutEntry],
    ) -> BackendResult<BindGroupLayoutHandle>;

    /// Create a bind group
    fn create_bind_group(
        &mut self,
        layout: BindGroupLayoutHandle,
        entries: &[(u32, BindGroupEntry)],
    ) -> BackendResult<BindGroupHandle>;

    /// Create a render pipeline
    fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDescriptor,
    ) -> BackendResult<RenderPipelineHandle>;

    // Command recording

    /// Begin a render pass
    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor);

    /// End the current render pass
    fn end_render_pass(&mut self);

    /// Set the render pipeline
    fn set_render_pipeline(&mut self, pipeline: RenderPipelineHandle);

    /// Set a bind group
    fn set_bind_group(&mut self, index: u32, bind_group: BindGroupHandle);

    /// Set vertex buffer
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64);

    /// Set index buffer
    fn set_index_buffer(&mut self, buffer: BufferHandle, offset: u64, format: IndexFormat);

    /// Apply a viewport record created by the factory
    fn apply_viewport(&mut self, viewport: ViewportHandle);

    /// Set the stencil reference value for subsequent draws
    fn set_stencil_reference(&mut self, reference: u32);

    /// Draw primitives
    fn draw(&mut self, vertices: std::ops::Range<u32>, instances: std::ops::Range<u32>);

    /// Draw indexed primitives
    fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        base_vertex: i32,
        instances: std::ops::Range<u32>,
    );

    // Readback

    /// Blocking read of mip 0 of a single-sampled texture
    fn read_texture(&mut self, texture: TextureHandle) -> BackendResult<TextureReadback>;

    // Resource cleanup

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);
}
