//! Recording graphics backend used by the integration tests.
//!
//! Implements the full `GraphicsBackend` contract without a GPU: every
//! resource is a counter-minted handle, render passes capture their
//! attachments and replayed commands, and buffer writes keep the written
//! bytes for inspection.

use prepass_renderer::backend::traits::*;
use prepass_renderer::backend::types::*;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    SetPipeline(u64),
    SetBindGroup(u32, u64),
    SetVertexBuffer(u32, u64),
    SetIndexBuffer(u64),
    SetViewport(u64),
    SetStencilReference(u32),
    Draw { vertices: (u32, u32), instances: (u32, u32) },
    DrawIndexed { indices: (u32, u32) },
}

#[derive(Debug, Clone)]
pub struct RecordedColorAttachment {
    pub view: u64,
    pub resolve_target: Option<u64>,
    pub clear: Option<[f32; 4]>,
}

#[derive(Debug, Clone)]
pub struct RecordedDepthAttachment {
    pub view: u64,
    pub read_only: bool,
    pub depth_cleared: bool,
}

#[derive(Debug, Clone)]
pub struct RecordedPass {
    pub label: String,
    pub color: Vec<RecordedColorAttachment>,
    pub depth: Option<RecordedDepthAttachment>,
    pub commands: Vec<Recorded>,
}

impl RecordedPass {
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Recorded::Draw { .. } | Recorded::DrawIndexed { .. }))
            .count()
    }

    pub fn pipelines_used(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .commands
            .iter()
            .filter_map(|c| match c {
                Recorded::SetPipeline(id) => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

pub struct RecordingBackend {
    next_id: u64,
    width: u32,
    height: u32,
    pub fallback: bool,

    pub passes: Vec<RecordedPass>,
    current: Option<RecordedPass>,

    /// view id -> (texture id, read_only)
    pub view_meta: HashMap<u64, (u64, bool)>,
    pub texture_descs: HashMap<u64, TextureDescriptor>,
    pub buffer_sizes: HashMap<u64, u64>,
    pub buffer_data: HashMap<u64, Vec<u8>>,
    pub pipelines: HashMap<u64, RenderPipelineDescriptor>,
    pub ds_states: HashMap<u64, DepthStencilStateDescriptor>,
    pub raster_states: HashMap<u64, RasterizerStateDescriptor>,
    pub viewports: HashMap<u64, ViewportDescriptor>,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            next_id: 1,
            width,
            height,
            fallback: false,
            passes: Vec::new(),
            current: None,
            view_meta: HashMap::new(),
            texture_descs: HashMap::new(),
            buffer_sizes: HashMap::new(),
            buffer_data: HashMap::new(),
            pipelines: HashMap::new(),
            ds_states: HashMap::new(),
            raster_states: HashMap::new(),
            viewports: HashMap::new(),
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(&mut self, command: Recorded) {
        if let Some(pass) = self.current.as_mut() {
            pass.commands.push(command);
        }
    }

    pub fn pass(&self, label: &str) -> &RecordedPass {
        self.passes
            .iter()
            .find(|p| p.label == label)
            .unwrap_or_else(|| panic!("no recorded pass labelled {label:?}"))
    }

    pub fn pass_labels(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.label.as_str()).collect()
    }

    /// Find the pipeline handle created under the given label
    pub fn pipeline_by_label(&self, label: &str) -> u64 {
        *self
            .pipelines
            .iter()
            .find(|(_, desc)| desc.label.as_deref() == Some(label))
            .unwrap_or_else(|| panic!("no pipeline labelled {label:?}"))
            .0
    }
}

impl GraphicsBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn begin_frame(&mut self) -> BackendResult<FrameContext> {
        let swapchain_texture = self.next();
        let view = self.next();
        self.view_meta.insert(view, (swapchain_texture, false));
        Ok(FrameContext {
            swapchain_view: TextureViewHandle::from_raw(view),
            width: self.width,
            height: self.height,
        })
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn swapchain_format(&self) -> TextureFormat {
        TextureFormat::Bgra8UnormSrgb
    }

    fn is_fallback_adapter(&self) -> bool {
        self.fallback
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        let id = self.next();
        self.buffer_sizes.insert(id, desc.size);
        Ok(BufferHandle::from_raw(id))
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        let id = self.next();
        self.buffer_sizes.insert(id, desc.size);
        self.buffer_data.insert(id, data.to_vec());
        Ok(BufferHandle::from_raw(id))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let entry = self.buffer_data.entry(buffer.raw()).or_default();
        let end = offset as usize + data.len();
        if entry.len() < end {
            entry.resize(end, 0);
        }
        entry[offset as usize..end].copy_from_slice(data);
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        let id = self.next();
        self.texture_descs.insert(id, desc.clone());
        Ok(TextureHandle::from_raw(id))
    }

    fn create_texture_view(
        &mut self,
        texture: TextureHandle,
        desc: &TextureViewDescriptor,
    ) -> BackendResult<TextureViewHandle> {
        if !self.texture_descs.contains_key(&texture.raw()) {
            return Err(BackendError::TextureCreationFailed(
                "Texture not found".into(),
            ));
        }
        let id = self.next();
        self.view_meta.insert(id, (texture.raw(), desc.read_only));
        Ok(TextureViewHandle::from_raw(id))
    }

    fn write_texture(&mut self, _texture: TextureHandle, _data: &[u8], _width: u32, _height: u32) {}

    fn create_sampler(&mut self, _desc: &SamplerDescriptor) -> BackendResult<SamplerHandle> {
        let id = self.next();
        Ok(SamplerHandle::from_raw(id))
    }

    fn texture_of_view(&self, view: TextureViewHandle) -> Option<TextureHandle> {
        self.view_meta
            .get(&view.raw())
            .map(|(texture, _)| TextureHandle::from_raw(*texture))
    }

    fn create_depth_stencil_state(
        &mut self,
        desc: &DepthStencilStateDescriptor,
    ) -> BackendResult<DepthStencilStateHandle> {
        let id = self.next();
        self.ds_states.insert(id, desc.clone());
        Ok(DepthStencilStateHandle::from_raw(id))
    }

    fn create_rasterizer_state(
        &mut self,
        desc: &RasterizerStateDescriptor,
    ) -> BackendResult<RasterizerStateHandle> {
        let id = self.next();
        self.raster_states.insert(id, desc.clone());
        Ok(RasterizerStateHandle::from_raw(id))
    }

    fn create_viewport(&mut self, desc: &ViewportDescriptor) -> BackendResult<ViewportHandle> {
        let id = self.next();
        self.viewports.insert(id, *desc);
        Ok(ViewportHandle::from_raw(id))
    }

    fn create_bind_group_layout(
        &mut self,
        _entries: &[BindGroupLayoutEntry],
    ) -> BackendResult<BindGroupLayoutHandle> {
        let id = self.next();
        Ok(BindGroupLayoutHandle::from_raw(id))
    }

    fn create_bind_group(
        &mut self,
        _layout: BindGroupLayoutHandle,
        _entries: &[(u32, BindGroupEntry)],
    ) -> BackendResult<BindGroupHandle> {
        let id = self.next();
        Ok(BindGroupHandle::from_raw(id))
    }

    fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDescriptor,
    ) -> BackendResult<RenderPipelineHandle> {
        if !self.raster_states.contains_key(&desc.rasterizer_state.raw()) {
            return Err(BackendError::PipelineCreationFailed(
                "Unknown rasterizer state".into(),
            ));
        }
        if let Some(ds) = desc.depth_stencil_state {
            if !self.ds_states.contains_key(&ds.raw()) {
                return Err(BackendError::PipelineCreationFailed(
                    "Unknown depth-stencil state".into(),
                ));
            }
        }
        let id = self.next();
        self.pipelines.insert(id, desc.clone());
        Ok(RenderPipelineHandle::from_raw(id))
    }

    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) {
        let color = desc
            .color_attachments
            .iter()
            .map(|att| RecordedColorAttachment {
                view: att.view.raw(),
                resolve_target: att.resolve_target.map(|v| v.raw()),
                clear: match &att.load_op {
                    LoadOp::Clear(color) => Some(*color),
                    LoadOp::Load => None,
                },
            })
            .collect();

        let depth = desc.depth_stencil_attachment.as_ref().map(|att| {
            let read_only = self
                .view_meta
                .get(&att.view.raw())
                .map(|(_, read_only)| *read_only)
                .unwrap_or(false);
            RecordedDepthAttachment {
                view: att.view.raw(),
                read_only,
                depth_cleared: matches!(att.depth_load_op, LoadOp::Clear(_)),
            }
        });

        self.current = Some(RecordedPass {
            label: desc.label.clone().unwrap_or_default(),
            color,
            depth,
            commands: Vec::new(),
        });
    }

    fn end_render_pass(&mut self) {
        if let Some(pass) = self.current.take() {
            self.passes.push(pass);
        }
    }

    fn set_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.record(Recorded::SetPipeline(pipeline.raw()));
    }

    fn set_bind_group(&mut self, index: u32, bind_group: BindGroupHandle) {
        self.record(Recorded::SetBindGroup(index, bind_group.raw()));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, _offset: u64) {
        self.record(Recorded::SetVertexBuffer(slot, buffer.raw()));
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, _offset: u64, _format: IndexFormat) {
        self.record(Recorded::SetIndexBuffer(buffer.raw()));
    }

    fn apply_viewport(&mut self, viewport: ViewportHandle) {
        self.record(Recorded::SetViewport(viewport.raw()));
    }

    fn set_stencil_reference(&mut self, reference: u32) {
        self.record(Recorded::SetStencilReference(reference));
    }

    fn draw(&mut self, vertices: std::ops::Range<u32>, instances: std::ops::Range<u32>) {
        self.record(Recorded::Draw {
            vertices: (vertices.start, vertices.end),
            instances: (instances.start, instances.end),
        });
    }

    fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        _base_vertex: i32,
        _instances: std::ops::Range<u32>,
    ) {
        self.record(Recorded::DrawIndexed {
            indices: (indices.start, indices.end),
        });
    }

    fn read_texture(&mut self, texture: TextureHandle) -> BackendResult<TextureReadback> {
        let desc = self
            .texture_descs
            .get(&texture.raw())
            .ok_or_else(|| BackendError::ReadbackFailed("Texture not found".into()))?;
        let size = (desc.width * desc.height * desc.format.bytes_per_pixel()) as usize;
        Ok(TextureReadback {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            data: vec![0; size],
        })
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffer_sizes.remove(&buffer.raw());
        self.buffer_data.remove(&buffer.raw());
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.texture_descs.remove(&texture.raw());
    }
}
