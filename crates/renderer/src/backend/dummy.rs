//! Recording device backend for headless tests.
//!
//! Performs no GPU work: ids are handed out sequentially, every call is
//! appended to an inspectable log, and live resources are tracked so tests
//! can assert lifecycle invariants (nothing leaked, nothing double-freed).

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

use crate::device::{
    BufferId, BufferTarget, FramebufferId, GlApi, ProgramId, RenderbufferId, TextureFilter,
    TextureId, UniformLocation, VertexArrayId,
};
use crate::error::DeviceError;

/// One recorded device call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DeleteVertexArray(VertexArrayId),
    CreateBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData(BufferTarget, usize),
    DeleteBuffer(BufferId),
    VertexAttribPointer {
        slot: u32,
        components: i32,
        normalized: bool,
    },
    EnableVertexAttrib(u32),
    DisableVertexAttrib(u32),
    DrawIndexedTriangles(i32),
    Clear,
    Viewport(i32, i32),
    EnableDepthTest,
    CreateTexture(TextureId),
    BindTexture {
        unit: u32,
        texture: Option<TextureId>,
    },
    UploadTexture {
        width: i32,
        height: i32,
        has_pixels: bool,
        filter: TextureFilter,
    },
    DeleteTexture(TextureId),
    CreateProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    DeleteProgram(ProgramId),
    UniformLookup(String),
    SetUniformF32(UniformLocation, f32),
    SetUniformI32(UniformLocation, i32),
    SetUniformVec3(UniformLocation),
    SetUniformMat4(UniformLocation),
    CreateFramebuffer(FramebufferId),
    BindFramebuffer(Option<FramebufferId>),
    AttachColorTexture {
        index: u32,
        texture: TextureId,
    },
    CreateRenderbuffer(RenderbufferId),
    AttachDepthStencil(RenderbufferId),
    DeleteFramebuffer(FramebufferId),
    DeleteRenderbuffer(RenderbufferId),
}

pub struct DummyBackend {
    next_id: Cell<u32>,
    next_location: Cell<u32>,
    calls: RefCell<Vec<Call>>,
    live: RefCell<HashSet<u32>>,
    locations: RefCell<HashMap<(ProgramId, String), UniformLocation>>,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            next_location: Cell::new(0),
            calls: RefCell::new(Vec::new()),
            live: RefCell::new(HashSet::new()),
            locations: RefCell::new(HashMap::new()),
        }
    }

    fn alloc(&self) -> NonZeroU32 {
        let raw = self.next_id.get();
        self.next_id.set(raw + 1);
        self.live.borrow_mut().insert(raw);
        NonZeroU32::new(raw).expect("id counter starts at 1")
    }

    fn release(&self, raw: NonZeroU32) {
        if !self.live.borrow_mut().remove(&raw.get()) {
            panic!("double release of device id {raw}");
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    /// Snapshot of every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of created-but-not-deleted device objects.
    pub fn live_resources(&self) -> usize {
        self.live.borrow().len()
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlApi for DummyBackend {
    fn create_vertex_array(&self) -> Result<VertexArrayId, DeviceError> {
        let id = VertexArrayId(self.alloc());
        self.record(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        self.record(Call::BindVertexArray(vao));
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        self.release(vao.0);
        self.record(Call::DeleteVertexArray(vao));
    }

    fn create_buffer(&self) -> Result<BufferId, DeviceError> {
        let id = BufferId(self.alloc());
        self.record(Call::CreateBuffer(id));
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record(Call::BufferData(target, data.len()));
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.release(buffer.0);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer_f32(&self, slot: u32, components: i32, normalized: bool) {
        self.record(Call::VertexAttribPointer {
            slot,
            components,
            normalized,
        });
    }

    fn enable_vertex_attrib(&self, slot: u32) {
        self.record(Call::EnableVertexAttrib(slot));
    }

    fn disable_vertex_attrib(&self, slot: u32) {
        self.record(Call::DisableVertexAttrib(slot));
    }

    fn draw_indexed_triangles(&self, index_count: i32) {
        self.record(Call::DrawIndexedTriangles(index_count));
    }

    fn clear(&self, _r: f32, _g: f32, _b: f32, _a: f32) {
        self.record(Call::Clear);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport(width, height));
    }

    fn enable_depth_test(&self) {
        self.record(Call::EnableDepthTest);
    }

    fn create_texture(&self) -> Result<TextureId, DeviceError> {
        let id = TextureId(self.alloc());
        self.record(Call::CreateTexture(id));
        Ok(id)
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        self.record(Call::BindTexture { unit, texture });
    }

    fn upload_texture_rgba8(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
        filter: TextureFilter,
    ) {
        self.record(Call::UploadTexture {
            width,
            height,
            has_pixels: pixels.is_some(),
            filter,
        });
    }

    fn delete_texture(&self, texture: TextureId) {
        self.release(texture.0);
        self.record(Call::DeleteTexture(texture));
    }

    fn create_program(
        &self,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> Result<ProgramId, DeviceError> {
        let id = ProgramId(self.alloc());
        self.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.record(Call::UniformLookup(name.to_owned()));
        let mut locations = self.locations.borrow_mut();
        let location = *locations
            .entry((program, name.to_owned()))
            .or_insert_with(|| {
                let location = UniformLocation(self.next_location.get());
                self.next_location.set(location.0 + 1);
                location
            });
        Some(location)
    }

    fn set_uniform_f32(&self, location: UniformLocation, value: f32) {
        self.record(Call::SetUniformF32(location, value));
    }

    fn set_uniform_i32(&self, location: UniformLocation, value: i32) {
        self.record(Call::SetUniformI32(location, value));
    }

    fn set_uniform_vec3(&self, location: UniformLocation, _value: [f32; 3]) {
        self.record(Call::SetUniformVec3(location));
    }

    fn set_uniform_mat4(&self, location: UniformLocation, _value: &[f32; 16]) {
        self.record(Call::SetUniformMat4(location));
    }

    fn delete_program(&self, program: ProgramId) {
        self.release(program.0);
        self.record(Call::DeleteProgram(program));
    }

    fn create_framebuffer(&self) -> Result<FramebufferId, DeviceError> {
        let id = FramebufferId(self.alloc());
        self.record(Call::CreateFramebuffer(id));
        Ok(id)
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        self.record(Call::BindFramebuffer(framebuffer));
    }

    fn attach_color_texture(&self, index: u32, texture: TextureId) {
        self.record(Call::AttachColorTexture { index, texture });
    }

    fn create_renderbuffer(&self) -> Result<RenderbufferId, DeviceError> {
        let id = RenderbufferId(self.alloc());
        self.record(Call::CreateRenderbuffer(id));
        Ok(id)
    }

    fn attach_depth_stencil_renderbuffer(
        &self,
        renderbuffer: RenderbufferId,
        _width: i32,
        _height: i32,
    ) {
        self.record(Call::AttachDepthStencil(renderbuffer));
    }

    fn framebuffer_complete(&self) -> bool {
        true
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.release(framebuffer.0);
        self.record(Call::DeleteFramebuffer(framebuffer));
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        self.release(renderbuffer.0);
        self.record(Call::DeleteRenderbuffer(renderbuffer));
    }

    fn poll_error(&self) -> Option<u32> {
        None
    }
}
