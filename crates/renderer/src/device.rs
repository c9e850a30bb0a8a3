//! Narrow GL device abstraction.
//!
//! The resource wrappers ([`crate::model::Model`], [`crate::shader`],
//! [`crate::framebuffer`]) consume the graphics API only through this
//! trait, so their binding/lifecycle logic is testable without a GL
//! context. Operations that act on "the bound object" (buffer uploads,
//! texture uploads, framebuffer attachments) follow GL's bind-then-operate
//! model rather than taking the handle again.

use std::num::NonZeroU32;

use crate::error::DeviceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub(crate) NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub(crate) NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub(crate) NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderbufferId(pub(crate) NonZeroU32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Minification filtering for uploaded textures; magnification is always
/// linear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFilter {
    Linear,
    Mipmap,
}

pub trait GlApi {
    // Vertex arrays
    fn create_vertex_array(&self) -> Result<VertexArrayId, DeviceError>;
    fn bind_vertex_array(&self, vao: Option<VertexArrayId>);
    fn delete_vertex_array(&self, vao: VertexArrayId);

    // Buffers
    fn create_buffer(&self) -> Result<BufferId, DeviceError>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    /// Upload `data` into the buffer bound to `target` (static draw usage).
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: BufferId);

    // Vertex attributes (float data, tightly packed)
    fn vertex_attrib_pointer_f32(&self, slot: u32, components: i32, normalized: bool);
    fn enable_vertex_attrib(&self, slot: u32);
    fn disable_vertex_attrib(&self, slot: u32);

    // Frame operations
    /// Indexed triangle-list draw over `index_count` u32 indices.
    fn draw_indexed_triangles(&self, index_count: i32);
    /// Clear color and depth buffers to the given color.
    fn clear(&self, r: f32, g: f32, b: f32, a: f32);
    fn viewport(&self, width: i32, height: i32);
    fn enable_depth_test(&self);

    // Textures
    fn create_texture(&self) -> Result<TextureId, DeviceError>;
    /// Activate texture `unit` and (un)bind the 2D texture there.
    fn bind_texture(&self, unit: u32, texture: Option<TextureId>);
    /// Upload RGBA8 pixels (or allocate uninitialized storage when `None`)
    /// into the texture bound to the active unit, and set its filtering.
    fn upload_texture_rgba8(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
        filter: TextureFilter,
    );
    fn delete_texture(&self, texture: TextureId);

    // Shader programs
    /// Compile both stages and link them; compile/link logs are surfaced
    /// in the error.
    fn create_program(
        &self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, DeviceError>;
    fn use_program(&self, program: Option<ProgramId>);
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn set_uniform_f32(&self, location: UniformLocation, value: f32);
    fn set_uniform_i32(&self, location: UniformLocation, value: i32);
    fn set_uniform_vec3(&self, location: UniformLocation, value: [f32; 3]);
    /// Column-major 4x4 matrix.
    fn set_uniform_mat4(&self, location: UniformLocation, value: &[f32; 16]);
    fn delete_program(&self, program: ProgramId);

    // Framebuffers
    fn create_framebuffer(&self) -> Result<FramebufferId, DeviceError>;
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>);
    /// Attach `texture` as color attachment `index` of the bound framebuffer.
    fn attach_color_texture(&self, index: u32, texture: TextureId);
    fn create_renderbuffer(&self) -> Result<RenderbufferId, DeviceError>;
    /// Allocate depth24/stencil8 storage for `renderbuffer` and attach it
    /// to the bound framebuffer.
    fn attach_depth_stencil_renderbuffer(
        &self,
        renderbuffer: RenderbufferId,
        width: i32,
        height: i32,
    );
    fn framebuffer_complete(&self) -> bool;
    fn delete_framebuffer(&self, framebuffer: FramebufferId);
    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId);

    // Diagnostics
    /// Drain one pending GL error flag, if any.
    fn poll_error(&self) -> Option<u32>;
}
