//! Real device backend over [`glow`].
//!
//! Thin call-throughs only; all binding/lifecycle policy lives in the
//! resource wrappers.

use std::os::raw::c_void;

use glow::HasContext;

use crate::device::{
    BufferId, BufferTarget, FramebufferId, GlApi, ProgramId, RenderbufferId, TextureFilter,
    TextureId, UniformLocation, VertexArrayId,
};
use crate::error::DeviceError;

pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Build from a GL function loader (e.g. a windowed context's
    /// `get_proc_address`).
    ///
    /// # Safety
    /// The loader must return pointers valid for the current GL context,
    /// and that context must stay current on this thread for the lifetime
    /// of the backend.
    pub unsafe fn from_loader(loader: impl FnMut(&str) -> *const c_void) -> Self {
        Self {
            gl: unsafe { glow::Context::from_loader_function(loader) },
        }
    }
}

fn gl_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn vao(id: VertexArrayId) -> glow::NativeVertexArray {
    glow::NativeVertexArray(id.0)
}

fn buffer(id: BufferId) -> glow::NativeBuffer {
    glow::NativeBuffer(id.0)
}

fn texture(id: TextureId) -> glow::NativeTexture {
    glow::NativeTexture(id.0)
}

fn program(id: ProgramId) -> glow::NativeProgram {
    glow::NativeProgram(id.0)
}

fn framebuffer(id: FramebufferId) -> glow::NativeFramebuffer {
    glow::NativeFramebuffer(id.0)
}

fn renderbuffer(id: RenderbufferId) -> glow::NativeRenderbuffer {
    glow::NativeRenderbuffer(id.0)
}

impl GlowBackend {
    fn compile_stage(
        &self,
        kind: u32,
        stage: &'static str,
        src: &str,
    ) -> Result<glow::NativeShader, DeviceError> {
        unsafe {
            let shader = self
                .gl
                .create_shader(kind)
                .map_err(|_| DeviceError::ResourceAllocation("shader"))?;
            self.gl.shader_source(shader, src);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(DeviceError::ShaderCompile { stage, log });
            }
            Ok(shader)
        }
    }
}

impl GlApi for GlowBackend {
    fn create_vertex_array(&self) -> Result<VertexArrayId, DeviceError> {
        unsafe {
            self.gl
                .create_vertex_array()
                .map(|v| VertexArrayId(v.0))
                .map_err(|_| DeviceError::ResourceAllocation("vertex array"))
        }
    }

    fn bind_vertex_array(&self, id: Option<VertexArrayId>) {
        unsafe { self.gl.bind_vertex_array(id.map(vao)) }
    }

    fn delete_vertex_array(&self, id: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(vao(id)) }
    }

    fn create_buffer(&self) -> Result<BufferId, DeviceError> {
        unsafe {
            self.gl
                .create_buffer()
                .map(|b| BufferId(b.0))
                .map_err(|_| DeviceError::ResourceAllocation("buffer"))
        }
    }

    fn bind_buffer(&self, target: BufferTarget, id: Option<BufferId>) {
        unsafe { self.gl.bind_buffer(gl_target(target), id.map(buffer)) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(gl_target(target), data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, id: BufferId) {
        unsafe { self.gl.delete_buffer(buffer(id)) }
    }

    fn vertex_attrib_pointer_f32(&self, slot: u32, components: i32, normalized: bool) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(slot, components, glow::FLOAT, normalized, 0, 0)
        }
    }

    fn enable_vertex_attrib(&self, slot: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(slot) }
    }

    fn disable_vertex_attrib(&self, slot: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(slot) }
    }

    fn draw_indexed_triangles(&self, index_count: i32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, index_count, glow::UNSIGNED_INT, 0)
        }
    }

    fn clear(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { self.gl.viewport(0, 0, width, height) }
    }

    fn enable_depth_test(&self) {
        unsafe { self.gl.enable(glow::DEPTH_TEST) }
    }

    fn create_texture(&self) -> Result<TextureId, DeviceError> {
        unsafe {
            self.gl
                .create_texture()
                .map(|t| TextureId(t.0))
                .map_err(|_| DeviceError::ResourceAllocation("texture"))
        }
    }

    fn bind_texture(&self, unit: u32, id: Option<TextureId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, id.map(texture));
        }
    }

    fn upload_texture_rgba8(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
        filter: TextureFilter,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                pixels,
            );
            let min_filter = match filter {
                TextureFilter::Mipmap => {
                    self.gl.generate_mipmap(glow::TEXTURE_2D);
                    glow::LINEAR_MIPMAP_LINEAR
                }
                TextureFilter::Linear => glow::LINEAR,
            };
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min_filter as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        }
    }

    fn delete_texture(&self, id: TextureId) {
        unsafe { self.gl.delete_texture(texture(id)) }
    }

    fn create_program(
        &self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramId, DeviceError> {
        let vs = self.compile_stage(glow::VERTEX_SHADER, "vertex", vertex_src)?;
        let fs = match self.compile_stage(glow::FRAGMENT_SHADER, "fragment", fragment_src) {
            Ok(fs) => fs,
            Err(err) => {
                unsafe { self.gl.delete_shader(vs) };
                return Err(err);
            }
        };
        unsafe {
            let program = match self.gl.create_program() {
                Ok(p) => p,
                Err(_) => {
                    self.gl.delete_shader(vs);
                    self.gl.delete_shader(fs);
                    return Err(DeviceError::ResourceAllocation("shader program"));
                }
            };
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(DeviceError::ProgramLink { log });
            }
            Ok(ProgramId(program.0))
        }
    }

    fn use_program(&self, id: Option<ProgramId>) {
        unsafe { self.gl.use_program(id.map(program)) }
    }

    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(program(id), name)
                .map(|l| UniformLocation(l.0))
        }
    }

    fn set_uniform_f32(&self, location: UniformLocation, value: f32) {
        unsafe {
            self.gl
                .uniform_1_f32(Some(&glow::NativeUniformLocation(location.0)), value)
        }
    }

    fn set_uniform_i32(&self, location: UniformLocation, value: i32) {
        unsafe {
            self.gl
                .uniform_1_i32(Some(&glow::NativeUniformLocation(location.0)), value)
        }
    }

    fn set_uniform_vec3(&self, location: UniformLocation, value: [f32; 3]) {
        unsafe {
            self.gl.uniform_3_f32(
                Some(&glow::NativeUniformLocation(location.0)),
                value[0],
                value[1],
                value[2],
            )
        }
    }

    fn set_uniform_mat4(&self, location: UniformLocation, value: &[f32; 16]) {
        unsafe {
            self.gl.uniform_matrix_4_f32_slice(
                Some(&glow::NativeUniformLocation(location.0)),
                false,
                value,
            )
        }
    }

    fn delete_program(&self, id: ProgramId) {
        unsafe { self.gl.delete_program(program(id)) }
    }

    fn create_framebuffer(&self) -> Result<FramebufferId, DeviceError> {
        unsafe {
            self.gl
                .create_framebuffer()
                .map(|f| FramebufferId(f.0))
                .map_err(|_| DeviceError::ResourceAllocation("framebuffer"))
        }
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) {
        unsafe {
            self.gl
                .bind_framebuffer(glow::FRAMEBUFFER, id.map(framebuffer))
        }
    }

    fn attach_color_texture(&self, index: u32, id: TextureId) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0 + index,
                glow::TEXTURE_2D,
                Some(texture(id)),
                0,
            )
        }
    }

    fn create_renderbuffer(&self) -> Result<RenderbufferId, DeviceError> {
        unsafe {
            self.gl
                .create_renderbuffer()
                .map(|r| RenderbufferId(r.0))
                .map_err(|_| DeviceError::ResourceAllocation("renderbuffer"))
        }
    }

    fn attach_depth_stencil_renderbuffer(&self, id: RenderbufferId, width: i32, height: i32) {
        unsafe {
            self.gl
                .bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer(id)));
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH24_STENCIL8,
                width,
                height,
            );
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_STENCIL_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(renderbuffer(id)),
            );
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    fn framebuffer_complete(&self) -> bool {
        unsafe {
            self.gl.check_framebuffer_status(glow::FRAMEBUFFER) == glow::FRAMEBUFFER_COMPLETE
        }
    }

    fn delete_framebuffer(&self, id: FramebufferId) {
        unsafe { self.gl.delete_framebuffer(framebuffer(id)) }
    }

    fn delete_renderbuffer(&self, id: RenderbufferId) {
        unsafe { self.gl.delete_renderbuffer(renderbuffer(id)) }
    }

    fn poll_error(&self) -> Option<u32> {
        let code = unsafe { self.gl.get_error() };
        (code != glow::NO_ERROR).then_some(code)
    }
}
