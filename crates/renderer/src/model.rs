//! GPU-side model: vertex array + per-attribute buffers + index buffer.

use asset::mesh::MeshData;

use crate::device::{BufferId, BufferTarget, GlApi, TextureId, VertexArrayId};
use crate::error::DeviceError;
use crate::shader::ShaderProgram;
use crate::texture::Texture2d;

/// Float uniform the scene shader reads to branch between textured and
/// flat-color output (1.0 when any texture is attached).
pub const USE_TEXTURE_UNIFORM: &str = "useTexture";

/// One drawable mesh on the device.
///
/// Owns its vertex array, attribute buffers and index buffer; attached
/// textures are referenced only and survive [`Model::destroy`]. Draws are
/// valid between `bind` and `unbind` with the shader active.
pub struct Model {
    vao: VertexArrayId,
    attribute_buffers: Vec<BufferId>,
    index_buffer: Option<BufferId>,
    index_count: i32,
    textures: Vec<TextureId>,
}

impl Model {
    pub fn new<G: GlApi>(gl: &G) -> Result<Self, DeviceError> {
        let vao = gl.create_vertex_array()?;
        Ok(Self {
            vao,
            attribute_buffers: Vec::new(),
            index_buffer: None,
            index_count: 0,
            textures: Vec::new(),
        })
    }

    /// Upload positions, tex coords, normals and indices of `mesh` in the
    /// slot order the scene shader consumes (0/1/2).
    pub fn from_mesh<G: GlApi>(gl: &G, mesh: &MeshData) -> Result<Self, DeviceError> {
        let mut model = Self::new(gl)?;
        let uploaded = (|| {
            model.add_attribute_buffer(gl, &mesh.positions, 3, false)?;
            model.add_attribute_buffer(gl, &mesh.tex_coords, 2, false)?;
            model.add_attribute_buffer(gl, &mesh.normals, 3, true)?;
            model.set_index_buffer(gl, &mesh.indices)
        })();
        match uploaded {
            Ok(()) => Ok(model),
            Err(err) => {
                model.destroy(gl);
                Err(err)
            }
        }
    }

    /// Upload `data` into a fresh device buffer and register it as the
    /// next attribute slot. Slots number from 0 in call order.
    pub fn add_attribute_buffer<G: GlApi>(
        &mut self,
        gl: &G,
        data: &[f32],
        components: i32,
        normalized: bool,
    ) -> Result<(), DeviceError> {
        let slot = self.attribute_buffers.len() as u32;
        let buffer = gl.create_buffer()?;
        gl.bind_vertex_array(Some(self.vao));
        gl.bind_buffer(BufferTarget::Array, Some(buffer));
        gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(data));
        gl.vertex_attrib_pointer_f32(slot, components, normalized);
        gl.bind_buffer(BufferTarget::Array, None);
        gl.bind_vertex_array(None);
        self.attribute_buffers.push(buffer);
        Ok(())
    }

    /// Upload the index buffer. Replacing an existing one releases the old
    /// device buffer first.
    pub fn set_index_buffer<G: GlApi>(
        &mut self,
        gl: &G,
        indices: &[u32],
    ) -> Result<(), DeviceError> {
        if let Some(old) = self.index_buffer.take() {
            gl.delete_buffer(old);
        }
        let buffer = gl.create_buffer()?;
        gl.bind_buffer(BufferTarget::ElementArray, Some(buffer));
        gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
        gl.bind_buffer(BufferTarget::ElementArray, None);
        self.index_buffer = Some(buffer);
        self.index_count = indices.len() as i32;
        Ok(())
    }

    /// Reference a texture for `bind` to place on the next texture unit.
    /// The model does not take ownership.
    pub fn attach_texture(&mut self, texture: &Texture2d) {
        self.textures.push(texture.id());
    }

    /// Activate vertex array, index buffer, attribute slots and textures,
    /// and tell `shader` whether textures are attached. The shader must be
    /// bound.
    pub fn bind<G: GlApi>(&self, gl: &G, shader: &ShaderProgram) {
        gl.bind_vertex_array(Some(self.vao));
        gl.bind_buffer(BufferTarget::ElementArray, self.index_buffer);
        for slot in 0..self.attribute_buffers.len() as u32 {
            gl.enable_vertex_attrib(slot);
        }
        for (unit, &texture) in self.textures.iter().enumerate() {
            gl.bind_texture(unit as u32, Some(texture));
        }
        let textured = if self.textures.is_empty() { 0.0 } else { 1.0 };
        shader.set_f32(gl, USE_TEXTURE_UNIFORM, textured);
    }

    pub fn draw<G: GlApi>(&self, gl: &G) {
        gl.draw_indexed_triangles(self.index_count);
    }

    /// Restore global binding state to "nothing bound".
    pub fn unbind<G: GlApi>(&self, gl: &G) {
        for unit in (0..self.textures.len() as u32).rev() {
            gl.bind_texture(unit, None);
        }
        for slot in (0..self.attribute_buffers.len() as u32).rev() {
            gl.disable_vertex_attrib(slot);
        }
        gl.bind_buffer(BufferTarget::ElementArray, None);
        gl.bind_vertex_array(None);
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }

    /// Release every owned device object. Attached textures are left
    /// alive for their owners.
    pub fn destroy<G: GlApi>(self, gl: &G) {
        for buffer in self.attribute_buffers {
            gl.delete_buffer(buffer);
        }
        if let Some(index_buffer) = self.index_buffer {
            gl.delete_buffer(index_buffer);
        }
        gl.delete_vertex_array(self.vao);
    }
}
