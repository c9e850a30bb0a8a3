//! Off-screen framebuffers and the explicit post-processing quad.

use crate::device::{FramebufferId, GlApi, RenderbufferId};
use crate::error::DeviceError;
use crate::model::Model;
use crate::shader::ShaderProgram;
use crate::texture::Texture2d;

/// Fullscreen quad for post-processing passes. Created once next to the
/// framebuffer and passed by reference to [`Framebuffer::draw`] — no
/// process-wide shared quad.
pub struct PostQuad {
    model: Model,
}

impl PostQuad {
    pub fn new<G: GlApi>(gl: &G) -> Result<Self, DeviceError> {
        let positions: [f32; 8] = [
            -1.0, -1.0, //
            1.0, -1.0, //
            -1.0, 1.0, //
            1.0, 1.0,
        ];
        let tex_coords: [f32; 8] = [
            0.0, 0.0, //
            1.0, 0.0, //
            0.0, 1.0, //
            1.0, 1.0,
        ];
        let indices: [u32; 6] = [0, 1, 2, 1, 3, 2];

        let mut model = Model::new(gl)?;
        let uploaded = (|| {
            model.add_attribute_buffer(gl, &positions, 2, false)?;
            model.add_attribute_buffer(gl, &tex_coords, 2, false)?;
            model.set_index_buffer(gl, &indices)
        })();
        match uploaded {
            Ok(()) => Ok(Self { model }),
            Err(err) => {
                model.destroy(gl);
                Err(err)
            }
        }
    }

    pub fn destroy<G: GlApi>(self, gl: &G) {
        self.model.destroy(gl);
    }
}

/// Off-screen render target. Owns its color-attachment textures and
/// depth/stencil renderbuffers; attachment indices follow call order.
pub struct Framebuffer {
    id: FramebufferId,
    color_attachments: Vec<Texture2d>,
    renderbuffers: Vec<RenderbufferId>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    pub fn new<G: GlApi>(gl: &G, width: u32, height: u32) -> Result<Self, DeviceError> {
        let id = gl.create_framebuffer()?;
        Ok(Self {
            id,
            color_attachments: Vec::new(),
            renderbuffers: Vec::new(),
            width,
            height,
        })
    }

    /// Add a color attachment, sampled later by the post shader.
    pub fn add_color_attachment<G: GlApi>(&mut self, gl: &G) -> Result<(), DeviceError> {
        let texture = Texture2d::render_target(gl, self.width, self.height)?;
        gl.bind_framebuffer(Some(self.id));
        gl.attach_color_texture(self.color_attachments.len() as u32, texture.id());
        gl.bind_framebuffer(None);
        self.color_attachments.push(texture);
        Ok(())
    }

    /// Add a combined depth/stencil renderbuffer.
    pub fn add_depth_stencil<G: GlApi>(&mut self, gl: &G) -> Result<(), DeviceError> {
        let renderbuffer = gl.create_renderbuffer()?;
        gl.bind_framebuffer(Some(self.id));
        gl.attach_depth_stencil_renderbuffer(renderbuffer, self.width as i32, self.height as i32);
        gl.bind_framebuffer(None);
        self.renderbuffers.push(renderbuffer);
        Ok(())
    }

    pub fn is_complete<G: GlApi>(&self, gl: &G) -> bool {
        gl.bind_framebuffer(Some(self.id));
        let complete = gl.framebuffer_complete();
        gl.bind_framebuffer(None);
        complete
    }

    /// Bind for off-screen rendering and clear its buffers.
    pub fn bind_and_clear<G: GlApi>(&self, gl: &G) {
        gl.bind_framebuffer(Some(self.id));
        gl.clear(0.0, 0.0, 0.0, 0.0);
    }

    /// Rebind the default framebuffer.
    pub fn unbind<G: GlApi>(&self, gl: &G) {
        gl.bind_framebuffer(None);
    }

    /// Draw the color attachments onto the current framebuffer through
    /// `shader`, which must be bound.
    pub fn draw<G: GlApi>(&self, gl: &G, quad: &PostQuad, shader: &ShaderProgram) {
        quad.model.bind(gl, shader);
        for (unit, texture) in self.color_attachments.iter().enumerate() {
            texture.bind(gl, unit as u32);
        }
        quad.model.draw(gl);
        for (unit, texture) in self.color_attachments.iter().enumerate().rev() {
            texture.unbind(gl, unit as u32);
        }
        quad.model.unbind(gl);
    }

    pub fn destroy<G: GlApi>(self, gl: &G) {
        for renderbuffer in self.renderbuffers {
            gl.delete_renderbuffer(renderbuffer);
        }
        for texture in self.color_attachments {
            texture.destroy(gl);
        }
        gl.delete_framebuffer(self.id);
    }
}
