//! Device-side 2D textures (RGBA8).

use asset::texture::TextureData;

use crate::device::{GlApi, TextureFilter, TextureId};
use crate::error::DeviceError;

pub struct Texture2d {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture2d {
    /// Upload decoded pixel data, with mipmaps when requested.
    pub fn from_data<G: GlApi>(
        gl: &G,
        data: &TextureData,
        mipmap: bool,
    ) -> Result<Self, DeviceError> {
        let filter = if mipmap {
            TextureFilter::Mipmap
        } else {
            TextureFilter::Linear
        };
        Self::upload(gl, data.width, data.height, Some(&data.pixels), filter)
    }

    /// Uninitialized storage, e.g. a framebuffer color attachment.
    pub fn render_target<G: GlApi>(gl: &G, width: u32, height: u32) -> Result<Self, DeviceError> {
        Self::upload(gl, width, height, None, TextureFilter::Linear)
    }

    fn upload<G: GlApi>(
        gl: &G,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
        filter: TextureFilter,
    ) -> Result<Self, DeviceError> {
        let id = gl.create_texture()?;
        gl.bind_texture(0, Some(id));
        gl.upload_texture_rgba8(width as i32, height as i32, pixels, filter);
        gl.bind_texture(0, None);
        Ok(Self { id, width, height })
    }

    pub fn bind<G: GlApi>(&self, gl: &G, unit: u32) {
        gl.bind_texture(unit, Some(self.id));
    }

    pub fn unbind<G: GlApi>(&self, gl: &G, unit: u32) {
        gl.bind_texture(unit, None);
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn destroy<G: GlApi>(self, gl: &G) {
        gl.delete_texture(self.id);
    }
}
