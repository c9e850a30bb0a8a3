//! Shader program wrapper with a uniform-location cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::{Mat4, Vec3};

use crate::device::{GlApi, ProgramId, UniformLocation};
use crate::error::DeviceError;

/// Compiled and linked program. Uniform locations are looked up once per
/// name and cached, misses included.
pub struct ShaderProgram {
    id: ProgramId,
    locations: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    pub fn from_sources<G: GlApi>(
        gl: &G,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, DeviceError> {
        let id = gl.create_program(vertex_src, fragment_src)?;
        Ok(Self {
            id,
            locations: RefCell::new(HashMap::new()),
        })
    }

    pub fn from_files<G: GlApi>(
        gl: &G,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, DeviceError> {
        let vertex_src = read_source(vertex_path.as_ref())?;
        let fragment_src = read_source(fragment_path.as_ref())?;
        Self::from_sources(gl, &vertex_src, &fragment_src)
    }

    pub fn bind<G: GlApi>(&self, gl: &G) {
        gl.use_program(Some(self.id));
    }

    pub fn unbind<G: GlApi>(&self, gl: &G) {
        gl.use_program(None);
    }

    /// The program must be bound when setting uniforms. Unknown names are
    /// skipped (matching GL's tolerance for inactive uniforms).
    pub fn set_f32<G: GlApi>(&self, gl: &G, name: &str, value: f32) {
        if let Some(location) = self.location(gl, name) {
            gl.set_uniform_f32(location, value);
        }
    }

    pub fn set_i32<G: GlApi>(&self, gl: &G, name: &str, value: i32) {
        if let Some(location) = self.location(gl, name) {
            gl.set_uniform_i32(location, value);
        }
    }

    pub fn set_vec3<G: GlApi>(&self, gl: &G, name: &str, value: Vec3) {
        if let Some(location) = self.location(gl, name) {
            gl.set_uniform_vec3(location, value.to_array());
        }
    }

    pub fn set_mat4<G: GlApi>(&self, gl: &G, name: &str, value: &Mat4) {
        if let Some(location) = self.location(gl, name) {
            gl.set_uniform_mat4(location, &value.to_cols_array());
        }
    }

    fn location<G: GlApi>(&self, gl: &G, name: &str) -> Option<UniformLocation> {
        if let Some(&cached) = self.locations.borrow().get(name) {
            return cached;
        }
        let location = gl.uniform_location(self.id, name);
        if location.is_none() {
            log::debug!("Uniform '{name}' not active in shader program");
        }
        self.locations
            .borrow_mut()
            .insert(name.to_owned(), location);
        location
    }

    pub fn destroy<G: GlApi>(self, gl: &G) {
        gl.delete_program(self.id);
    }
}

fn read_source(path: &Path) -> Result<String, DeviceError> {
    fs::read_to_string(path).map_err(|source| DeviceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
