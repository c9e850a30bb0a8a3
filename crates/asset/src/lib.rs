//! Asset loading/parsers (meshes, textures).

pub mod mesh;
pub mod obj;
pub mod texture;
