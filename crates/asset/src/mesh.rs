//! CPU-side mesh data: flat, GPU-ready attribute arrays.

/// Indexed triangle mesh as flat per-vertex arrays.
///
/// `positions` holds 3 floats per vertex, `tex_coords` 2, `normals` 3;
/// `indices` holds one entry per triangle corner and addresses the
/// position array. Tex coords and normals are stored per *vertex*, not
/// per corner: a vertex shared by faces that disagree on texcoord/normal
/// keeps whichever face wrote last (see the `obj` module).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Non-empty, well-shaped arrays with every index in range.
    pub fn is_valid(&self) -> bool {
        !self.positions.is_empty()
            && self.positions.len() % 3 == 0
            && !self.indices.is_empty()
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertex_count())
    }

    /// Built-in unit quad in the XY plane, facing +Z. The default scene
    /// when no model file is given.
    pub fn unit_quad() -> Self {
        Self {
            positions: vec![
                -0.5, -0.5, 0.0, //
                0.5, -0.5, 0.0, //
                -0.5, 0.5, 0.0, //
                0.5, 0.5, 0.0,
            ],
            tex_coords: vec![
                0.0, 0.0, //
                1.0, 0.0, //
                0.0, 1.0, //
                1.0, 1.0,
            ],
            normals: vec![
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0,
            ],
            indices: vec![0, 1, 2, 1, 3, 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_quad_is_valid() {
        let quad = MeshData::unit_quad();
        assert!(quad.is_valid());
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.index_count(), 6);
    }

    #[test]
    fn default_mesh_is_invalid() {
        assert!(!MeshData::default().is_valid());
    }

    #[test]
    fn out_of_range_index_invalidates() {
        let mut quad = MeshData::unit_quad();
        quad.indices[0] = 4;
        assert!(!quad.is_valid());
    }
}
