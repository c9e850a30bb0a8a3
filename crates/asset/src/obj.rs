//! Strict OBJ-subset parser producing flat, position-indexed buffers.
//!
//! Supported statements: `v`, `vt`, `vn` and triangulated `f` lines with
//! full `pos/tex/norm` corners; every other directive is skipped. Indices
//! are 1-based in the file and converted to 0-based. Texture V is flipped
//! (`v' = 1 - v`) to match image coordinates.
//!
//! Attributes are stored per *position*: each face corner scatter-writes
//! its texcoord/normal into the slot addressed by the corner's position
//! index. A position shared between faces with different texcoord/normal
//! indices therefore keeps the values of the face parsed last; splitting
//! such vertices into distinct GPU vertices is out of scope.
//!
//! All `v`/`vt`/`vn` statements are expected to precede the `f` statements
//! that reference them. The per-vertex attribute arrays are sized at the
//! first `f` line, and any corner index that falls outside the data
//! declared by then is a parse error.

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};

use crate::mesh::MeshData;

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    parse_obj(BufReader::new(file))
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    parse_obj(Cursor::new(contents))
}

fn parse_obj<R: BufRead>(reader: R) -> Result<MeshData> {
    let mut positions: Vec<f32> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut indices: Vec<u32> = Vec::new();
    // Per-vertex attribute arrays, allocated at the first face line and
    // sized to the positions declared by then.
    let mut expanded_texcoords: Vec<f32> = Vec::new();
    let mut expanded_normals: Vec<f32> = Vec::new();
    let mut seen_face = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let line = line.trim_end_matches('\r');

        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else { continue };

        match tag {
            "v" => {
                let [x, y, z] = parse_floats::<3>(tokens, line, line_no)?;
                positions.extend_from_slice(&[x, y, z]);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(tokens, line, line_no)?;
                // Flip V to match the image origin convention.
                texcoords.push([u, 1.0 - v]);
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(tokens, line, line_no)?;
                normals.push([x, y, z]);
            }
            "f" => {
                if !seen_face {
                    expanded_texcoords = vec![0.0; positions.len() / 3 * 2];
                    expanded_normals = vec![0.0; positions.len()];
                    seen_face = true;
                }
                let vertex_count = expanded_normals.len() / 3;

                let corners: Vec<&str> = tokens.collect();
                if corners.len() != 3 {
                    bail!(
                        "Face with {} corners on line {} (triangles only): '{}'",
                        corners.len(),
                        line_no + 1,
                        line
                    );
                }
                for corner in corners {
                    let (pi, ti, ni) = parse_corner(corner, line_no)?;
                    if pi >= vertex_count {
                        bail!(
                            "Position index {} out of range on line {} ({} vertices declared before the first face): '{}'",
                            pi + 1,
                            line_no + 1,
                            vertex_count,
                            line
                        );
                    }
                    let [u, v] = *texcoords.get(ti).ok_or_else(|| {
                        anyhow!(
                            "Texture coordinate index {} out of range on line {} ({} declared): '{}'",
                            ti + 1,
                            line_no + 1,
                            texcoords.len(),
                            line
                        )
                    })?;
                    let normal = *normals.get(ni).ok_or_else(|| {
                        anyhow!(
                            "Normal index {} out of range on line {} ({} declared): '{}'",
                            ni + 1,
                            line_no + 1,
                            normals.len(),
                            line
                        )
                    })?;

                    indices.push(pi as u32);
                    expanded_texcoords[pi * 2] = u;
                    expanded_texcoords[pi * 2 + 1] = v;
                    expanded_normals[pi * 3..pi * 3 + 3].copy_from_slice(&normal);
                }
            }
            // Comments, o/g/s/usemtl/mtllib and friends.
            _ => {}
        }
    }

    if indices.is_empty() {
        bail!("OBJ contained no triangles");
    }

    Ok(MeshData {
        positions,
        tex_coords: expanded_texcoords,
        normals: expanded_normals,
        indices,
    })
}

fn parse_floats<const N: usize>(
    mut tokens: std::str::SplitWhitespace<'_>,
    line: &str,
    line_no: usize,
) -> Result<[f32; N]> {
    let mut out = [0.0_f32; N];
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| {
            anyhow!(
                "Expected {} numeric fields on line {}: '{}'",
                N,
                line_no + 1,
                line
            )
        })?;
        *slot = token.parse::<f32>().with_context(|| {
            format!("Invalid number '{}' on line {}: '{}'", token, line_no + 1, line)
        })?;
    }
    if tokens.next().is_some() {
        bail!(
            "Expected exactly {} numeric fields on line {}: '{}'",
            N,
            line_no + 1,
            line
        );
    }
    Ok(out)
}

/// Parse one `pos/tex/norm` face corner into 0-based indices.
fn parse_corner(corner: &str, line_no: usize) -> Result<(usize, usize, usize)> {
    let mut parts = corner.split('/');
    let pi = parse_corner_index(parts.next(), corner, line_no)?;
    let ti = parse_corner_index(parts.next(), corner, line_no)?;
    let ni = parse_corner_index(parts.next(), corner, line_no)?;
    if parts.next().is_some() {
        bail!(
            "Malformed face corner '{}' on line {} (expected pos/tex/norm)",
            corner,
            line_no + 1
        );
    }
    Ok((pi, ti, ni))
}

fn parse_corner_index(part: Option<&str>, corner: &str, line_no: usize) -> Result<usize> {
    let token = part.filter(|p| !p.is_empty()).ok_or_else(|| {
        anyhow!(
            "Malformed face corner '{}' on line {} (expected pos/tex/norm)",
            corner,
            line_no + 1
        )
    })?;
    let index: usize = token.parse().with_context(|| {
        format!(
            "Invalid index '{}' in face corner '{}' on line {}",
            token,
            corner,
            line_no + 1
        )
    })?;
    if index == 0 {
        bail!(
            "OBJ indices are 1-based; found 0 in face corner '{}' on line {}",
            corner,
            line_no + 1
        );
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_string(contents: &str) -> String {
        format!("{:#}", load_obj_from_str(contents).unwrap_err())
    }

    #[test]
    fn parses_single_triangle_end_to_end() {
        let src = "v 0 0 0\n\
                   v 1 0 0\n\
                   v 0 1 0\n\
                   vt 0 0\n\
                   vt 1 0\n\
                   vt 0 1\n\
                   vn 0 0 1\n\
                   vn 0 0 1\n\
                   vn 0 0 1\n\
                   f 1/1/1 2/2/2 3/3/3\n";
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.positions, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        // V flipped: vt v becomes 1 - v.
        assert_eq!(mesh.tex_coords, vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn every_index_addresses_a_declared_position() {
        let src = "v 0 0 0\n\
                   v 1 0 0\n\
                   v 0 1 0\n\
                   v 1 1 0\n\
                   vt 0 0\n\
                   vn 0 0 1\n\
                   f 1/1/1 2/1/1 3/1/1\n\
                   f 2/1/1 4/1/1 3/1/1\n";
        let mesh = load_obj_from_str(src).expect("parse quad as two triangles");
        let vertex_count = mesh.vertex_count();
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < vertex_count));
    }

    #[test]
    fn position_arity_is_checked() {
        let err = err_string("v 1 2\n");
        assert!(err.contains("v 1 2"), "unexpected error: {err}");

        let err = err_string("v 1 2 3 4\n");
        assert!(err.contains("v 1 2 3 4"), "unexpected error: {err}");
    }

    #[test]
    fn texcoord_arity_is_checked() {
        let err = err_string("vt 0.5\n");
        assert!(err.contains("vt 0.5"), "unexpected error: {err}");

        let err = err_string("vt 0.5 0.5 0.5\n");
        assert!(err.contains("vt 0.5 0.5 0.5"), "unexpected error: {err}");
    }

    #[test]
    fn normal_arity_is_checked() {
        let err = err_string("vn 0 1\n");
        assert!(err.contains("vn 0 1"), "unexpected error: {err}");
    }

    #[test]
    fn non_numeric_coordinate_is_rejected() {
        let err = err_string("v 0 zero 0\n");
        assert!(err.contains("zero"), "unexpected error: {err}");
    }

    #[test]
    fn quad_faces_are_rejected_not_triangulated() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
                   vt 0 0\nvn 0 0 1\n\
                   f 1/1/1 2/1/1 3/1/1 4/1/1\n";
        let err = format!("{:#}", load_obj_from_str(src).unwrap_err());
        assert!(err.contains("triangles only"), "unexpected error: {err}");
        assert!(err.contains("4 corners"), "unexpected error: {err}");
    }

    #[test]
    fn incomplete_face_corners_are_rejected() {
        let preamble = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n";

        // Bare position index.
        let err = err_string(&format!("{preamble}f 1 2 3\n"));
        assert!(err.contains("pos/tex/norm"), "unexpected error: {err}");

        // Missing normal part.
        let err = err_string(&format!("{preamble}f 1/1 2/1 3/1\n"));
        assert!(err.contains("pos/tex/norm"), "unexpected error: {err}");

        // Empty texcoord part.
        let err = err_string(&format!("{preamble}f 1//1 2//1 3//1\n"));
        assert!(err.contains("pos/tex/norm"), "unexpected error: {err}");

        // Non-numeric part.
        let err = err_string(&format!("{preamble}f a/1/1 2/1/1 3/1/1\n"));
        assert!(err.contains("Invalid index"), "unexpected error: {err}");
    }

    #[test]
    fn zero_and_negative_indices_are_rejected() {
        let preamble = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n";

        let err = err_string(&format!("{preamble}f 0/1/1 2/1/1 3/1/1\n"));
        assert!(err.contains("1-based"), "unexpected error: {err}");

        let err = err_string(&format!("{preamble}f -1/1/1 2/1/1 3/1/1\n"));
        assert!(err.contains("Invalid index"), "unexpected error: {err}");
    }

    #[test]
    fn texture_v_is_flipped() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
                   vt 0.2 0.3\n\
                   vn 0 0 1\n\
                   f 1/1/1 2/1/1 3/1/1\n";
        let mesh = load_obj_from_str(src).expect("parse");
        assert!((mesh.tex_coords[0] - 0.2).abs() < 1e-6);
        assert!((mesh.tex_coords[1] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn shared_position_keeps_last_face_texcoords() {
        // Vertex 1 is shared: the first face maps it to vt 1 (u=0.25), the
        // second to vt 2 (u=0.75). The expanded array must keep the value
        // written by the face parsed last. Pins the documented
        // no-vertex-splitting behavior; do not "fix" silently.
        let src = "v 0 0 0\n\
                   v 1 0 0\n\
                   v 0 1 0\n\
                   v 1 1 0\n\
                   vt 0.25 0\n\
                   vt 0.75 0\n\
                   vn 0 0 1\n\
                   f 1/1/1 2/1/1 3/1/1\n\
                   f 1/2/1 2/2/1 4/2/1\n";
        let mesh = load_obj_from_str(src).expect("parse");
        assert!((mesh.tex_coords[0] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn face_referencing_late_position_is_rejected() {
        // The expanded arrays are sized at the first face line; a position
        // declared after that point cannot be referenced.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
                   vt 0 0\nvn 0 0 1\n\
                   f 1/1/1 2/1/1 3/1/1\n\
                   v 1 1 0\n\
                   f 2/1/1 4/1/1 3/1/1\n";
        let err = format!("{:#}", load_obj_from_str(src).unwrap_err());
        assert!(err.contains("Position index 4 out of range"), "unexpected error: {err}");
    }

    #[test]
    fn out_of_range_texcoord_and_normal_are_rejected() {
        let preamble = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n";

        let err = err_string(&format!("{preamble}f 1/2/1 2/1/1 3/1/1\n"));
        assert!(err.contains("Texture coordinate index 2"), "unexpected error: {err}");

        let err = err_string(&format!("{preamble}f 1/1/3 2/1/1 3/1/1\n"));
        assert!(err.contains("Normal index 3"), "unexpected error: {err}");
    }

    #[test]
    fn crlf_comments_and_unknown_directives_are_tolerated() {
        let src = "# a comment\r\n\
                   o triangle\r\n\
                   v 0 0 0\r\n\
                   v 1 0 0\r\n\
                   v 0 1 0\r\n\
                   vt 0 0\r\n\
                   vn 0 0 1\r\n\
                   s off\r\n\
                   usemtl none\r\n\
                   f 1/1/1 2/1/1 3/1/1\r\n";
        let mesh = load_obj_from_str(src).expect("parse CRLF input");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn file_without_faces_is_rejected() {
        let err = err_string("v 0 0 0\nv 1 0 0\nv 0 1 0\n");
        assert!(err.contains("no triangles"), "unexpected error: {err}");
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = load_obj_from_path("/no/such/mesh.obj").unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/mesh.obj"));
    }
}
