//! Wavefront OBJ parsing
//!
//! Reads the position subset of OBJ: `v` lines and `f` lines with three or
//! four indices. Everything else (normals, texture coordinates, groups,
//! materials, comments) is ignored.
//!
//! Parsing is best effort. A malformed coordinate becomes `NaN`, and a face
//! that references a vertex which does not exist is dropped. Only a file that
//! yields no triangles at all is an error.

use glam::Vec3;
use poiview_core::TriangleBuffer;
use smallvec::SmallVec;

use crate::{ParseError, ParseResult};

/// Corner orders used to triangulate a triangle face and a quad face.
///
/// Quads always split along the 0-2 diagonal.
const TRIANGLE: &[[usize; 3]] = &[[0, 1, 2]];
const QUAD: &[[usize; 3]] = &[[0, 1, 2], [0, 2, 3]];

/// Summary of a parse, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// `v` lines read
    pub vertices: usize,
    /// `v` lines with at least one NaN coordinate
    pub nan_vertices: usize,
    /// Triangle and quad faces read
    pub faces: usize,
    /// Faces skipped because they had neither 3 nor 4 indices
    pub unsupported_faces: usize,
    /// Faces dropped because an index did not resolve to a vertex
    pub dropped_faces: usize,
    /// Triangles emitted
    pub triangles: usize,
}

#[derive(Debug)]
struct Face {
    /// 0-based indices; `None` marks a token that is not a positive integer
    indices: SmallVec<[Option<usize>; 4]>,
    line: usize,
}

/// Parse OBJ text into a triangle buffer
pub fn parse(text: &str) -> ParseResult<TriangleBuffer> {
    parse_with_report(text).map(|(buffer, _)| buffer)
}

/// Parse OBJ text into a triangle buffer, also returning a [`ParseReport`]
pub fn parse_with_report(text: &str) -> ParseResult<(TriangleBuffer, ParseReport)> {
    let mut report = ParseReport::default();
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let vertex = parse_vertex(tokens);
                if vertex.is_nan() {
                    report.nan_vertices += 1;
                }
                vertices.push(vertex);
            }
            Some("f") => {
                let indices: SmallVec<[Option<usize>; 4]> = tokens.map(parse_index).collect();
                if matches!(indices.len(), 3 | 4) {
                    faces.push(Face { indices, line: number + 1 });
                } else {
                    log::debug!("line {}: skipping face with {} indices", number + 1, indices.len());
                    report.unsupported_faces += 1;
                }
            }
            _ => {}
        }
    }

    report.vertices = vertices.len();
    report.faces = faces.len();

    if vertices.is_empty() || faces.is_empty() {
        return Err(ParseError::NoGeometry);
    }

    let mut buffer = TriangleBuffer::with_capacity(faces.len() * 2);
    for face in &faces {
        let Some(corners) = resolve(face, &vertices) else {
            log::debug!("line {}: dropping face with unresolvable vertex index", face.line);
            report.dropped_faces += 1;
            continue;
        };

        let order = if corners.len() == 4 { QUAD } else { TRIANGLE };
        for &[a, b, c] in order {
            buffer.push_triangle(corners[a], corners[b], corners[c]);
        }
    }

    report.triangles = buffer.triangle_count();

    if report.dropped_faces > 0 {
        log::warn!(
            "dropped {} of {} faces referencing missing vertices",
            report.dropped_faces,
            report.faces
        );
    }
    if report.nan_vertices > 0 {
        log::warn!("{} vertices have malformed coordinates", report.nan_vertices);
    }

    if buffer.is_empty() {
        return Err(ParseError::AllFacesDropped { dropped: report.dropped_faces });
    }

    Ok((buffer, report))
}

/// Read three coordinates; missing or malformed fields become `NaN`
fn parse_vertex<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Vec3 {
    let mut field = || {
        tokens
            .next()
            .and_then(|token| token.parse::<f32>().ok())
            .unwrap_or(f32::NAN)
    };
    let x = field();
    let y = field();
    let z = field();
    Vec3::new(x, y, z)
}

/// Convert a 1-based face token to a 0-based index
///
/// Only the position part of `v/vt/vn` tokens is used.
fn parse_index(token: &str) -> Option<usize> {
    let position = token.split('/').next()?;
    match position.parse::<usize>() {
        Ok(index) if index > 0 => Some(index - 1),
        _ => None,
    }
}

fn resolve(face: &Face, vertices: &[Vec3]) -> Option<SmallVec<[Vec3; 4]>> {
    face.indices
        .iter()
        .map(|index| index.and_then(|i| vertices.get(i).copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
# single triangle
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";

    fn triangles(buffer: &TriangleBuffer) -> Vec<[Vec3; 3]> {
        buffer.triangles().collect()
    }

    #[test]
    fn test_parse_triangle() {
        let buffer = parse(TRIANGLE_OBJ).unwrap();
        assert_eq!(buffer.len(), 9);
        assert_eq!(
            buffer.as_slice(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_quad_split_order() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let buffer = parse(text).unwrap();

        let v1 = Vec3::new(0.0, 0.0, 0.0);
        let v2 = Vec3::new(1.0, 0.0, 0.0);
        let v3 = Vec3::new(1.0, 1.0, 0.0);
        let v4 = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(triangles(&buffer), vec![[v1, v2, v3], [v1, v3, v4]]);
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(parse(""), Err(ParseError::NoGeometry));
        assert_eq!(parse("# comment only\n"), Err(ParseError::NoGeometry));
    }

    #[test]
    fn test_vertices_without_faces_fails() {
        assert_eq!(parse("v 0 0 0\nv 1 0 0\nv 0 1 0\n"), Err(ParseError::NoGeometry));
    }

    #[test]
    fn test_out_of_range_face_alone_fails() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\n";
        assert_eq!(parse(text), Err(ParseError::AllFacesDropped { dropped: 1 }));
    }

    #[test]
    fn test_out_of_range_face_is_dropped() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\nf 1 2 3\n";
        let (buffer, report) = parse_with_report(text).unwrap();

        assert_eq!(buffer.triangle_count(), 1);
        assert_eq!(report.faces, 2);
        assert_eq!(report.dropped_faces, 1);
        assert_eq!(report.triangles, 1);
    }

    #[test]
    fn test_zero_and_garbage_indices_drop_face() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\nf a b c\nf 1 2 3\n";
        let (buffer, report) = parse_with_report(text).unwrap();
        assert_eq!(buffer.triangle_count(), 1);
        assert_eq!(report.dropped_faces, 2);
    }

    #[test]
    fn test_unsupported_arity_skipped() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\nf 1 2\nf 1 2 3 4 5\nf 1 2 3\n";
        let (buffer, report) = parse_with_report(text).unwrap();
        assert_eq!(buffer.triangle_count(), 1);
        assert_eq!(report.unsupported_faces, 2);
        assert_eq!(report.faces, 1);
    }

    #[test]
    fn test_only_pentagons_is_no_geometry() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\nf 1 2 3 4 5\n";
        assert_eq!(parse(text), Err(ParseError::NoGeometry));
    }

    #[test]
    fn test_malformed_coordinate_becomes_nan() {
        let text = "v 0 abc 0\nv 1 0\nv 0 1 0\nf 1 2 3\n";
        let (buffer, report) = parse_with_report(text).unwrap();
        let [a, b, c] = buffer.triangles().next().unwrap();

        assert!(a.y.is_nan());
        assert_eq!(a.x, 0.0);
        assert!(b.z.is_nan());
        assert_eq!(c, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(report.nan_vertices, 2);
    }

    #[test]
    fn test_slash_tokens_use_position_index() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3//1
";
        let buffer = parse(text).unwrap();
        assert_eq!(
            triangles(&buffer),
            vec![[Vec3::ZERO, Vec3::X, Vec3::Y]]
        );
    }

    #[test]
    fn test_ignores_other_statements() {
        let text = "\
mtllib scene.mtl
o statue
g base
usemtl stone
s off

  v 0 0 0
v 2 0 0
v 0 2 0
vp 0.5
f 1 2 3
";
        let (buffer, report) = parse_with_report(text).unwrap();
        assert_eq!(report.vertices, 3);
        assert_eq!(buffer.triangle_count(), 1);
    }

    #[test]
    fn test_mixed_faces_length_multiple_of_nine() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
f 1 2 3 4
f 1 2 5
f 2 3 5
";
        let buffer = parse(text).unwrap();
        assert_eq!(buffer.triangle_count(), 4);
        assert_eq!(buffer.len() % TriangleBuffer::FLOATS_PER_TRIANGLE, 0);
    }

    /// Quad grid of `n` x `n` cells with one extra triangle, one dangling
    /// face and one pentagon per row
    fn generated_obj(n: usize) -> String {
        use std::fmt::Write;

        let mut text = String::new();
        for y in 0..=n {
            for x in 0..=n {
                writeln!(text, "v {} {} {}", x as f32, y as f32, (x * y) as f32 * 0.1).unwrap();
            }
        }
        let row = n + 1;
        for y in 0..n {
            for x in 0..n {
                let a = y * row + x + 1;
                writeln!(text, "f {} {} {} {}", a, a + 1, a + row + 1, a + row).unwrap();
            }
            let a = y * row + 1;
            writeln!(text, "f {}/1/1 {}//2 {}/3", a, a + 1, a + row).unwrap();
            writeln!(text, "f {} {} {}", a, a + 1, row * row + 1).unwrap();
            writeln!(text, "f 1 2 3 4 5").unwrap();
        }
        text
    }

    #[test]
    fn test_generated_grids() {
        for n in [1, 2, 3, 7, 16, 33] {
            let (buffer, report) = parse_with_report(&generated_obj(n)).unwrap();

            assert!(!buffer.is_empty());
            assert_eq!(buffer.len() % 9, 0);
            assert_eq!(buffer.triangle_count(), 2 * n * n + n);
            assert_eq!(report.triangles, buffer.triangle_count());
            assert_eq!(report.vertices, (n + 1) * (n + 1));
            assert_eq!(report.dropped_faces, n);
            assert_eq!(report.unsupported_faces, n);
            assert!(buffer.as_slice().iter().all(|value| value.is_finite()));
        }
    }

    #[test]
    fn test_windows_line_endings() {
        let text = "v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 1 2 3\r\n";
        assert_eq!(parse(text).unwrap().triangle_count(), 1);
    }
}
