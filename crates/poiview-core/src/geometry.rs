//! Triangle geometry
//!
//! Flat, render-ready triangle soup shared by the parser and the renderer.

use glam::Vec3;

use crate::math::Aabb;

/// Flattened triangle positions: three floats per vertex, three vertices per triangle
///
/// The length is always a multiple of [`TriangleBuffer::FLOATS_PER_TRIANGLE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleBuffer {
    positions: Vec<f32>,
}

impl TriangleBuffer {
    /// Floats making up one triangle
    pub const FLOATS_PER_TRIANGLE: usize = 9;

    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `triangles` triangles
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * Self::FLOATS_PER_TRIANGLE),
        }
    }

    /// Wrap raw positions, returning `None` unless the length is a multiple of 9
    pub fn from_positions(positions: Vec<f32>) -> Option<Self> {
        (positions.len() % Self::FLOATS_PER_TRIANGLE == 0).then_some(Self { positions })
    }

    /// Append one triangle
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        self.positions.extend_from_slice(&a.to_array());
        self.positions.extend_from_slice(&b.to_array());
        self.positions.extend_from_slice(&c.to_array());
    }

    /// Number of floats
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the buffer holds no triangles
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / Self::FLOATS_PER_TRIANGLE
    }

    /// Raw float view
    pub fn as_slice(&self) -> &[f32] {
        &self.positions
    }

    /// Iterate over triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions
            .chunks_exact(Self::FLOATS_PER_TRIANGLE)
            .map(|t| {
                [
                    Vec3::new(t[0], t[1], t[2]),
                    Vec3::new(t[3], t[4], t[5]),
                    Vec3::new(t[6], t[7], t[8]),
                ]
            })
    }

    /// Iterate over every vertex position
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    /// Bounding box of all finite vertices
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices())
    }
}
