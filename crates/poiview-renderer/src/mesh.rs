//! Mesh and Geometry
//!
//! Renderable triangle meshes with flat normals.

use glam::Vec3;
use poiview_core::{Aabb, Transform, TriangleBuffer};

use crate::material::Material;

/// Mesh identifier within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Mesh data
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Triangle positions in local space
    pub geometry: TriangleBuffer,
    /// One normal per triangle
    pub normals: Vec<Vec3>,
    /// Local-space bounds
    pub bounds: Aabb,
    /// World transform
    pub transform: Transform,
    /// Surface material
    pub material: Material,
    /// The geometry has no extent, so it was not normalized
    pub degenerate: bool,
}

impl Mesh {
    /// Create a mesh with flat normals and an identity transform
    pub fn new(geometry: TriangleBuffer, material: Material) -> Self {
        let normals = flat_normals(&geometry);
        let bounds = geometry.bounds();
        Self {
            geometry,
            normals,
            bounds,
            transform: Transform::IDENTITY,
            material,
            degenerate: false,
        }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.geometry.triangle_count()
    }

    /// Bounds of the transformed geometry
    pub fn world_bounds(&self) -> Aabb {
        Aabb::from_points(self.geometry.vertices().map(|v| self.transform.transform_point(v)))
    }
}

/// Per-triangle normals from counter-clockwise winding
///
/// Degenerate or non-finite triangles get a zero normal.
pub fn flat_normals(geometry: &TriangleBuffer) -> Vec<Vec3> {
    geometry
        .triangles()
        .map(|[a, b, c]| (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::ZERO))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriangleBuffer {
        let mut buffer = TriangleBuffer::new();
        buffer.push_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        buffer
    }

    #[test]
    fn test_flat_normals_follow_winding() {
        let mut buffer = triangle();
        buffer.push_triangle(Vec3::ZERO, Vec3::Y, Vec3::X);

        let normals = flat_normals(&buffer);
        assert_eq!(normals, vec![Vec3::Z, Vec3::NEG_Z]);
    }

    #[test]
    fn test_degenerate_triangle_normal() {
        let mut buffer = TriangleBuffer::new();
        buffer.push_triangle(Vec3::ONE, Vec3::ONE, Vec3::ONE);
        buffer.push_triangle(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::X, Vec3::Y);
        assert_eq!(flat_normals(&buffer), vec![Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new(triangle(), Material::default());
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert!(!mesh.degenerate);
    }

    #[test]
    fn test_world_bounds() {
        let mut mesh = Mesh::new(triangle(), Material::default());
        mesh.transform = Transform::from_uniform_scale(3.0);
        assert_eq!(mesh.world_bounds().max, Vec3::new(3.0, 3.0, 0.0));
    }
}
