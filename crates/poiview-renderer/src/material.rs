//! Material
//!
//! Flat-shaded surface parameters for preview meshes.

use glam::Vec3;

/// Mesh material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color (linear RGB)
    pub base_color: Vec3,
    /// Light back faces as if they faced the camera
    pub double_sided: bool,
}

impl Material {
    /// Create a double-sided material with the given color
    pub fn new(base_color: Vec3) -> Self {
        Self {
            base_color,
            double_sided: true,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::splat(0.8))
    }
}
