//! Scene
//!
//! Builds a framed, lit preview scene from parsed triangle geometry.

use glam::Vec3;
use poiview_core::{SceneConfig, Transform, TriangleBuffer};

use crate::camera::Camera;
use crate::lighting::{Light, Lighting};
use crate::material::Material;
use crate::mesh::{Mesh, MeshId};

/// Everything a surface needs to draw one frame
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<Mesh>,
    /// Camera
    pub camera: Camera,
    /// Lighting
    pub lighting: Lighting,
    /// Clear color (linear RGB)
    pub background: Vec3,
}

impl Scene {
    /// Create an empty scene
    pub fn new(camera: Camera, lighting: Lighting, background: Vec3) -> Self {
        Self {
            meshes: Vec::new(),
            camera,
            lighting,
            background,
        }
    }

    /// Add a mesh, returning its id
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    /// Get a mesh
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0 as usize)
    }

    /// Get a mesh mutably
    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0 as usize)
    }

    /// All meshes
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Total triangle count
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

/// Builds preview scenes
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    /// Create a builder
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    /// Get the builder configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Build a scene around `geometry` for a surface of the given aspect ratio
    ///
    /// Returns the scene and the id of the model mesh.
    pub fn build(&self, geometry: &TriangleBuffer, aspect: f32) -> (Scene, MeshId) {
        let config = &self.config;

        let mut lighting = Lighting::new(Light::ambient(Vec3::ONE, config.ambient_intensity));
        lighting.add_directional(Light::directional(
            Vec3::ONE,
            config.directional_intensity,
            config.light_direction,
        ));

        let camera = Camera::new(
            config.camera_distance,
            config.fov_degrees,
            aspect,
            config.near,
            config.far,
        );

        let mut scene = Scene::new(camera, lighting, config.background);
        let mesh = self.normalized_mesh(geometry);
        let id = scene.add_mesh(mesh);
        (scene, id)
    }

    /// Center geometry on the origin and scale its largest dimension to the target size
    pub fn normalized_mesh(&self, geometry: &TriangleBuffer) -> Mesh {
        let bounds = geometry.bounds();
        let center = if bounds.is_empty() { Vec3::ZERO } else { bounds.center() };

        let mut centered = TriangleBuffer::with_capacity(geometry.triangle_count());
        for [a, b, c] in geometry.triangles() {
            centered.push_triangle(a - center, b - center, c - center);
        }

        let mut mesh = Mesh::new(centered, Material::new(self.config.base_color));
        let max_dimension = bounds.max_dimension();

        if bounds.is_empty() || !max_dimension.is_finite() || max_dimension <= 0.0 {
            log::warn!(
                "degenerate model: largest dimension is {}, skipping scale normalization",
                max_dimension
            );
            mesh.degenerate = true;
        } else {
            let scale = self.config.target_size / max_dimension;
            log::debug!("normalizing model: center {:?}, scale {}", center, scale);
            mesh.transform = Transform::from_uniform_scale(scale);
        }

        mesh
    }
}
