//! Animation Registry
//!
//! Per-session list of mesh animations advanced once per frame.

use poiview_renderer::{MeshId, Scene};

/// Mesh animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Continuous rotation about the vertical axis
    IdleSpin { radians_per_second: f32 },
}

impl Animation {
    fn apply(&self, scene: &mut Scene, mesh: MeshId, dt: f32) -> bool {
        let Some(mesh) = scene.mesh_mut(mesh) else {
            return false;
        };

        match *self {
            Animation::IdleSpin { radians_per_second } => {
                mesh.transform.rotate_y(radians_per_second * dt);
            }
        }
        true
    }
}

/// Animations registered for one session
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    entries: Vec<(MeshId, Animation)>,
}

impl AnimationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an animation for a mesh
    pub fn add(&mut self, mesh: MeshId, animation: Animation) {
        self.entries.push((mesh, animation));
    }

    /// Remove all animations
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered animations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no animations are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance every animation by `dt` seconds, returning how many applied
    ///
    /// Entries whose mesh is missing from the scene are skipped.
    pub fn advance(&self, scene: &mut Scene, dt: f32) -> usize {
        let mut applied = 0;
        for (mesh, animation) in &self.entries {
            if animation.apply(scene, *mesh, dt) {
                applied += 1;
            }
        }
        applied
    }
}
