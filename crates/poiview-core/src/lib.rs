//! # Poiview Core
//!
//! Core library for the poiview model viewer.
//!
//! This crate provides the foundational pieces shared by every other crate:
//! - **Math**: Axis-aligned bounds and the glam re-exports
//! - **Geometry**: Flat triangle buffers produced by model parsers
//! - **Transform**: Position, rotation and scale of a scene object
//! - **Config**: Viewer configuration with serde support

pub mod geometry;
pub mod math;
pub mod transform;

pub use geometry::TriangleBuffer;
pub use math::Aabb;
pub use transform::Transform;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Scene framing and lighting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Size the largest model dimension is scaled to
    pub target_size: f32,
    /// Initial camera distance along +Z
    pub camera_distance: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Directional light intensity
    pub directional_intensity: f32,
    /// Direction the directional light travels in
    pub light_direction: Vec3,
    /// Mesh base color (linear RGB)
    pub base_color: Vec3,
    /// Clear color (linear RGB)
    pub background: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            target_size: 2.0,
            camera_distance: 4.0,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            ambient_intensity: 0.4,
            directional_intensity: 0.8,
            light_direction: Vec3::new(-1.0, -1.0, -1.0),
            base_color: Vec3::new(0.8, 0.65, 0.3),
            background: Vec3::new(0.95, 0.95, 0.95),
        }
    }
}

/// Pointer interaction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Orbit speed in radians per pixel of horizontal drag
    pub rotate_speed: f32,
    /// Fractional distance change per wheel tick
    pub zoom_step: f32,
    /// Closest the camera may get to the origin
    pub min_distance: f32,
    /// Furthest the camera may get from the origin
    pub max_distance: f32,
}

impl ControlsConfig {
    /// Distance multiplier for a wheel tick away from the model
    pub fn zoom_out_factor(&self) -> f32 {
        1.0 + self.zoom_step
    }

    /// Distance multiplier for a wheel tick towards the model
    pub fn zoom_in_factor(&self) -> f32 {
        1.0 - self.zoom_step
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.01,
            zoom_step: 0.1,
            min_distance: 0.1,
            max_distance: 1000.0,
        }
    }
}

/// Idle animation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Spin the model when it is not being touched
    pub idle_spin: bool,
    /// Spin rate in radians per second
    pub spin_speed: f32,
    /// Keep spinning while a drag is active
    pub spin_while_dragging: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_spin: true,
            spin_speed: 0.5,
            spin_while_dragging: true,
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scene framing and lighting
    pub scene: SceneConfig,
    /// Pointer interaction
    pub controls: ControlsConfig,
    /// Idle animation
    pub animation: AnimationConfig,
    /// Fetch timeout in milliseconds (`None` waits indefinitely)
    pub fetch_timeout_ms: Option<u64>,
}

impl ViewerConfig {
    /// Fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Option<std::time::Duration> {
        self.fetch_timeout_ms.map(std::time::Duration::from_millis)
    }
}
