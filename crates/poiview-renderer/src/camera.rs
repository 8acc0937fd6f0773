//! Camera
//!
//! Perspective camera aimed at a fixed target.

use glam::{Mat4, Quat, Vec3};
use poiview_core::math::azimuth;

/// Camera state
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Look-at target
    pub target: Vec3,
    /// World up
    pub up: Vec3,
    /// Unit view direction, updated by [`Camera::look_at`]
    forward: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    /// Create a camera `distance` units along +Z, looking at the origin
    pub fn new(distance: f32, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            forward: Vec3::NEG_Z,
            fov_y: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        };
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Aim the camera at a target
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        if let Some(forward) = (target - self.position).try_normalize() {
            self.forward = forward;
        }
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Distance from the target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Angle around the vertical axis through the target, from +Z towards +X
    pub fn azimuth(&self) -> f32 {
        azimuth(self.position - self.target)
    }

    /// Rotate the eye around the vertical axis through the target, keeping distance
    pub fn orbit_y(&mut self, angle: f32) {
        let offset = Quat::from_rotation_y(angle) * (self.position - self.target);
        self.position = self.target + offset;
        self.look_at(self.target);
    }

    /// Scale the eye's offset from the target, clamping the resulting distance
    ///
    /// The bounds may come in either order and a NaN bound is ignored. A
    /// result that is not a positive finite distance leaves the camera as is.
    pub fn scale_distance(&mut self, factor: f32, min_distance: f32, max_distance: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= 0.0 {
            return;
        }

        let (low, high) = (min_distance.min(max_distance), min_distance.max(max_distance));
        let scaled = (distance * factor).max(low).min(high);
        if !(scaled.is_finite() && scaled > 0.0) {
            return;
        }

        self.position = self.target + offset * (scaled / distance);
        self.look_at(self.target);
    }

    /// View matrix
    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// Projection matrix (depth in `[0, 1]`)
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::new(4.0, 45.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_initial_camera() {
        let camera = camera();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(camera.forward(), Vec3::NEG_Z);
        assert_eq!(camera.distance(), 4.0);
        assert!(camera.azimuth().abs() < 1e-6);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = camera();
        camera.orbit_y(FRAC_PI_2);

        assert!((camera.distance() - 4.0).abs() < 1e-5);
        assert!((camera.azimuth() - FRAC_PI_2).abs() < 1e-5);
        assert!((camera.position - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
        assert!((camera.forward() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_scale_distance() {
        let mut camera = camera();
        camera.scale_distance(1.5, 0.1, 100.0);
        assert!((camera.distance() - 6.0).abs() < 1e-5);

        camera.scale_distance(1000.0, 0.1, 10.0);
        assert!((camera.distance() - 10.0).abs() < 1e-5);
        assert_eq!(camera.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_scale_distance_bad_bounds() {
        let mut camera = camera();
        camera.scale_distance(1.5, 10.0, 1.0);
        assert!((camera.distance() - 6.0).abs() < 1e-5);

        camera.scale_distance(1000.0, 10.0, 1.0);
        assert!((camera.distance() - 10.0).abs() < 1e-5);

        camera.scale_distance(0.5, f32::NAN, f32::NAN);
        assert!((camera.distance() - 5.0).abs() < 1e-5);

        camera.scale_distance(-1.0, -5.0, 5.0);
        assert!((camera.distance() - 5.0).abs() < 1e-5);
        assert_eq!(camera.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = camera();
        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
