//! Lighting
//!
//! Fixed ambient plus directional lighting for the preview scene.

use glam::Vec3;
use smallvec::SmallVec;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Uniform light from every direction
    Ambient,
    /// Parallel light (sun)
    Directional,
}

/// Light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Direction the light travels in (directional only, normalized)
    pub direction: Vec3,
}

impl Light {
    /// Create an ambient light
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Ambient,
            color,
            intensity,
            direction: Vec3::ZERO,
        }
    }

    /// Create a directional light
    ///
    /// A zero direction falls back to straight down.
    pub fn directional(color: Vec3, intensity: f32, direction: Vec3) -> Self {
        Self {
            light_type: LightType::Directional,
            color,
            intensity,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Y),
        }
    }

    /// Get the effective color (color * intensity)
    pub fn effective_color(&self) -> Vec3 {
        self.color * self.intensity
    }

    /// Light contribution for a surface with the given unit normal
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        match self.light_type {
            LightType::Ambient => self.effective_color(),
            LightType::Directional => {
                self.effective_color() * normal.dot(-self.direction).max(0.0)
            }
        }
    }
}

/// Scene lighting: one ambient term and a small set of directional lights
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    ambient: Light,
    directional: SmallVec<[Light; 2]>,
}

impl Lighting {
    /// Create lighting with the given ambient light and no directional lights
    pub fn new(ambient: Light) -> Self {
        Self {
            ambient,
            directional: SmallVec::new(),
        }
    }

    /// Add a directional light
    pub fn add_directional(&mut self, light: Light) {
        debug_assert_eq!(light.light_type, LightType::Directional);
        self.directional.push(light);
    }

    /// Ambient light
    pub fn ambient(&self) -> &Light {
        &self.ambient
    }

    /// Directional lights
    pub fn directional(&self) -> &[Light] {
        &self.directional
    }

    /// Lambert shading of a base color, clamped to `[0, 1]`
    pub fn shade(&self, normal: Vec3, base_color: Vec3) -> Vec3 {
        let light = self
            .directional
            .iter()
            .fold(self.ambient.irradiance(normal), |sum, l| sum + l.irradiance(normal));
        (base_color * light).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(Light::ambient(Vec3::ONE, 0.4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_creation() {
        let sun = Light::directional(Vec3::ONE, 0.8, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(sun.light_type, LightType::Directional);
        assert_eq!(sun.direction, Vec3::NEG_Y);

        let ambient = Light::ambient(Vec3::ONE, 0.3);
        assert_eq!(ambient.light_type, LightType::Ambient);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let light = Light::directional(Vec3::ONE, 1.0, Vec3::ZERO);
        assert_eq!(light.direction, Vec3::NEG_Y);
    }

    #[test]
    fn test_directional_irradiance() {
        let light = Light::directional(Vec3::ONE, 1.0, Vec3::NEG_Y);
        assert_eq!(light.irradiance(Vec3::Y), Vec3::ONE);
        assert_eq!(light.irradiance(Vec3::NEG_Y), Vec3::ZERO);
        assert_eq!(light.irradiance(Vec3::X), Vec3::ZERO);
    }

    #[test]
    fn test_shade() {
        let mut lighting = Lighting::new(Light::ambient(Vec3::ONE, 0.25));
        lighting.add_directional(Light::directional(Vec3::ONE, 0.5, Vec3::NEG_Y));

        let lit = lighting.shade(Vec3::Y, Vec3::ONE);
        let unlit = lighting.shade(Vec3::NEG_Y, Vec3::ONE);
        assert!((lit - Vec3::splat(0.75)).length() < 1e-6);
        assert!((unlit - Vec3::splat(0.25)).length() < 1e-6);
        assert_eq!(lighting.directional().len(), 1);
    }

    #[test]
    fn test_shade_clamps() {
        let lighting = Lighting::new(Light::ambient(Vec3::ONE, 5.0));
        assert_eq!(lighting.shade(Vec3::Y, Vec3::ONE), Vec3::ONE);
    }
}
