//! Render Surfaces
//!
//! A render surface owns a pixel target and draws scenes into it.

use glam::{UVec2, Vec3};
use parking_lot::RwLock;
use poiview_platform::{FrameBuffer, SharedFrameBuffer, SurfaceId};
use std::sync::Arc;

use crate::raster::{ndc_to_screen, rasterize_triangle};
use crate::scene::Scene;
use crate::{RendererError, RendererResult};

/// Per-frame draw statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles handed to the surface
    pub triangles_submitted: u32,
    /// Triangles that covered at least one pixel
    pub triangles_drawn: u32,
    /// Triangles skipped for non-finite or behind-camera vertices
    pub triangles_skipped: u32,
    /// Pixels that passed the depth test
    pub pixels_written: u64,
}

/// Something a scene can be drawn into
pub trait RenderSurface: Send {
    /// Surface identifier
    fn id(&self) -> SurfaceId;

    /// Size in pixels
    fn size(&self) -> UVec2;

    /// Pixel target to mount in a viewport
    fn target(&self) -> SharedFrameBuffer;

    /// Draw one frame
    fn draw(&mut self, scene: &Scene) -> RendererResult<FrameStats>;

    /// Release the surface's resources; later draws fail
    fn dispose(&mut self);

    /// Whether [`RenderSurface::dispose`] has been called
    fn is_disposed(&self) -> bool;
}

/// CPU rasterizing surface with a depth buffer
pub struct SoftwareSurface {
    id: SurfaceId,
    width: u32,
    height: u32,
    target: SharedFrameBuffer,
    depth: Vec<f32>,
    disposed: bool,
}

impl SoftwareSurface {
    /// Create a surface of the given size
    pub fn new(id: SurfaceId, width: u32, height: u32) -> RendererResult<Self> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidSurfaceSize { width, height });
        }

        Ok(Self {
            id,
            width,
            height,
            target: Arc::new(RwLock::new(FrameBuffer::new(width, height))),
            depth: vec![f32::INFINITY; width as usize * height as usize],
            disposed: false,
        })
    }
}

impl RenderSurface for SoftwareSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    fn target(&self) -> SharedFrameBuffer {
        Arc::clone(&self.target)
    }

    fn draw(&mut self, scene: &Scene) -> RendererResult<FrameStats> {
        if self.disposed {
            return Err(RendererError::SurfaceDisposed);
        }

        let (width, height) = (self.width, self.height);
        let mut stats = FrameStats::default();
        let mut frame = self.target.write();
        let depth = &mut self.depth;

        frame.clear(to_rgba(scene.background));
        depth.fill(f32::INFINITY);

        let view_projection = scene.camera.view_projection();
        let eye = scene.camera.position;

        for mesh in scene.meshes() {
            let model = mesh.transform.matrix();

            for [a, b, c] in mesh.geometry.triangles() {
                stats.triangles_submitted += 1;

                let world = [a, b, c].map(|v| model.transform_point3(v));
                let clip = world.map(|v| view_projection * v.extend(1.0));
                if clip.iter().any(|v| !v.is_finite() || v.w <= 0.0) {
                    stats.triangles_skipped += 1;
                    continue;
                }

                let mut normal = (world[1] - world[0])
                    .cross(world[2] - world[0])
                    .try_normalize()
                    .unwrap_or(Vec3::ZERO);
                if mesh.material.double_sided && normal.dot(eye - world[0]) < 0.0 {
                    normal = -normal;
                }
                let color = to_rgba(scene.lighting.shade(normal, mesh.material.base_color));

                let [sa, sb, sc] = clip.map(|v| ndc_to_screen(v.truncate() / v.w, width, height));
                let written = rasterize_triangle(sa, sb, sc, width, height, |x, y, z| {
                    if !(0.0..=1.0).contains(&z) {
                        return;
                    }
                    let index = y as usize * width as usize + x as usize;
                    if z < depth[index] {
                        depth[index] = z;
                        frame.set_pixel(x, y, color);
                        stats.pixels_written += 1;
                    }
                });

                if written > 0 {
                    stats.triangles_drawn += 1;
                }
            }
        }

        Ok(stats)
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.depth = Vec::new();
        self.target.write().release();
        log::debug!("disposed software surface {}", self.id.0);
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Convert a linear `[0, 1]` color to opaque RGBA8
pub fn to_rgba(color: Vec3) -> [u8; 4] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::camera::Camera;
    use crate::lighting::{Light, Lighting};
    use crate::material::Material;
    use crate::mesh::Mesh;
    use crate::scene::SceneBuilder;
    use poiview_core::{SceneConfig, TriangleBuffer};

    fn quad(half: f32, z: f32) -> TriangleBuffer {
        let a = Vec3::new(-half, -half, z);
        let b = Vec3::new(half, -half, z);
        let c = Vec3::new(half, half, z);
        let d = Vec3::new(-half, half, z);
        let mut buffer = TriangleBuffer::new();
        buffer.push_triangle(a, b, c);
        buffer.push_triangle(a, c, d);
        buffer
    }

    fn flat_scene() -> Scene {
        Scene::new(
            Camera::new(4.0, 45.0, 1.0, 0.1, 100.0),
            Lighting::new(Light::ambient(Vec3::ONE, 1.0)),
            Vec3::ZERO,
        )
    }

    #[test]
    fn test_invalid_size() {
        assert!(matches!(
            SoftwareSurface::new(SurfaceId(1), 0, 10),
            Err(RendererError::InvalidSurfaceSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_draw_model_over_background() {
        let config = SceneConfig::default();
        let (scene, _) = SceneBuilder::new(config.clone()).build(&quad(10.0, 0.0), 1.0);
        let mut surface = SoftwareSurface::new(SurfaceId(1), 32, 32).unwrap();

        let stats = surface.draw(&scene).unwrap();
        assert_eq!(stats.triangles_submitted, 2);
        assert_eq!(stats.triangles_drawn, 2);
        assert!(stats.pixels_written > 0);

        let target = surface.target();
        let frame = target.read();
        assert_eq!(frame.pixel(0, 0), Some(to_rgba(config.background)));
        assert_ne!(frame.pixel(16, 16), Some(to_rgba(config.background)));
    }

    #[test]
    fn test_nearer_triangle_wins() {
        let mut scene = flat_scene();
        scene.add_mesh(Mesh::new(quad(0.5, 1.0), Material::new(Vec3::Y)));
        scene.add_mesh(Mesh::new(quad(2.0, -1.0), Material::new(Vec3::X)));

        let mut surface = SoftwareSurface::new(SurfaceId(1), 32, 32).unwrap();
        surface.draw(&scene).unwrap();

        let target = surface.target();
        let frame = target.read();
        assert_eq!(frame.pixel(16, 16), Some([0, 255, 0, 255]));
        assert_eq!(frame.pixel(4, 16), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_back_faces_are_lit_when_double_sided() {
        let mut scene = flat_scene();
        scene.lighting = Lighting::new(Light::ambient(Vec3::ONE, 0.0));
        scene.lighting.add_directional(Light::directional(Vec3::ONE, 1.0, Vec3::NEG_Z));

        let mut geometry = TriangleBuffer::new();
        geometry.push_triangle(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        scene.add_mesh(Mesh::new(geometry, Material::new(Vec3::ONE)));

        let mut surface = SoftwareSurface::new(SurfaceId(1), 32, 32).unwrap();
        surface.draw(&scene).unwrap();
        assert_eq!(surface.target().read().pixel(12, 18), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_skips_triangles_behind_camera() {
        let mut scene = flat_scene();
        scene.add_mesh(Mesh::new(quad(1.0, 10.0), Material::default()));

        let mut surface = SoftwareSurface::new(SurfaceId(1), 16, 16).unwrap();
        let stats = surface.draw(&scene).unwrap();
        assert_eq!(stats.triangles_skipped, 2);
        assert_eq!(stats.pixels_written, 0);
    }

    #[test]
    fn test_dispose() {
        let mut surface = SoftwareSurface::new(SurfaceId(3), 8, 8).unwrap();
        let target = surface.target();

        surface.dispose();
        surface.dispose();

        assert!(surface.is_disposed());
        assert_eq!(target.read().width(), 0);
        assert!(matches!(surface.draw(&flat_scene()), Err(RendererError::SurfaceDisposed)));
    }
}
