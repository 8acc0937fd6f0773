//! # Poiview Renderer
//!
//! Scene building and software rendering for the poiview model viewer.
//!
//! ## Features
//! - Scene builder that centers and normalizes model geometry
//! - Orbiting perspective camera
//! - Ambient plus directional flat shading
//! - Depth-tested software rasterizer drawing into a shared frame buffer

pub mod camera;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod raster;
pub mod scene;
pub mod surface;

pub use camera::Camera;
pub use lighting::{Light, LightType, Lighting};
pub use material::Material;
pub use mesh::{Mesh, MeshId};
pub use scene::{Scene, SceneBuilder};
pub use surface::{FrameStats, RenderSurface, SoftwareSurface};

use poiview_platform::{ScopedTimer, SharedFrameBuffer, SurfaceId};
use thiserror::Error;

/// Renderer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSurfaceSize { width: u32, height: u32 },

    #[error("Render surface has been disposed")]
    SurfaceDisposed,
}

/// Result type for renderer operations
pub type RendererResult<T> = Result<T, RendererError>;

/// Renderer statistics
#[derive(Debug, Clone, Default)]
pub struct RendererStats {
    /// Statistics of the last drawn frame
    pub last_frame: FrameStats,
    /// Frames drawn successfully
    pub frames_drawn: u64,
    /// Triangles drawn across all frames
    pub total_triangles: u64,
}

/// Main renderer instance
///
/// Drives one render surface and keeps frame statistics.
pub struct Renderer {
    surface: Box<dyn RenderSurface>,
    stats: RendererStats,
    frame_number: u64,
}

impl Renderer {
    /// Create a renderer drawing into `surface`
    pub fn new(surface: Box<dyn RenderSurface>) -> Self {
        Self {
            surface,
            stats: RendererStats::default(),
            frame_number: 0,
        }
    }

    /// Create a renderer with a fresh software surface
    pub fn software(id: SurfaceId, width: u32, height: u32) -> RendererResult<Self> {
        Ok(Self::new(Box::new(SoftwareSurface::new(id, width, height)?)))
    }

    /// Get renderer statistics
    pub fn stats(&self) -> &RendererStats {
        &self.stats
    }

    /// Get the current frame number
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Get the render surface
    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    /// Pixel target of the render surface
    pub fn target(&self) -> SharedFrameBuffer {
        self.surface.target()
    }

    /// Draw one frame of `scene`
    pub fn render(&mut self, scene: &Scene) -> RendererResult<FrameStats> {
        self.frame_number += 1;
        let _timer = ScopedTimer::traced("render_frame");

        let frame = self.surface.draw(scene)?;
        self.stats.last_frame = frame;
        self.stats.frames_drawn += 1;
        self.stats.total_triangles += u64::from(frame.triangles_drawn);

        log::trace!(
            "frame {}: {} triangles, {} pixels",
            self.frame_number,
            frame.triangles_drawn,
            frame.pixels_written
        );
        Ok(frame)
    }

    /// Dispose the render surface
    pub fn dispose(&mut self) {
        self.surface.dispose();
    }

    /// Whether the render surface has been disposed
    pub fn is_disposed(&self) -> bool {
        self.surface.is_disposed()
    }
}
