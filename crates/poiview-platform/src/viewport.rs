//! Viewport
//!
//! The host-owned rectangle a render surface is mounted into.

use std::sync::Arc;

use glam::{UVec2, Vec2};
use parking_lot::{Mutex, RwLock};

use crate::input::{EventTarget, InputHub, PointerEvent};
use crate::{PlatformError, PlatformResult};

/// RGBA8 pixel target shared between a renderer and the host
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl FrameBuffer {
    /// Create a transparent frame buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in pixels
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// Fill with one color
    pub fn clear(&mut self, color: [u8; 4]) {
        self.pixels.fill(color);
    }

    /// Read a pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x, y)])
    }

    /// Write a pixel; out-of-range writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.pixels[index] = color;
        }
    }

    /// Row-major pixels
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Row-major RGBA bytes
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Release pixel memory, leaving a zero-sized buffer
    pub fn release(&mut self) {
        self.pixels = Vec::new();
        self.width = 0;
        self.height = 0;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Frame buffer handle shared by a surface and the viewport it is mounted in
pub type SharedFrameBuffer = Arc<RwLock<FrameBuffer>>;

/// Identifier of a surface mounted in a viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

struct Mounted {
    id: SurfaceId,
    target: SharedFrameBuffer,
}

/// Host-owned rectangular render target
///
/// The size is fixed for the lifetime of the viewport. The host forwards
/// pointer events in viewport-local coordinates through [`Viewport::dispatch`].
pub struct Viewport {
    size: UVec2,
    input: Arc<InputHub>,
    mounted: Mutex<Option<Mounted>>,
}

impl Viewport {
    /// Create a viewport of the given size
    pub fn new(width: u32, height: u32) -> PlatformResult<Arc<Self>> {
        if width == 0 || height == 0 {
            return Err(PlatformError::InvalidViewport { width, height });
        }

        Ok(Arc::new(Self {
            size: UVec2::new(width, height),
            input: InputHub::new(),
            mounted: Mutex::new(None),
        }))
    }

    /// Get the viewport size
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Get the viewport aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.size.x as f32 / self.size.y.max(1) as f32
    }

    /// Listener registry for this viewport
    pub fn input(&self) -> &Arc<InputHub> {
        &self.input
    }

    /// Check if a viewport-local position lies inside the viewport
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < self.size.x as f32
            && position.y < self.size.y as f32
    }

    /// Mount a surface's frame buffer
    pub fn attach(&self, id: SurfaceId, target: SharedFrameBuffer) -> PlatformResult<()> {
        let mut mounted = self.mounted.lock();
        if let Some(existing) = mounted.as_ref() {
            return Err(PlatformError::SurfaceAlreadyAttached(existing.id.0));
        }
        *mounted = Some(Mounted { id, target });
        log::debug!("surface {} attached", id.0);
        Ok(())
    }

    /// Unmount a surface, returning whether it was mounted here
    pub fn detach(&self, id: SurfaceId) -> bool {
        let mut mounted = self.mounted.lock();
        match mounted.as_ref() {
            Some(current) if current.id == id => {
                *mounted = None;
                log::debug!("surface {} detached", id.0);
                true
            }
            _ => false,
        }
    }

    /// Identifier of the mounted surface
    pub fn attached(&self) -> Option<SurfaceId> {
        self.mounted.lock().as_ref().map(|m| m.id)
    }

    /// Frame buffer of the mounted surface, for presenting
    pub fn frame_buffer(&self) -> Option<SharedFrameBuffer> {
        self.mounted.lock().as_ref().map(|m| Arc::clone(&m.target))
    }

    /// Forward a pointer event from the host, returning how many listeners heard it
    ///
    /// Events inside the viewport while a surface is mounted count as
    /// surface events; everything else only reaches global listeners.
    pub fn dispatch(&self, event: PointerEvent) -> usize {
        let over_surface = self.attached().is_some() && self.contains(event.position());
        let target = if over_surface { EventTarget::Surface } else { EventTarget::Outside };
        self.input.dispatch(&event, target)
    }
}
