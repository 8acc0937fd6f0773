//! Orbit Controls
//!
//! Turns pointer drags and wheel ticks into camera orbit and zoom around the
//! fixed look-at target.

use glam::Vec2;
use poiview_core::ControlsConfig;
use poiview_platform::PointerEvent;
use poiview_renderer::Camera;

/// Drag state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A drag is active; `last` is the most recent pointer position
    Dragging { last: Vec2 },
}

/// Horizontal orbit and wheel zoom controller
#[derive(Debug, Clone, Default)]
pub struct OrbitControls {
    config: ControlsConfig,
    state: DragState,
}

impl OrbitControls {
    /// Create idle controls
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    /// Get the controls configuration
    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    /// Current drag state
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Check if a drag is active
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Apply a pointer event to the camera
    pub fn handle(&mut self, event: &PointerEvent, camera: &mut Camera) {
        match *event {
            PointerEvent::Down { position, .. } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position, camera),
            PointerEvent::Up { .. } => self.pointer_up(),
            PointerEvent::Wheel { delta_y, .. } => self.wheel(delta_y, camera),
        }
    }

    /// Start a drag at `position`
    pub fn pointer_down(&mut self, position: Vec2) {
        self.state = DragState::Dragging { last: position };
    }

    /// Orbit by the horizontal movement since the last position
    ///
    /// Vertical movement is ignored. Does nothing while idle.
    pub fn pointer_move(&mut self, position: Vec2, camera: &mut Camera) {
        let DragState::Dragging { last } = self.state else {
            return;
        };

        let dx = position.x - last.x;
        if dx != 0.0 {
            camera.orbit_y(-dx * self.config.rotate_speed);
        }
        self.state = DragState::Dragging { last: position };
    }

    /// End any active drag
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Zoom out for positive `delta_y`, in for negative
    pub fn wheel(&mut self, delta_y: f32, camera: &mut Camera) {
        let factor = if delta_y > 0.0 {
            self.config.zoom_out_factor()
        } else if delta_y < 0.0 {
            self.config.zoom_in_factor()
        } else {
            return;
        };

        camera.scale_distance(factor, self.config.min_distance, self.config.max_distance);
    }
}
