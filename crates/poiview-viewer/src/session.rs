//! Viewer Session
//!
//! Everything one opened model owns: scene, controls, animations, renderer,
//! listener registrations and the render loop. A session is torn down
//! completely by [`Session::close`].

use std::sync::Arc;

use parking_lot::Mutex;
use poiview_core::{AnimationConfig, Transform, TriangleBuffer, ViewerConfig};
use poiview_platform::{
    EventKinds, FrameClock, FrameScheduler, FrameTime, ListenerRegistration, ListenerScope, PointerEvent, SurfaceId,
    Viewport,
};
use poiview_renderer::{Camera, MeshId, Renderer, Scene, SceneBuilder};

use crate::ViewerResult;
use crate::animation::{Animation, AnimationRegistry};
use crate::controls::OrbitControls;
use crate::render_loop::RenderLoop;

/// Mutable state shared by the render loop and the input listeners
pub struct SessionState {
    scene: Scene,
    model: MeshId,
    controls: OrbitControls,
    animations: AnimationRegistry,
    animation_config: AnimationConfig,
    renderer: Renderer,
    clock: FrameClock,
}

impl SessionState {
    /// Build the state for a model
    pub fn new(config: &ViewerConfig, geometry: &TriangleBuffer, renderer: Renderer, aspect: f32) -> Self {
        let (scene, model) = SceneBuilder::new(config.scene.clone()).build(geometry, aspect);

        let mut animations = AnimationRegistry::new();
        if config.animation.idle_spin {
            animations.add(
                model,
                Animation::IdleSpin {
                    radians_per_second: config.animation.spin_speed,
                },
            );
        }

        Self {
            scene,
            model,
            controls: OrbitControls::new(config.controls.clone()),
            animations,
            animation_config: config.animation.clone(),
            renderer,
            clock: FrameClock::new(),
        }
    }

    /// Advance animations and draw one frame
    pub fn frame(&mut self, time: FrameTime) {
        let dt = self.clock.tick(time) as f32;

        let paused = self.controls.is_dragging() && !self.animation_config.spin_while_dragging;
        if !paused {
            self.animations.advance(&mut self.scene, dt);
        }

        if let Err(e) = self.renderer.render(&self.scene) {
            log::error!("frame {} failed: {}", self.renderer.frame_number(), e);
        }
    }

    /// Apply a pointer event to the camera
    pub fn handle_input(&mut self, event: &PointerEvent) {
        self.controls.handle(event, &mut self.scene.camera);
    }

    /// The scene being shown
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Id of the model mesh
    pub fn model(&self) -> MeshId {
        self.model
    }

    /// The orbit controls
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// The renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

/// One opened model bound to a viewport
pub struct Session {
    surface: SurfaceId,
    viewport: Arc<Viewport>,
    state: Option<Arc<Mutex<SessionState>>>,
    listeners: Vec<ListenerRegistration>,
    render_loop: RenderLoop,
}

impl Session {
    /// Mount a new session for `geometry` in `viewport` and start rendering
    ///
    /// The surface size is read from the viewport once.
    pub fn start(
        config: &ViewerConfig,
        geometry: &TriangleBuffer,
        surface: SurfaceId,
        viewport: Arc<Viewport>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> ViewerResult<Self> {
        let size = viewport.size();
        let renderer = Renderer::software(surface, size.x, size.y)?;
        viewport.attach(surface, renderer.target())?;

        let state = Arc::new(Mutex::new(SessionState::new(
            config,
            geometry,
            renderer,
            viewport.aspect_ratio(),
        )));

        let input = viewport.input();
        let surface_input = Arc::clone(&state);
        let global_input = Arc::clone(&state);
        let listeners = vec![
            input.register(
                ListenerScope::Surface,
                EventKinds::POINTER_DOWN | EventKinds::POINTER_MOVE | EventKinds::WHEEL,
                move |event| surface_input.lock().handle_input(event),
            ),
            input.register(ListenerScope::Global, EventKinds::POINTER_UP, move |event| {
                global_input.lock().handle_input(event)
            }),
        ];

        let frame_state = Arc::clone(&state);
        let render_loop = RenderLoop::new(scheduler, move |time| frame_state.lock().frame(time));
        render_loop.start();

        log::debug!(
            "session started on surface {} ({}x{}, {} triangles)",
            surface.0,
            size.x,
            size.y,
            geometry.triangle_count()
        );

        Ok(Self {
            surface,
            viewport,
            state: Some(state),
            listeners,
            render_loop,
        })
    }

    /// Tear the session down
    ///
    /// Cancels the render loop, removes listeners, stops animations, disposes
    /// the surface, detaches it from the viewport and drops the scene.
    /// Idempotent.
    pub fn close(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };

        self.render_loop.cancel();
        for mut listener in self.listeners.drain(..) {
            listener.remove();
        }
        {
            let mut state = state.lock();
            state.animations.clear();
            state.renderer.dispose();
        }
        self.viewport.detach(self.surface);

        log::debug!("session on surface {} closed", self.surface.0);
    }

    /// Check if the session has been closed
    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }

    /// Surface this session draws into
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.render_loop.frames()
    }

    /// Current camera
    pub fn camera(&self) -> Option<Camera> {
        self.with_state(|state| state.scene.camera.clone())
    }

    /// Current model transform
    pub fn model_transform(&self) -> Option<Transform> {
        self.with_state(|state| state.scene.mesh(state.model).map(|mesh| mesh.transform))
            .flatten()
    }

    /// Run `f` against the live session state
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> Option<R> {
        self.state.as_ref().map(|state| f(&state.lock()))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
