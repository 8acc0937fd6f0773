//! Viewer
//!
//! Lifecycle manager binding model sessions to a host viewport.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use poiview_assets::{AssetError, FetchError, ModelFetcher, ModelFormat};
use poiview_core::{Transform, TriangleBuffer, ViewerConfig};
use poiview_platform::{FrameScheduler, SurfaceId, Viewport};
use poiview_renderer::Camera;
use tokio::sync::watch;

use crate::session::Session;
use crate::{ViewerError, ViewerResult};

/// Status published to the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewerStatus {
    /// Nothing open
    #[default]
    Idle,
    /// A model is being fetched and parsed
    Loading,
    /// A model is shown
    Ready,
    /// The last open failed
    Error(String),
}

/// Interactive model viewer for one host viewport
///
/// At most one session is live at a time. Opening a model closes the
/// previous one, and closing invalidates any load still in flight.
pub struct Viewer<F: ModelFetcher> {
    config: ViewerConfig,
    fetcher: F,
    scheduler: Arc<dyn FrameScheduler>,
    viewport: Arc<Viewport>,
    status: watch::Sender<ViewerStatus>,
    generation: AtomicU64,
    next_surface: AtomicU64,
    session: Mutex<Option<Session>>,
}

impl<F: ModelFetcher> Viewer<F> {
    /// Create an idle viewer
    pub fn new(config: ViewerConfig, fetcher: F, scheduler: Arc<dyn FrameScheduler>, viewport: Arc<Viewport>) -> Self {
        let (status, _) = watch::channel(ViewerStatus::Idle);
        Self {
            config,
            fetcher,
            scheduler,
            viewport,
            status,
            generation: AtomicU64::new(0),
            next_surface: AtomicU64::new(1),
            session: Mutex::new(None),
        }
    }

    /// Get the viewer configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The viewport sessions are mounted in
    pub fn viewport(&self) -> &Arc<Viewport> {
        &self.viewport
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<ViewerStatus> {
        self.status.subscribe()
    }

    /// Current status
    pub fn status(&self) -> ViewerStatus {
        self.status.borrow().clone()
    }

    /// Check if a model is being shown
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Open the model at `url`, replacing whatever is shown
    ///
    /// The format is checked before anything is fetched. Failures are
    /// published as [`ViewerStatus::Error`] and returned. If the viewer is
    /// closed or another model is opened before this load finishes, the
    /// result is discarded and [`ViewerError::Superseded`] is returned.
    pub async fn open(&self, url: &str) -> ViewerResult<()> {
        let generation = self.begin_load();
        log::info!("opening model {}", url);

        let geometry = match self.load(url, generation).await {
            Ok(geometry) => geometry,
            Err(e) => return Err(self.fail(generation, e)),
        };

        let mut session = self.session.lock();
        if !self.is_current(generation) {
            log::debug!("discarding stale load of {}", url);
            return Err(ViewerError::Superseded);
        }

        let surface = SurfaceId(self.next_surface.fetch_add(1, Ordering::Relaxed));
        match Session::start(
            &self.config,
            &geometry,
            surface,
            Arc::clone(&self.viewport),
            Arc::clone(&self.scheduler),
        ) {
            Ok(started) => {
                *session = Some(started);
                drop(session);
                self.status.send_replace(ViewerStatus::Ready);
                log::info!("model {} ready ({} triangles)", url, geometry.triangle_count());
                Ok(())
            }
            Err(e) => {
                drop(session);
                Err(self.fail(generation, e))
            }
        }
    }

    /// Close the current session, if any
    ///
    /// Safe to call repeatedly, before any open, or while a load is in flight.
    pub fn close(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let session = self.session.lock().take();
        if let Some(mut session) = session {
            session.close();
            log::info!("viewer closed");
        }
        self.status.send_replace(ViewerStatus::Idle);
    }

    /// Camera of the current session
    pub fn camera(&self) -> Option<Camera> {
        self.session.lock().as_ref().and_then(Session::camera)
    }

    /// Model transform of the current session
    pub fn model_transform(&self) -> Option<Transform> {
        self.session.lock().as_ref().and_then(Session::model_transform)
    }

    /// Frames rendered by the current session
    pub fn frames(&self) -> u64 {
        self.session.lock().as_ref().map_or(0, Session::frames)
    }

    fn begin_load(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let previous = self.session.lock().take();
        if let Some(mut previous) = previous {
            previous.close();
        }
        self.status.send_replace(ViewerStatus::Loading);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    async fn load(&self, url: &str, generation: u64) -> ViewerResult<TriangleBuffer> {
        ModelFormat::from_url(url)?;

        let fetched = match self.config.fetch_timeout() {
            Some(limit) => match tokio::time::timeout(limit, self.fetcher.fetch(url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(limit)),
            },
            None => self.fetcher.fetch(url).await,
        };

        if !self.is_current(generation) {
            return Err(ViewerError::Superseded);
        }

        let text = fetched.map_err(AssetError::from)?;
        let geometry = poiview_assets::parse(&text).map_err(AssetError::from)?;
        Ok(geometry)
    }

    fn fail(&self, generation: u64, error: ViewerError) -> ViewerError {
        if matches!(error, ViewerError::Superseded) || !self.is_current(generation) {
            return ViewerError::Superseded;
        }
        log::warn!("failed to open model: {}", error);
        self.status.send_replace(ViewerStatus::Error(error.to_string()));
        error
    }
}

impl<F: ModelFetcher> Drop for Viewer<F> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.get_mut().take() {
            session.close();
        }
    }
}
