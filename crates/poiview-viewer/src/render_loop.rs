//! Render Loop
//!
//! Continuous per-frame callback driven by a [`FrameScheduler`]. Each frame
//! runs the handler and requests the next frame, until cancelled.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use poiview_platform::{FrameRequestId, FrameScheduler, FrameTime};

/// Work done on every frame
pub type FrameHandler = Box<dyn FnMut(FrameTime) + Send>;

struct LoopShared {
    scheduler: Arc<dyn FrameScheduler>,
    handler: Mutex<Option<FrameHandler>>,
    running: AtomicBool,
    pending: Mutex<Option<FrameRequestId>>,
    frames: AtomicU64,
}

/// Handle to a running frame loop
///
/// Dropping the handle cancels the loop.
pub struct RenderLoop {
    shared: Arc<LoopShared>,
}

impl RenderLoop {
    /// Create a stopped loop
    pub fn new<H>(scheduler: Arc<dyn FrameScheduler>, handler: H) -> Self
    where
        H: FnMut(FrameTime) + Send + 'static,
    {
        Self {
            shared: Arc::new(LoopShared {
                scheduler,
                handler: Mutex::new(Some(Box::new(handler))),
                running: AtomicBool::new(false),
                pending: Mutex::new(None),
                frames: AtomicU64::new(0),
            }),
        }
    }

    /// Request the first frame
    ///
    /// Starting a running or cancelled loop does nothing.
    pub fn start(&self) {
        if self.shared.handler.lock().is_none() || self.shared.running.swap(true, Ordering::AcqRel) {
            return;
        }
        schedule(&self.shared);
    }

    /// Stop the loop and release the handler
    ///
    /// A pending frame request is cancelled; a frame delivered anyway does
    /// nothing.
    pub fn cancel(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(id) = self.shared.pending.lock().take() {
            self.shared.scheduler.cancel_frame(id);
        }
        let handler = self.shared.handler.lock().take();
        if handler.is_some() {
            log::debug!("render loop cancelled after {} frames", self.frames());
        }
    }

    /// Check if the loop is running
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.shared.frames.load(Ordering::Relaxed)
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule(shared: &Arc<LoopShared>) {
    let weak: Weak<LoopShared> = Arc::downgrade(shared);
    let id = shared.scheduler.request_frame(Box::new(move |time| {
        if let Some(shared) = weak.upgrade() {
            run_frame(&shared, time);
        }
    }));
    *shared.pending.lock() = Some(id);
}

fn run_frame(shared: &Arc<LoopShared>, time: FrameTime) {
    if !shared.running.load(Ordering::Acquire) {
        return;
    }
    shared.pending.lock().take();

    {
        let mut handler = shared.handler.lock();
        let Some(handler) = handler.as_mut() else {
            return;
        };
        handler(time);
    }
    shared.frames.fetch_add(1, Ordering::Relaxed);

    if shared.running.load(Ordering::Acquire) {
        schedule(shared);
    }
}
