//! Frame Scheduling
//!
//! Display-refresh driven frame callbacks, in the style of a browser's
//! animation frame requests: a callback is requested once, runs on the next
//! refresh, and must request again to keep animating.

use parking_lot::Mutex;

/// Frame timestamp in seconds since an arbitrary host epoch
pub type FrameTime = f64;

/// One-shot frame callback
pub type FrameCallback = Box<dyn FnOnce(FrameTime) + Send>;

/// Identifier of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

/// Schedules callbacks against the host display refresh
pub trait FrameScheduler: Send + Sync {
    /// Run `callback` on the next display refresh
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Cancel a pending request; unknown or already-run ids are ignored
    fn cancel_frame(&self, id: FrameRequestId);
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    pending: Vec<(FrameRequestId, FrameCallback)>,
    requested: u64,
    cancelled: u64,
    refreshes: u64,
}

/// Frame scheduler the host drives from its refresh signal
///
/// The host calls [`FrameQueue::refresh`] once per display refresh (vsync,
/// a redraw event, or a test step). Callbacks requested while a refresh is
/// running are deferred to the next one.
#[derive(Default)]
pub struct FrameQueue {
    state: Mutex<QueueState>,
}

impl FrameQueue {
    /// Create an empty frame queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback pending at the time of the call, returning how many ran
    pub fn refresh(&self, time: FrameTime) -> usize {
        let due = {
            let mut state = self.state.lock();
            state.refreshes += 1;
            std::mem::take(&mut state.pending)
        };

        let count = due.len();
        for (_, callback) in due {
            callback(time);
        }

        tracing::trace!(target: "frame", time, callbacks = count, "refresh");
        count
    }

    /// Number of callbacks waiting for the next refresh
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Total frame requests made
    pub fn requested(&self) -> u64 {
        self.state.lock().requested
    }

    /// Total requests cancelled while still pending
    pub fn cancelled(&self) -> u64 {
        self.state.lock().cancelled
    }

    /// Total refreshes driven by the host
    pub fn refreshes(&self) -> u64 {
        self.state.lock().refreshes
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let mut state = self.state.lock();
        let id = FrameRequestId(state.next_id);
        state.next_id += 1;
        state.requested += 1;
        state.pending.push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let mut state = self.state.lock();
        let before = state.pending.len();
        state.pending.retain(|(pending, _)| *pending != id);
        if state.pending.len() < before {
            state.cancelled += 1;
        }
    }
}
