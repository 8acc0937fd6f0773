//! # Poiview Platform
//!
//! Host integration layer for the poiview model viewer.
//!
//! This crate provides the abstractions a host UI implements or drives:
//! - **Viewport**: The rectangle a render surface is mounted into
//! - **Input**: Pointer events and scoped listener registrations
//! - **Frame**: Display-refresh driven frame callbacks
//! - **Timers**: Frame deltas and scoped timing

pub mod frame;
pub mod input;
pub mod timer;
pub mod viewport;

pub use frame::{FrameCallback, FrameQueue, FrameRequestId, FrameScheduler, FrameTime};
pub use input::{
    EventKinds, EventTarget, InputHub, ListenerRegistration, ListenerScope, PointerButton, PointerEvent,
};
pub use timer::{FrameClock, ScopedTimer};
pub use viewport::{FrameBuffer, SharedFrameBuffer, SurfaceId, Viewport};

use thiserror::Error;

/// Platform errors
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Invalid viewport size: {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("Viewport already has surface {0} attached")]
    SurfaceAlreadyAttached(u64),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
