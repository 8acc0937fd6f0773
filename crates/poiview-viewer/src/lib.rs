//! # Poiview Viewer
//!
//! Interactive 3D model preview for a host-owned viewport.
//!
//! ## Features
//! - Lifecycle manager opening and closing model sessions
//! - Orbit (horizontal drag) and zoom (wheel) controls
//! - Display-refresh driven render loop with idle spin animation
//! - Status channel for the host UI

pub mod animation;
pub mod controls;
pub mod render_loop;
pub mod session;
pub mod viewer;

pub use animation::{Animation, AnimationRegistry};
pub use controls::{DragState, OrbitControls};
pub use render_loop::RenderLoop;
pub use session::{Session, SessionState};
pub use viewer::{Viewer, ViewerStatus};

use poiview_assets::AssetError;
use poiview_platform::PlatformError;
use poiview_renderer::RendererError;
use thiserror::Error;

/// Viewer errors
///
/// The `Display` output is the message published with [`ViewerStatus::Error`].
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Load superseded by a newer request")]
    Superseded,
}

/// Result type for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
