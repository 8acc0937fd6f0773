//! # Poiview Assets
//!
//! Model loading for the poiview viewer.
//!
//! ## Features
//! - Model format detection from URLs
//! - Permissive Wavefront OBJ parsing into triangle buffers
//! - HTTP and local file fetchers behind a single trait

pub mod fetch;
pub mod obj;

pub use fetch::{FileFetcher, HttpFetcher, ModelFetcher, SourceFetcher};
pub use obj::{ParseReport, parse, parse_with_report};

use std::time::Duration;

use thiserror::Error;

/// OBJ parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no geometry found")]
    NoGeometry,

    #[error("no geometry found: all {dropped} faces reference missing vertices")]
    AllFacesDropped { dropped: usize },
}

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Model fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Unsupported model format: {}", display_extension(.extension))]
    UnsupportedFormat { extension: String },

    #[error("Failed to fetch model: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] ParseError),
}

fn display_extension(extension: &str) -> String {
    if extension.is_empty() {
        String::from("(none)")
    } else {
        format!("'.{}'", extension)
    }
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Model formats the viewer can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// Wavefront OBJ (positions and faces only)
    Obj,
}

impl ModelFormat {
    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Obj => &["obj"],
        }
    }

    /// Detect the format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        [Self::Obj]
            .into_iter()
            .find(|format| format.extensions().iter().any(|e| e.eq_ignore_ascii_case(extension)))
    }

    /// Detect the format of a model URL or path
    ///
    /// Fails with [`AssetError::UnsupportedFormat`] for an empty URL or an
    /// unknown extension.
    pub fn from_url(url: &str) -> AssetResult<Self> {
        let extension = url_extension(url);
        Self::from_extension(extension).ok_or_else(|| AssetError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }
}

/// Extension of the last path segment, ignoring query string and fragment
pub fn url_extension(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => &file_name[dot + 1..],
        _ => "",
    }
}
