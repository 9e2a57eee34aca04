//! Error types for website capture.

use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur while capturing a website.
///
/// A navigation *timeout* is deliberately absent: capture proceeds
/// best-effort with whatever content loaded.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid browser configuration: {0}")]
    BrowserConfig(String),

    #[error("failed to launch headless browser: {0}")]
    BrowserLaunch(String),

    #[error("failed to open page: {0}")]
    PageOpen(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("page script evaluation failed: {0}")]
    Script(String),

    #[error("screenshot failed for frame {frame}: {message}")]
    Screenshot { frame: u32, message: String },

    #[error("frame encoding failed: {0}")]
    Encoding(#[from] vsl_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
