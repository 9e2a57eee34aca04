//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("website capture failed: {0}")]
    Capture(#[from] vsl_capture::CaptureError),

    #[error("media processing failed: {0}")]
    Media(#[from] vsl_media::MediaError),

    #[error("status update failed: {0}")]
    Status(#[from] crate::status::StatusError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("batch task panicked: {0}")]
    BatchPanicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
