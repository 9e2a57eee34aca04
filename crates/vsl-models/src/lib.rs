//! Shared data models for the VSL generation pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Generation jobs and their status state machine
//! - Project display settings (bubble position, shape, size, duration)
//! - Encoding configuration shared by every FFmpeg invocation
//! - Landing-page slugs and lead URL normalization

pub mod encoding;
pub mod job;
pub mod project;
pub mod slug;

pub use encoding::EncodingConfig;
pub use job::{GenerationJob, InvalidTransition, JobId, JobStatus};
pub use project::{
    normalize_website_url, BubblePosition, BubbleShape, DisplayMode, DisplaySettings, Project,
};
pub use slug::Slug;
