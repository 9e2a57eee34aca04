//! Batch orchestration for per-lead video generation.
//!
//! This crate provides:
//! - Worker configuration from environment
//! - The status-update interface and an in-memory store for polling
//! - The per-lead capture + composition pipeline
//! - A batch runner with bounded concurrency, cancellation, and a
//!   completion signal; one lead's failure never aborts the batch

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod status;

pub use batch::{BatchHandle, BatchRunner, BatchSummary};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use pipeline::{LeadPipeline, VideoPipeline};
pub use status::{BatchStats, InMemoryStatusStore, StatusError, StatusSink};
