//! FFmpeg/FFprobe CLI wrapper for the VSL composition pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building (multiple inputs, filter graphs)
//! - A runner that captures stderr diagnostics and surfaces exit codes
//! - FFprobe-based duration/metadata probing
//! - Bubble overlay geometry and filter construction
//! - Composition planning and rendering (bubble phase, fullscreen phase,
//!   stream-copy concatenation)

pub mod command;
pub mod compose;
pub mod error;
pub mod fs_utils;
pub mod overlay;
pub mod plan;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::compose_full_video;
pub use error::{MediaError, MediaResult};
pub use overlay::{bubble_overlay_filter, overlay_anchor, CircleMask, OVERLAY_MARGIN};
pub use plan::{CompositionPlan, FullscreenPhase};
pub use probe::{probe_duration, probe_video, VideoInfo};
