//! Headless-browser scroll capture of lead websites.
//!
//! Drives an isolated headless Chromium instance over CDP, scrolls the
//! page across a fixed duration while screenshotting each frame, then
//! encodes the ordered frame sequence into a scroll video. Frame storage
//! is scoped: the frames directory is removed whether or not encoding
//! succeeds.

pub mod browser;
pub mod capture;
pub mod error;
pub mod scroll;

pub use capture::{capture_scroll_video, CaptureOptions};
pub use error::{CaptureError, CaptureResult};
pub use scroll::ScrollPlan;
