//! Scroll capture: navigate, scroll, screenshot, encode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use vsl_media::{FfmpegCommand, FfmpegRunner};
use vsl_models::EncodingConfig;

use crate::browser::BrowserSession;
use crate::error::{CaptureError, CaptureResult};
use crate::scroll::ScrollPlan;

/// Options for one website capture.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Length of the produced scroll video in seconds.
    pub duration_secs: f64,
    /// Capture frame rate.
    pub fps: u32,
    /// How long navigation may take before capture proceeds best-effort.
    pub navigation_timeout: Duration,
    /// Parent directory for the frames scratch dir; system temp when unset.
    pub scratch_dir: Option<PathBuf>,
    /// Kill the frame encoder if it runs longer than this.
    pub encode_timeout_secs: Option<u64>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            duration_secs: 10.0,
            fps: 30,
            navigation_timeout: Duration::from_secs(30),
            scratch_dir: None,
            encode_timeout_secs: None,
        }
    }
}

/// Scoped storage for captured frames.
///
/// Owns the frames directory; `encode` consumes the store, so the
/// directory is removed whether or not the encoder succeeds.
struct FrameStore {
    dir: TempDir,
}

impl FrameStore {
    fn create(parent: Option<&Path>) -> CaptureResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("frames_");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    /// Path for one frame; zero-padded so lexical order matches temporal
    /// order.
    fn frame_path(&self, frame: u32) -> PathBuf {
        self.dir.path().join(format!("frame_{frame:05}.png"))
    }

    /// Encode the ordered frame sequence into one video, then drop the
    /// frames directory.
    async fn encode(self, options: &CaptureOptions, output: &Path) -> CaptureResult<()> {
        let pattern = self.dir.path().join("frame_%05d.png");
        let cmd = FfmpegCommand::new(&pattern, output)
            .input_args(["-framerate", &options.fps.to_string()])
            .video_encoding(&EncodingConfig::default());

        let mut runner = FfmpegRunner::new();
        if let Some(secs) = options.encode_timeout_secs {
            runner = runner.with_timeout(secs);
        }
        runner.run(&cmd).await?;
        Ok(())
    }
}

/// Capture a scrolling recording of a website into `output`.
///
/// The produced video is exactly `duration_secs` long at `fps`. Bounds on
/// duration and fps are the caller's responsibility. Frame files live in a
/// scoped scratch directory and are removed unconditionally, even when the
/// encoder step fails.
pub async fn capture_scroll_video(
    url: &str,
    output: impl AsRef<Path>,
    options: &CaptureOptions,
) -> CaptureResult<()> {
    let output = output.as_ref();
    info!(url, duration_secs = options.duration_secs, "Capturing website scroll");

    let frames = FrameStore::create(options.scratch_dir.as_deref())?;

    let session = BrowserSession::launch(options.width, options.height).await?;
    let captured = capture_frames(&session, url, options, &frames).await;
    // The browser goes down before encoding, success or not.
    session.close().await;
    captured?;

    frames.encode(options, output).await?;

    info!(output = %output.display(), "Scroll capture encoded");
    Ok(())
}

/// Navigate and screenshot every frame of the scroll plan.
async fn capture_frames(
    session: &BrowserSession,
    url: &str,
    options: &CaptureOptions,
    frames: &FrameStore,
) -> CaptureResult<()> {
    let page = session.new_page().await?;

    navigate_best_effort(&page, url, options.navigation_timeout).await?;

    let page_height = page_scroll_height(&page).await?;
    let plan = ScrollPlan::new(
        page_height,
        options.height,
        options.duration_secs,
        options.fps,
    );
    debug!(
        page_height,
        total_frames = plan.total_frames(),
        is_static = plan.is_static(),
        "Scroll plan resolved"
    );

    for frame in 0..plan.total_frames() {
        page.evaluate(format!("window.scrollTo(0, {:.2})", plan.offset(frame)))
            .await
            .map_err(|e| CaptureError::Script(e.to_string()))?;

        tokio::time::sleep(plan.frame_delay()).await;

        page.save_screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build(),
            frames.frame_path(frame),
        )
        .await
        .map_err(|e| CaptureError::Screenshot {
            frame,
            message: e.to_string(),
        })?;
    }

    Ok(())
}

/// Navigate with a bounded timeout.
///
/// A slow page is not a failed job: on timeout the capture continues with
/// whatever content has loaded. Only an outright navigation error fails.
async fn navigate_best_effort(page: &Page, url: &str, timeout: Duration) -> CaptureResult<()> {
    match tokio::time::timeout(timeout, page.goto(url)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(CaptureError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        }),
        Err(_) => {
            warn!(url, "Navigation timed out, capturing whatever loaded");
            Ok(())
        }
    }
}

/// Read the full scrollable page height.
async fn page_scroll_height(page: &Page) -> CaptureResult<f64> {
    page.evaluate("document.body.scrollHeight")
        .await
        .map_err(|e| CaptureError::Script(e.to_string()))?
        .into_value::<f64>()
        .map_err(|e| CaptureError::Script(e.to_string()))
}
