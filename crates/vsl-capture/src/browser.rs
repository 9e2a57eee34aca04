//! Headless browser session management.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{CaptureError, CaptureResult};

/// One isolated headless Chromium instance with its CDP event loop.
///
/// Each capture launches its own instance; nothing is shared between
/// jobs. `close` must run on every path so no browser process leaks.
pub struct BrowserSession {
    browser: Browser,
    event_loop: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a headless browser with a fixed viewport.
    pub async fn launch(width: u32, height: u32) -> CaptureResult<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .args(["--disable-gpu", "--hide-scrollbars", "--mute-audio"])
            .build()
            .map_err(CaptureError::BrowserConfig)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CaptureError::BrowserLaunch(e.to_string()))?;

        // Drive CDP messages until the browser goes away.
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            event_loop,
        })
    }

    /// Open a blank page at the session viewport.
    pub async fn new_page(&self) -> CaptureResult<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::PageOpen(e.to_string()))
    }

    /// Shut the browser down and reap its process.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        self.event_loop.abort();
    }
}
