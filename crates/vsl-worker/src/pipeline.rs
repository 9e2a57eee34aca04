//! Per-lead generation pipeline: capture, then compose.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use vsl_capture::capture_scroll_video;
use vsl_media::compose_full_video;
use vsl_models::{normalize_website_url, GenerationJob, Project};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;

/// The work done for one lead. Abstracted so batch behavior can be tested
/// without a browser or encoder.
#[async_trait]
pub trait LeadPipeline: Send + Sync {
    /// Produce the final video for one job; returns its path.
    async fn generate(&self, project: &Project, job: &GenerationJob) -> WorkerResult<PathBuf>;
}

/// The real pipeline: scroll capture into job-private scratch space, then
/// overlay composition into the output directory.
pub struct VideoPipeline {
    config: WorkerConfig,
}

impl VideoPipeline {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LeadPipeline for VideoPipeline {
    async fn generate(&self, project: &Project, job: &GenerationJob) -> WorkerResult<PathBuf> {
        fs::create_dir_all(&self.config.work_dir).await?;
        fs::create_dir_all(&self.config.output_dir).await?;

        // Job-private scratch: removed on drop, success or failure, so a
        // failed attempt leaves nothing behind.
        let scratch = tempfile::Builder::new()
            .prefix(&format!("job_{}_", job.id))
            .tempdir_in(&self.config.work_dir)?;

        let url = normalize_website_url(&job.website_url);
        let scroll_video = scratch.path().join("scroll.mp4");
        let mut capture = self.config.capture_options();
        capture.scratch_dir = Some(scratch.path().to_path_buf());
        info!(job_id = %job.id, url = %url, "Capturing website");
        capture_scroll_video(&url, &scroll_video, &capture).await?;

        let filename = job.resolve_output_filename();
        let output = self.config.output_dir.join(&filename);
        info!(job_id = %job.id, output = %output.display(), "Composing VSL video");
        compose_full_video(
            &project.intro_video,
            &scroll_video,
            &project.settings,
            &self.config.encoding,
            &self.config.ffmpeg_runner(),
            &output,
        )
        .await?;

        Ok(output)
    }
}
