//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use vsl_capture::CaptureOptions;
use vsl_models::EncodingConfig;

/// Scroll capture length used for every lead in a batch.
const BATCH_CAPTURE_SECS: f64 = 15.0;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum jobs rendered at once. 1 keeps the pipeline strictly
    /// sequential; each browser + encoder pair is resource-heavy.
    pub max_concurrent_jobs: usize,
    /// Where finished videos land.
    pub output_dir: PathBuf,
    /// Parent directory for per-job scratch space.
    pub work_dir: PathBuf,
    /// Capture viewport width.
    pub capture_width: u32,
    /// Capture viewport height.
    pub capture_height: u32,
    /// Scroll capture length in seconds.
    pub capture_duration_secs: f64,
    /// Capture frame rate.
    pub capture_fps: u32,
    /// Page navigation timeout before best-effort capture.
    pub navigation_timeout: Duration,
    /// Kill any single encoder run that exceeds this; unbounded when unset.
    pub encode_timeout_secs: Option<u64>,
    /// Output options shared by every encode in a job.
    pub encoding: EncodingConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 1,
            output_dir: PathBuf::from("./outputs"),
            work_dir: std::env::temp_dir().join("vsl"),
            capture_width: 1920,
            capture_height: 1080,
            capture_duration_secs: BATCH_CAPTURE_SECS,
            capture_fps: 30,
            navigation_timeout: Duration::from_secs(30),
            encode_timeout_secs: None,
            encoding: EncodingConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: env_parse("VSL_MAX_JOBS", defaults.max_concurrent_jobs),
            output_dir: std::env::var("VSL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            work_dir: std::env::var("VSL_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            capture_width: env_parse("VSL_CAPTURE_WIDTH", defaults.capture_width),
            capture_height: env_parse("VSL_CAPTURE_HEIGHT", defaults.capture_height),
            capture_duration_secs: env_parse("VSL_CAPTURE_SECS", defaults.capture_duration_secs),
            capture_fps: env_parse("VSL_CAPTURE_FPS", defaults.capture_fps),
            navigation_timeout: Duration::from_secs(env_parse(
                "VSL_NAVIGATION_TIMEOUT_SECS",
                defaults.navigation_timeout.as_secs(),
            )),
            encode_timeout_secs: std::env::var("VSL_ENCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            encoding: EncodingConfig::default(),
        }
    }

    /// Capture options for one lead under this config. The frames scratch
    /// parent is left unset; the pipeline points it at the job scratch dir.
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            width: self.capture_width,
            height: self.capture_height,
            duration_secs: self.capture_duration_secs,
            fps: self.capture_fps,
            navigation_timeout: self.navigation_timeout,
            scratch_dir: None,
            encode_timeout_secs: self.encode_timeout_secs,
        }
    }

    /// FFmpeg runner honoring the configured encode timeout.
    pub fn ffmpeg_runner(&self) -> vsl_media::FfmpegRunner {
        let runner = vsl_media::FfmpegRunner::new();
        match self.encode_timeout_secs {
            Some(secs) => runner.with_timeout(secs),
            None => runner,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.max_concurrent_jobs, 1);
        assert!((config.capture_duration_secs - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.capture_fps, 30);
    }

    #[test]
    fn test_capture_options_mirror_config() {
        let config = WorkerConfig {
            encode_timeout_secs: Some(90),
            ..Default::default()
        };
        let options = config.capture_options();
        assert_eq!(options.width, config.capture_width);
        assert_eq!(options.fps, config.capture_fps);
        assert_eq!(options.navigation_timeout, config.navigation_timeout);
        assert_eq!(options.encode_timeout_secs, Some(90));
        assert!(options.scratch_dir.is_none());
    }

    #[test]
    fn test_encode_timeout_from_env() {
        std::env::set_var("VSL_ENCODE_TIMEOUT_SECS", "120");
        let config = WorkerConfig::from_env();
        assert_eq!(config.encode_timeout_secs, Some(120));
        std::env::remove_var("VSL_ENCODE_TIMEOUT_SECS");
    }
}
