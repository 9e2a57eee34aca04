//! Generation jobs and their status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Slug;

/// Unique identifier for a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job status as a tagged state machine.
///
/// `pending -> processing -> {completed | failed}`; terminal states carry
/// the data that only exists in that state, so a failed job without a
/// message or a completed job without an output path cannot be
/// represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing {
        started_at: DateTime<Utc>,
    },
    Completed {
        video_path: String,
        filename: String,
        completed_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        completed_at: DateTime<Utc>,
    },
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing { .. } => "processing",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }

    /// Check if this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed { .. })
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejected status transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

/// One (project, lead) pairing to be rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: JobId,
    pub slug: Slug,
    /// The lead's website, as imported (normalized before navigation).
    pub website_url: String,
    /// Caller-supplied output filename; `vsl_full_<job-id>.mp4` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Create a pending job for a lead's website.
    pub fn new(website_url: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            slug: Slug::generate(),
            website_url: website_url.into(),
            output_filename: None,
            status: JobStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Override the output filename.
    pub fn with_output_filename(mut self, filename: impl Into<String>) -> Self {
        self.output_filename = Some(filename.into());
        self
    }

    /// The filename the final video is written under.
    pub fn resolve_output_filename(&self) -> String {
        self.output_filename
            .clone()
            .unwrap_or_else(|| format!("vsl_full_{}.mp4", self.id))
    }

    /// Filename keyed by the landing-page slug instead of the job ID.
    pub fn slug_output_filename(&self) -> String {
        format!("vsl_{}.mp4", self.slug)
    }

    /// Transition `pending -> processing`, stamping the start time.
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Processing {
                    started_at: Utc::now(),
                };
                Ok(())
            }
            ref from => Err(InvalidTransition {
                from: from.as_str(),
                to: "processing",
            }),
        }
    }

    /// Transition `processing -> completed` with the final video location.
    pub fn complete(
        &mut self,
        video_path: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<(), InvalidTransition> {
        match self.status {
            JobStatus::Processing { .. } => {
                self.status = JobStatus::Completed {
                    video_path: video_path.into(),
                    filename: filename.into(),
                    completed_at: Utc::now(),
                };
                Ok(())
            }
            ref from => Err(InvalidTransition {
                from: from.as_str(),
                to: "completed",
            }),
        }
    }

    /// Transition `processing -> failed` with a human-readable message.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        match self.status {
            JobStatus::Processing { .. } => {
                self.status = JobStatus::Failed {
                    message: message.into(),
                    completed_at: Utc::now(),
                };
                Ok(())
            }
            ref from => Err(InvalidTransition {
                from: from.as_str(),
                to: "failed",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = GenerationJob::new("example.com");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(!job.status.is_terminal());
        assert!(job
            .resolve_output_filename()
            .starts_with(&format!("vsl_full_{}", job.id)));
    }

    #[test]
    fn test_explicit_output_filename() {
        let job = GenerationJob::new("example.com").with_output_filename("vsl_site-abc.mp4");
        assert_eq!(job.resolve_output_filename(), "vsl_site-abc.mp4");
    }

    #[test]
    fn test_slug_output_filename() {
        let job = GenerationJob::new("example.com");
        let name = job.slug_output_filename();
        assert!(name.starts_with("vsl_site-"));
        assert!(name.ends_with(".mp4"));

        // Slug-named jobs resolve to the slug filename, not the default.
        let named = job.clone().with_output_filename(name.clone());
        assert_eq!(named.resolve_output_filename(), name);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut job = GenerationJob::new("example.com");
        job.start().unwrap();
        assert!(matches!(job.status, JobStatus::Processing { .. }));

        job.complete("/outputs/vsl.mp4", "vsl.mp4").unwrap();
        match &job.status {
            JobStatus::Completed { video_path, .. } => assert_eq!(video_path, "/outputs/vsl.mp4"),
            other => panic!("unexpected status: {other}"),
        }
        assert!(job.status.is_terminal());
    }

    #[test]
    fn test_failure_carries_message() {
        let mut job = GenerationJob::new("example.com");
        job.start().unwrap();
        job.fail("navigation refused").unwrap();
        match &job.status {
            JobStatus::Failed { message, .. } => assert_eq!(message, "navigation refused"),
            other => panic!("unexpected status: {other}"),
        }
    }

    #[test]
    fn test_terminal_states_do_not_regress() {
        let mut job = GenerationJob::new("example.com");
        job.start().unwrap();
        job.complete("/outputs/vsl.mp4", "vsl.mp4").unwrap();

        assert!(job.start().is_err());
        assert!(job.fail("too late").is_err());
        assert!(matches!(job.status, JobStatus::Completed { .. }));
    }

    #[test]
    fn test_cannot_complete_from_pending() {
        let mut job = GenerationJob::new("example.com");
        let err = job.complete("/outputs/vsl.mp4", "vsl.mp4").unwrap_err();
        assert_eq!(err.from, "pending");
        assert_eq!(err.to, "completed");
    }

    #[test]
    fn test_status_serde_tags() {
        let mut job = GenerationJob::new("example.com");
        job.start().unwrap();
        job.fail("boom").unwrap();
        let json = serde_json::to_string(&job.status).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("boom"));
    }
}
