//! Batch runner: drives every lead's job to a terminal state.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use vsl_models::{GenerationJob, Project};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::LeadPipeline;
use crate::status::{StatusError, StatusSink};

/// Outcome tally for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Handle to a running batch: the trigger returns immediately with the
/// accepted count, and the handle carries the cancel switch and the
/// completion signal.
pub struct BatchHandle {
    accepted: usize,
    cancel: watch::Sender<bool>,
    task: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// How many leads were accepted into the batch.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Stop dispatching further leads. Already-dispatched jobs run to a
    /// terminal state; untouched jobs stay pending.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the batch to finish.
    pub async fn wait(self) -> WorkerResult<BatchSummary> {
        self.task
            .await
            .map_err(|e| WorkerError::BatchPanicked(e.to_string()))
    }
}

/// Drives a project's leads through the pipeline with bounded concurrency
/// and per-lead failure isolation.
pub struct BatchRunner {
    config: WorkerConfig,
    status: Arc<dyn StatusSink>,
    pipeline: Arc<dyn LeadPipeline>,
}

impl BatchRunner {
    pub fn new(
        config: WorkerConfig,
        status: Arc<dyn StatusSink>,
        pipeline: Arc<dyn LeadPipeline>,
    ) -> Self {
        Self {
            config,
            status,
            pipeline,
        }
    }

    /// Start a batch in the background and return immediately.
    pub fn spawn(&self, project: Project, jobs: Vec<GenerationJob>) -> BatchHandle {
        let accepted = jobs.len();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        info!(
            project = %project.name,
            accepted,
            max_concurrent = self.config.max_concurrent_jobs,
            "Starting generation batch"
        );

        let task = tokio::spawn(run_batch(
            self.config.max_concurrent_jobs.max(1),
            Arc::clone(&self.status),
            Arc::clone(&self.pipeline),
            project,
            jobs,
            cancel_rx,
        ));

        BatchHandle {
            accepted,
            cancel: cancel_tx,
            task,
        }
    }
}

async fn run_batch(
    max_concurrent: usize,
    status: Arc<dyn StatusSink>,
    pipeline: Arc<dyn LeadPipeline>,
    project: Project,
    jobs: Vec<GenerationJob>,
    cancel_rx: watch::Receiver<bool>,
) -> BatchSummary {
    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let mut tasks: JoinSet<JobOutcome> = JoinSet::new();
    let mut summary = BatchSummary::default();

    for job in jobs {
        if *cancel_rx.borrow() {
            info!("Batch cancelled, remaining leads stay pending");
            break;
        }

        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        // The permit wait can span a whole job; re-check before dispatch.
        if *cancel_rx.borrow() {
            info!("Batch cancelled, remaining leads stay pending");
            break;
        }

        let status = Arc::clone(&status);
        let pipeline = Arc::clone(&pipeline);
        let project = project.clone();
        tasks.spawn(async move {
            let _permit = permit;
            process_one(status, pipeline, project, job).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(JobOutcome::Completed) => summary.completed += 1,
            Ok(JobOutcome::Failed) => summary.failed += 1,
            Ok(JobOutcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                error!("Job task panicked: {}", e);
                summary.failed += 1;
            }
        }
    }

    info!(
        completed = summary.completed,
        failed = summary.failed,
        skipped = summary.skipped,
        "Batch finished"
    );
    summary
}

enum JobOutcome {
    Completed,
    Failed,
    Skipped,
}

/// Process one lead end to end. Every pipeline error is caught here and
/// converted into a failed status; nothing propagates to the batch.
async fn process_one(
    status: Arc<dyn StatusSink>,
    pipeline: Arc<dyn LeadPipeline>,
    project: Project,
    job: GenerationJob,
) -> JobOutcome {
    let job_id = job.id.clone();

    match status.mark_processing(&job_id).await {
        Ok(()) => {}
        Err(StatusError::UnknownJob(_)) => {
            // Upstream should have created the record; skip defensively.
            warn!(job_id = %job_id, "No job record for lead, skipping");
            return JobOutcome::Skipped;
        }
        Err(e) => {
            warn!(job_id = %job_id, "Could not mark job processing: {}", e);
            return JobOutcome::Skipped;
        }
    }

    match pipeline.generate(&project, &job).await {
        Ok(video_path) => {
            let filename = job.resolve_output_filename();
            info!(job_id = %job_id, url = %job.website_url, "Generated video");
            if let Err(e) = status.mark_completed(&job_id, &video_path, &filename).await {
                warn!(job_id = %job_id, "Could not mark job completed: {}", e);
            }
            JobOutcome::Completed
        }
        Err(e) => {
            error!(job_id = %job_id, url = %job.website_url, "Generation failed: {}", e);
            if let Err(e) = status.mark_failed(&job_id, &e.to_string()).await {
                warn!(job_id = %job_id, "Could not mark job failed: {}", e);
            }
            JobOutcome::Failed
        }
    }
}
