//! VSL generation worker binary.
//!
//! Usage: `vsl-worker <intro-video> <website-url> [<website-url>...]`
//!
//! Builds one generation job per URL against the intro clip and runs the
//! batch to completion, printing final statuses.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vsl_models::{GenerationJob, JobStatus, Project};
use vsl_worker::{BatchRunner, InMemoryStatusStore, VideoPipeline, WorkerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let intro = args.next().context("usage: vsl-worker <intro-video> <website-url>...")?;
    let urls: Vec<String> = args.collect();
    if urls.is_empty() {
        bail!("usage: vsl-worker <intro-video> <website-url>...");
    }

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    vsl_media::check_ffmpeg().context("ffmpeg is required")?;
    vsl_media::check_ffprobe().context("ffprobe is required")?;

    let project = Project::new("cli", intro);
    // Outputs are keyed by the landing-page slug so filenames stay short
    // and shareable.
    let jobs: Vec<GenerationJob> = urls
        .iter()
        .map(|url| {
            let job = GenerationJob::new(url);
            let filename = job.slug_output_filename();
            job.with_output_filename(filename)
        })
        .collect();

    let store = Arc::new(InMemoryStatusStore::new());
    for job in &jobs {
        store.insert(job.clone()).await;
    }

    let runner = BatchRunner::new(
        config.clone(),
        store.clone(),
        Arc::new(VideoPipeline::new(config)),
    );
    let handle = runner.spawn(project, jobs);
    info!("Accepted {} leads", handle.accepted());

    let summary = handle.wait().await?;
    info!(
        "Batch done: {} completed, {} failed, {} skipped",
        summary.completed, summary.failed, summary.skipped
    );

    for job in store.snapshot().await {
        match &job.status {
            JobStatus::Completed { video_path, .. } => {
                println!("{}\tcompleted\t{}", job.website_url, video_path);
            }
            JobStatus::Failed { message, .. } => {
                println!("{}\tfailed\t{}", job.website_url, message);
            }
            other => println!("{}\t{}", job.website_url, other),
        }
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vsl=info,vsl_worker=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}
