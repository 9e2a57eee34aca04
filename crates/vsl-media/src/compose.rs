//! Composition rendering: bubble phase, fullscreen phase, concatenation.

use std::path::Path;
use tokio::fs;
use tracing::info;

use vsl_models::{DisplaySettings, EncodingConfig};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::plan::CompositionPlan;
use crate::probe::probe_duration;

/// Compose the final personalized video.
///
/// Overlays the intro clip on the background (website capture) for the
/// bubble phase, renders the fullscreen remainder of the intro when one
/// exists, and joins the two with a stream copy. Every encode goes through
/// the caller's runner, so one timeout policy covers the whole job.
/// Intermediates live in a scratch directory that is removed on every
/// path; the output path is only populated on success.
pub async fn compose_full_video(
    intro: impl AsRef<Path>,
    background: impl AsRef<Path>,
    settings: &DisplaySettings,
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let intro = intro.as_ref();
    let background = background.as_ref();
    let output = output.as_ref();

    if !intro.exists() {
        return Err(MediaError::FileNotFound(intro.to_path_buf()));
    }
    if !background.exists() {
        return Err(MediaError::FileNotFound(background.to_path_buf()));
    }

    let intro_duration = probe_duration(intro).await?;
    let plan = CompositionPlan::resolve(settings, intro_duration);

    info!(
        intro = %intro.display(),
        intro_duration,
        bubble_secs = plan.bubble_secs,
        concat = plan.needs_concat(),
        "Composing video"
    );

    let scratch = tempfile::tempdir()?;

    let bubble = scratch.path().join("bubble.mp4");
    render_bubble_phase(background, intro, &plan, encoding, runner, &bubble).await?;

    match plan.fullscreen {
        None => {
            // The whole intro fits inside the bubble.
            move_file(&bubble, output).await?;
        }
        Some(phase) => {
            let fullscreen = scratch.path().join("fullscreen.mp4");
            render_fullscreen_phase(intro, phase.start_secs, encoding, runner, &fullscreen)
                .await?;

            let joined = scratch.path().join("joined.mp4");
            concat_phases(&bubble, &fullscreen, scratch.path(), runner, &joined).await?;
            move_file(&joined, output).await?;
        }
    }

    info!(output = %output.display(), "Composition complete");
    Ok(())
}

/// Render the background with the masked intro overlaid, truncated to the
/// bubble phase length. Audio comes from the intro track.
async fn render_bubble_phase(
    background: &Path,
    intro: &Path,
    plan: &CompositionPlan,
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
    output: &Path,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(background, output)
        .add_input(intro)
        .filter_complex(plan.overlay_filter.clone())
        .map("[vout]")
        .map("1:a?")
        .encoding(encoding)
        .limit_duration(plan.bubble_secs);

    runner.run(&cmd).await
}

/// Render the remainder of the intro clip at full frame.
async fn render_fullscreen_phase(
    intro: &Path,
    start_secs: f64,
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
    output: &Path,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(intro, output)
        .seek(start_secs)
        .encoding(encoding);

    runner.run(&cmd).await
}

/// Join the two phases with the concat demuxer.
///
/// Both phases were encoded with identical options, so a stream copy is
/// valid and avoids a third encode.
async fn concat_phases(
    bubble: &Path,
    fullscreen: &Path,
    scratch: &Path,
    runner: &FfmpegRunner,
    output: &Path,
) -> MediaResult<()> {
    let list_path = scratch.join("concat.txt");
    fs::write(&list_path, concat_list(&[bubble, fullscreen])).await?;

    let cmd = FfmpegCommand::new(&list_path, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .output_args(["-c", "copy"]);

    runner.run(&cmd).await
}

/// Concat demuxer list contents, in playback order.
fn concat_list(paths: &[&Path]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_concat_list_preserves_order() {
        let a = PathBuf::from("/tmp/scratch/bubble.mp4");
        let b = PathBuf::from("/tmp/scratch/fullscreen.mp4");
        let list = concat_list(&[&a, &b]);
        assert_eq!(
            list,
            "file '/tmp/scratch/bubble.mp4'\nfile '/tmp/scratch/fullscreen.mp4'\n"
        );
        assert!(list.find("bubble").unwrap() < list.find("fullscreen").unwrap());
    }

    #[tokio::test]
    async fn test_compose_missing_intro() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("scroll.mp4");
        tokio::fs::write(&background, b"stub").await.unwrap();

        let err = compose_full_video(
            dir.path().join("missing.mp4"),
            &background,
            &DisplaySettings::default(),
            &EncodingConfig::default(),
            &FfmpegRunner::new(),
            dir.path().join("out.mp4"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
