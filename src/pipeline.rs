use anyhow::{Context, Result};
use std::path::Path;

use crate::config::RunConfig;
use crate::mux::Muxer;
use crate::output;
use crate::transcribe::{Segment, Transcriber};

/// Transcribes `input` and writes the SRT document to `subtitle_path`.
pub fn transcribe_to_srt(
    transcriber: &mut impl Transcriber,
    input: &Path,
    subtitle_path: &Path,
) -> Result<Vec<Segment>> {
    println!("Transcribing {:?}...", input);
    let segments = transcriber
        .transcribe(input)
        .with_context(|| format!("Failed to transcribe {:?}", input))?;
    log::info!("transcribed {} segments", segments.len());

    let subtitles = output::format_srt(&segments);
    output::save_srt(subtitle_path, &subtitles)?;
    println!("Saved subtitles to {:?}", subtitle_path);

    Ok(segments)
}

/// Muxes an existing subtitle file into a copy of `video`.
pub fn attach_subtitles(
    muxer: &impl Muxer,
    video: &Path,
    subtitle_path: &Path,
    output_video: &Path,
) -> Result<()> {
    println!("Adding subtitles to {:?}...", video);
    muxer
        .mux(video, subtitle_path, output_video)
        .with_context(|| format!("Failed to mux subtitles into {:?}", output_video))?;
    println!("Saved video to {:?}", output_video);
    Ok(())
}

/// Transcribe, write the subtitle file, then mux it, strictly in that order.
///
/// A subtitle file that was written stays on disk when muxing fails.
pub fn run(
    conf: &RunConfig,
    transcriber: &mut impl Transcriber,
    muxer: &impl Muxer,
) -> Result<()> {
    transcribe_to_srt(transcriber, &conf.input_video, &conf.subtitle_path)?;
    attach_subtitles(
        muxer,
        &conf.input_video,
        &conf.subtitle_path,
        &conf.output_video,
    )
}
