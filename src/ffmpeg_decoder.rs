use hound::WavReader;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

use crate::error::TranscriptionError;

// ffmpeg -i input.mp4 -vn -ar 16000 -ac 1 -c:a pcm_s16le output.wav
fn extract_audio(ffmpeg: &Path, input_path: &Path) -> Result<NamedTempFile, TranscriptionError> {
    log::info!("extracting audio track from {:?}", input_path);

    let temp_file = NamedTempFile::with_suffix(".wav")?;

    let status = Command::new(ffmpeg)
        .arg("-i")
        .arg(input_path)
        .args(["-vn", "-ar", "16000", "-ac", "1", "-c:a", "pcm_s16le"])
        .arg(temp_file.path())
        .args(["-hide_banner", "-y", "-loglevel", "error"])
        .stdin(Stdio::null())
        .status()
        .map_err(TranscriptionError::Spawn)?;

    if !status.success() {
        return Err(TranscriptionError::AudioExtraction {
            path: input_path.to_path_buf(),
            status,
        });
    }

    Ok(temp_file)
}

/// Converts 16-bit PCM samples to f32 in [-1, 1).
fn to_float(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Decodes the audio track of `input_path` as 16 kHz mono f32 samples.
pub fn read_file(ffmpeg: &Path, input_path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let temp_file = extract_audio(ffmpeg, input_path)?;

    let mut reader = WavReader::new(temp_file.reopen()?)?;
    let samples: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;
    Ok(to_float(&samples))
    // temp_file is deleted when it goes out of scope
}
