use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::MuxError;

/// Attaches a subtitle file to a video as an extra stream.
pub trait Muxer {
    fn mux(&self, video: &Path, subtitle: &Path, output: &Path) -> Result<(), MuxError>;
}

/// Subtitle codec a container extension can carry, if any.
pub fn codec_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" | "mov" => Some("mov_text"),
        "mkv" | "mka" => Some("srt"),
        "webm" => Some("webvtt"),
        _ => None,
    }
}

/// Subtitle codec the output container can carry.
pub fn subtitle_codec_for(output: &Path) -> Result<&'static str, MuxError> {
    output
        .extension()
        .and_then(|e| codec_for_extension(&e.to_string_lossy()))
        .ok_or_else(|| MuxError::UnsupportedContainer(output.to_path_buf()))
}

/// Muxes with an ffmpeg binary, copying video and audio untouched.
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new(ffmpeg_sidecar::paths::ffmpeg_path())
    }
}

impl FfmpegMuxer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Stream copy for video and audio, every input stream mapped, output
    /// overwritten without asking.
    pub fn args(video: &Path, subtitle: &Path, output: &Path) -> Result<Vec<OsString>, MuxError> {
        let codec = subtitle_codec_for(output)?;

        let mut args: Vec<OsString> = Vec::with_capacity(18);
        args.push("-i".into());
        args.push(video.into());
        args.push("-i".into());
        args.push(subtitle.into());
        for arg in [
            "-c:v",
            "copy",
            "-c:a",
            "copy",
            "-c:s",
            codec,
            "-map",
            "0",
            "-map",
            "1",
            "-y",
        ] {
            args.push(arg.into());
        }
        args.push(output.into());
        Ok(args)
    }
}

impl Muxer for FfmpegMuxer {
    fn mux(&self, video: &Path, subtitle: &Path, output: &Path) -> Result<(), MuxError> {
        let args = Self::args(video, subtitle, output)?;
        log::debug!("running {:?} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| MuxError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(MuxError::Failed {
                program: self.program.clone(),
                status,
            });
        }

        log::info!("muxed subtitles into {:?}", output);
        Ok(())
    }
}
