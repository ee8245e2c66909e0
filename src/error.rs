use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a video's audio track into segments.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("failed to run ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg could not extract audio from {path:?} (status {status})")]
    AudioExtraction {
        path: PathBuf,
        status: std::process::ExitStatus,
    },

    #[error("failed to read extracted audio: {0}")]
    Wav(#[from] hound::Error),

    #[error("whisper failed: {0}")]
    Whisper(#[from] whisper_rs::WhisperError),

    #[error("invalid path: {0:?}")]
    InvalidPath(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of the subtitle muxing subprocess.
#[derive(Error, Debug)]
pub enum MuxError {
    #[error("no subtitle codec known for the container of {0:?}")]
    UnsupportedContainer(PathBuf),

    #[error("failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program:?} exited with {status}")]
    Failed {
        program: PathBuf,
        status: std::process::ExitStatus,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    #[error("model {model} only supports English, got language {lang}")]
    EnglishOnlyModel { model: String, lang: String },

    #[error("could not find home directory")]
    NoHomeDir,

    #[error("could not determine a cache directory, pass --cache-dir")]
    NoCacheDir,

    #[error("input path has no file name: {0:?}")]
    NoFileStem(PathBuf),
}
