pub mod whisper_cpp;

use std::path::Path;

use crate::error::TranscriptionError;

/// One timed utterance, in seconds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Speech-to-text over a media file's audio track.
///
/// Implementations return only once the whole input has been processed.
pub trait Transcriber {
    fn transcribe(&mut self, input: &Path) -> Result<Vec<Segment>, TranscriptionError>;
}
