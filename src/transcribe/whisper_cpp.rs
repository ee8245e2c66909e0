use std::{
    ffi::c_int,
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters};

use crate::{
    config::{Language, WhisperConfig},
    error::TranscriptionError,
    ffmpeg_decoder,
    transcribe::{Segment, Transcriber},
};

const DEFAULT_BEAM_SIZE: u32 = 5;
const DEFAULT_PATIENCE: f32 = 1.0;

/// whisper.cpp timestamps are in centiseconds.
fn centis_to_seconds(centis: i64) -> f64 {
    centis as f64 / 100.0
}

/// Clears the progress bar once decoding ends, successfully or not.
struct ClearOnDrop(ProgressBar);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

pub struct Whisper {
    ctx: WhisperContext,
    lang: Language,
    conf: WhisperConfig,
    ffmpeg: PathBuf,
    pb: Option<ProgressBar>,
}

impl Whisper {
    /// Loads the model into memory. This is the expensive part of a run and
    /// happens once.
    pub fn new(
        model_path: &Path,
        lang: Language,
        conf: WhisperConfig,
        ffmpeg: PathBuf,
    ) -> Result<Self, TranscriptionError> {
        let model = model_path
            .to_str()
            .ok_or_else(|| TranscriptionError::InvalidPath(model_path.to_path_buf()))?;

        log::info!("loading whisper model from {:?}", model_path);
        let param = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model, param)?;

        Ok(Self {
            ctx,
            lang,
            conf,
            ffmpeg,
            pb: None,
        })
    }

    /// Reports decoding progress, in percent, on the given bar.
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.pb = Some(pb);
        self
    }

    fn params(&self) -> FullParams<'_, '_> {
        let mut params = FullParams::new(whisper_rs::SamplingStrategy::BeamSearch {
            beam_size: self.conf.beam_size.unwrap_or(DEFAULT_BEAM_SIZE) as c_int,
            patience: self.conf.patience.unwrap_or(DEFAULT_PATIENCE),
        });

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(false);

        params.set_temperature(self.conf.temperature.unwrap_or(0.0));
        params.set_language(Some(self.lang.as_str()));
        if let Some(prompt) = self.conf.initial_prompt.as_deref() {
            params.set_initial_prompt(prompt);
        }

        if let Some(pb) = self.pb.clone() {
            params.set_progress_callback_safe(move |progress: i32| {
                pb.set_position(progress.clamp(0, 100) as u64);
            });
        }

        params
    }
}

impl Transcriber for Whisper {
    fn transcribe(&mut self, input: &Path) -> Result<Vec<Segment>, TranscriptionError> {
        let audio = ffmpeg_decoder::read_file(&self.ffmpeg, input)?;
        log::debug!("decoded {} samples from {:?}", audio.len(), input);

        let _progress = self.pb.clone().map(ClearOnDrop);
        let params = self.params();
        let mut state = self.ctx.create_state()?;
        state.full(params, &audio)?;

        let mut segments = Vec::with_capacity(state.full_n_segments().max(0) as usize);
        for segment in state.as_iter() {
            segments.push(Segment {
                start: centis_to_seconds(segment.start_timestamp()),
                end: centis_to_seconds(segment.end_timestamp()),
                text: segment.to_str_lossy()?.to_string(),
            });
        }

        if segments.is_empty() {
            log::warn!("no speech found in {:?}", input);
        }

        Ok(segments)
    }
}
