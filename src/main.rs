mod config;
mod error;
mod ffmpeg_decoder;
mod model;
mod mux;
mod output;
mod pipeline;
mod transcribe;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::config::{Language, ModelSize, RunConfig};
use crate::mux::FfmpegMuxer;
use crate::transcribe::whisper_cpp::Whisper;

#[derive(Parser)]
#[command(name = "vidsub")]
#[command(about = "Transcribe a video and attach the subtitles to a copy of it", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TranscribeArgs {
    /// Input video file
    input: PathBuf,

    /// Whisper model size
    #[arg(short, long, value_enum, default_value_t = ModelSize::LargeV3)]
    model: ModelSize,

    /// Directory holding downloaded models (default: <cache dir>/whisper)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Spoken language code (default: auto)
    #[arg(short, long, default_value = "auto")]
    lang: Language,

    /// Subtitle file to write (default: <stem>_subtitles.srt)
    #[arg(short, long)]
    subtitle: Option<PathBuf>,

    /// Configuration profile name or file path
    #[arg(short, long)]
    profile: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe, write subtitles and mux them into a new video
    Run {
        #[command(flatten)]
        transcribe: TranscribeArgs,

        /// Output video (default: <stem>_with_subtitles.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ffmpeg binary to use
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
    },

    /// Only transcribe and write the subtitle file
    Transcribe {
        #[command(flatten)]
        transcribe: TranscribeArgs,

        /// Also write <stem>.transcript.json next to the input
        #[arg(long)]
        json: bool,

        /// ffmpeg binary to use
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
    },

    /// Mux an existing subtitle file into a copy of the video
    Mux {
        /// Input video file
        input: PathBuf,

        /// Subtitle file
        subtitle: PathBuf,

        /// Output video (default: <stem>_with_subtitles.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ffmpeg binary to use
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// The `--ffmpeg` override, or the binary ffmpeg-sidecar resolves.
fn ffmpeg_program(ffmpeg: Option<PathBuf>) -> PathBuf {
    ffmpeg.unwrap_or_else(ffmpeg_sidecar::paths::ffmpeg_path)
}

fn muxer(ffmpeg: Option<PathBuf>) -> FfmpegMuxer {
    FfmpegMuxer::new(ffmpeg_program(ffmpeg))
}

impl TranscribeArgs {
    fn into_config(self, output: Option<PathBuf>) -> anyhow::Result<RunConfig> {
        let language = config::resolve_language(self.model, self.lang)?;
        let whisper = config::load_whisper_config(self.profile.as_deref())
            .context("Failed to load profile")?;
        let cache_dir = match self.cache_dir {
            Some(dir) => dir,
            None => config::default_cache_dir()?,
        };
        let subtitle_path = match self.subtitle {
            Some(path) => path,
            None => config::default_subtitle_path(&self.input)?,
        };
        let output_video = match output {
            Some(path) => path,
            None => config::default_output_path(&self.input)?,
        };

        Ok(RunConfig {
            input_video: self.input,
            model_size: self.model,
            cache_dir,
            language,
            subtitle_path,
            output_video,
            whisper,
        })
    }
}

async fn load_whisper(conf: &RunConfig, ffmpeg: &Path) -> anyhow::Result<Whisper> {
    let model_path = model::ensure_model(&conf.cache_dir, conf.model_size)
        .await
        .context("Failed to fetch whisper model")?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% ({eta})")?
            .progress_chars("#>-"),
    );

    let whisper = Whisper::new(
        &model_path,
        conf.language.clone(),
        conf.whisper.clone(),
        ffmpeg.to_path_buf(),
    )
    .context("Failed to create Whisper instance")?;

    Ok(whisper.with_progress(pb))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            transcribe,
            output,
            ffmpeg,
        } => {
            let conf = transcribe.into_config(output)?;
            log::debug!("run configuration: {:?}", conf);

            let muxer = muxer(ffmpeg);
            let mut whisper = load_whisper(&conf, muxer.program()).await?;

            pipeline::run(&conf, &mut whisper, &muxer)?;
        }
        Commands::Transcribe {
            transcribe,
            json,
            ffmpeg,
        } => {
            let conf = transcribe.into_config(None)?;
            log::debug!("run configuration: {:?}", conf);

            let ffmpeg_bin = ffmpeg_program(ffmpeg);
            let mut whisper = load_whisper(&conf, &ffmpeg_bin).await?;

            let segments =
                pipeline::transcribe_to_srt(&mut whisper, &conf.input_video, &conf.subtitle_path)?;

            if json {
                let stem = conf
                    .input_video
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                let transcript_path = conf
                    .input_video
                    .with_file_name(format!("{}.transcript.json", stem));
                output::save_transcript_json(&transcript_path, &segments)?;
                println!("Saved transcript to {:?}", transcript_path);
            }
        }
        Commands::Mux {
            input,
            subtitle,
            output,
            ffmpeg,
        } => {
            let output = match output {
                Some(path) => path,
                None => config::default_output_path(&input)?,
            };
            pipeline::attach_subtitles(&muxer(ffmpeg), &input, &subtitle, &output)?;
        }
    }

    Ok(())
}
