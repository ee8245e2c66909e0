use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::mux;

/// Language codes understood by whisper.
const LANGUAGE_CODES: &[&str] = &[
    "en", "zh", "de", "es", "ru", "ko", "fr", "ja", "pt", "tr", "pl", "ca", "nl", "ar", "sv", "it",
    "id", "hi", "fi", "vi", "he", "uk", "el", "ms", "cs", "ro", "da", "hu", "ta", "no", "th", "ur",
    "hr", "bg", "lt", "la", "mi", "ml", "cy", "sk", "te", "fa", "lv", "bn", "sr", "az", "sl", "kn",
    "et", "mk", "br", "eu", "is", "hy", "ne", "mn", "bs", "kk", "sq", "sw", "gl", "mr", "pa", "si",
    "km", "sn", "yo", "so", "af", "oc", "ka", "be", "tg", "sd", "gu", "am", "yi", "lo", "uz", "fo",
    "ht", "ps", "tk", "nn", "mt", "sa", "lb", "my", "bo", "tl", "mg", "as", "tt", "haw", "ln", "ha",
    "ba", "jw", "su", "yue",
];

#[derive(Clone, PartialEq, Eq, Debug, Hash, Default)]
pub enum Language {
    #[default]
    Auto,
    Code(&'static str),
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::Code(code) => *code,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "auto" {
            return Ok(Language::Auto);
        }
        LANGUAGE_CODES
            .iter()
            .find(|code| **code == s)
            .map(|code| Language::Code(*code))
            .ok_or(ConfigError::UnknownLanguage(s))
    }
}

/// Pretrained whisper model sizes available in ggml format.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ModelSize {
    Tiny,
    #[value(name = "tiny.en")]
    TinyEn,
    Base,
    #[value(name = "base.en")]
    BaseEn,
    Small,
    #[value(name = "small.en")]
    SmallEn,
    Medium,
    #[value(name = "medium.en")]
    MediumEn,
    #[value(name = "large-v1")]
    LargeV1,
    #[value(name = "large-v2")]
    LargeV2,
    #[default]
    #[value(name = "large-v3", alias = "large")]
    LargeV3,
    #[value(name = "large-v3-turbo")]
    LargeV3Turbo,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::TinyEn => "tiny.en",
            ModelSize::Base => "base",
            ModelSize::BaseEn => "base.en",
            ModelSize::Small => "small",
            ModelSize::SmallEn => "small.en",
            ModelSize::Medium => "medium",
            ModelSize::MediumEn => "medium.en",
            ModelSize::LargeV1 => "large-v1",
            ModelSize::LargeV2 => "large-v2",
            ModelSize::LargeV3 => "large-v3",
            ModelSize::LargeV3Turbo => "large-v3-turbo",
        }
    }

    pub fn is_english_only(&self) -> bool {
        matches!(
            self,
            ModelSize::TinyEn | ModelSize::BaseEn | ModelSize::SmallEn | ModelSize::MediumEn
        )
    }

    /// File name of the ggml weights inside the model cache.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.as_str())
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decoder tuning, read from a profile file.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct WhisperConfig {
    pub beam_size: Option<u32>,
    pub patience: Option<f32>,
    pub temperature: Option<f32>,
    pub initial_prompt: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Profile {
    pub whisper: Option<WhisperConfig>,
}

/// Everything a single run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_video: PathBuf,
    pub model_size: ModelSize,
    pub cache_dir: PathBuf,
    pub language: Language,
    pub subtitle_path: PathBuf,
    pub output_video: PathBuf,
    pub whisper: WhisperConfig,
}

/// English-only models cannot auto-detect; pin them to English.
pub fn resolve_language(model: ModelSize, lang: Language) -> Result<Language, ConfigError> {
    if !model.is_english_only() {
        return Ok(lang);
    }
    match lang {
        Language::Auto | Language::Code("en") => Ok(Language::Code("en")),
        other => Err(ConfigError::EnglishOnlyModel {
            model: model.to_string(),
            lang: other.to_string(),
        }),
    }
}

pub fn default_cache_dir() -> Result<PathBuf, ConfigError> {
    dirs::cache_dir()
        .map(|dir| dir.join("whisper"))
        .ok_or(ConfigError::NoCacheDir)
}

fn file_stem(input: &Path) -> Result<String, ConfigError> {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| ConfigError::NoFileStem(input.to_path_buf()))
}

fn parent_dir(input: &Path) -> &Path {
    input.parent().unwrap_or_else(|| Path::new("."))
}

/// `<dir>/<stem>_subtitles.srt`
pub fn default_subtitle_path(input: &Path) -> Result<PathBuf, ConfigError> {
    let stem = file_stem(input)?;
    Ok(parent_dir(input).join(format!("{}_subtitles.srt", stem)))
}

/// `<dir>/<stem>_with_subtitles.<ext>`. The input's container is kept when
/// it can carry text subtitles, otherwise the output is mp4.
pub fn default_output_path(input: &Path) -> Result<PathBuf, ConfigError> {
    let stem = file_stem(input)?;
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| mux::codec_for_extension(e).is_some())
        .unwrap_or_else(|| "mp4".to_string());
    Ok(parent_dir(input).join(format!("{}_with_subtitles.{}", stem, ext)))
}

pub fn resolve_profile_path(profile: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = profile.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        return Ok(home.join(rest));
    }

    let path = PathBuf::from(profile);
    if path.is_absolute() || profile.starts_with("./") || profile.starts_with("../") {
        return Ok(path);
    }

    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home
        .join(".vidsub/profiles")
        .join(format!("{}.yaml", profile)))
}

pub fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {:?}", path))?;
    let profile: Profile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse profile {:?}", path))?;
    Ok(profile)
}

/// Whisper settings from an optional profile name or path.
pub fn load_whisper_config(profile: Option<&str>) -> anyhow::Result<WhisperConfig> {
    match profile {
        Some(p) => {
            let path = resolve_profile_path(p)?;
            log::debug!("loading profile from {:?}", path);
            Ok(load_profile(&path)?.whisper.unwrap_or_default())
        }
        None => Ok(WhisperConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_known_language_codes() {
        assert_eq!("auto".parse::<Language>().unwrap(), Language::Auto);
        assert_eq!("DE".parse::<Language>().unwrap(), Language::Code("de"));
        assert_eq!("haw".parse::<Language>().unwrap().as_str(), "haw");
        assert!(matches!(
            "xx".parse::<Language>(),
            Err(ConfigError::UnknownLanguage(code)) if code == "xx"
        ));
    }

    #[test]
    fn english_only_models_pin_english() {
        assert_eq!(
            resolve_language(ModelSize::BaseEn, Language::Auto).unwrap(),
            Language::Code("en")
        );
        assert!(resolve_language(ModelSize::SmallEn, Language::Code("fr")).is_err());
        assert_eq!(
            resolve_language(ModelSize::LargeV3, Language::Auto).unwrap(),
            Language::Auto
        );
    }

    #[test]
    fn model_file_names() {
        assert_eq!(ModelSize::LargeV3.file_name(), "ggml-large-v3.bin");
        assert_eq!(ModelSize::TinyEn.file_name(), "ggml-tiny.en.bin");
        assert_eq!(ModelSize::default(), ModelSize::LargeV3);
    }

    #[test]
    fn large_is_an_alias_for_large_v3() {
        assert_eq!(
            <ModelSize as ValueEnum>::from_str("large", false).unwrap(),
            ModelSize::LargeV3
        );
        assert_eq!(
            <ModelSize as ValueEnum>::from_str("medium.en", false).unwrap(),
            ModelSize::MediumEn
        );
    }

    #[test]
    fn default_paths_follow_input_name() {
        let input = Path::new("/videos/talk.mkv");
        assert_eq!(
            default_subtitle_path(input).unwrap(),
            PathBuf::from("/videos/talk_subtitles.srt")
        );
        assert_eq!(
            default_output_path(input).unwrap(),
            PathBuf::from("/videos/talk_with_subtitles.mkv")
        );
        assert_eq!(
            default_output_path(Path::new("clip")).unwrap(),
            PathBuf::from("clip_with_subtitles.mp4")
        );
    }

    #[test]
    fn default_output_always_has_a_subtitle_codec() {
        let cases = [
            ("/v/clip.avi", "/v/clip_with_subtitles.mp4", "mov_text"),
            ("/v/clip.flv", "/v/clip_with_subtitles.mp4", "mov_text"),
            ("/v/clip.ts", "/v/clip_with_subtitles.mp4", "mov_text"),
            ("/v/clip.m4v", "/v/clip_with_subtitles.m4v", "mov_text"),
            ("/v/clip.mov", "/v/clip_with_subtitles.mov", "mov_text"),
            ("/v/clip.webm", "/v/clip_with_subtitles.webm", "webvtt"),
        ];
        for (input, expected, codec) in cases {
            let output = default_output_path(Path::new(input)).unwrap();
            assert_eq!(output, PathBuf::from(expected));
            assert_eq!(mux::subtitle_codec_for(&output).unwrap(), codec);
        }
    }

    #[test]
    fn explicit_profile_paths_are_kept() {
        assert_eq!(
            resolve_profile_path("./fast.yaml").unwrap(),
            PathBuf::from("./fast.yaml")
        );
        assert_eq!(
            resolve_profile_path("/etc/vidsub.yaml").unwrap(),
            PathBuf::from("/etc/vidsub.yaml")
        );
    }

    #[test]
    fn loads_whisper_settings_from_profile() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "whisper:\n  beam_size: 8\n  temperature: 0.2\n  initial_prompt: \"Meeting notes\""
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let conf = load_whisper_config(Some(&path)).unwrap();
        assert_eq!(conf.beam_size, Some(8));
        assert_eq!(conf.patience, None);
        assert_eq!(conf.temperature, Some(0.2));
        assert_eq!(conf.initial_prompt.as_deref(), Some("Meeting notes"));
    }

    #[test]
    fn missing_profile_is_an_error() {
        assert!(load_whisper_config(Some("/definitely/not/here.yaml")).is_err());
        assert_eq!(load_whisper_config(None).unwrap(), WhisperConfig::default());
    }
}
