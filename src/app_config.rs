use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Drama script to read
    #[serde(default = "default_drama_file")]
    pub drama_file: String,

    /// Rehearsal page settings
    #[serde(default)]
    pub page: PageConfig,

    /// Speech synthesis settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Rehearsal page generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PageConfig {
    /// Output HTML file
    #[serde(default = "default_output_html")]
    pub output_html: String,

    /// Audio directory as referenced from the page
    #[serde(default = "default_tts_dir")]
    pub tts_dir: String,

    /// Language of the page (ISO code)
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            output_html: default_output_html(),
            tts_dir: default_tts_dir(),
            language: default_language(),
        }
    }
}

/// Sampling parameters passed to the speech program.
/// Unset values are left to the program's own defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TtsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl TtsSettings {
    // @returns: (name, value) pairs of the settings that are set
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(v) = self.temperature {
            entries.push(("temperature", v.to_string()));
        }
        if let Some(v) = self.repetition_penalty {
            entries.push(("repetition_penalty", v.to_string()));
        }
        if let Some(v) = self.top_k {
            entries.push(("top_k", v.to_string()));
        }
        if let Some(v) = self.top_p {
            entries.push(("top_p", v.to_string()));
        }
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Named set of synthesis settings with its own output directory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeechProfile {
    // @field: Profile name
    pub name: String,

    // @field: Where this profile writes its audio
    pub output_dir: String,

    // @field: Sampling parameters
    #[serde(default)]
    pub settings: TtsSettings,
}

impl SpeechProfile {
    pub fn new(name: &str, settings: TtsSettings) -> Self {
        Self {
            name: name.to_string(),
            output_dir: format!("tts-output-{}", name),
            settings,
        }
    }
}

/// External speech program invocation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechCommandConfig {
    /// Program to run
    #[serde(default = "default_speech_program")]
    pub program: String,

    /// Arguments; `{text}`, `{voice}`, `{language}` and `{output}` are substituted per line
    #[serde(default = "default_speech_args")]
    pub args: Vec<String>,

    /// Append `--<setting> <value>` for every profile setting that is set
    #[serde(default = "default_true")]
    pub pass_settings: bool,

    /// Per-line timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechCommandConfig {
    fn default() -> Self {
        Self {
            program: default_speech_program(),
            args: default_speech_args(),
            pass_settings: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Speech generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Spoken language (ISO code)
    #[serde(default = "default_language")]
    pub language: String,

    /// Name of the active profile
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Available profiles
    #[serde(default = "default_profiles")]
    pub profiles: Vec<SpeechProfile>,

    /// Character name → voice identifier. Names are matched case-insensitively.
    #[serde(default)]
    pub voices: BTreeMap<String, String>,

    /// Speech program invocation
    #[serde(default)]
    pub command: SpeechCommandConfig,

    /// Maximum number of lines synthesized at the same time
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Keep audio files that already exist instead of regenerating them
    #[serde(default = "default_true")]
    pub skip_existing: bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            profile: default_profile(),
            profiles: default_profiles(),
            voices: BTreeMap::new(),
            command: SpeechCommandConfig::default(),
            concurrent_requests: default_concurrent_requests(),
            skip_existing: true,
        }
    }
}

impl SpeechConfig {
    /// Get the active profile
    pub fn active_profile(&self) -> Option<&SpeechProfile> {
        self.get_profile(&self.profile)
    }

    /// Get a profile by name (case-insensitive)
    pub fn get_profile(&self, name: &str) -> Option<&SpeechProfile> {
        self.profiles.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_drama_file() -> String {
    "full_drama.txt".to_string()
}

fn default_output_html() -> String {
    "index.html".to_string()
}

fn default_tts_dir() -> String {
    "tts-output".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_profiles() -> Vec<SpeechProfile> {
    vec![
        SpeechProfile::new("default", TtsSettings::default()),
        SpeechProfile::new("stable", TtsSettings {
            temperature: Some(0.85),
            repetition_penalty: Some(10.0),
            top_k: Some(80),
            top_p: Some(0.9),
        }),
        SpeechProfile::new("balanced", TtsSettings {
            temperature: Some(0.55),
            repetition_penalty: Some(2.5),
            top_k: Some(40),
            top_p: Some(0.75),
        }),
    ]
}

fn default_speech_program() -> String {
    "tts".to_string()
}

fn default_speech_args() -> Vec<String> {
    [
        "--model_name", "tts_models/multilingual/multi-dataset/xtts_v2",
        "--text", "{text}",
        "--speaker_idx", "{voice}",
        "--language_idx", "{language}",
        "--out_path", "{output}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load `path`, or write the default configuration there when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path).map_err(|e| AppError::Config(format!("{:#}", e)));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Self::default();
        config
            .save(path)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path.as_ref(), config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path.as_ref()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.page.language)
            .context("Invalid page language")?;
        crate::language_utils::validate_language_code(&self.speech.language)
            .context("Invalid speech language")?;

        if self.speech.active_profile().is_none() {
            let names: Vec<&str> = self.speech.profiles.iter().map(|p| p.name.as_str()).collect();
            return Err(anyhow!(
                "Unknown speech profile '{}'. Available: {}",
                self.speech.profile,
                names.join(", ")
            ));
        }

        if self.speech.concurrent_requests == 0 {
            return Err(anyhow!("speech.concurrent_requests must be at least 1"));
        }

        if self.speech.command.program.trim().is_empty() {
            return Err(anyhow!("speech.command.program must not be empty"));
        }

        if self.speech.command.timeout_secs == 0 {
            return Err(anyhow!("speech.command.timeout_secs must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            drama_file: default_drama_file(),
            page: PageConfig::default(),
            speech: SpeechConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
