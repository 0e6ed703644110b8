/*!
 * Speech generation for a parsed drama.
 *
 * Every dialogue whose character has a voice is rendered to its own audio
 * file under `<output_dir>/act<N>/scene<M>/<line:03>_<character>.wav`:
 * - `plan_speech` decides which lines to render and where
 * - a `SpeechBackend` renders one line (external program or mock)
 * - `SpeechGenerator` runs the plan with bounded concurrency and progress
 */

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::warn;

use crate::app_config::TtsSettings;
use crate::drama::Drama;
use crate::errors::SpeechError;
use crate::file_utils::FileManager;

pub mod command;
pub mod generator;
pub mod mock;

pub use command::CommandBackend;
pub use generator::{SpeechGenerator, SpeechOptions, SpeechReport};
pub use mock::{MockBackend, MockBehavior};

/// Characters that already end a sentence for the synthesizer
const SENTENCE_END: &[char] = &['.', '!', '?', '…', ';', ':'];

/// Common trait for speech synthesizers
///
/// Implementations render one line of text to the audio file named in the request.
#[async_trait]
pub trait SpeechBackend: Send + Sync + Debug {
    /// Render `request.text` into `request.output_path`
    async fn synthesize(&self, request: &SpeechRequest) -> Result<(), SpeechError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// One synthesis call
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Cleaned text to speak
    pub text: String,
    pub voice: String,
    pub language: String,
    pub output_path: PathBuf,
    pub settings: TtsSettings,
}

/// Case-insensitive character → voice mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceMap {
    voices: HashMap<String, String>,
}

impl VoiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the voice for `character`
    pub fn insert(&mut self, character: &str, voice: &str) {
        self.voices.insert(character.to_lowercase(), voice.to_string());
    }

    /// Voice for `character`, ignoring case
    pub fn voice_for(&self, character: &str) -> Option<&str> {
        self.voices.get(&character.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for VoiceMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = VoiceMap::new();
        for (character, voice) in iter {
            map.insert(character.as_ref(), voice.as_ref());
        }
        map
    }
}

/// A dialogue line scheduled for synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechJob {
    pub act: usize,
    pub scene: usize,
    pub line: usize,
    pub character: String,
    pub voice: String,
    /// Dialogue text as parsed
    pub text: String,
    pub output_path: PathBuf,
}

impl SpeechJob {
    /// Build the synthesis request for this job
    pub fn to_request(&self, language: &str, settings: &TtsSettings) -> SpeechRequest {
        SpeechRequest {
            text: clean_text_for_tts(&self.text),
            voice: self.voice.clone(),
            language: language.to_string(),
            output_path: self.output_path.clone(),
            settings: settings.clone(),
        }
    }
}

/// A dialogue line skipped because its character has no voice
#[derive(Debug, Clone, PartialEq)]
pub struct UnmappedLine {
    pub act: usize,
    pub scene: usize,
    pub line: usize,
    pub character: String,
}

/// Lines to synthesize and lines skipped, both in performance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechPlan {
    pub jobs: Vec<SpeechJob>,
    pub unmapped: Vec<UnmappedLine>,
}

impl SpeechPlan {
    /// Distinct character names without a voice, as written in the first cue
    pub fn unmapped_characters(&self) -> Vec<String> {
        let mut keys = HashSet::new();
        self.unmapped
            .iter()
            .filter(|line| keys.insert(line.character.to_lowercase()))
            .map(|line| line.character.clone())
            .collect()
    }
}

/// Make text end like a sentence so the synthesizer closes it cleanly
pub fn clean_text_for_tts(text: &str) -> String {
    let mut text = text.trim().to_string();
    if let Some(last) = text.chars().last() {
        if !SENTENCE_END.contains(&last) {
            text.push('.');
        }
    }
    text
}

/// Plan synthesis of every dialogue in `drama` into `output_dir`
///
/// Lines whose character has no voice are skipped with a warning.
pub fn plan_speech<P: AsRef<Path>>(drama: &Drama, voices: &VoiceMap, output_dir: P) -> SpeechPlan {
    let output_dir = output_dir.as_ref();
    let total = drama.dialogue_count();
    let mut plan = SpeechPlan::default();

    for (index, numbered) in drama.numbered_dialogues().enumerate() {
        let character = &numbered.dialogue.character;
        match voices.voice_for(character) {
            Some(voice) => plan.jobs.push(SpeechJob {
                act: numbered.act,
                scene: numbered.scene,
                line: numbered.line,
                character: character.clone(),
                voice: voice.to_string(),
                text: numbered.dialogue.text.clone(),
                output_path: FileManager::dialogue_audio_path(
                    output_dir,
                    numbered.act,
                    numbered.scene,
                    numbered.line,
                    character,
                ),
            }),
            None => {
                warn!(
                    "[{}/{}] No voice mapping for '{}', skipping",
                    index + 1,
                    total,
                    character
                );
                plan.unmapped.push(UnmappedLine {
                    act: numbered.act,
                    scene: numbered.scene,
                    line: numbered.line,
                    character: character.clone(),
                });
            }
        }
    }

    plan
}
