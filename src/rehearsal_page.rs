/*!
 * Rehearsal page generation.
 *
 * Projects a parsed [`Drama`] into a single static HTML page. The drama is
 * embedded as JSON, each dialogue carrying the relative path of its audio
 * file so the page can play the other characters' lines.
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;

use crate::drama::Drama;
use crate::file_utils::FileManager;

// @const: Page template with `__DRAMA_DATA__` and `__LANG__` placeholders
const PAGE_TEMPLATE: &str = include_str!("templates/rehearsal.html");

const DATA_PLACEHOLDER: &str = "__DRAMA_DATA__";
const LANG_PLACEHOLDER: &str = "__LANG__";

/// Drama as embedded in the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DramaData {
    pub title: String,

    /// Lowercased character names, sorted
    pub characters: Vec<String>,

    pub acts: Vec<ActData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActData {
    pub scenes: Vec<SceneData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneData {
    pub dialogues: Vec<DialogueData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueData {
    pub character: String,
    pub text: String,

    /// Audio path relative to the page, always `/`-separated
    pub audio: String,
}

impl DramaData {
    /// Total number of dialogues
    pub fn dialogue_count(&self) -> usize {
        self.dialogues().count()
    }

    // @returns: Every dialogue in performance order
    pub fn dialogues(&self) -> impl Iterator<Item = &DialogueData> {
        self.acts
            .iter()
            .flat_map(|act| &act.scenes)
            .flat_map(|scene| &scene.dialogues)
    }
}

/// Audio path of a dialogue as seen from the page
pub fn audio_url(tts_dir: &str, act: usize, scene: usize, line: usize, character: &str) -> String {
    format!(
        "{}/act{}/scene{}/{}",
        tts_dir.trim_end_matches('/'),
        act,
        scene,
        FileManager::dialogue_audio_filename(line, character)
    )
}

/// Convert a drama into the page data, attaching audio paths under `tts_dir`
pub fn generate_drama_data(drama: &Drama, tts_dir: &str) -> DramaData {
    let acts = drama
        .acts
        .iter()
        .enumerate()
        .map(|(act_idx, act)| ActData {
            scenes: act
                .scenes
                .iter()
                .enumerate()
                .map(|(scene_idx, scene)| SceneData {
                    dialogues: scene
                        .dialogues
                        .iter()
                        .enumerate()
                        .map(|(line_idx, dialogue)| DialogueData {
                            character: dialogue.character.clone(),
                            text: dialogue.text.clone(),
                            audio: audio_url(
                                tts_dir,
                                act_idx + 1,
                                scene_idx + 1,
                                line_idx + 1,
                                &dialogue.character,
                            ),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    DramaData {
        title: drama.title.clone(),
        characters: drama.characters(),
        acts,
    }
}

/// Render the page HTML for `data`
///
/// `</` is escaped in the embedded JSON so dialogue text cannot close the script element.
pub fn render_page(data: &DramaData, language: &str) -> Result<String> {
    let json = serde_json::to_string(data).context("Failed to serialize drama data")?;
    let json = json.replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace(LANG_PLACEHOLDER, language)
        .replace(DATA_PLACEHOLDER, &json))
}

/// Write the rendered page, creating parent directories as needed
pub fn write_page<P: AsRef<Path>>(path: P, html: &str) -> Result<()> {
    FileManager::write_to_file(path.as_ref(), html)?;
    debug!("Wrote rehearsal page to {:?} ({} bytes)", path.as_ref(), html.len());
    Ok(())
}

/// Which referenced audio files exist on disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioCoverage {
    pub present: usize,

    /// Referenced paths with no file on disk
    pub missing: Vec<String>,
}

/// Check the audio files referenced by `data` against the disk.
///
/// `page_dir` is the directory holding the page; audio paths are resolved from it.
pub fn audio_coverage<P: AsRef<Path>>(data: &DramaData, page_dir: P, tts_dir: &str) -> Result<AudioCoverage> {
    let page_dir = page_dir.as_ref();
    let audio_root = page_dir.join(tts_dir);

    let existing: HashSet<PathBuf> = if FileManager::dir_exists(&audio_root) {
        FileManager::find_files(&audio_root, "wav")?.into_iter().collect()
    } else {
        HashSet::new()
    };

    let mut coverage = AudioCoverage::default();
    for dialogue in data.dialogues() {
        if existing.contains(&page_dir.join(&dialogue.audio)) {
            coverage.present += 1;
        } else {
            coverage.missing.push(dialogue.audio.clone());
        }
    }

    Ok(coverage)
}
