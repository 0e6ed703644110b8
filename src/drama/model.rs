/*!
 * Drama data model: Drama → Act → Scene → Dialogue.
 *
 * All levels are plain owned data built once by [`parse`] and then only read.
 * Act, scene and line numbers are positional and 1-based for display.
 */

use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::DramaError;

use super::blocks::split_into_blocks;
use super::dialogue::extract_dialogues;
use super::{ACT_KEYWORD, SCENE_KEYWORD};

/// One block of text spoken by a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    /// Character name as written in the cue (original casing)
    pub character: String,

    /// Spoken text, lines joined with `\n`
    pub text: String,
}

impl Dialogue {
    pub fn new(character: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            text: text.into(),
        }
    }

    /// Lowercased character name, used for case-insensitive matching
    pub fn character_key(&self) -> String {
        self.character.to_lowercase()
    }
}

/// A scene: dialogues in performance order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub dialogues: Vec<Dialogue>,
}

impl Scene {
    /// Build a scene from the lines between two scene markers
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            dialogues: extract_dialogues(lines),
        }
    }
}

/// An act: scenes in order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Act {
    pub scenes: Vec<Scene>,
}

impl Act {
    /// Build an act from the lines between two act markers
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            scenes: split_into_blocks(lines, SCENE_KEYWORD)
                .iter()
                .map(|block| Scene::from_lines(block))
                .collect(),
        }
    }
}

/// A complete play
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Drama {
    /// First line of the script, verbatim
    pub title: String,

    pub acts: Vec<Act>,
}

/// A dialogue together with its 1-based position in the play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberedDialogue<'a> {
    pub act: usize,
    pub scene: usize,
    pub line: usize,
    pub dialogue: &'a Dialogue,
}

impl Drama {
    /// Build a drama from script lines. The first line is the title.
    ///
    /// The title line is taken as-is even when it looks like a marker.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let title = lines
            .first()
            .map(|line| line.as_ref().to_string())
            .unwrap_or_default();
        let remaining = lines.get(1..).unwrap_or(&[]);

        let acts = split_into_blocks(remaining, ACT_KEYWORD)
            .iter()
            .map(|block| Act::from_lines(block))
            .collect();

        Self { title, acts }
    }

    /// Parse script text held in memory
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(&lines_from_text(text))
    }

    /// Read and parse a script file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DramaError> {
        let lines = read_lines(path)?;
        Ok(Self::from_lines(&lines))
    }

    /// Iterate over every dialogue in performance order with its position
    pub fn numbered_dialogues(&self) -> impl Iterator<Item = NumberedDialogue<'_>> + '_ {
        self.acts.iter().enumerate().flat_map(|(act_idx, act)| {
            act.scenes.iter().enumerate().flat_map(move |(scene_idx, scene)| {
                scene.dialogues.iter().enumerate().map(move |(line_idx, dialogue)| {
                    NumberedDialogue {
                        act: act_idx + 1,
                        scene: scene_idx + 1,
                        line: line_idx + 1,
                        dialogue,
                    }
                })
            })
        })
    }

    /// Total number of dialogues across all acts and scenes
    pub fn dialogue_count(&self) -> usize {
        self.acts
            .iter()
            .flat_map(|act| &act.scenes)
            .map(|scene| scene.dialogues.len())
            .sum()
    }

    /// Lowercased character names, sorted and de-duplicated
    pub fn characters(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numbered_dialogues()
            .map(|numbered| numbered.dialogue.character_key())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl fmt::Display for Drama {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (act_idx, act) in self.acts.iter().enumerate() {
            writeln!(f, "Act {}:", act_idx + 1)?;
            for (scene_idx, scene) in act.scenes.iter().enumerate() {
                writeln!(f, "  Scene {}:", scene_idx + 1)?;
                for dialogue in &scene.dialogues {
                    writeln!(f, "    {}: {}", dialogue.character, dialogue.text)?;
                }
            }
        }
        Ok(())
    }
}

/// Parse script lines into a [`Drama`]
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Drama {
    let drama = Drama::from_lines(lines);
    debug!(
        "Parsed drama '{}': {} act(s), {} dialogue(s)",
        drama.title,
        drama.acts.len(),
        drama.dialogue_count()
    );
    drama
}

/// Split text into lines with trailing whitespace removed
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
pub fn lines_from_text(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// Read a script file into lines with trailing whitespace removed
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, DramaError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| DramaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(lines_from_text(&content))
}
