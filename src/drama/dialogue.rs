/*!
 * Character cue recognition and dialogue accumulation for one scene.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::Dialogue;

// @const: Character cue at column 0, e.g. "<Alice> Hello."
static CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([^>]+)>").expect("Invalid cue regex")
});

/// Split a cue line into the character name and the text after the cue.
///
/// Returns `None` when the line does not start with a `<NAME>` cue. The
/// returned name is verbatim; the remainder is not trimmed.
pub fn parse_cue(line: &str) -> Option<(&str, &str)> {
    let caps = CUE_REGEX.captures(line)?;
    let name = caps.get(1)?.as_str();
    let end = caps.get(0)?.end();
    Some((name, &line[end..]))
}

/// Group the lines of a scene into dialogues.
///
/// Each cue line starts a new dialogue whose text is the trimmed remainder of
/// the cue line, followed by every following non-cue line verbatim, joined
/// with newlines. Lines before the first cue have no speaker and are dropped.
pub fn extract_dialogues<S: AsRef<str>>(lines: &[S]) -> Vec<Dialogue> {
    let mut dialogues = Vec::new();
    let mut current_character: Option<String> = None;
    let mut current_lines: Vec<String> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        match parse_cue(line) {
            Some((name, rest)) => {
                if let Some(character) = current_character.take() {
                    dialogues.push(Dialogue::new(character, current_lines.join("\n")));
                }
                current_character = Some(name.to_string());
                current_lines = vec![rest.trim().to_string()];
            }
            None => {
                if current_character.is_some() {
                    current_lines.push(line.to_string());
                }
            }
        }
    }

    if let Some(character) = current_character {
        dialogues.push(Dialogue::new(character, current_lines.join("\n")));
    }

    dialogues
}
