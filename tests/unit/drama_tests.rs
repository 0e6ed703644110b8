/*!
 * Tests for drama script parsing
 */

use anyhow::Result;
use rehearsal::drama::{self, Dialogue, Drama};
use rehearsal::errors::DramaError;
use crate::common;

/// Test the act, scene and dialogue structure of a complete script file
#[test]
fn test_from_file_withSampleDrama_shouldBuildHierarchy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_drama(&temp_dir.path().to_path_buf(), "drama.txt")?;

    let drama = Drama::from_file(&path)?;

    assert_eq!(drama.title, "La Répétition");
    assert_eq!(drama.acts.len(), 2);
    assert_eq!(drama.acts[0].scenes.len(), 2);
    assert_eq!(drama.acts[1].scenes.len(), 1);
    assert_eq!(
        drama.acts[0].scenes[0].dialogues,
        vec![
            Dialogue::new("Marthe", "Bonjour Paul."),
            Dialogue::new("PAUL", "Bonjour Marthe!\nTu es en retard."),
        ]
    );
    assert_eq!(drama.acts[1].scenes[0].dialogues, vec![Dialogue::new("Paul", "Rideau.")]);

    Ok(())
}

/// Test that a missing script is reported with its path
#[test]
fn test_from_file_withMissingFile_shouldReturnIoError() {
    let result = Drama::from_file("definitely_missing_drama.txt");

    match result {
        Err(DramaError::Io { path, .. }) => {
            assert_eq!(path.to_string_lossy(), "definitely_missing_drama.txt");
        }
        other => panic!("Expected DramaError::Io, got {:?}", other),
    }
}

/// Test that lines before the first act marker form the first act
#[test]
fn test_parse_withoutMarkers_shouldYieldSingleActAndScene() {
    let drama = drama::parse(&["Title", "<Alice> Hello.", "World."]);

    assert_eq!(drama.acts.len(), 1);
    assert_eq!(drama.acts[0].scenes.len(), 1);
    assert_eq!(drama.acts[0].scenes[0].dialogues[0].text, "Hello.\nWorld.");
}

/// Test that the blank lines of a dialogue are kept in its text
#[test]
fn test_parse_withBlankLinesInDialogue_shouldKeepThem() {
    let drama = drama::parse(&["T", "<A> first", "", "second"]);

    assert_eq!(drama.acts[0].scenes[0].dialogues[0].text, "first\n\nsecond");
}

/// Test that a scene holding only stage notes is kept with no dialogue
#[test]
fn test_parse_withSceneWithoutCues_shouldKeepEmptyScene() {
    let drama = drama::parse(&["T", "*scene*", "stage notes only", "*scene*", "<A> hi"]);

    assert_eq!(drama.acts[0].scenes.len(), 2);
    assert!(drama.acts[0].scenes[0].dialogues.is_empty());
    assert_eq!(drama.dialogue_count(), 1);
}

/// Test that marker matching ignores case and surrounding text
#[test]
fn test_parse_withDecoratedMarkers_shouldSplit() {
    let drama = Drama::from_text("T\n<A> one\n  =ACT= II  \n<B> two\n-- *Scene* 2 --\n<C> three");

    assert_eq!(drama.acts.len(), 2);
    assert_eq!(drama.acts[1].scenes.len(), 2);
}

/// Test that an empty file yields an empty drama
#[test]
fn test_from_file_withEmptyFile_shouldReturnEmptyDrama() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "empty.txt", "")?;

    let drama = Drama::from_file(&path)?;

    assert_eq!(drama, Drama::default());
    Ok(())
}

/// Test that CRLF line endings and trailing spaces are removed
#[test]
fn test_from_text_withCrlfLines_shouldStripLineEndings() {
    let drama = Drama::from_text("Title  \r\n<A> Hello   \r\nagain\r\n");

    assert_eq!(drama.title, "Title");
    assert_eq!(drama.acts[0].scenes[0].dialogues[0].text, "Hello\nagain");
}

/// Test the numbering of dialogues across acts and scenes
#[test]
fn test_numbered_dialogues_withSampleDrama_shouldRestartPerParent() {
    let drama = Drama::from_text(common::SAMPLE_DRAMA);

    let positions: Vec<(usize, usize, usize, &str)> = drama
        .numbered_dialogues()
        .map(|n| (n.act, n.scene, n.line, n.dialogue.character.as_str()))
        .collect();

    assert_eq!(
        positions,
        vec![
            (1, 1, 1, "Marthe"),
            (1, 1, 2, "PAUL"),
            (1, 2, 1, "marthe"),
            (2, 1, 1, "Paul"),
        ]
    );
}

/// Test that characters are lowercased and de-duplicated
#[test]
fn test_characters_withMixedCase_shouldMergeNames() {
    let drama = Drama::from_text(common::SAMPLE_DRAMA);

    assert_eq!(drama.characters(), vec!["marthe", "paul"]);
    assert_eq!(drama.dialogue_count(), 4);
}

/// Test that the parsed drama serializes to the nested JSON shape
#[test]
fn test_serialize_shouldNestActsScenesDialogues() -> Result<()> {
    let drama = Drama::from_text("T\n<A> hi");

    let json = serde_json::to_value(&drama)?;

    assert_eq!(json["title"], "T");
    assert_eq!(json["acts"][0]["scenes"][0]["dialogues"][0]["character"], "A");
    assert_eq!(json["acts"][0]["scenes"][0]["dialogues"][0]["text"], "hi");
    Ok(())
}
