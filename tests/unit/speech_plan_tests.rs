/*!
 * Tests for speech planning and the speech program backend
 */

use std::path::Path;
use anyhow::Result;
use rehearsal::app_config::{SpeechCommandConfig, TtsSettings};
use rehearsal::drama::Drama;
use rehearsal::errors::SpeechError;
use rehearsal::speech::{clean_text_for_tts, plan_speech, CommandBackend, SpeechBackend, SpeechRequest, VoiceMap};
use crate::common;

fn sample_voices() -> VoiceMap {
    [("MARTHE", "Henriette Usha"), ("paul", "Craig Gutsy")].into_iter().collect()
}

/// Test that every mapped line gets a job at its numbered path
#[test]
fn test_plan_speech_withAllVoices_shouldPlanEveryLine() {
    let drama = Drama::from_text(common::SAMPLE_DRAMA);

    let plan = plan_speech(&drama, &sample_voices(), "tts-output");

    let paths: Vec<&Path> = plan.jobs.iter().map(|job| job.output_path.as_path()).collect();
    assert_eq!(
        paths,
        vec![
            Path::new("tts-output/act1/scene1/001_Marthe.wav"),
            Path::new("tts-output/act1/scene1/002_PAUL.wav"),
            Path::new("tts-output/act1/scene2/001_marthe.wav"),
            Path::new("tts-output/act2/scene1/001_Paul.wav"),
        ]
    );
    assert!(plan.unmapped.is_empty());
    assert_eq!(plan.jobs[1].voice, "Craig Gutsy");
    assert_eq!(plan.jobs[1].text, "Bonjour Marthe!\nTu es en retard.");
}

/// Test that an empty voice map skips every line
#[test]
fn test_plan_speech_withNoVoices_shouldSkipEverything() {
    let drama = Drama::from_text(common::SAMPLE_DRAMA);

    let plan = plan_speech(&drama, &VoiceMap::new(), "out");

    assert!(plan.jobs.is_empty());
    assert_eq!(plan.unmapped.len(), 4);
    assert_eq!(plan.unmapped_characters(), vec!["Marthe", "PAUL"]);
}

/// Test that later entries replace earlier ones regardless of case
#[test]
fn test_voice_map_insert_withSameNameDifferentCase_shouldReplace() {
    let mut voices = VoiceMap::new();
    voices.insert("Paul", "first");
    voices.insert("PAUL", "second");

    assert_eq!(voices.len(), 1);
    assert_eq!(voices.voice_for("paul"), Some("second"));
}

/// Test the sentence ending added to spoken text
#[test]
fn test_clean_text_for_tts_shouldEndWithPunctuation() {
    assert_eq!(clean_text_for_tts("Rideau"), "Rideau.");
    assert_eq!(clean_text_for_tts("Rideau !"), "Rideau !");
    assert_eq!(clean_text_for_tts("Je sais;"), "Je sais;");
}

fn shell_backend(script: &str, timeout_secs: u64) -> CommandBackend {
    CommandBackend::new(&SpeechCommandConfig {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string(), "sh".to_string(), "{output}".to_string()],
        pass_settings: false,
        timeout_secs,
    })
}

fn request_for(output: &Path) -> SpeechRequest {
    SpeechRequest {
        text: "Bonjour.".to_string(),
        voice: "Ana Florence".to_string(),
        language: "fr".to_string(),
        output_path: output.to_path_buf(),
        settings: TtsSettings::default(),
    }
}

/// Test a program that writes the requested file
#[cfg(unix)]
#[test]
fn test_command_backend_withWritingProgram_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("001_A.wav");
    let backend = shell_backend("printf audio > \"$1\"", 10);

    tokio_test::block_on(backend.synthesize(&request_for(&output)))?;

    assert_eq!(std::fs::read_to_string(&output)?, "audio");
    assert_eq!(backend.name(), "sh");
    Ok(())
}

/// Test a program that exits with an error
#[cfg(unix)]
#[test]
fn test_command_backend_withFailingProgram_shouldReportStderr() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("001_A.wav");
    let backend = shell_backend("echo 'unknown speaker' >&2; exit 3", 10);

    let result = tokio_test::block_on(backend.synthesize(&request_for(&output)));

    match result {
        Err(SpeechError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "unknown speaker"),
        other => panic!("Expected CommandFailed, got {:?}", other),
    }
    Ok(())
}

/// Test a program that succeeds without writing the file
#[cfg(unix)]
#[test]
fn test_command_backend_withoutOutputFile_shouldReportMissingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("001_A.wav");
    let backend = shell_backend("true", 10);

    let result = tokio_test::block_on(backend.synthesize(&request_for(&output)));

    assert!(matches!(result, Err(SpeechError::MissingOutput(_))));
    Ok(())
}

/// Test that a missing program is reported as a spawn failure
#[test]
fn test_command_backend_withMissingProgram_shouldReportSpawn() {
    let backend = CommandBackend::new(&SpeechCommandConfig {
        program: "definitely-not-a-speech-program".to_string(),
        ..Default::default()
    });

    let result = tokio_test::block_on(backend.synthesize(&request_for(Path::new("x.wav"))));

    assert!(matches!(result, Err(SpeechError::Spawn { .. })));
}
