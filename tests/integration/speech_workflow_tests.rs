/*!
 * End-to-end tests from a script file to audio files, using the mock backend
 */

use anyhow::Result;
use rehearsal::app_config::{Config, TtsSettings};
use rehearsal::drama::Drama;
use rehearsal::file_utils::FileManager;
use rehearsal::speech::mock::MOCK_AUDIO;
use rehearsal::speech::{plan_speech, MockBackend, MockBehavior, SpeechGenerator, SpeechOptions, VoiceMap};
use crate::common;

fn sample_voices() -> VoiceMap {
    [("marthe", "Henriette Usha"), ("paul", "Craig Gutsy")].into_iter().collect()
}

/// Test that every mapped line is written under the act and scene layout
#[test]
fn test_speech_workflow_withWorkingBackend_shouldWriteEveryFile() -> Result<()> {
    common::init_test_logger();
    let temp_dir = common::create_temp_dir()?;
    let drama_path = common::create_test_drama(&temp_dir.path().to_path_buf(), "drama.txt")?;
    let output_dir = temp_dir.path().join("tts-output");

    let drama = Drama::from_file(&drama_path)?;
    let plan = plan_speech(&drama, &sample_voices(), &output_dir);
    let generator = SpeechGenerator::new(MockBackend::working(), SpeechOptions::default());

    let report = tokio_test::block_on(generator.run(&plan))?;

    assert!(report.is_success());
    assert_eq!(report.generated, 4);
    assert_eq!(FileManager::find_files(&output_dir, "wav")?.len(), 4);
    assert_eq!(std::fs::read(output_dir.join("act2/scene1/001_Paul.wav"))?, MOCK_AUDIO);
    Ok(())
}

/// Test that the backend receives cleaned text, the voice and the profile settings
#[test]
fn test_speech_workflow_shouldPassProfileToBackend() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let drama = Drama::from_text("T\n<Paul> Bonjour");

    let mut config = Config::default();
    config.speech.profile = "stable".to_string();
    let options = SpeechOptions::from_config(&config.speech)?;

    let plan = plan_speech(&drama, &sample_voices(), temp_dir.path());
    let generator = SpeechGenerator::new(MockBackend::working(), options);
    tokio_test::block_on(generator.run(&plan))?;

    let requests = generator.backend().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "Bonjour.");
    assert_eq!(requests[0].voice, "Craig Gutsy");
    assert_eq!(requests[0].language, "fr");
    assert_eq!(requests[0].settings.repetition_penalty, Some(10.0));
    Ok(())
}

/// Test that existing files are kept unless skipping is disabled
#[test]
fn test_speech_workflow_withExistingFiles_shouldSkipThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let drama = Drama::from_text(common::SAMPLE_DRAMA);
    let plan = plan_speech(&drama, &sample_voices(), temp_dir.path());

    let first = SpeechGenerator::new(MockBackend::working(), SpeechOptions::default());
    tokio_test::block_on(first.run(&plan))?;

    let second = SpeechGenerator::new(MockBackend::working(), SpeechOptions::default());
    let report = tokio_test::block_on(second.run(&plan))?;
    assert_eq!(report.generated, 0);
    assert_eq!(report.skipped_existing, 4);
    assert_eq!(second.backend().request_count(), 0);

    let forced = SpeechGenerator::new(
        MockBackend::working(),
        SpeechOptions { skip_existing: false, ..Default::default() },
    );
    let report = tokio_test::block_on(forced.run(&plan))?;
    assert_eq!(report.generated, 4);
    assert_eq!(forced.backend().request_count(), 4);
    Ok(())
}

/// Test that failing lines are reported without stopping the run
#[test]
fn test_speech_workflow_withIntermittentBackend_shouldReportFailures() -> Result<()> {
    common::init_test_logger();
    let temp_dir = common::create_temp_dir()?;
    let drama = Drama::from_text(common::SAMPLE_DRAMA);
    let plan = plan_speech(&drama, &sample_voices(), temp_dir.path());
    let generator = SpeechGenerator::new(MockBackend::intermittent(2), SpeechOptions::default());

    let report = tokio_test::block_on(generator.run(&plan))?;

    assert!(!report.is_success());
    assert_eq!(report.generated, 2);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].output_path, plan.jobs[1].output_path);
    assert!(report.failed[0].error.contains("mock failure"));
    Ok(())
}

/// Test that unmapped characters are counted but never synthesized
#[test]
fn test_speech_workflow_withPartialVoices_shouldCountUnmapped() -> Result<()> {
    common::init_test_logger();
    let temp_dir = common::create_temp_dir()?;
    let drama = Drama::from_text(common::SAMPLE_DRAMA);
    let voices: VoiceMap = [("Paul", "Craig Gutsy")].into_iter().collect();
    let plan = plan_speech(&drama, &voices, temp_dir.path());
    let generator = SpeechGenerator::new(MockBackend::working(), SpeechOptions::default());

    let report = tokio_test::block_on(generator.run(&plan))?;

    assert_eq!(report.generated, 2);
    assert_eq!(report.skipped_unmapped, 2);
    assert!(!FileManager::file_exists(temp_dir.path().join("act1/scene1/001_Marthe.wav")));
    Ok(())
}

/// Test that concurrent synthesis still reports every line
#[test]
fn test_speech_workflow_withConcurrency_shouldProcessAllLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = (1..=20)
        .map(|i| format!("<Paul> Ligne {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let drama = Drama::from_text(&format!("T\n{}", script));
    let plan = plan_speech(&drama, &sample_voices(), temp_dir.path());
    let options = SpeechOptions {
        concurrent_requests: 4,
        settings: TtsSettings::default(),
        ..Default::default()
    };
    let generator = SpeechGenerator::new(MockBackend::working(), options);

    let report = tokio_test::block_on(generator.run(&plan))?;

    assert_eq!(report.generated, 20);
    assert_eq!(generator.backend().request_count(), 20);
    assert!(FileManager::file_exists(temp_dir.path().join("act1/scene1/020_Paul.wav")));
    Ok(())
}

/// Test that the generator trusts the backend result without checking the file
#[test]
fn test_speech_workflow_withNoOutputBackend_shouldCountAsGenerated() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let drama = Drama::from_text("T\n<Paul> Bonjour");
    let plan = plan_speech(&drama, &sample_voices(), temp_dir.path());
    let generator = SpeechGenerator::new(MockBackend::new(MockBehavior::NoOutput), SpeechOptions::default());

    let report = tokio_test::block_on(generator.run(&plan))?;

    assert_eq!(report.generated, 1);
    assert!(!FileManager::file_exists(&plan.jobs[0].output_path));
    Ok(())
}
