/*!
 * Tests for error types
 */

use std::error::Error;
use std::path::PathBuf;
use rehearsal::errors::{AppError, DramaError, SpeechError};

/// Test that the drama error names the file and keeps its source
#[test]
fn test_drama_error_shouldIncludePathAndSource() {
    let error = DramaError::Io {
        path: PathBuf::from("play.txt"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };

    assert!(error.to_string().contains("play.txt"));
    assert!(error.source().is_some());
}

/// Test the speech error messages
#[test]
fn test_speech_error_display_shouldDescribeFailure() {
    assert_eq!(SpeechError::Timeout(30).to_string(), "Speech program timed out after 30 seconds");

    let error = SpeechError::CommandFailed {
        status: "exit status: 2".to_string(),
        stderr: "unknown speaker".to_string(),
    };
    assert!(error.to_string().contains("unknown speaker"));
}

/// Test conversions into the application error
#[test]
fn test_app_error_from_shouldWrapOtherErrors() {
    let app_error: AppError = SpeechError::MissingOutput(PathBuf::from("x.wav")).into();
    assert!(matches!(app_error, AppError::Speech(_)));

    let app_error: AppError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert!(matches!(app_error, AppError::File(_)));

    let app_error: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app_error.to_string(), "Unknown error: boom");
}
