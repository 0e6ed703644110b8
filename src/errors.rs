/*!
 * Error types for the rehearsal application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a drama script.
///
/// Parsing itself never fails: every line sequence yields a valid drama.
/// Only reading the script from disk can go wrong.
#[derive(Error, Debug)]
pub enum DramaError {
    /// The script file could not be opened or read
    #[error("Failed to read drama file {path:?}: {source}")]
    Io {
        /// Path of the script file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while synthesizing speech for one dialogue line
#[derive(Error, Debug)]
pub enum SpeechError {
    /// The synthesis program could not be started
    #[error("Failed to start speech program '{program}': {message}")]
    Spawn {
        /// Program name
        program: String,
        /// Error message from the OS
        message: String,
    },

    /// The synthesis program exited with a non-zero status
    #[error("Speech program exited with {status}: {stderr}")]
    CommandFailed {
        /// Exit status description
        status: String,
        /// Filtered stderr of the program
        stderr: String,
    },

    /// The synthesis program did not finish in time
    #[error("Speech program timed out after {0} seconds")]
    Timeout(u64),

    /// The program reported success but no audio file was written
    #[error("No audio written to {0:?}")]
    MissingOutput(PathBuf),

    /// Error preparing the output location
    #[error("Speech I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error loading the drama script
    #[error("Drama error: {0}")]
    Drama(#[from] DramaError),

    /// Error from speech synthesis
    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
