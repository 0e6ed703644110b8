/*!
 * Speech backend that runs an external text-to-speech program per line.
 *
 * The program and its arguments come from the configuration. Placeholders
 * in the arguments are substituted for every line:
 * `{text}`, `{voice}`, `{language}`, `{output}` and the profile settings
 * `{temperature}`, `{repetition_penalty}`, `{top_k}`, `{top_p}`.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tokio::process::Command;

use crate::app_config::SpeechCommandConfig;
use crate::errors::SpeechError;

use super::{SpeechBackend, SpeechRequest};

// @const: Argument placeholder, e.g. "{voice}"
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([a-z_]+)\}").expect("Invalid placeholder regex")
});

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 10;

/// Runs a configured program for each synthesis request
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    pass_settings: bool,
    timeout: Duration,
}

impl CommandBackend {
    pub fn new(config: &SpeechCommandConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            pass_settings: config.pass_settings,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Arguments for one request, placeholders substituted
    pub fn build_args(&self, request: &SpeechRequest) -> Vec<String> {
        let settings = request.settings.entries();
        let output = request.output_path.to_string_lossy();

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                PLACEHOLDER_REGEX
                    .replace_all(arg, |caps: &Captures| {
                        let name = &caps[1];
                        match name {
                            "text" => request.text.clone(),
                            "voice" => request.voice.clone(),
                            "language" => request.language.clone(),
                            "output" => output.to_string(),
                            _ => settings
                                .iter()
                                .find(|(setting, _)| *setting == name)
                                .map(|(_, value)| value.clone())
                                .unwrap_or_else(|| caps[0].to_string()),
                        }
                    })
                    .into_owned()
            })
            .collect();

        if self.pass_settings {
            for (setting, value) in settings {
                args.push(format!("--{}", setting));
                args.push(value);
            }
        }

        args
    }

    /// Keep the last meaningful lines of the program's stderr
    fn filter_stderr(stderr: &str) -> String {
        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();

        if meaningful.is_empty() {
            "stderr was empty".to_string()
        } else {
            let start = meaningful.len().saturating_sub(STDERR_TAIL_LINES);
            meaningful[start..].join("\n")
        }
    }
}

#[async_trait]
impl SpeechBackend for CommandBackend {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<(), SpeechError> {
        let args = self.build_args(request);
        debug!("Running {} for {:?}", self.program, request.output_path);

        let output_future = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = output_future => {
                result.map_err(|e| SpeechError::Spawn {
                    program: self.program.clone(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(SpeechError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::CommandFailed {
                status: output.status.to_string(),
                stderr: Self::filter_stderr(&stderr),
            });
        }

        if !request.output_path.is_file() {
            return Err(SpeechError::MissingOutput(request.output_path.clone()));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
