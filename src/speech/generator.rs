/*!
 * Runs a speech plan against a backend.
 *
 * Scene directories are created up front, existing files can be kept, and
 * lines are synthesized with bounded concurrency while a progress bar
 * tracks the run. A failing line never aborts the run; it is reported.
 */

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};

use crate::app_config::{SpeechConfig, TtsSettings};
use crate::file_utils::FileManager;
use crate::language_utils;

use super::{SpeechBackend, SpeechJob, SpeechPlan};

/// Characters of dialogue text shown in progress logs
const PREVIEW_CHARS: usize = 50;

/// Options for a speech run
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    /// Language passed to the backend (ISO 639-1 when one exists)
    pub language: String,
    pub settings: TtsSettings,
    pub concurrent_requests: usize,
    pub skip_existing: bool,
}

impl SpeechOptions {
    /// Options for the active profile of `config`
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        let profile = config
            .active_profile()
            .ok_or_else(|| anyhow!("Unknown speech profile '{}'", config.profile))?;

        Ok(Self {
            language: language_utils::normalize_to_part1_or_part2t(&config.language)?,
            settings: profile.settings.clone(),
            concurrent_requests: config.concurrent_requests.max(1),
            skip_existing: config.skip_existing,
        })
    }
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "fr".to_string(),
            settings: TtsSettings::default(),
            concurrent_requests: 1,
            skip_existing: true,
        }
    }
}

/// A line whose synthesis failed
#[derive(Debug, Clone, PartialEq)]
pub struct FailedLine {
    pub output_path: PathBuf,
    pub error: String,
}

/// Outcome of a speech run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechReport {
    pub generated: usize,
    pub skipped_existing: usize,
    pub skipped_unmapped: usize,
    pub failed: Vec<FailedLine>,
}

impl SpeechReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

enum JobOutcome {
    Generated,
    Existing,
    Failed(String),
}

/// Synthesizes the lines of a plan through a backend
pub struct SpeechGenerator<B: SpeechBackend> {
    backend: B,
    options: SpeechOptions,
}

impl<B: SpeechBackend> SpeechGenerator<B> {
    pub fn new(backend: B, options: SpeechOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Synthesize every job of `plan`
    ///
    /// Fails only when an output directory cannot be created.
    pub async fn run(&self, plan: &SpeechPlan) -> Result<SpeechReport> {
        let start_time = Instant::now();

        let scene_dirs: BTreeSet<PathBuf> = plan
            .jobs
            .iter()
            .filter_map(|job| job.output_path.parent().map(PathBuf::from))
            .collect();
        for dir in &scene_dirs {
            FileManager::ensure_dir(dir)?;
        }

        let total = plan.jobs.len();
        let progress_bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style);

        info!(
            "Synthesizing {} line(s) with {} ({} at a time)",
            total,
            self.backend.name(),
            self.options.concurrent_requests
        );

        let backend = &self.backend;
        let options = &self.options;
        let progress = &progress_bar;

        let mut outcomes = stream::iter(plan.jobs.iter().enumerate())
            .map(move |(index, job)| async move {
                let outcome = Self::run_job(backend, options, job, index + 1, total).await;
                progress.inc(1);
                progress.set_message(job.character.clone());
                (index, job, outcome)
            })
            .buffer_unordered(self.options.concurrent_requests.max(1))
            .collect::<Vec<_>>()
            .await;

        progress_bar.finish_and_clear();
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut report = SpeechReport {
            skipped_unmapped: plan.unmapped.len(),
            ..Default::default()
        };
        for (_, job, outcome) in outcomes {
            match outcome {
                JobOutcome::Generated => report.generated += 1,
                JobOutcome::Existing => report.skipped_existing += 1,
                JobOutcome::Failed(error) => report.failed.push(FailedLine {
                    output_path: job.output_path.clone(),
                    error,
                }),
            }
        }

        info!(
            "Speech done in {:.1}s: {} generated, {} kept, {} without voice, {} failed",
            start_time.elapsed().as_secs_f32(),
            report.generated,
            report.skipped_existing,
            report.skipped_unmapped,
            report.failed.len()
        );

        Ok(report)
    }

    async fn run_job(
        backend: &B,
        options: &SpeechOptions,
        job: &SpeechJob,
        position: usize,
        total: usize,
    ) -> JobOutcome {
        if options.skip_existing && FileManager::file_exists(&job.output_path) {
            debug!("[{}/{}] Keeping existing {:?}", position, total, job.output_path);
            return JobOutcome::Existing;
        }

        info!(
            "[{}/{}] Act {}, Scene {}: {} -> {}",
            position, total, job.act, job.scene, job.character, job.voice
        );
        debug!("    Text: {}", preview(&job.text));

        let request = job.to_request(&options.language, &options.settings);
        match backend.synthesize(&request).await {
            Ok(()) => JobOutcome::Generated,
            Err(e) => {
                error!("[{}/{}] Failed to synthesize {:?}: {}", position, total, job.output_path, e);
                JobOutcome::Failed(e.to_string())
            }
        }
    }
}

// @returns: First characters of text, with an ellipsis when cut
fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
