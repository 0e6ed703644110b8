// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use rehearsal::app_config::{self, Config};
use rehearsal::drama::Drama;
use rehearsal::errors::AppError;
use rehearsal::language_utils;
use rehearsal::rehearsal_page;
use rehearsal::speech::{self, CommandBackend, SpeechGenerator, SpeechOptions, VoiceMap};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the acts, scenes and dialogues of a drama script
    Show {
        /// Drama script (defaults to drama_file from the config)
        #[arg(value_name = "DRAMA_FILE")]
        input: Option<PathBuf>,
    },

    /// Generate the rehearsal webpage
    Page(PageArgs),

    /// Synthesize one audio file per dialogue line
    Speech(SpeechArgs),

    /// Generate shell completions for rehearsal
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Drama script (defaults to drama_file from the config)
    #[arg(value_name = "DRAMA_FILE")]
    input: Option<PathBuf>,

    /// Output HTML file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Audio directory as referenced from the page
    #[arg(short, long)]
    tts_dir: Option<String>,

    /// Page language code (e.g., 'fr', 'en')
    #[arg(long)]
    language: Option<String>,
}

#[derive(Parser, Debug)]
struct SpeechArgs {
    /// Drama script (defaults to drama_file from the config)
    #[arg(value_name = "DRAMA_FILE")]
    input: Option<PathBuf>,

    /// Speech profile to use (e.g., 'default', 'stable', 'balanced')
    #[arg(short, long)]
    profile: Option<String>,

    /// Output directory (defaults to the profile's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Regenerate audio files that already exist
    #[arg(short, long)]
    force: bool,

    /// Print the planned files without synthesizing anything
    #[arg(long)]
    dry_run: bool,
}

/// Rehearsal - drama scripts to rehearsal pages and spoken lines
#[derive(Parser, Debug)]
#[command(name = "rehearsal")]
#[command(version)]
#[command(about = "Turn a drama script into a rehearsal page and spoken lines")]
#[command(long_about = "Rehearsal parses a drama script and generates rehearsal material from it.

SCRIPT FORMAT:
    First line          the title
    =act=               starts a new act
    *scene*             starts a new scene
    <NAME> text         a line spoken by NAME (continues until the next cue)

EXAMPLES:
    rehearsal show drama.txt                    # Print the parsed structure
    rehearsal page drama.txt -o index.html      # Write the rehearsal page
    rehearsal speech -p stable drama.txt        # Synthesize with the 'stable' profile
    rehearsal speech --dry-run drama.txt        # List the files that would be written
    rehearsal completions bash > rehearsal.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through log::set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "rehearsal", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    match cli.command {
        Commands::Show { input } => {
            finish_config(&config, cli.log_level.is_none())?;
            run_show(&config, input)
        }
        Commands::Page(args) => {
            if let Some(tts_dir) = &args.tts_dir {
                config.page.tts_dir = tts_dir.clone();
            }
            if let Some(language) = &args.language {
                config.page.language = language.clone();
            }
            finish_config(&config, cli.log_level.is_none())?;
            run_page(&config, args)
        }
        Commands::Speech(args) => {
            if let Some(profile) = &args.profile {
                config.speech.profile = profile.clone();
            }
            if args.force {
                config.speech.skip_existing = false;
            }
            finish_config(&config, cli.log_level.is_none())?;
            run_speech(&config, args).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

// Validate after CLI overrides, then apply the configured log level unless the CLI set one
fn finish_config(config: &Config, use_config_log_level: bool) -> Result<(), AppError> {
    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    if use_config_log_level {
        log::set_max_level(config.log_level.to_level_filter());
    }
    Ok(())
}

fn load_drama(config: &Config, input: Option<PathBuf>) -> Result<Drama, AppError> {
    let path = input.unwrap_or_else(|| PathBuf::from(&config.drama_file));
    info!("Loading drama from {:?}", path);
    let drama = Drama::from_file(&path)?;
    if drama.acts.is_empty() {
        warn!("No acts found in {:?}", path);
    }
    Ok(drama)
}

fn run_show(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let drama = load_drama(config, input)?;

    println!("{}", drama.title);
    print!("{}", drama);
    println!();
    println!("Characters: {}", drama.characters().join(", "));
    println!("Acts: {}, lines: {}", drama.acts.len(), drama.dialogue_count());
    Ok(())
}

fn run_page(config: &Config, args: PageArgs) -> Result<()> {
    let drama = load_drama(config, args.input)?;
    let output = args.output.unwrap_or_else(|| PathBuf::from(&config.page.output_html));

    info!("Generating drama data...");
    let data = rehearsal_page::generate_drama_data(&drama, &config.page.tts_dir);

    let language_name = language_utils::get_language_name(&config.page.language)?;
    info!("Generating HTML ({})...", language_name);
    let html = rehearsal_page::render_page(&data, &config.page.language)?;
    rehearsal_page::write_page(&output, &html)?;

    let page_dir = output.parent().unwrap_or(Path::new(""));
    let coverage = rehearsal_page::audio_coverage(&data, page_dir, &config.page.tts_dir)?;
    if !coverage.missing.is_empty() {
        warn!(
            "{} of {} line(s) have no audio file yet under '{}'",
            coverage.missing.len(),
            data.dialogue_count(),
            config.page.tts_dir
        );
    }

    info!("Done! Open {:?} in a browser.", output);
    info!("Characters: {}", data.characters.join(", "));
    info!("Acts: {}", data.acts.len());
    Ok(())
}

async fn run_speech(config: &Config, args: SpeechArgs) -> Result<()> {
    let drama = load_drama(config, args.input)?;

    let profile = config
        .speech
        .active_profile()
        .ok_or_else(|| anyhow!("Unknown speech profile '{}'", config.speech.profile))?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&profile.output_dir));

    info!("Using profile: {}", profile.name);
    info!("Output: {:?}", output_dir);

    let voices: VoiceMap = config.speech.voices.iter().collect();
    if voices.is_empty() {
        warn!("No voices configured in speech.voices; every line will be skipped");
    }

    let plan = speech::plan_speech(&drama, &voices, &output_dir);
    let unmapped = plan.unmapped_characters();
    if !unmapped.is_empty() {
        warn!("Characters without a voice: {}", unmapped.join(", "));
    }

    if args.dry_run {
        for job in &plan.jobs {
            println!("{} ({})", job.output_path.display(), job.voice);
        }
        info!("{} file(s) planned, {} line(s) without voice", plan.jobs.len(), plan.unmapped.len());
        return Ok(());
    }

    let options = SpeechOptions::from_config(&config.speech)?;
    let generator = SpeechGenerator::new(CommandBackend::new(&config.speech.command), options);
    let report = generator.run(&plan).await?;

    if !report.is_success() {
        for failed in &report.failed {
            error!("{:?}: {}", failed.output_path, failed.error);
        }
        return Err(anyhow!("{} line(s) failed to synthesize", report.failed.len()));
    }

    info!("Output files organized in: {}/act<N>/scene<N>/", output_dir.display());
    Ok(())
}
