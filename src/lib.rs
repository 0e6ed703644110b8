/*!
 * # Rehearsal - drama scripts to rehearsal pages and spoken lines
 *
 * A Rust library that turns a stage play written as plain text into a
 * structured model, then into rehearsal material.
 *
 * ## Features
 *
 * - Parse a script with acts (`=act=`), scenes (`*scene*`) and character cues (`<NAME>`)
 * - Generate a static rehearsal webpage with per-line audio
 * - Synthesize one audio file per dialogue line through an external TTS program
 * - Case-insensitive character-to-voice mapping with named synthesis profiles
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `drama`: Script parsing and the Drama → Act → Scene → Dialogue model
 * - `rehearsal_page`: Page data and HTML rendering
 * - `speech`: Speech planning, backends and the generator
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations and the audio layout
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod drama;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod rehearsal_page;
pub mod speech;

// Re-export main types for easier usage
pub use app_config::Config;
pub use drama::{parse, split_into_blocks, extract_dialogues, Act, Dialogue, Drama, Scene};
pub use errors::{AppError, DramaError, SpeechError};
pub use rehearsal_page::{generate_drama_data, render_page, DramaData};
pub use speech::{plan_speech, SpeechBackend, SpeechGenerator, VoiceMap};
