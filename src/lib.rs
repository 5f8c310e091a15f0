/*!
 * # subsyncer - bilingual subtitle timing synchronisation
 *
 * Retimes a fan-made bilingual caption track against a reference track
 * that carries trustworthy timing, by matching their shared foreign
 * language sentences.
 *
 * ## Features
 *
 * - Reference tracks with timestamp-pair cue records (`-->`)
 * - Bilingual dialogue caption tracks in any detected text encoding
 * - Greedy sentence matching with two-line merges and a one-word tolerance
 * - Up to five match profiles per run, the best one wins
 * - SRT output with an optional watermark cue
 * - Per-episode logs, JSON reports and a batch summary
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `text_normalizer`: Text clean-up before comparison
 * - `parsers`: Reference and caption track parsers
 * - `alignment`: The matching core:
 *   - `alignment::similarity`: Sentence predicates
 *   - `alignment::engine`: Two-cursor matcher
 *   - `alignment::repair`: Retiming and trimming
 *   - `alignment::report`: Run statistics
 *   - `alignment::trace`: Decision log
 * - `runner`: Multi-profile selection
 * - `subtitle_processor`: Cue types, timestamps and SRT rendering
 * - `manifest`: Episode manifest of a series directory
 * - `providers`: Reference track sources (local files, HTTP)
 * - `file_utils`: File system operations
 * - `app_controller`: Batch and single-pair workflows
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
// Test names follow test_operation_condition_expectation in camel case
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod manifest;
pub mod parsers;
pub mod providers;
pub mod runner;
pub mod subtitle_processor;
pub mod text_normalizer;

// Re-export main types for easier usage
pub use alignment::{align, AlignmentResult, MatchRecord, MatchReport, MatchType};
pub use app_config::{Config, MatchConfig};
pub use errors::{AlignError, AppError, ConfigError, ProviderError, SubtitleError};
pub use runner::{run_profiles, ProfileRun};
pub use subtitle_processor::{CaptionCue, ReferenceCue};
