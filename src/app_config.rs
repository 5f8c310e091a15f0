use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConfigError;

// Application configuration module
// This module handles the application configuration including loading,
// validating and saving configuration settings.

/// Maximum number of match profiles evaluated per episode
pub const MAX_PROFILES: usize = 5;

/// Tunable tolerances for one alignment run.
///
/// Immutable for the duration of a run. Every profile is fully independent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchConfig {
    /// Maximum number of reference cues examined forward of the cursor
    #[serde(default = "default_search_forward_max")]
    pub search_forward_max: usize,

    /// Maximum start-time distance between two lines merged into one sentence
    #[serde(default = "default_multiline_merge_max_offset_ms")]
    pub multiline_merge_max_offset_ms: i64,

    /// Sentences with at most this many words are subject to the offset alert.
    /// Zero disables the alert.
    #[serde(default = "default_offset_alert_max_words")]
    pub offset_alert_max_words: usize,

    /// Largest offset accepted for short sentences
    #[serde(default = "default_offset_alert_max_ms")]
    pub offset_alert_max_ms: i64,

    /// Fraction of dissimilarity tolerated between long sentences (0.0 - 1.0)
    #[serde(default = "default_same_tolerant_ratio")]
    pub same_tolerant_ratio: f64,

    /// Minimum caption sentence length before the tolerant ratio applies
    #[serde(default = "default_same_tolerant_min_words")]
    pub same_tolerant_min_words: usize,
}

impl MatchConfig {
    /// Create a validated profile
    pub fn new(
        search_forward_max: usize,
        multiline_merge_max_offset_ms: i64,
        offset_alert_max_words: usize,
        offset_alert_max_ms: i64,
        same_tolerant_ratio: f64,
        same_tolerant_min_words: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            search_forward_max,
            multiline_merge_max_offset_ms,
            offset_alert_max_words,
            offset_alert_max_ms,
            same_tolerant_ratio,
            same_tolerant_min_words,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every option against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_forward_max == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search_forward_max",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.multiline_merge_max_offset_ms < 0 {
            return Err(ConfigError::InvalidValue {
                field: "multiline_merge_max_offset_ms",
                reason: format!("must not be negative, got {}", self.multiline_merge_max_offset_ms),
            });
        }
        if self.offset_alert_max_ms < 0 {
            return Err(ConfigError::InvalidValue {
                field: "offset_alert_max_ms",
                reason: format!("must not be negative, got {}", self.offset_alert_max_ms),
            });
        }
        if !(0.0..=1.0).contains(&self.same_tolerant_ratio) {
            return Err(ConfigError::InvalidValue {
                field: "same_tolerant_ratio",
                reason: format!("must be within 0.0..=1.0, got {}", self.same_tolerant_ratio),
            });
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            search_forward_max: default_search_forward_max(),
            multiline_merge_max_offset_ms: default_multiline_merge_max_offset_ms(),
            offset_alert_max_words: default_offset_alert_max_words(),
            offset_alert_max_ms: default_offset_alert_max_ms(),
            same_tolerant_ratio: default_same_tolerant_ratio(),
            same_tolerant_min_words: default_same_tolerant_min_words(),
        }
    }
}

/// Caption track handling
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CaptionConfig {
    /// Dialogue lines matching this pattern are discarded before parsing
    #[serde(default)]
    pub exclude_pattern: Option<String>,

    /// Re-pair files that list all native lines before all foreign lines
    #[serde(default)]
    pub repair_split_layout: bool,
}

impl CaptionConfig {
    /// Compile the exclusion pattern, if any
    pub fn exclusion_regex(&self) -> Result<Option<Regex>, ConfigError> {
        match self.exclude_pattern.as_deref() {
            None | Some("") => Ok(None),
            Some(pattern) => Regex::new(pattern)
                .map(Some)
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }),
        }
    }
}

/// Reference track acquisition
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReferenceConfig {
    /// Fetch the reference again even when a cached copy exists
    #[serde(default = "default_true")]
    pub redownload: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            redownload: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Replace existing output files
    #[serde(default)]
    pub overwrite: bool,

    /// Prepend a cue carrying the tool version and the match rate
    #[serde(default = "default_true")]
    pub watermark: bool,

    /// Episodes below this match rate are flagged for manual review
    #[serde(default = "default_low_match_rate")]
    pub low_match_rate: f64,

    /// Write a JSON match report next to each episode log
    #[serde(default)]
    pub write_json_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            watermark: true,
            low_match_rate: default_low_match_rate(),
            write_json_report: false,
        }
    }
}

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Match profiles, evaluated in order
    #[serde(default = "default_profiles")]
    pub profiles: Vec<MatchConfig>,

    /// Caption parsing options
    #[serde(default)]
    pub caption: CaptionConfig,

    /// Reference acquisition options
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_search_forward_max() -> usize {
    // lyrics are often left untranslated and can span 20+ reference cues
    35
}

fn default_multiline_merge_max_offset_ms() -> i64 {
    5_000
}

fn default_offset_alert_max_words() -> usize {
    2
}

fn default_offset_alert_max_ms() -> i64 {
    30_000
}

fn default_same_tolerant_ratio() -> f64 {
    0.1
}

fn default_same_tolerant_min_words() -> usize {
    10
}

fn default_profiles() -> Vec<MatchConfig> {
    vec![MatchConfig::default()]
}

fn default_low_match_rate() -> f64 {
    0.8
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, validating it before returning
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate().context("Configuration validation failed")?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        if self.profiles.len() > MAX_PROFILES {
            return Err(ConfigError::TooManyProfiles(self.profiles.len()));
        }
        for profile in &self.profiles {
            profile.validate()?;
        }

        self.caption.exclusion_regex()?;

        if !(0.0..=1.0).contains(&self.output.low_match_rate) {
            return Err(ConfigError::InvalidValue {
                field: "low_match_rate",
                reason: format!("must be within 0.0..=1.0, got {}", self.output.low_match_rate),
            });
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            profiles: default_profiles(),
            caption: CaptionConfig::default(),
            reference: ReferenceConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
