/*!
 * Error types for the subsyncer application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that abort the alignment of a single episode.
///
/// These never abort a batch: the caller logs the reason code and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// The reference track produced no usable cues
    #[error("Reference track has no usable cues")]
    EmptyReference,

    /// The caption track produced no usable cues
    #[error("Caption track has no usable cues")]
    EmptyCaption,
}

impl AlignError {
    /// Stable reason code for logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyReference => "empty-reference",
            Self::EmptyCaption => "empty-caption",
        }
    }
}

/// Errors raised while building or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric option is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending option
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// No match profile was supplied
    #[error("At least one match profile is required")]
    NoProfiles,

    /// More profiles than the runner supports
    #[error("Too many match profiles: {0} (max {max})", max = crate::app_config::MAX_PROFILES)]
    TooManyProfiles(usize),

    /// The caption exclusion pattern does not compile
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as written in the config
        pattern: String,
        /// Compilation error from the regex engine
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while fetching a reference track
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The episode descriptor cannot be turned into a location
    #[error("Invalid episode descriptor: {0}")]
    InvalidDescriptor(String),

    /// Error when making a request fails
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with an error status
    #[error("Server responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Body or reason sent back
        message: String,
    },

    /// The fetched body does not look like a reference track
    #[error("Not a reference track: {0}")]
    InvalidBody(String),
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// Timestamp text could not be parsed
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error from alignment
    #[error("Alignment error: {0}")]
    Align(#[from] AlignError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from a reference provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

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
