/*!
 * Reference track providers.
 *
 * A provider turns an episode descriptor from the manifest into the raw
 * body of the reference track:
 * - `file`: descriptors are paths below the series directory
 * - `http`: descriptors are direct track URLs
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;
use std::path::Path;

use crate::app_config::ReferenceConfig;
use crate::errors::ProviderError;
use crate::manifest::LOCAL_PLATFORM;

pub mod file;
pub mod http;

pub use file::FileReferenceProvider;
pub use http::HttpReferenceProvider;

// @const: Header line or at least one timestamp pair
static REFERENCE_BODY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"WEBVTT\s*\n|\d{2}:\d{2}\.\d{3}\s*-->\s*(?:\d{2,}:)?\d{2}:\d{2}\.\d{3}").unwrap()
});

/// Common trait for all reference track sources
#[async_trait]
pub trait ReferenceProvider: Send + Sync + Debug {
    /// Fetch the reference body of one episode.
    ///
    /// # Arguments
    /// * `episode` - Episode key, used for logging
    /// * `descriptor` - Opaque descriptor taken from the manifest
    ///
    /// # Returns
    /// * `Ok(Some(body))` - The track body
    /// * `Ok(None)` - The source has nothing for this episode
    /// * `Err(..)` - Fetching failed
    async fn fetch_reference(&self, episode: &str, descriptor: &str) -> Result<Option<String>, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Whether a fetched body looks like a reference track
pub fn looks_like_reference(body: &str) -> bool {
    REFERENCE_BODY_REGEX.is_match(body)
}

/// Pick the provider for a manifest platform
pub fn provider_for_platform(
    platform: &str,
    series_dir: &Path,
    config: &ReferenceConfig,
) -> Box<dyn ReferenceProvider> {
    if platform.eq_ignore_ascii_case(LOCAL_PLATFORM) {
        Box::new(FileReferenceProvider::new(series_dir))
    } else {
        Box::new(HttpReferenceProvider::new(config.timeout_secs))
    }
}
