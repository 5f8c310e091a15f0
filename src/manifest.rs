/*!
 * Episode manifest of a series directory.
 *
 * ```json
 * {
 *   "platform": "local",
 *   "episodes": {
 *     "S01E01": "reference/S01E01.vtt",
 *     "S01E02": "reference/S01E02.vtt"
 *   }
 * }
 * ```
 *
 * Each descriptor is opaque here; the reference provider chosen for the
 * platform knows how to resolve it.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// File name of the manifest inside a series directory
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Platform served from the local file system
pub const LOCAL_PLATFORM: &str = "local";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeManifest {
    /// Where the reference tracks come from
    pub platform: String,

    /// Episode key to provider descriptor, iterated in key order
    #[serde(default)]
    pub episodes: BTreeMap<String, String>,
}

impl EpisodeManifest {
    /// Load the manifest of a series directory
    pub fn load<P: AsRef<Path>>(series_dir: P) -> Result<Self> {
        let path = series_dir.as_ref().join(MANIFEST_FILE_NAME);
        let file = File::open(&path)
            .with_context(|| format!("Failed to open episode manifest: {}", path.display()))?;
        let manifest: EpisodeManifest = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse episode manifest: {}", path.display()))?;

        if manifest.platform.trim().is_empty() {
            anyhow::bail!("Episode manifest {} has no platform", path.display());
        }

        Ok(manifest)
    }

    /// Episodes to process: all of them, or just one when it is listed
    pub fn select<'a>(&'a self, episode: Option<&'a str>) -> Result<Vec<(&'a str, &'a str)>> {
        match episode {
            Some(key) => {
                let descriptor = self
                    .episodes
                    .get(key)
                    .with_context(|| format!("Episode {} is not listed in the manifest", key))?;
                Ok(vec![(key, descriptor.as_str())])
            }
            None => Ok(self.episodes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()),
        }
    }
}
