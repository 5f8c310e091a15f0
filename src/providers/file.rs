use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Component, Path, PathBuf};

use crate::errors::ProviderError;
use crate::file_utils::decode_bytes;
use crate::providers::{looks_like_reference, ReferenceProvider};

/// Serves reference tracks stored below a base directory
#[derive(Debug, Clone)]
pub struct FileReferenceProvider {
    base_dir: PathBuf,
}

impl FileReferenceProvider {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self { base_dir: base_dir.as_ref().to_path_buf() }
    }

    /// Resolve a descriptor; it must stay inside the base directory
    fn resolve(&self, descriptor: &str) -> Result<PathBuf, ProviderError> {
        let relative = Path::new(descriptor.trim());
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if descriptor.trim().is_empty() || escapes {
            return Err(ProviderError::InvalidDescriptor(descriptor.to_string()));
        }

        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl ReferenceProvider for FileReferenceProvider {
    async fn fetch_reference(&self, episode: &str, descriptor: &str) -> Result<Option<String>, ProviderError> {
        let path = self.resolve(descriptor)?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!("[{}] reference file not found: {}", episode, path.display());
            return Ok(None);
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("{}: {}", path.display(), e)))?;
        let (body, encoding) = decode_bytes(&bytes);

        if !looks_like_reference(&body) {
            return Err(ProviderError::InvalidBody(path.display().to_string()));
        }

        debug!("[{}] read reference from {} as {}", episode, path.display(), encoding.name());
        Ok(Some(body))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
