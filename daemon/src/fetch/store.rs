//! Artifact store backed by the storage layout

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info, warn};

use crate::deploy::cf::MANIFEST_FILE;
use crate::fetch::archive::extract_zip;
use crate::fetch::{ArtifactFetcher, FetchError};
use crate::filesys::dir::Dir;
use crate::http::client::HttpClient;

/// Fetches artifacts into per-request directories below `root`
pub struct ArtifactStore {
    http_client: Arc<HttpClient>,
    root: Dir,
}

impl ArtifactStore {
    pub fn new(http_client: Arc<HttpClient>, root: Dir) -> Self {
        Self { http_client, root }
    }

    async fn unpack(&self, data: Vec<u8>) -> Result<Dir, FetchError> {
        let dir = self.root.create_unique_subdir("artifact").await?;
        let dest = dir.path().to_path_buf();

        let extracted = tokio::task::spawn_blocking(move || extract_zip(&data, &dest))
            .await
            .map_err(|e| FetchError::Archive(e.to_string()))
            .and_then(|r| r);

        match extracted {
            Ok(files) => {
                debug!("Extracted {} files into {:?}", files, dir.path());
                Ok(dir)
            }
            Err(e) => {
                if let Err(cleanup) = dir.delete().await {
                    warn!("Failed to clean up {:?}: {}", dir.path(), cleanup);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ArtifactFetcher for ArtifactStore {
    async fn fetch(&self, url: &str, manifest: Option<&str>) -> Result<PathBuf, FetchError> {
        info!("Fetching artifact from {}", url);

        // Decode first so a bad manifest costs no download
        let manifest = manifest
            .filter(|m| !m.trim().is_empty())
            .map(|m| STANDARD.decode(m.trim()))
            .transpose()
            .map_err(|e| FetchError::Manifest(e.to_string()))?;

        let data = self
            .http_client
            .download(url)
            .await
            .map_err(|e| FetchError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let dir = self.unpack(data).await?;
        if let Some(manifest) = manifest {
            dir.file(MANIFEST_FILE).write_bytes(&manifest).await?;
        }
        Ok(dir.path().to_path_buf())
    }

    async fn fetch_from_zip(&self, body: &[u8]) -> Result<PathBuf, FetchError> {
        info!("Unpacking uploaded archive ({} bytes)", body.len());
        let dir = self.unpack(body.to_vec()).await?;
        Ok(dir.path().to_path_buf())
    }

    async fn release(&self, artifact_path: &Path) {
        // Only ever delete what this store created
        if !artifact_path.starts_with(self.root.path()) {
            return;
        }
        if let Err(e) = Dir::new(artifact_path).delete().await {
            warn!("Failed to remove artifact {:?}: {}", artifact_path, e);
        }
    }
}
