//! Artifact resolution

pub mod archive;
pub mod store;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::DeployerError;

pub use store::ArtifactStore;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not download artifact from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("could not process zip file: {0}")]
    Archive(String),

    #[error("could not decode manifest: {0}")]
    Manifest(String),

    #[error("artifact storage error: {0}")]
    Storage(#[from] DeployerError),
}

/// Turns a deploy input into a local directory holding the application
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download and unpack a remote artifact, writing the optional base64
    /// encoded manifest next to it
    async fn fetch(&self, url: &str, manifest: Option<&str>) -> Result<PathBuf, FetchError>;

    /// Unpack an uploaded archive
    async fn fetch_from_zip(&self, body: &[u8]) -> Result<PathBuf, FetchError>;

    /// Remove an artifact once its deployment is over. Failures are only logged.
    async fn release(&self, artifact_path: &Path);
}
