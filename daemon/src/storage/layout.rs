//! Storage layout configuration

use std::path::PathBuf;

use crate::errors::DeployerError;
use crate::filesys::dir::Dir;

/// Working directories used by the daemon
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Fetched and extracted artifacts, one subdirectory per request
    pub fn artifacts_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("artifacts"))
    }

    /// Isolated CLI homes, one subdirectory per foundation push
    pub fn cli_homes_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("cli-homes"))
    }

    pub async fn setup(&self) -> Result<(), DeployerError> {
        self.artifacts_dir().create().await?;
        self.cli_homes_dir().create().await?;
        Ok(())
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        #[cfg(target_os = "linux")]
        let base_dir = PathBuf::from("/var/lib/pushgate");

        #[cfg(not(target_os = "linux"))]
        let base_dir = std::env::temp_dir().join("pushgate");

        Self::new(base_dir)
    }
}
