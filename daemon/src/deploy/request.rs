//! Deploy request values

use uuid::Uuid;

use crate::utils::{mime_essence, new_deployment_id};

pub const MANIFEST_CONTENT_TYPE: &str = "application/json";
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Shape of the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    /// JSON document pointing at a remote artifact
    Manifest,
    /// The zipped application itself
    Archive,
}

impl DeployMode {
    /// Map a `Content-Type` header to a mode. Anything else is unsupported.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match mime_essence(content_type).as_str() {
            MANIFEST_CONTENT_TYPE => Some(DeployMode::Manifest),
            ARCHIVE_CONTENT_TYPE => Some(DeployMode::Archive),
            _ => None,
        }
    }
}

/// Identifies what is deployed where. Owned by one orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub deployment_id: Uuid,
    pub environment: String,
    pub org: String,
    pub space: String,
    pub app_name: String,
}

impl DeployRequest {
    pub fn new(
        environment: impl Into<String>,
        org: impl Into<String>,
        space: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            deployment_id: new_deployment_id(),
            environment: environment.into(),
            org: org.into(),
            space: space.into(),
            app_name: app_name.into(),
        }
    }
}

impl std::fmt::Display for DeployRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}/{}/{}",
            self.app_name, self.environment, self.org, self.space
        )
    }
}
