//! Pushgate API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Body of an `application/json` deploy request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployManifest {
    /// Location of the zipped application artifact
    pub artifact_url: String,

    /// Base64 encoded platform manifest, written next to the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

/// Payload posted to webhook listeners for every lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub event: String,
    pub deployment_id: Uuid,
    pub environment: String,
    pub org: String,
    pub space: String,
    pub app_name: String,
    pub occurred_at: DateTime<Utc>,

    /// Present once the outcome is sealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeSummary>,
}

/// Sealed deployment verdict as seen by webhook listeners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub success: bool,
    pub status_code: u16,
    pub foundations: Vec<FoundationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundationSummary {
    pub foundation: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
