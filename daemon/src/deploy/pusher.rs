//! Foundation pusher contract

use std::path::Path;

use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Everything one push attempt needs to know
#[derive(Debug, Clone)]
pub struct PushTarget<'a> {
    pub deployment_id: Uuid,
    pub foundation: &'a str,
    pub org: &'a str,
    pub space: &'a str,
    pub app_name: &'a str,
    pub artifact_path: &'a Path,
    pub skip_ssl: bool,
}

/// A failed push. Carries the status the deployment reports if this is the
/// first failing foundation, and whatever output the attempt produced.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct PushError {
    pub status: StatusCode,
    pub message: String,
    pub log: String,
}

impl PushError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            log: String::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_log(mut self, log: String) -> Self {
        self.log = log;
        self
    }
}

/// Performs one deploy attempt against one foundation.
///
/// Implementations must return in bounded time; a timeout is reported as an
/// ordinary `PushError`. On success the push output is returned.
#[async_trait]
pub trait FoundationPusher: Send + Sync {
    async fn push(&self, target: &PushTarget<'_>) -> Result<String, PushError>;
}
