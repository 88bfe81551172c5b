//! Deployment lifecycle events

pub mod manager;
pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;
use openapi_server::models::{EventPayload, OutcomeSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deploy::outcome::DeploymentOutcome;
use crate::deploy::request::DeployRequest;

pub use manager::{EventHandler, EventManager};

/// Lifecycle event kinds, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Before any foundation is contacted. Listener errors veto the deployment.
    #[serde(rename = "deploy.start")]
    DeployStart,
    #[serde(rename = "deploy.success")]
    DeploySuccess,
    #[serde(rename = "deploy.failure")]
    DeployFailure,
    /// Always last, after success or failure
    #[serde(rename = "deploy.finish")]
    DeployFinish,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::DeployStart,
        EventKind::DeploySuccess,
        EventKind::DeployFailure,
        EventKind::DeployFinish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DeployStart => "deploy.start",
            EventKind::DeploySuccess => "deploy.success",
            EventKind::DeployFailure => "deploy.failure",
            EventKind::DeployFinish => "deploy.finish",
        }
    }

    /// Whether a listener error at this phase stops the deployment
    pub fn can_veto(&self) -> bool {
        matches!(self, EventKind::DeployStart)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle signal and its payload
#[derive(Debug, Clone)]
pub struct DeployEvent {
    pub kind: EventKind,
    pub request: DeployRequest,
    /// Set for post-deploy events
    pub outcome: Option<OutcomeSummary>,
    pub occurred_at: DateTime<Utc>,
}

impl DeployEvent {
    pub fn new(kind: EventKind, request: &DeployRequest) -> Self {
        Self {
            kind,
            request: request.clone(),
            outcome: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_outcome(mut self, outcome: &DeploymentOutcome) -> Self {
        self.outcome = Some(outcome.summary());
        self
    }

    pub fn payload(&self) -> EventPayload {
        EventPayload {
            event: self.kind.as_str().to_string(),
            deployment_id: self.request.deployment_id,
            environment: self.request.environment.clone(),
            org: self.request.org.clone(),
            space: self.request.space.clone(),
            app_name: self.request.app_name.clone(),
            occurred_at: self.occurred_at,
            outcome: self.outcome.clone(),
        }
    }
}

/// A listener refused or failed to handle an event
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct HookError {
    /// Reported as the deployment status when this vetoes a deployment
    pub status: StatusCode,
    pub message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Broadcasts an event to its listeners and reports the first failure.
///
/// Delivery is synchronous from the caller's point of view: `notify` returns
/// once every listener has run or one has failed.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn notify(&self, event: &DeployEvent) -> Result<(), HookError>;
}
