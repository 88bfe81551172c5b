//! Application state management

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::options::AppOptions;
use crate::deploy::cf::CfPusher;
use crate::deploy::orchestrator::Orchestrator;
use crate::deploy::registry::EnvironmentRegistry;
use crate::errors::DeployerError;
use crate::events::webhook::WebhookHandler;
use crate::events::EventManager;
use crate::fetch::ArtifactStore;
use crate::http::client::HttpClient;
use crate::server::state::ServerState;

/// Main application state, wired once at startup and shared read-only
pub struct AppState {
    /// HTTP client for artifact downloads and webhooks
    pub http_client: Arc<HttpClient>,

    /// Configured environments
    pub registry: Arc<EnvironmentRegistry>,

    /// Artifact fetcher and cleaner
    pub artifacts: Arc<ArtifactStore>,

    /// The deployment pipeline
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Initialize application state
    pub async fn init(options: &AppOptions) -> Result<Self, DeployerError> {
        info!("Initializing application state...");

        options.storage.setup().await?;

        let http_client = Arc::new(HttpClient::new(options.http_timeout)?);

        let registry = Arc::new(EnvironmentRegistry::from_settings(&options.environments)?);
        if registry.is_empty() {
            warn!("No environments configured, every deployment will be rejected");
        } else {
            info!("Loaded environments: {}", registry.names().join(", "));
        }

        let mut events = EventManager::new();
        for hook in &options.webhooks {
            url::Url::parse(&hook.url).map_err(|e| {
                DeployerError::ConfigError(format!("invalid webhook url '{}': {}", hook.url, e))
            })?;
            events.register_for(
                &hook.events,
                Arc::new(WebhookHandler::new(hook.url.clone(), http_client.clone())),
            );
        }

        let artifacts = Arc::new(ArtifactStore::new(
            http_client.clone(),
            options.storage.artifacts_dir(),
        ));

        let pusher = Arc::new(CfPusher::new(
            options.push.cli_binary.clone(),
            options.push.username.clone(),
            options.push.password.clone(),
            options.push.timeout,
            options.storage.cli_homes_dir(),
        ));

        let orchestrator = Arc::new(Orchestrator::new(
            registry.clone(),
            artifacts.clone(),
            pusher,
            Arc::new(events),
            options.push.orchestrator.clone(),
        ));

        Ok(Self {
            http_client,
            registry,
            artifacts,
            orchestrator,
        })
    }

    pub fn server_state(&self) -> ServerState {
        ServerState::new(self.orchestrator.clone(), self.artifacts.clone())
    }

    /// Shutdown application state
    pub async fn shutdown(&self) -> Result<(), DeployerError> {
        info!("Shutting down application state...");
        Ok(())
    }
}
