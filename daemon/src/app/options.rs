//! Application configuration options

use std::time::Duration;

use secrecy::SecretString;

use crate::deploy::orchestrator::OrchestratorOptions;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::{
    EnvironmentSettings, Settings, WebhookSettings, DEFAULT_MAX_UPLOAD_BYTES,
};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Storage layout paths
    pub storage: StorageLayout,

    /// Server configuration
    pub server: ServerOptions,

    /// Foundation push configuration
    pub push: PushOptions,

    /// Timeout for artifact downloads and webhook calls
    pub http_timeout: Duration,

    pub environments: Vec<EnvironmentSettings>,

    pub webhooks: Vec<WebhookSettings>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            storage: StorageLayout::default(),
            server: ServerOptions::default(),
            push: PushOptions::default(),
            http_timeout: Duration::from_secs(300),
            environments: Vec::new(),
            webhooks: Vec::new(),
        }
    }
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        let storage = settings
            .storage_dir
            .as_ref()
            .map(StorageLayout::new)
            .unwrap_or_default();

        Self {
            lifecycle: LifecycleOptions {
                max_shutdown_delay: Duration::from_secs(settings.max_shutdown_delay_secs),
            },
            storage,
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
                max_upload_bytes: settings.server.max_upload_bytes,
            },
            push: PushOptions {
                cli_binary: settings.push.cli_binary.clone(),
                username: settings.username.clone(),
                password: settings.password.clone(),
                timeout: Duration::from_secs(settings.push.timeout_secs),
                orchestrator: OrchestratorOptions {
                    concurrent: settings.push.concurrent,
                },
            },
            http_timeout: Duration::from_secs(settings.http_timeout_secs),
            environments: settings.environments.clone(),
            webhooks: settings.webhooks.clone(),
        }
    }
}

/// Lifecycle options for the daemon
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// How pushes reach the foundations
#[derive(Debug, Clone)]
pub struct PushOptions {
    pub cli_binary: String,

    pub username: String,

    pub password: SecretString,

    /// Upper bound for a single foundation push
    pub timeout: Duration,

    pub orchestrator: OrchestratorOptions,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            cli_binary: "cf".to_string(),
            username: String::new(),
            password: SecretString::from(String::new()),
            timeout: Duration::from_secs(600),
            orchestrator: OrchestratorOptions::default(),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request body cap in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
