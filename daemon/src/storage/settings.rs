//! Settings file management

use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;

use crate::events::EventKind;
use crate::logs::LogLevel;

pub const USERNAME_ENV_VAR: &str = "PUSHGATE_USERNAME";
pub const PASSWORD_ENV_VAR: &str = "PUSHGATE_PASSWORD";

/// Daemon settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log: LogSettings,

    #[serde(default)]
    pub server: ServerSettings,

    /// Base directory for fetched artifacts and CLI homes
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub push: PushSettings,

    /// Default platform credentials used for every foundation
    #[serde(default)]
    pub username: String,

    #[serde(default = "empty_secret")]
    pub password: SecretString,

    #[serde(default)]
    pub environments: Vec<EnvironmentSettings>,

    #[serde(default)]
    pub webhooks: Vec<WebhookSettings>,

    /// Timeout for artifact downloads and webhook calls
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_shutdown_delay")]
    pub max_shutdown_delay_secs: u64,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_http_timeout() -> u64 {
    300
}

fn default_shutdown_delay() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: LogSettings::default(),
            server: ServerSettings::default(),
            storage_dir: None,
            push: PushSettings::default(),
            username: String::new(),
            password: empty_secret(),
            environments: Vec::new(),
            webhooks: Vec::new(),
            http_timeout_secs: default_http_timeout(),
            max_shutdown_delay_secs: default_shutdown_delay(),
        }
    }
}

impl Settings {
    /// Let credentials from the process environment win over the file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(USERNAME_ENV_VAR).ok(),
            std::env::var(PASSWORD_ENV_VAR).ok(),
        );
    }

    fn apply_overrides(&mut self, username: Option<String>, password: Option<String>) {
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            self.username = username;
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.password = SecretString::from(password);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, archive uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// How foundation pushes are executed
#[derive(Debug, Clone, Deserialize)]
pub struct PushSettings {
    /// Platform CLI used for login and push
    #[serde(default = "default_cli_binary")]
    pub cli_binary: String,

    /// Upper bound for one foundation push
    #[serde(default = "default_push_timeout")]
    pub timeout_secs: u64,

    /// Push to all foundations of an environment at once
    #[serde(default = "default_true")]
    pub concurrent: bool,
}

fn default_cli_binary() -> String {
    "cf".to_string()
}

fn default_push_timeout() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            cli_binary: default_cli_binary(),
            timeout_secs: default_push_timeout(),
            concurrent: true,
        }
    }
}

/// One named environment and its foundations, in push order
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentSettings {
    pub name: String,

    #[serde(default)]
    pub foundations: Vec<String>,

    #[serde(default)]
    pub skip_ssl: bool,
}

/// A listener that receives event payloads over HTTP
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    pub url: String,

    /// Event kinds delivered to this hook; empty means all of them
    #[serde(default)]
    pub events: Vec<EventKind>,
}
