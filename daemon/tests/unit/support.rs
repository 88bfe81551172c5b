//! Test doubles shared by the integration tests

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use openapi_server::models::DeployManifest;

use pushgate::deploy::orchestrator::{Deployer, Orchestrator, OrchestratorOptions};
use pushgate::deploy::outcome::DeploymentOutcome;
use pushgate::deploy::pusher::{FoundationPusher, PushError, PushTarget};
use pushgate::deploy::registry::{Environment, EnvironmentRegistry};
use pushgate::deploy::request::DeployRequest;
use pushgate::events::{DeployEvent, EventHandler, EventKind, EventManager, HookError};
use pushgate::fetch::{ArtifactFetcher, FetchError};
use pushgate::server::serve::router;
use pushgate::server::state::ServerState;
use pushgate::storage::settings::DEFAULT_MAX_UPLOAD_BYTES;

/// Pusher that counts calls and optionally fails every push
#[derive(Default)]
pub struct CountingPusher {
    pub fail_with: Option<String>,
    calls: AtomicUsize,
}

impl CountingPusher {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FoundationPusher for CountingPusher {
    async fn push(&self, target: &PushTarget<'_>) -> Result<String, PushError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(PushError::new(message.clone())),
            None => Ok(format!("pushed {} to {}", target.app_name, target.foundation)),
        }
    }
}

/// Fetcher that counts calls without touching the network or the disk
#[derive(Default)]
pub struct CountingFetcher {
    pub zip_error: Option<String>,
    fetches: AtomicUsize,
    releases: AtomicUsize,
}

impl CountingFetcher {
    pub fn broken_zip(message: &str) -> Self {
        Self {
            zip_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactFetcher for CountingFetcher {
    async fn fetch(&self, _url: &str, _manifest: Option<&str>) -> Result<PathBuf, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("/tmp/pushgate-test/artifact"))
    }

    async fn fetch_from_zip(&self, _body: &[u8]) -> Result<PathBuf, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.zip_error {
            Some(message) => Err(FetchError::Archive(message.clone())),
            None => Ok(PathBuf::from("/tmp/pushgate-test/upload")),
        }
    }

    async fn release(&self, _artifact_path: &Path) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Listener that records what it saw and can refuse one kind
pub struct RecordingListener {
    name: String,
    refuse: Option<EventKind>,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingListener {
    pub fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            refuse: None,
            log,
        }
    }

    pub fn refusing(mut self, kind: EventKind) -> Self {
        self.refuse = Some(kind);
        self
    }
}

#[async_trait]
impl EventHandler for RecordingListener {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, event: &DeployEvent) -> Result<(), HookError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, event.kind));
        if self.refuse == Some(event.kind) {
            return Err(HookError::new(format!("{} refused {}", self.name, event.kind)));
        }
        Ok(())
    }
}

/// Deployer that only records which entry point was called
#[derive(Default)]
pub struct RecordingDeployer {
    pub calls: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl Deployer for RecordingDeployer {
    async fn deploy(
        &self,
        _request: &DeployRequest,
        _manifest: &DeployManifest,
    ) -> DeploymentOutcome {
        self.calls.lock().unwrap().push("manifest");
        DeploymentOutcome::seal(Vec::new(), Default::default())
    }

    async fn deploy_from_artifact(
        &self,
        _request: &DeployRequest,
        _artifact_path: &Path,
    ) -> DeploymentOutcome {
        self.calls.lock().unwrap().push("archive");
        DeploymentOutcome::seal(Vec::new(), Default::default())
    }
}

/// Registry with environment "Test" holding foundations f1 and f2
pub fn test_registry() -> Arc<EnvironmentRegistry> {
    Arc::new(
        EnvironmentRegistry::new([Environment {
            name: "Test".to_string(),
            foundations: vec!["f1".to_string(), "f2".to_string()],
            skip_ssl: false,
        }])
        .unwrap(),
    )
}

/// Router over a real orchestrator wired to the given doubles
pub fn app_with(
    fetcher: Arc<CountingFetcher>,
    pusher: Arc<CountingPusher>,
    events: EventManager,
) -> Router {
    let orchestrator = Orchestrator::new(
        test_registry(),
        fetcher.clone(),
        pusher,
        Arc::new(events),
        OrchestratorOptions::default(),
    );
    router(
        Arc::new(ServerState::new(Arc::new(orchestrator), fetcher)),
        DEFAULT_MAX_UPLOAD_BYTES,
    )
}
