//! Deployment orchestrator
//!
//! Drives one deployment from a resolved artifact to a sealed
//! [`DeploymentOutcome`]: environment lookup, `deploy.start` (which may veto),
//! one push per foundation, all-or-nothing aggregation, then the advisory
//! post-deploy events.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use http::StatusCode;
use openapi_server::models::DeployManifest;
use tracing::{error, info, warn};

use crate::deploy::fsm::{OrchestrationEvent, OrchestrationFsm};
use crate::deploy::outcome::{DeploymentOutcome, FoundationResult, Transcript};
use crate::deploy::pusher::{FoundationPusher, PushTarget};
use crate::deploy::registry::{Environment, EnvironmentRegistry};
use crate::deploy::request::DeployRequest;
use crate::events::{DeployEvent, EventKind, EventNotifier, HookError};
use crate::fetch::ArtifactFetcher;

/// The two deploy entry points the HTTP front calls
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Manifest mode: fetch the referenced artifact, then deploy it
    async fn deploy(&self, request: &DeployRequest, manifest: &DeployManifest)
        -> DeploymentOutcome;

    /// Archive mode: deploy an artifact that is already on disk
    async fn deploy_from_artifact(
        &self,
        request: &DeployRequest,
        artifact_path: &Path,
    ) -> DeploymentOutcome;
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Push to all foundations at once instead of one after another
    pub concurrent: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self { concurrent: true }
    }
}

pub struct Orchestrator {
    registry: Arc<EnvironmentRegistry>,
    fetcher: Arc<dyn ArtifactFetcher>,
    pusher: Arc<dyn FoundationPusher>,
    notifier: Arc<dyn EventNotifier>,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<EnvironmentRegistry>,
        fetcher: Arc<dyn ArtifactFetcher>,
        pusher: Arc<dyn FoundationPusher>,
        notifier: Arc<dyn EventNotifier>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            registry,
            fetcher,
            pusher,
            notifier,
            options,
        }
    }

    async fn run(
        &self,
        request: &DeployRequest,
        artifact_path: &Path,
        mut fsm: OrchestrationFsm,
        transcript: Transcript,
    ) -> DeploymentOutcome {
        match self.pipeline(request, artifact_path, &mut fsm, transcript).await {
            Ok(outcome) => {
                info!(
                    "Deployment {} finished in state {:?} with {}",
                    request.deployment_id,
                    fsm.state(),
                    outcome.status()
                );
                outcome
            }
            Err(e) => {
                error!("Deployment {} aborted: {}", request.deployment_id, e);
                DeploymentOutcome::rejected(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("internal orchestration error: {}", e),
                )
            }
        }
    }

    async fn pipeline(
        &self,
        request: &DeployRequest,
        artifact_path: &Path,
        fsm: &mut OrchestrationFsm,
        transcript: Transcript,
    ) -> Result<DeploymentOutcome, String> {
        let Some(environment) = self.registry.lookup(&request.environment) else {
            let message = format!("environment '{}' not found", request.environment);
            warn!("Deployment {}: {}", request.deployment_id, message);
            fsm.process(OrchestrationEvent::Reject(message.clone()))?;
            return Ok(DeploymentOutcome::halted(
                StatusCode::INTERNAL_SERVER_ERROR,
                transcript,
                message,
            ));
        };
        if environment.foundations.is_empty() {
            warn!(
                "Environment '{}' has no foundations, deployment {} will succeed without pushing",
                environment.name, request.deployment_id
            );
        }

        fsm.process(OrchestrationEvent::Announce)?;
        let start = DeployEvent::new(EventKind::DeployStart, request);
        if let Err(e) = self.emit(&start, None).await {
            warn!("Deployment {} vetoed: {}", request.deployment_id, e);
            fsm.process(OrchestrationEvent::Veto(e.message.clone()))?;
            return Ok(DeploymentOutcome::halted(e.status, transcript, e.message));
        }

        fsm.process(OrchestrationEvent::Dispatch)?;
        let results = self.dispatch(request, environment, artifact_path).await;

        fsm.process(OrchestrationEvent::Aggregate)?;
        let mut outcome = DeploymentOutcome::seal(results, transcript);

        fsm.process(OrchestrationEvent::Conclude)?;
        let verdict = if outcome.success() {
            EventKind::DeploySuccess
        } else {
            EventKind::DeployFailure
        };
        for kind in [verdict, EventKind::DeployFinish] {
            let event = DeployEvent::new(kind, request).with_outcome(&outcome);
            self.emit(&event, Some(&mut outcome))
                .await
                .map_err(|e| format!("{} listener vetoed after dispatch: {}", kind, e))?;
        }

        fsm.process(OrchestrationEvent::Complete)?;
        Ok(outcome)
    }

    /// Deliver one event. Only errors at a phase that can veto are returned;
    /// the rest are logged and noted on `outcome`.
    async fn emit(
        &self,
        event: &DeployEvent,
        outcome: Option<&mut DeploymentOutcome>,
    ) -> Result<(), HookError> {
        let Err(e) = self.notifier.notify(event).await else {
            return Ok(());
        };
        if event.kind.can_veto() {
            return Err(e);
        }

        warn!(
            "Deployment {}: {} listener failed: {}",
            event.request.deployment_id, event.kind, e
        );
        if let Some(outcome) = outcome {
            outcome.note(format!("{} listener failed: {}", event.kind, e));
        }
        Ok(())
    }

    /// One push per foundation. Results come back in configured order
    /// whatever the dispatch mode.
    async fn dispatch(
        &self,
        request: &DeployRequest,
        environment: &Environment,
        artifact_path: &Path,
    ) -> Vec<FoundationResult> {
        let targets: Vec<PushTarget<'_>> = environment
            .foundations
            .iter()
            .map(|foundation| PushTarget {
                deployment_id: request.deployment_id,
                foundation,
                org: &request.org,
                space: &request.space,
                app_name: &request.app_name,
                artifact_path,
                skip_ssl: environment.skip_ssl,
            })
            .collect();

        if self.options.concurrent {
            join_all(targets.iter().map(|target| self.push_one(target))).await
        } else {
            let mut results = Vec::with_capacity(targets.len());
            for target in &targets {
                results.push(self.push_one(target).await);
            }
            results
        }
    }

    async fn push_one(&self, target: &PushTarget<'_>) -> FoundationResult {
        match self.pusher.push(target).await {
            Ok(log) => FoundationResult::succeeded(target.foundation, log),
            Err(e) => {
                error!(
                    "Deployment {}: push to {} failed: {}",
                    target.deployment_id, target.foundation, e
                );
                FoundationResult::failed(target.foundation, e)
            }
        }
    }
}

#[async_trait]
impl Deployer for Orchestrator {
    async fn deploy(
        &self,
        request: &DeployRequest,
        manifest: &DeployManifest,
    ) -> DeploymentOutcome {
        info!("Deployment {}: {} from {}", request.deployment_id, request, manifest.artifact_url);

        let mut fsm = OrchestrationFsm::new();
        let transcript = Transcript::for_request(request);
        if let Err(e) = fsm.process(OrchestrationEvent::StartResolution) {
            return DeploymentOutcome::rejected(StatusCode::INTERNAL_SERVER_ERROR, e);
        }

        let artifact_path = match self
            .fetcher
            .fetch(&manifest.artifact_url, manifest.manifest.as_deref())
            .await
        {
            Ok(path) => path,
            Err(e) => {
                error!("Deployment {}: {}", request.deployment_id, e);
                let message = e.to_string();
                if let Err(e) = fsm.process(OrchestrationEvent::ResolutionFailed(message.clone())) {
                    warn!("Deployment {}: {}", request.deployment_id, e);
                }
                return DeploymentOutcome::halted(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    transcript,
                    message,
                );
            }
        };

        if let Err(e) = fsm.process(OrchestrationEvent::ArtifactReady) {
            self.fetcher.release(&artifact_path).await;
            return DeploymentOutcome::rejected(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
        let outcome = self.run(request, &artifact_path, fsm, transcript).await;
        self.fetcher.release(&artifact_path).await;
        outcome
    }

    async fn deploy_from_artifact(
        &self,
        request: &DeployRequest,
        artifact_path: &Path,
    ) -> DeploymentOutcome {
        info!("Deployment {}: {} from uploaded archive", request.deployment_id, request);

        let mut fsm = OrchestrationFsm::new();
        if let Err(e) = fsm.process(OrchestrationEvent::ArtifactReady) {
            return DeploymentOutcome::rejected(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
        self.run(request, artifact_path, fsm, Transcript::for_request(request))
            .await
    }
}
