//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use openapi_server::models::{DeployManifest, HealthResponse, VersionResponse};
use tracing::{info, warn};

use crate::deploy::outcome::DeploymentOutcome;
use crate::deploy::request::{DeployMode, DeployRequest};
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "pushgate".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// `POST /v1/apps/{environment}/{org}/{space}/{app_name}`
///
/// Picks the input mode from `Content-Type`, hands the request to the
/// deployer and answers with the deployment transcript. Both modes share
/// the same pipeline once an artifact directory exists.
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    Path((environment, org, space, app_name)): Path<(String, String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = DeployRequest::new(environment, org, space, app_name);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();

    let Some(mode) = DeployMode::from_content_type(&content_type) else {
        warn!("Deployment {}: unsupported content type '{}'", request.deployment_id, content_type);
        return plain(
            StatusCode::BAD_REQUEST,
            format!("content type '{}' not supported\n", content_type),
        );
    };
    info!("Deployment {} accepted ({:?}): {}", request.deployment_id, mode, request);

    let outcome = match mode {
        DeployMode::Manifest => deploy_manifest(&state, &request, &body).await,
        DeployMode::Archive => deploy_archive(&state, &request, &body).await,
    };
    plain(outcome.status(), outcome.into_transcript())
}

async fn deploy_manifest(
    state: &ServerState,
    request: &DeployRequest,
    body: &[u8],
) -> DeploymentOutcome {
    let manifest: DeployManifest = match serde_json::from_slice(body) {
        Ok(manifest) => manifest,
        Err(e) => {
            return DeploymentOutcome::rejected(
                StatusCode::BAD_REQUEST,
                format!("invalid deploy manifest: {}", e),
            );
        }
    };
    if let Err(e) = url::Url::parse(&manifest.artifact_url) {
        return DeploymentOutcome::rejected(
            StatusCode::BAD_REQUEST,
            format!("invalid artifact url '{}': {}", manifest.artifact_url, e),
        );
    }

    state.deployer.deploy(request, &manifest).await
}

async fn deploy_archive(
    state: &ServerState,
    request: &DeployRequest,
    body: &[u8],
) -> DeploymentOutcome {
    if body.is_empty() {
        return DeploymentOutcome::rejected(StatusCode::BAD_REQUEST, "request body is empty");
    }

    let artifact_path = match state.fetcher.fetch_from_zip(body).await {
        Ok(path) => path,
        Err(e) => {
            warn!("Deployment {}: {}", request.deployment_id, e);
            return DeploymentOutcome::rejected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let outcome = state
        .deployer
        .deploy_from_artifact(request, &artifact_path)
        .await;
    state.fetcher.release(&artifact_path).await;
    outcome
}

fn plain(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
