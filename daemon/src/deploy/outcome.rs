//! Per-foundation results and the aggregated deployment outcome

use http::StatusCode;
use openapi_server::models::{FoundationSummary, OutcomeSummary};

use crate::deploy::pusher::PushError;
use crate::deploy::request::DeployRequest;

pub const DEPLOY_SUCCESSFUL: &str = "deploy successful";
pub const CANNOT_DEPLOY: &str = "cannot deploy application";

/// Human readable log returned to the caller as the response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Start a transcript with a header naming the deployment
    pub fn for_request(request: &DeployRequest) -> Self {
        let mut transcript = Self::default();
        transcript.line(format!("deployment {}: {}", request.deployment_id, request));
        transcript
    }

    pub fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Append a multi-line block, indented under the previous line
    pub fn block(&mut self, block: &str) {
        for line in block.lines().filter(|l| !l.trim().is_empty()) {
            self.text.push_str("    ");
            self.text.push_str(line);
            self.text.push('\n');
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Outcome of one push against one foundation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundationResult {
    pub foundation: String,
    pub success: bool,
    pub status: StatusCode,
    pub error: Option<String>,
    pub log: String,
}

impl FoundationResult {
    pub fn succeeded(foundation: impl Into<String>, log: String) -> Self {
        Self {
            foundation: foundation.into(),
            success: true,
            status: StatusCode::OK,
            error: None,
            log,
        }
    }

    pub fn failed(foundation: impl Into<String>, error: PushError) -> Self {
        Self {
            foundation: foundation.into(),
            success: false,
            status: error.status,
            error: Some(error.message),
            log: error.log,
        }
    }

    fn write_to(&self, transcript: &mut Transcript) {
        match &self.error {
            None => transcript.line(format!("[{}] push succeeded", self.foundation)),
            Some(error) => transcript.line(format!("[{}] push failed: {}", self.foundation, error)),
        }
        transcript.block(&self.log);
    }
}

/// All-or-nothing verdict over results kept in configured foundation order.
///
/// The reported code is that of the first failure in list order, so the
/// verdict does not depend on the order in which pushes finished.
pub fn aggregate(results: &[FoundationResult]) -> (bool, StatusCode) {
    match results.iter().find(|r| !r.success) {
        Some(first_failure) => (false, first_failure.status),
        None => (true, StatusCode::OK),
    }
}

/// Sealed result of one orchestration
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    success: bool,
    status: StatusCode,
    transcript: Transcript,
    results: Vec<FoundationResult>,
}

impl DeploymentOutcome {
    /// A failure decided before any foundation was contacted
    pub fn rejected(status: StatusCode, message: impl AsRef<str>) -> Self {
        Self::halted(status, Transcript::default(), message)
    }

    /// Like `rejected`, keeping what the transcript already holds
    pub fn halted(status: StatusCode, mut transcript: Transcript, message: impl AsRef<str>) -> Self {
        transcript.line(message);
        Self {
            success: false,
            status,
            transcript,
            results: Vec::new(),
        }
    }

    /// Aggregate per-foundation results and seal the verdict
    pub fn seal(results: Vec<FoundationResult>, mut transcript: Transcript) -> Self {
        for result in &results {
            result.write_to(&mut transcript);
        }

        let (success, status) = aggregate(&results);
        if success {
            transcript.line(DEPLOY_SUCCESSFUL);
        } else {
            let failed = results.iter().filter(|r| !r.success).count();
            transcript.line(format!(
                "{}: {} of {} foundations failed",
                CANNOT_DEPLOY,
                failed,
                results.len()
            ));
        }

        Self {
            success,
            status,
            transcript,
            results,
        }
    }

    /// Attach an advisory note. Never changes the verdict.
    pub(crate) fn note(&mut self, message: impl AsRef<str>) {
        self.transcript.line(message);
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn results(&self) -> &[FoundationResult] {
        &self.results
    }

    pub fn into_transcript(self) -> String {
        self.transcript.into_string()
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            success: self.success,
            status_code: self.status.as_u16(),
            foundations: self
                .results
                .iter()
                .map(|r| FoundationSummary {
                    foundation: r.foundation.clone(),
                    success: r.success,
                    error: r.error.clone(),
                })
                .collect(),
        }
    }
}
