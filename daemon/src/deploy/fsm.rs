//! Finite state machine for one orchestration

use serde::Serialize;

/// Orchestration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationState {
    /// Request accepted, nothing done yet
    Received,
    /// Refused before any side effect (bad input or unknown environment)
    Rejected,
    /// Fetching the remote artifact
    ResolvingArtifact,
    /// The artifact could not be materialized
    ResolutionFailed,
    /// A local artifact is ready
    Resolved,
    /// Pre-deploy listeners are running
    PreEventPhase,
    /// A pre-deploy listener refused the deployment
    Vetoed,
    /// Pushing to foundations
    Dispatching,
    /// Combining per-foundation results
    Aggregating,
    /// Post-deploy listeners are running
    PostEventPhase,
    /// Outcome sealed and reported
    Completed,
}

impl OrchestrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestrationState::Rejected
                | OrchestrationState::ResolutionFailed
                | OrchestrationState::Vetoed
                | OrchestrationState::Completed
        )
    }
}

/// Orchestration event
#[derive(Debug, Clone)]
pub enum OrchestrationEvent {
    Reject(String),
    StartResolution,
    ResolutionFailed(String),
    ArtifactReady,
    Announce,
    Veto(String),
    Dispatch,
    Aggregate,
    Conclude,
    Complete,
}

/// Orchestration FSM. States are never re-entered and there are no retries.
#[derive(Debug, Clone)]
pub struct OrchestrationFsm {
    state: OrchestrationState,
    error: Option<String>,
}

impl OrchestrationFsm {
    pub fn new() -> Self {
        Self {
            state: OrchestrationState::Received,
            error: None,
        }
    }

    pub fn state(&self) -> OrchestrationState {
        self.state
    }

    /// Reason for a terminal failure state
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: OrchestrationEvent) -> Result<(), String> {
        use OrchestrationEvent as E;
        use OrchestrationState as S;

        let new_state = match (self.state, event) {
            (S::Received, E::Reject(err)) | (S::Resolved, E::Reject(err)) => {
                self.error = Some(err);
                S::Rejected
            }
            (S::Received, E::StartResolution) => S::ResolvingArtifact,
            // Archive uploads arrive already resolved
            (S::Received, E::ArtifactReady) => S::Resolved,

            (S::ResolvingArtifact, E::ArtifactReady) => S::Resolved,
            (S::ResolvingArtifact, E::ResolutionFailed(err)) => {
                self.error = Some(err);
                S::ResolutionFailed
            }

            (S::Resolved, E::Announce) => S::PreEventPhase,

            (S::PreEventPhase, E::Veto(err)) => {
                self.error = Some(err);
                S::Vetoed
            }
            (S::PreEventPhase, E::Dispatch) => S::Dispatching,

            (S::Dispatching, E::Aggregate) => S::Aggregating,
            (S::Aggregating, E::Conclude) => S::PostEventPhase,
            (S::PostEventPhase, E::Complete) => S::Completed,

            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for OrchestrationFsm {
    fn default() -> Self {
        Self::new()
    }
}
