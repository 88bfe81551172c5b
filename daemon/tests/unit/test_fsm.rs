//! FSM unit tests

use pushgate::deploy::fsm::{OrchestrationEvent, OrchestrationFsm, OrchestrationState};

#[test]
fn test_fsm_initial_state() {
    let fsm = OrchestrationFsm::new();
    assert_eq!(fsm.state(), OrchestrationState::Received);
    assert!(!fsm.state().is_terminal());
    assert!(fsm.error().is_none());
}

#[test]
fn test_fsm_archive_flow() {
    let mut fsm = OrchestrationFsm::new();

    // Uploads skip resolution
    fsm.process(OrchestrationEvent::ArtifactReady).unwrap();
    assert_eq!(fsm.state(), OrchestrationState::Resolved);

    fsm.process(OrchestrationEvent::Announce).unwrap();
    assert_eq!(fsm.state(), OrchestrationState::PreEventPhase);

    fsm.process(OrchestrationEvent::Dispatch).unwrap();
    assert_eq!(fsm.state(), OrchestrationState::Dispatching);

    fsm.process(OrchestrationEvent::Aggregate).unwrap();
    fsm.process(OrchestrationEvent::Conclude).unwrap();
    assert_eq!(fsm.state(), OrchestrationState::PostEventPhase);

    fsm.process(OrchestrationEvent::Complete).unwrap();
    assert_eq!(fsm.state(), OrchestrationState::Completed);
}

#[test]
fn test_fsm_veto_records_reason() {
    let mut fsm = OrchestrationFsm::new();
    fsm.process(OrchestrationEvent::ArtifactReady).unwrap();
    fsm.process(OrchestrationEvent::Announce).unwrap();
    fsm.process(OrchestrationEvent::Veto("change freeze".to_string()))
        .unwrap();

    assert_eq!(fsm.state(), OrchestrationState::Vetoed);
    assert!(fsm.state().is_terminal());
    assert_eq!(fsm.error(), Some("change freeze"));
    assert!(fsm.process(OrchestrationEvent::Dispatch).is_err());
}

#[test]
fn test_fsm_reject_unknown_environment() {
    let mut fsm = OrchestrationFsm::new();
    fsm.process(OrchestrationEvent::ArtifactReady).unwrap();
    fsm.process(OrchestrationEvent::Reject("environment 'x' not found".to_string()))
        .unwrap();

    assert_eq!(fsm.state(), OrchestrationState::Rejected);
    assert_eq!(fsm.error(), Some("environment 'x' not found"));
}

#[test]
fn test_fsm_cannot_skip_phases() {
    let mut fsm = OrchestrationFsm::new();

    // No dispatch before the start event phase
    assert!(fsm.process(OrchestrationEvent::Dispatch).is_err());
    assert_eq!(fsm.state(), OrchestrationState::Received);

    fsm.process(OrchestrationEvent::StartResolution).unwrap();
    assert!(fsm.process(OrchestrationEvent::Announce).is_err());
    assert_eq!(fsm.state(), OrchestrationState::ResolvingArtifact);
}

#[test]
fn test_fsm_completed_is_final() {
    let mut fsm = OrchestrationFsm::new();
    for event in [
        OrchestrationEvent::ArtifactReady,
        OrchestrationEvent::Announce,
        OrchestrationEvent::Dispatch,
        OrchestrationEvent::Aggregate,
        OrchestrationEvent::Conclude,
        OrchestrationEvent::Complete,
    ] {
        fsm.process(event).unwrap();
    }

    assert!(fsm.process(OrchestrationEvent::Complete).is_err());
    assert!(fsm.process(OrchestrationEvent::Reject("late".to_string())).is_err());
    assert_eq!(fsm.state(), OrchestrationState::Completed);
    assert!(fsm.error().is_none());
}
