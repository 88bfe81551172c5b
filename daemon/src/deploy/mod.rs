//! Deployment orchestration

pub mod cf;
pub mod fsm;
pub mod orchestrator;
pub mod outcome;
pub mod pusher;
pub mod registry;
pub mod request;
