//! Server state

use std::sync::Arc;

use crate::deploy::orchestrator::Deployer;
use crate::fetch::ArtifactFetcher;

/// Server state shared across handlers
pub struct ServerState {
    pub deployer: Arc<dyn Deployer>,
    /// Unpacks archive uploads before they reach the deployer
    pub fetcher: Arc<dyn ArtifactFetcher>,
}

impl ServerState {
    pub fn new(deployer: Arc<dyn Deployer>, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self { deployer, fetcher }
    }
}
