//! In-process event fan-out

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::events::{DeployEvent, EventKind, EventNotifier, HookError};

/// A registered listener
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn on_event(&self, event: &DeployEvent) -> Result<(), HookError>;
}

/// Listeners keyed by event kind, called in registration order.
///
/// Registration happens while wiring the daemon; afterwards the manager is
/// shared read-only.
#[derive(Default)]
pub struct EventManager {
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Register for several kinds; an empty list means every kind
    pub fn register_for(&mut self, kinds: &[EventKind], handler: Arc<dyn EventHandler>) {
        let kinds: &[EventKind] = if kinds.is_empty() {
            &EventKind::ALL
        } else {
            kinds
        };
        for kind in kinds {
            self.register(*kind, handler.clone());
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

#[async_trait]
impl EventNotifier for EventManager {
    async fn notify(&self, event: &DeployEvent) -> Result<(), HookError> {
        let Some(handlers) = self.handlers.get(&event.kind) else {
            return Ok(());
        };

        for handler in handlers {
            debug!(
                "Delivering {} for deployment {} to {}",
                event.kind,
                event.request.deployment_id,
                handler.name()
            );
            if let Err(e) = handler.on_event(event).await {
                warn!("{} listener {} failed: {}", event.kind, handler.name(), e);
                return Err(e);
            }
        }
        Ok(())
    }
}
