//! Hot-reloadable risk registry snapshot.

use std::sync::{Arc, RwLock};
use steward_domain::tool::RiskRegistry;
use tracing::info;

/// Holds the current [`RiskRegistry`].
///
/// A turn takes one `Arc` snapshot and classifies all of its calls against
/// it; [`replace`](Self::replace) swaps the snapshot for later turns without
/// touching turns already running.
pub struct SharedRiskRegistry {
    current: RwLock<Arc<RiskRegistry>>,
}

impl SharedRiskRegistry {
    pub fn new(registry: RiskRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<RiskRegistry> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace(&self, registry: RiskRegistry) {
        info!("Risk registry reloaded ({} entries)", registry.len());
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(registry);
    }
}

impl Default for SharedRiskRegistry {
    fn default() -> Self {
        Self::new(RiskRegistry::builtin_defaults())
    }
}
