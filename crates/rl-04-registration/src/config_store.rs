//! Config Store
//!
//! Holds the issuer configuration as an immutable snapshot. Every operation
//! reads one snapshot at its start and uses it throughout, so a concurrent
//! update never changes the rules mid-operation.

use parking_lot::RwLock;
use shared_types::{IssuerConfig, IssuerConfigUpdate};
use std::sync::Arc;

pub struct ConfigStore {
    current: RwLock<Arc<IssuerConfig>>,
}

impl ConfigStore {
    pub fn new(initial: IssuerConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn snapshot(&self) -> Arc<IssuerConfig> {
        Arc::clone(&self.current.read())
    }

    /// Apply `update` and publish the result as the new snapshot.
    pub fn apply(&self, update: &IssuerConfigUpdate) -> Arc<IssuerConfig> {
        let mut current = self.current.write();
        let next = Arc::new(update.apply(&current));
        *current = Arc::clone(&next);
        next
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(IssuerConfig::default())
    }
}
