use std::collections::HashMap;
use std::sync::Mutex;

use aegis_core::error::AccessError;
use aegis_core::policy::PolicyRecord;
use aegis_core::types::PolicyId;

/// Storage contract the PAP writes through.
///
/// Implementations must not call back into the PAP: PAP operations hold the
/// module mutex across every storage call.
pub trait PolicyStore: Send + Sync {
    fn put(&self, id: &PolicyId, record: PolicyRecord) -> Result<(), AccessError>;
    fn get(&self, id: &PolicyId) -> Result<Option<PolicyRecord>, AccessError>;
    fn has(&self, id: &PolicyId) -> bool;
    fn del(&self, id: &PolicyId) -> Result<(), AccessError>;
}

/// Process-local policy store. Useful for tests and single-node deployments
/// that do not need persistence.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<PolicyId, PolicyRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PolicyStore for MemoryStore {
    fn put(&self, id: &PolicyId, record: PolicyRecord) -> Result<(), AccessError> {
        self.records
            .lock()
            .map_err(|_| AccessError::Storage("store mutex poisoned".into()))?
            .insert(*id, record);
        Ok(())
    }

    fn get(&self, id: &PolicyId) -> Result<Option<PolicyRecord>, AccessError> {
        Ok(self
            .records
            .lock()
            .map_err(|_| AccessError::Storage("store mutex poisoned".into()))?
            .get(id)
            .cloned())
    }

    fn has(&self, id: &PolicyId) -> bool {
        self.records
            .lock()
            .map(|m| m.contains_key(id))
            .unwrap_or(false)
    }

    fn del(&self, id: &PolicyId) -> Result<(), AccessError> {
        self.records
            .lock()
            .map_err(|_| AccessError::Storage("store mutex poisoned".into()))?
            .remove(id);
        Ok(())
    }
}
