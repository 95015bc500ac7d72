use std::path::Path;

use aegis_core::error::AccessError;
use aegis_core::policy::PolicyRecord;
use aegis_core::types::PolicyId;
use aegis_pap::store::PolicyStore;

/// Persistent policy store backed by sled.
///
/// Named trees:
///   policies — PolicyId bytes → bincode(PolicyRecord)
pub struct SledStore {
    _db: sled::Db,
    policies: sled::Tree,
}

impl SledStore {
    /// Open or create the policy database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AccessError> {
        let db = sled::open(path).map_err(|e| AccessError::Storage(e.to_string()))?;
        let policies = db
            .open_tree("policies")
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        Ok(Self { _db: db, policies })
    }

    /// Open a temporary database that is discarded on drop. For tests.
    pub fn temporary() -> Result<Self, AccessError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        let policies = db
            .open_tree("policies")
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        Ok(Self { _db: db, policies })
    }

    /// Count stored policies.
    pub fn count(&self) -> u64 {
        self.policies.len() as u64
    }

    /// Return every stored policy id.
    pub fn ids(&self) -> Result<Vec<PolicyId>, AccessError> {
        let mut out = Vec::new();
        for item in self.policies.iter() {
            let (key, _) = item.map_err(|e| AccessError::Storage(e.to_string()))?;
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&key);
            out.push(PolicyId::from_bytes(arr));
        }
        Ok(out)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), AccessError> {
        self._db
            .flush()
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl PolicyStore for SledStore {
    fn put(&self, id: &PolicyId, record: PolicyRecord) -> Result<(), AccessError> {
        let bytes = bincode::serialize(&record)
            .map_err(|e| AccessError::Serialization(e.to_string()))?;
        self.policies
            .insert(id.as_bytes(), bytes)
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        Ok(())
    }

    fn get(&self, id: &PolicyId) -> Result<Option<PolicyRecord>, AccessError> {
        match self
            .policies
            .get(id.as_bytes())
            .map_err(|e| AccessError::Storage(e.to_string()))?
        {
            Some(bytes) => {
                let record = bincode::deserialize(&bytes)
                    .map_err(|e| AccessError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn has(&self, id: &PolicyId) -> bool {
        self.policies.contains_key(id.as_bytes()).unwrap_or(false)
    }

    fn del(&self, id: &PolicyId) -> Result<(), AccessError> {
        self.policies
            .remove(id.as_bytes())
            .map_err(|e| AccessError::Storage(e.to_string()))?;
        Ok(())
    }
}
