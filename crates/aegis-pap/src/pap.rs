use std::sync::{Arc, Mutex};

use aegis_core::constants::HASH_FN_SHA256;
use aegis_core::error::AccessError;
use aegis_core::policy::PolicyRecord;
use aegis_core::types::{HashFn, PolicyId, PublicKey, SigAlg};
use aegis_crypto::hash::sha256;
use aegis_crypto::sign::verify_attached;
use aegis_crypto::KeyPair;
use aegis_json::JsonView;
use tracing::{debug, info, warn};

use crate::keys::SubmitterKeys;
use crate::store::PolicyStore;

/// Strip ASCII whitespace (space, tab, CR, LF) from policy object bytes.
/// The result is the canonical form the policy id commits to.
pub fn normalize_object(object: &[u8]) -> Vec<u8> {
    object
        .iter()
        .copied()
        .filter(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .collect()
}

struct PapInner {
    keys: KeyPair,
    store: Option<Arc<dyn PolicyStore>>,
}

/// Policy Administration Point.
///
/// One mutex guards every public operation for its full duration, storage
/// calls included; the installed store must never call back into the PAP.
pub struct Pap {
    submitter_keys: Arc<dyn SubmitterKeys>,
    inner: Mutex<PapInner>,
}

impl Pap {
    /// Generate a fresh module keypair. Keys live for the lifetime of the
    /// process; there is no persistence or rotation.
    pub fn new(submitter_keys: Arc<dyn SubmitterKeys>) -> Self {
        Self {
            submitter_keys,
            inner: Mutex::new(PapInner {
                keys: KeyPair::generate(),
                store: None,
            }),
        }
    }

    /// The module public key records are re-signed under.
    pub fn module_public_key(&self) -> PublicKey {
        self.lock().keys.public_key
    }

    /// Install the storage backend. Replaces any previous one.
    pub fn register_store(&self, store: Arc<dyn PolicyStore>) {
        self.lock().store = Some(store);
    }

    /// Drop the storage backend; storage-requiring operations return
    /// `NotConfigured` until a new one is registered.
    pub fn unregister_store(&self) {
        self.lock().store = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PapInner> {
        // A poisoned lock only marks a panic in an earlier call; the inner
        // state is plain data and stays usable.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Admit a signed policy envelope: signature ∥ policy JSON.
    ///
    /// Verifies the submitter signature, normalizes the policy object,
    /// cross-checks the declared content address, re-signs the id under the
    /// module key and hands the record to storage. State is untouched on
    /// every failure path.
    pub fn add_policy(&self, envelope: &[u8]) -> Result<PolicyId, AccessError> {
        if envelope.is_empty() {
            return Err(AccessError::BadInput);
        }

        let inner = self.lock();

        let submitter_pk = self.submitter_keys.fetch_public_key()?;
        let policy_json = verify_attached(&submitter_pk, envelope)
            .map_err(|_| AccessError::BadSignature)?;

        let view = JsonView::parse(&policy_json)?;

        let id_tok = view
            .find_key("policy_id")
            .ok_or_else(|| AccessError::Malformed("missing policy_id".into()))?;
        let id_text = std::str::from_utf8(view.token_bytes(id_tok))
            .map_err(|_| AccessError::Malformed("policy_id is not utf-8".into()))?;
        let declared_id = PolicyId::from_hex(id_text)?;

        let hash_tok = view
            .find_key("hash_function")
            .ok_or_else(|| AccessError::Malformed("missing hash_function".into()))?;
        let hash_name = view.token_bytes(hash_tok);
        if hash_name != HASH_FN_SHA256.as_bytes() {
            return Err(AccessError::UnsupportedHash(
                String::from_utf8_lossy(hash_name).into_owned(),
            ));
        }

        let object_tok = view
            .find_key("policy_object")
            .ok_or_else(|| AccessError::Malformed("missing policy_object".into()))?;
        let object_bytes = normalize_object(view.token_bytes(object_tok));
        if object_bytes.is_empty() {
            return Err(AccessError::Malformed("empty policy_object".into()));
        }

        let computed_id = PolicyId::from_bytes(sha256(&object_bytes));
        if computed_id != declared_id {
            return Err(AccessError::IdMismatch);
        }

        let store = inner.store.as_ref().ok_or(AccessError::NotConfigured)?;
        if store.has(&declared_id) {
            return Err(AccessError::Duplicate(declared_id.to_hex()));
        }

        let pap_signature = inner.keys.sign_detached(declared_id.as_bytes());
        let record = PolicyRecord {
            id: declared_id,
            object_bytes,
            pap_signature,
            submitter_pubkey: submitter_pk,
            sig_alg: SigAlg::Ed25519,
            hash_fn: HashFn::Sha256,
        };
        let object_size = record.object_size();
        store.put(&declared_id, record)?;

        info!(policy_id = %declared_id, object_size, "policy admitted");
        Ok(declared_id)
    }

    /// Retrieve a policy record and re-validate it.
    ///
    /// The check re-signs the recomputed content hash under the module key
    /// and byte-compares against the stored signature; Ed25519 is
    /// deterministic, so this is equivalent to `verify_detached`. A
    /// non-deterministic scheme must switch to verification.
    pub fn get_policy(&self, id_hex: &str) -> Result<PolicyRecord, AccessError> {
        if id_hex.is_empty() {
            return Err(AccessError::BadInput);
        }
        let id = PolicyId::from_hex(id_hex)?;

        let inner = self.lock();
        let store = inner.store.as_ref().ok_or(AccessError::NotConfigured)?;
        let record = store
            .get(&id)?
            .ok_or_else(|| AccessError::NotFound(id.to_hex()))?;

        match (record.sig_alg, record.hash_fn) {
            (SigAlg::Ed25519, HashFn::Sha256) => {}
            _ => {
                warn!(policy_id = %id, "record carries an unsupported scheme tag");
                return Err(AccessError::IntegrityViolation(id.to_hex()));
            }
        }

        let check_id = sha256(&record.object_bytes);
        let expected = inner.keys.sign_detached(&check_id);
        if expected != record.pap_signature {
            warn!(policy_id = %id, "stored record fails re-signature check");
            return Err(AccessError::IntegrityViolation(id.to_hex()));
        }

        debug!(policy_id = %id, "policy retrieved");
        Ok(record)
    }

    /// Whether a policy with this id is stored.
    pub fn has_policy(&self, id_hex: &str) -> Result<bool, AccessError> {
        if id_hex.is_empty() {
            return Err(AccessError::BadInput);
        }
        let id = PolicyId::from_hex(id_hex)?;

        let inner = self.lock();
        let store = inner.store.as_ref().ok_or(AccessError::NotConfigured)?;
        Ok(store.has(&id))
    }

    /// Delete a stored policy.
    pub fn remove_policy(&self, id_hex: &str) -> Result<(), AccessError> {
        if id_hex.is_empty() {
            return Err(AccessError::BadInput);
        }
        let id = PolicyId::from_hex(id_hex)?;

        let inner = self.lock();
        let store = inner.store.as_ref().ok_or(AccessError::NotConfigured)?;
        if !store.has(&id) {
            return Err(AccessError::NotFound(id.to_hex()));
        }
        store.del(&id)?;

        info!(policy_id = %id, "policy removed");
        Ok(())
    }
}
