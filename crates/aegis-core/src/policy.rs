use serde::{Deserialize, Serialize};

use crate::types::{HashFn, PolicyId, PublicKey, SigAlg, Signature};

// ── PolicyRecord ─────────────────────────────────────────────────────────────

/// Persisted policy artifact.
///
/// Invariants:
///   - `id == sha256(object_bytes)`
///   - `pap_signature` verifies under the PAP module key over `id`
///   - `object_bytes` is whitespace-normalized policy JSON
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub object_bytes: Vec<u8>,
    pub pap_signature: Signature,
    pub submitter_pubkey: PublicKey,
    pub sig_alg: SigAlg,
    pub hash_fn: HashFn,
}

impl PolicyRecord {
    pub fn object_size(&self) -> usize {
        self.object_bytes.len()
    }
}

// ── Decision ─────────────────────────────────────────────────────────────────

/// Outcome of evaluating a policy against a request: `goc + 2·doc`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Decision {
    Gap = 0,
    Grant = 1,
    Deny = 2,
    Conflict = 3,
}

impl Decision {
    /// Combine the grant-on-condition and deny-on-condition verdicts.
    pub fn from_flags(goc: bool, doc: bool) -> Self {
        match (goc, doc) {
            (false, false) => Decision::Gap,
            (true, false) => Decision::Grant,
            (false, true) => Decision::Deny,
            (true, true) => Decision::Conflict,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

// ── Action ───────────────────────────────────────────────────────────────────

/// Side-effect descriptor attached to a GRANT: the nominal action name plus
/// the validity window extracted from `time`-typed leaves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub value: String,
    pub start_time: u64,
    pub stop_time: u64,
}
