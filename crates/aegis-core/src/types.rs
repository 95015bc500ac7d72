use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{POL_ID_HEX_LEN, POL_ID_LEN, PUBLIC_KEY_LEN, SIGNATURE_LEN};
use crate::error::AccessError;

// ── PolicyId ─────────────────────────────────────────────────────────────────

/// 32-byte content address of a policy: SHA-256 of the normalized
/// `policy_object` bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId(pub [u8; POL_ID_LEN]);

impl PolicyId {
    pub fn from_bytes(b: [u8; POL_ID_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; POL_ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-char hex string. Any other length is `Malformed`.
    pub fn from_hex(s: &str) -> Result<Self, AccessError> {
        if s.len() != POL_ID_HEX_LEN {
            return Err(AccessError::Malformed(format!(
                "policy id must be {POL_ID_HEX_LEN} hex chars, got {}",
                s.len()
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| AccessError::Malformed(format!("policy id hex: {e}")))?;
        let mut arr = [0u8; POL_ID_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolicyId({}…)", &self.to_hex()[..16])
    }
}

// ── PublicKey ────────────────────────────────────────────────────────────────

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub fn from_bytes(b: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &hex::encode(&self.0)[..16])
    }
}

// ── Signature ────────────────────────────────────────────────────────────────

/// Ed25519 detached signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    /// Wrap raw signature bytes, enforcing the fixed length.
    pub fn from_bytes(b: Vec<u8>) -> Result<Self, AccessError> {
        if b.len() != SIGNATURE_LEN {
            return Err(AccessError::Malformed(format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                b.len()
            )));
        }
        Ok(Self(b))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}b)", self.0.len())
    }
}

// ── Scheme tags ──────────────────────────────────────────────────────────────

/// Signature algorithm tag stored with each record. Only Ed25519 is wired up;
/// Ecdsa is reserved for future schemes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SigAlg {
    Ed25519,
    Ecdsa,
}

/// Hash function tag. SHA-256 is the only supported digest; the id width of
/// `PolicyId` is tied to it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum HashFn {
    Sha256,
}

impl HashFn {
    /// The name used in policy JSON (`"hash_function"` field).
    pub fn wire_name(&self) -> &'static str {
        match self {
            HashFn::Sha256 => crate::constants::HASH_FN_SHA256,
        }
    }
}
