use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    // ── Input validation ─────────────────────────────────────────────────────
    #[error("null or zero-length input")]
    BadInput,

    #[error("malformed policy: {0}")]
    Malformed(String),

    #[error("unsupported hash function: {0}")]
    UnsupportedHash(String),

    #[error("parse produced more than {max} tokens")]
    ParseTooLarge { max: usize },

    // ── Admission ────────────────────────────────────────────────────────────
    #[error("envelope signature invalid")]
    BadSignature,

    #[error("declared policy_id does not match hash of normalized object")]
    IdMismatch,

    #[error("policy already stored: {0}")]
    Duplicate(String),

    #[error("no submitter public key available")]
    NoSubmitterKey,

    // ── Retrieval ────────────────────────────────────────────────────────────
    #[error("policy not found: {0}")]
    NotFound(String),

    #[error("stored record fails re-signature check: {0}")]
    IntegrityViolation(String),

    // ── Configuration / storage ──────────────────────────────────────────────
    #[error("required storage callback is not configured")]
    NotConfigured,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
