//! ─── Aegis Protocol Constants ───────────────────────────────────────────────
//!
//! Wire sizes, parser bounds and service defaults shared by the PAP and PDP.

// ── Signature scheme (Ed25519) ───────────────────────────────────────────────

/// Module / submitter public key length in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Secret key length in bytes (seed ∥ public key, NaCl layout).
pub const PRIVATE_KEY_LEN: usize = 64;

/// Detached signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

// ── Content addressing ───────────────────────────────────────────────────────

/// Policy id length in bytes: one SHA-256 digest.
pub const POL_ID_LEN: usize = 32;

/// Policy id length as hex text.
pub const POL_ID_HEX_LEN: usize = POL_ID_LEN * 2;

/// Wire name of the only supported hash function.
pub const HASH_FN_SHA256: &str = "sha-256";

// ── JSON view ────────────────────────────────────────────────────────────────

/// Upper bound on tokens produced by a single parse. A policy that needs more
/// is rejected with `ParseTooLarge`.
pub const MAX_TOKENS: usize = 1024;

// ── Evaluator ────────────────────────────────────────────────────────────────

/// Maximum expression-tree recursion depth. Deeper policies evaluate to an
/// error leaf, which collapses the enclosing node to false.
pub const MAX_EVAL_DEPTH: usize = 32;

/// Maximum obligation payload copied out of a policy, in bytes.
pub const OBLIGATION_LEN: usize = 15;

/// Cap on a PIP-resolved attribute value.
pub const DATA_VALUE_MAX: usize = 130;

/// Cap on a PIP-resolved attribute type.
pub const DATA_TYPE_MAX: usize = 20;

// ── Subject-pubkey service ───────────────────────────────────────────────────

/// Default TCP port of the subject-pubkey service.
pub const KEY_SERVICE_PORT: u16 = 9998;

/// Wire request literal. Historic: the response is a *public* key, but the
/// deployed service matches on this exact string, so it stays.
pub const KEY_SERVICE_REQUEST: &[u8] = b"get_private_key";

/// Total retry budget when the service is slow to answer, in seconds.
pub const KEY_SERVICE_RETRY_SECS: u64 = 10;
