use aegis_core::types::PolicyId;
use sha2::{Digest, Sha256};

/// Compute SHA-256 of arbitrary bytes → 32-byte array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive a PolicyId from normalized policy object bytes.
pub fn policy_id_from_object(object_bytes: &[u8]) -> PolicyId {
    PolicyId::from_bytes(sha256(object_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc")
        let digest = sha256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn policy_id_tracks_content() {
        let a = policy_id_from_object(b"{\"k\":\"v\"}");
        let b = policy_id_from_object(b"{\"k\":\"w\"}");
        assert_ne!(a, b);
        assert_eq!(a, policy_id_from_object(b"{\"k\":\"v\"}"));
    }
}
