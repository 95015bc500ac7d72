use aegis_core::types::{PublicKey, Signature};
use ed25519_dalek::SigningKey;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::sign::{sign_attached, sign_detached};

/// An Aegis module keypair: Ed25519 public + secret keys.
///
/// The secret key is held in NaCl keypair layout (seed ∥ public, 64 bytes)
/// and wiped on drop.
#[derive(Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: PublicKey,
    secret_key: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh Ed25519 keypair.
    pub fn generate() -> Self {
        let sk = SigningKey::generate(&mut OsRng);
        Self {
            public_key: PublicKey::from_bytes(sk.verifying_key().to_bytes()),
            secret_key: sk.to_keypair_bytes().to_vec(),
        }
    }

    /// Sign `message`, returning a detached signature.
    pub fn sign_detached(&self, message: &[u8]) -> Signature {
        let sk = Zeroizing::new(self.secret_key.clone());
        sign_detached(&sk, message).expect("sign with valid secret key is infallible")
    }

    /// Sign `message`, returning signature ∥ message.
    pub fn sign_attached(&self, message: &[u8]) -> Vec<u8> {
        let sk = Zeroizing::new(self.secret_key.clone());
        sign_attached(&sk, message).expect("sign with valid secret key is infallible")
    }

    /// Return a read-only view of the secret key bytes.
    pub fn secret_key_bytes(&self) -> &[u8] {
        &self.secret_key
    }

    /// Restore a KeyPair from raw 64-byte keypair material.
    pub fn from_raw(pk: PublicKey, sk_bytes: Vec<u8>) -> Self {
        Self {
            public_key: pk,
            secret_key: sk_bytes,
        }
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ public_key: {:?} }}", self.public_key)
    }
}
