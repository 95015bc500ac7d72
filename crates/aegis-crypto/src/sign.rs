use aegis_core::constants::{PRIVATE_KEY_LEN, SIGNATURE_LEN};
use aegis_core::types::{PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid signature")]
    BadSignature,
    #[error("invalid secret key length: expected {expected}, got {got}")]
    InvalidSecretKeyLength { expected: usize, got: usize },
    #[error("invalid public key")]
    InvalidPublicKey,
}

impl From<CryptoError> for aegis_core::AccessError {
    fn from(_: CryptoError) -> Self {
        aegis_core::AccessError::BadSignature
    }
}

fn signing_key(secret_key_bytes: &[u8]) -> Result<SigningKey, CryptoError> {
    let arr: &[u8; PRIVATE_KEY_LEN] = secret_key_bytes.try_into().map_err(|_| {
        CryptoError::InvalidSecretKeyLength {
            expected: PRIVATE_KEY_LEN,
            got: secret_key_bytes.len(),
        }
    })?;
    SigningKey::from_keypair_bytes(arr).map_err(|_| CryptoError::BadSignature)
}

fn verifying_key(public_key: &PublicKey) -> Result<VerifyingKey, CryptoError> {
    VerifyingKey::from_bytes(public_key.as_bytes()).map_err(|_| CryptoError::InvalidPublicKey)
}

/// Sign `message` with an Ed25519 secret key (64-byte seed ∥ public layout).
/// Returns a detached signature.
pub fn sign_detached(secret_key_bytes: &[u8], message: &[u8]) -> Result<Signature, CryptoError> {
    let sk = signing_key(secret_key_bytes)?;
    let sig = sk.sign(message);
    Ok(Signature(sig.to_bytes().to_vec()))
}

/// Verify a detached Ed25519 signature.
pub fn verify_detached(
    public_key: &PublicKey,
    signature: &Signature,
    message: &[u8],
) -> Result<(), CryptoError> {
    let vk = verifying_key(public_key)?;
    let sig_bytes: &[u8; SIGNATURE_LEN] = signature
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::BadSignature)?;
    let sig = ed25519_dalek::Signature::from_bytes(sig_bytes);
    vk.verify(message, &sig).map_err(|_| CryptoError::BadSignature)
}

/// Produce an attached signature: signature bytes prepended to the message.
pub fn sign_attached(secret_key_bytes: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let sig = sign_detached(secret_key_bytes, message)?;
    let mut out = Vec::with_capacity(SIGNATURE_LEN + message.len());
    out.extend_from_slice(sig.as_bytes());
    out.extend_from_slice(message);
    Ok(out)
}

/// Verify an attached signature and return the contained plaintext.
pub fn verify_attached(
    public_key: &PublicKey,
    signed_message: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if signed_message.len() < SIGNATURE_LEN {
        return Err(CryptoError::BadSignature);
    }
    let (sig_bytes, message) = signed_message.split_at(SIGNATURE_LEN);
    let sig = Signature(sig_bytes.to_vec());
    verify_detached(public_key, &sig, message)?;
    Ok(message.to_vec())
}
