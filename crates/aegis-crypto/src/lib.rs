pub mod hash;
pub mod keypair;
pub mod sign;

pub use hash::{policy_id_from_object, sha256};
pub use keypair::KeyPair;
pub use sign::{sign_attached, sign_detached, verify_attached, verify_detached, CryptoError};
