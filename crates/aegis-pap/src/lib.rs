//! aegis-pap
//!
//! Policy Administration Point: admits signed policies, content-addresses
//! them, re-signs them under the module key and hands them to storage;
//! retrieval re-checks the stored bytes against that signature.

pub mod keys;
pub mod pap;
pub mod store;

pub use keys::{StaticKeys, SubmitterKeys, TcpKeyService};
pub use pap::{normalize_object, Pap};
pub use store::{MemoryStore, PolicyStore};
