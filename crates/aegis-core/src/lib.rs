pub mod constants;
pub mod error;
pub mod policy;
pub mod types;

pub use constants::*;
pub use error::AccessError;
pub use policy::{Action, Decision, PolicyRecord};
pub use types::*;
