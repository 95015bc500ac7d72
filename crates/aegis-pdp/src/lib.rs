//! aegis-pdp
//!
//! Policy Decision Point: parses a request, fetches its policy through the
//! PAP, evaluates the grant/deny expression trees against PIP-resolved
//! attributes and resolves the matching obligation subtree.

pub mod eval;
pub mod obligation;
pub mod pdp;
pub mod pep;
pub mod pip;
pub mod window;

pub use pdp::{DecisionOutcome, Pdp, PdpError};
pub use pep::{LogPep, Pep};
pub use pip::{NullPip, Pip, PipLookup};
