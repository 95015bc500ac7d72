/// Result of asking the PIP to resolve an attribute reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipLookup {
    /// The reference is not a reference at all; use the policy text as-is.
    Literal,
    /// The reference names a subject attribute. The evaluator mirrors the
    /// counterpart operand's text instead. Historical stopgap from before
    /// the PIP could return subject values itself; preserved for
    /// compatibility with existing policies.
    Subject,
    /// The reference resolved to these bytes.
    Resolved(Vec<u8>),
}

/// Policy Information Point: resolves dynamic attribute references during
/// evaluation. Called once for an operand's value text and once for its type
/// text; implementations decide which texts are references.
///
/// `decide` blocks on these calls; implementations own their transport
/// timeouts.
pub trait Pip: Send + Sync {
    fn resolve(&self, url: &[u8]) -> PipLookup;
}

/// A PIP with no dynamic sources: every reference is a literal.
pub struct NullPip;

impl Pip for NullPip {
    fn resolve(&self, _url: &[u8]) -> PipLookup {
        PipLookup::Literal
    }
}
