/// Kind of a lexical token. Strings exclude their quotes; primitives span
/// numbers, booleans and null verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Object,
    Array,
    String,
    Primitive,
}

/// One token over the source text.
///
/// `parent` links follow the jsmn model: an object key's parent is the
/// object, a value's parent is its key, an array member's parent is the
/// array. `size` counts direct children (pairs for objects, members for
/// arrays, 1 for a key string).
#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub parent: Option<usize>,
    pub size: usize,
}

impl Token {
    /// True for a string token in key position.
    pub fn is_key(&self) -> bool {
        self.kind == TokenKind::String && self.size == 1
    }
}
