//! aegis-json
//!
//! A zero-copy JSON view: a bounded tokenizer producing an indexable token
//! array over immutable source text, plus positional queries. Values are
//! never materialized; numeric and boolean leaves compare as text.

pub mod token;
pub mod tokenizer;
pub mod view;

pub use token::{Token, TokenKind};
pub use tokenizer::{tokenize, JsonError};
pub use view::JsonView;
