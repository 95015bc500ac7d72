use crate::token::{Token, TokenKind};
use crate::tokenizer::{tokenize, JsonError};

/// An indexable token view over immutable JSON text.
///
/// All queries are positional: they return token indices, and token text is
/// sliced straight out of the source. The view never mutates or copies the
/// text.
pub struct JsonView<'a> {
    src: &'a [u8],
    tokens: Vec<Token>,
}

impl<'a> JsonView<'a> {
    pub fn parse(src: &'a [u8]) -> Result<Self, JsonError> {
        let tokens = tokenize(src)?;
        Ok(Self { src, tokens })
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, idx: usize) -> &Token {
        &self.tokens[idx]
    }

    /// Byte span of a token within the source.
    pub fn token_range(&self, idx: usize) -> (usize, usize) {
        let t = &self.tokens[idx];
        (t.start, t.end)
    }

    /// Raw text of a token.
    pub fn token_bytes(&self, idx: usize) -> &'a [u8] {
        let t = &self.tokens[idx];
        &self.src[t.start..t.end]
    }

    /// Find the first key named `name` at or after token index `from`,
    /// returning the index of its *value* token.
    ///
    /// The search is global: the caller is responsible for span checks when
    /// the key must lie inside a particular subtree.
    pub fn find_key_from(&self, from: usize, name: &str) -> Option<usize> {
        let needle = name.as_bytes();
        for i in from..self.tokens.len() {
            if self.tokens[i].is_key() && self.token_bytes(i) == needle {
                return Some(i + 1);
            }
        }
        None
    }

    /// Find a key's value starting the search at the root.
    pub fn find_key(&self, name: &str) -> Option<usize> {
        self.find_key_from(0, name)
    }

    /// Find a key's value inside the subtree rooted at `node`: the search
    /// starts past `node` and the value must begin before `node` ends.
    pub fn find_key_within(&self, node: usize, name: &str) -> Option<usize> {
        let end = self.tokens[node].end;
        let value = self.find_key_from(node + 1, name)?;
        if self.tokens[value].start < end {
            Some(value)
        } else {
            None
        }
    }

    /// Number of members of an array token (0 for non-arrays).
    pub fn array_size(&self, idx: usize) -> usize {
        match self.tokens[idx].kind {
            TokenKind::Array => self.tokens[idx].size,
            _ => 0,
        }
    }

    /// Index of the n-th member of an array token.
    pub fn array_member(&self, idx: usize, n: usize) -> Option<usize> {
        if self.tokens[idx].kind != TokenKind::Array {
            return None;
        }
        let mut seen = 0;
        for j in idx + 1..self.tokens.len() {
            if self.tokens[j].start >= self.tokens[idx].end {
                break;
            }
            if self.tokens[j].parent == Some(idx) {
                if seen == n {
                    return Some(j);
                }
                seen += 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &[u8] =
        br#"{"policy_id":"ab","policy_object":{"inner":[{"type":"boolean","value":"true"},2]}}"#;

    #[test]
    fn find_key_returns_value_index() {
        let view = JsonView::parse(SRC).unwrap();
        let v = view.find_key("policy_id").unwrap();
        assert_eq!(view.token_bytes(v), b"ab");
    }

    #[test]
    fn find_key_within_respects_span() {
        let view = JsonView::parse(SRC).unwrap();
        let obj = view.find_key("policy_object").unwrap();
        assert!(view.find_key_within(obj, "type").is_some());
        // policy_id lies before policy_object; not within its span
        assert!(view.find_key_within(obj, "policy_id").is_none());
    }

    #[test]
    fn array_queries() {
        let view = JsonView::parse(SRC).unwrap();
        let arr = view.find_key("inner").unwrap();
        assert_eq!(view.array_size(arr), 2);
        let first = view.array_member(arr, 0).unwrap();
        assert!(view.find_key_within(first, "value").is_some());
        let second = view.array_member(arr, 1).unwrap();
        assert_eq!(view.token_bytes(second), b"2");
        assert!(view.array_member(arr, 2).is_none());
    }

    #[test]
    fn duplicate_keys_found_in_order() {
        let src = br#"{"obligations":{"a":1},"obligations":{"b":2}}"#;
        let view = JsonView::parse(src).unwrap();
        let first = view.find_key("obligations").unwrap();
        let second = view.find_key_from(first + 1, "obligations").unwrap();
        assert!(second > first);
        assert!(view.find_key_within(first, "a").is_some());
        assert!(view.find_key_within(second, "b").is_some());
    }

    #[test]
    fn value_strings_are_not_keys() {
        // "operation" as a VALUE must not be picked up by key search.
        let src = br#"{"note":"operation","operation":"and"}"#;
        let view = JsonView::parse(src).unwrap();
        let v = view.find_key("operation").unwrap();
        assert_eq!(view.token_bytes(v), b"and");
    }

    #[test]
    fn token_range_matches_bytes() {
        let view = JsonView::parse(SRC).unwrap();
        let v = view.find_key("policy_id").unwrap();
        let (s, e) = view.token_range(v);
        assert_eq!(&SRC[s..e], b"ab");
    }
}
