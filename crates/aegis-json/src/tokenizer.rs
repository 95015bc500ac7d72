use aegis_core::constants::MAX_TOKENS;
use thiserror::Error;

use crate::token::{Token, TokenKind};

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("parse produced more than {max} tokens")]
    ParseTooLarge { max: usize },

    #[error("unexpected byte at offset {pos}")]
    Unexpected { pos: usize },

    #[error("unterminated string starting at offset {pos}")]
    UnterminatedString { pos: usize },

    #[error("unexpected end of input")]
    Eof,
}

impl From<JsonError> for aegis_core::AccessError {
    fn from(e: JsonError) -> Self {
        match e {
            JsonError::ParseTooLarge { max } => aegis_core::AccessError::ParseTooLarge { max },
            other => aegis_core::AccessError::Malformed(other.to_string()),
        }
    }
}

/// Tokenize `src` into a bounded token array. The source is never copied or
/// mutated; tokens carry byte offsets into it.
pub fn tokenize(src: &[u8]) -> Result<Vec<Token>, JsonError> {
    let mut t = Tokenizer {
        src,
        pos: 0,
        tokens: Vec::new(),
    };
    t.skip_whitespace();
    t.parse_value(None)?;
    t.skip_whitespace();
    if t.pos != src.len() {
        return Err(JsonError::Unexpected { pos: t.pos });
    }
    Ok(t.tokens)
}

struct Tokenizer<'a> {
    src: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn push(&mut self, token: Token) -> Result<usize, JsonError> {
        if self.tokens.len() >= MAX_TOKENS {
            return Err(JsonError::ParseTooLarge { max: MAX_TOKENS });
        }
        self.tokens.push(token);
        Ok(self.tokens.len() - 1)
    }

    fn expect(&mut self, byte: u8) -> Result<(), JsonError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(JsonError::Unexpected { pos: self.pos }),
            None => Err(JsonError::Eof),
        }
    }

    fn parse_value(&mut self, parent: Option<usize>) -> Result<usize, JsonError> {
        match self.peek() {
            Some(b'{') => self.parse_object(parent),
            Some(b'[') => self.parse_array(parent),
            Some(b'"') => self.parse_string(parent),
            Some(b) if is_primitive_byte(b) => self.parse_primitive(parent),
            Some(_) => Err(JsonError::Unexpected { pos: self.pos }),
            None => Err(JsonError::Eof),
        }
    }

    fn parse_object(&mut self, parent: Option<usize>) -> Result<usize, JsonError> {
        let start = self.pos;
        self.expect(b'{')?;
        let idx = self.push(Token {
            kind: TokenKind::Object,
            start,
            end: 0,
            parent,
            size: 0,
        })?;

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.tokens[idx].end = self.pos;
            return Ok(idx);
        }

        loop {
            self.skip_whitespace();
            let key = self.parse_string(Some(idx))?;
            self.tokens[key].size = 1;
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();
            self.parse_value(Some(key))?;
            self.tokens[idx].size += 1;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(JsonError::Unexpected { pos: self.pos }),
                None => return Err(JsonError::Eof),
            }
        }
        self.tokens[idx].end = self.pos;
        Ok(idx)
    }

    fn parse_array(&mut self, parent: Option<usize>) -> Result<usize, JsonError> {
        let start = self.pos;
        self.expect(b'[')?;
        let idx = self.push(Token {
            kind: TokenKind::Array,
            start,
            end: 0,
            parent,
            size: 0,
        })?;

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.tokens[idx].end = self.pos;
            return Ok(idx);
        }

        loop {
            self.skip_whitespace();
            self.parse_value(Some(idx))?;
            self.tokens[idx].size += 1;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(JsonError::Unexpected { pos: self.pos }),
                None => return Err(JsonError::Eof),
            }
        }
        self.tokens[idx].end = self.pos;
        Ok(idx)
    }

    /// Token spans the string contents, quotes excluded. Escapes are skipped,
    /// not decoded; the view compares raw text.
    fn parse_string(&mut self, parent: Option<usize>) -> Result<usize, JsonError> {
        let quote_pos = self.pos;
        self.expect(b'"')?;
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let end = self.pos;
                    self.pos += 1;
                    return self.push(Token {
                        kind: TokenKind::String,
                        start,
                        end,
                        parent,
                        size: 0,
                    });
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'u') => {
                            // \uXXXX
                            if self.pos + 5 > self.src.len() {
                                return Err(JsonError::UnterminatedString { pos: quote_pos });
                            }
                            self.pos += 5;
                        }
                        Some(_) => self.pos += 1,
                        None => {
                            return Err(JsonError::UnterminatedString { pos: quote_pos })
                        }
                    }
                }
                Some(_) => self.pos += 1,
                None => return Err(JsonError::UnterminatedString { pos: quote_pos }),
            }
        }
    }

    fn parse_primitive(&mut self, parent: Option<usize>) -> Result<usize, JsonError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_primitive_byte(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(JsonError::Unexpected { pos: start });
        }
        self.push(Token {
            kind: TokenKind::Primitive,
            start,
            end: self.pos,
            parent,
            size: 0,
        })
    }
}

fn is_primitive_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_flat_object() {
        let tokens = tokenize(br#"{"a":"b","n":42}"#).unwrap();
        // object, key a, value b, key n, value 42
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].kind, TokenKind::Object);
        assert_eq!(tokens[0].size, 2);
        assert!(tokens[1].is_key());
        assert_eq!(tokens[2].parent, Some(1));
        assert_eq!(tokens[4].kind, TokenKind::Primitive);
    }

    #[test]
    fn nested_parent_links() {
        let tokens = tokenize(br#"{"list":[{"x":1},2]}"#).unwrap();
        let array = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Array)
            .unwrap();
        let members: Vec<usize> = (0..tokens.len())
            .filter(|&i| tokens[i].parent == Some(array))
            .collect();
        assert_eq!(members.len(), 2);
        assert_eq!(tokens[members[0]].kind, TokenKind::Object);
        assert_eq!(tokens[members[1]].kind, TokenKind::Primitive);
    }

    #[test]
    fn string_spans_exclude_quotes() {
        let src = br#"{"k":"value"}"#;
        let tokens = tokenize(src).unwrap();
        let val = &tokens[2];
        assert_eq!(&src[val.start..val.end], b"value");
    }

    #[test]
    fn escapes_are_skipped_not_decoded() {
        let src = br#"{"k":"a\"b"}"#;
        let tokens = tokenize(src).unwrap();
        let val = &tokens[2];
        assert_eq!(&src[val.start..val.end], br#"a\"b"#);
    }

    #[test]
    fn whitespace_between_tokens_is_ignored() {
        let tokens = tokenize(b"{ \"a\" :\n\t[ 1 , 2 ]\r}").unwrap();
        assert_eq!(tokens[0].size, 1);
        let array = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Array)
            .unwrap();
        assert_eq!(array.size, 2);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(matches!(
            tokenize(br#"{"a":1} x"#),
            Err(JsonError::Unexpected { .. })
        ));
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(matches!(
            tokenize(br#"{"a":"unfinished"#),
            Err(JsonError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn rejects_oversized_input() {
        // Each array member is one token; overflow MAX_TOKENS.
        let mut src = b"[".to_vec();
        for i in 0..MAX_TOKENS + 1 {
            if i > 0 {
                src.push(b',');
            }
            src.push(b'1');
        }
        src.push(b']');
        assert!(matches!(
            tokenize(&src),
            Err(JsonError::ParseTooLarge { .. })
        ));
    }
}
