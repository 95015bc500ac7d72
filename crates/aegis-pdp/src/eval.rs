use std::cmp::Ordering;

use aegis_core::constants::{DATA_TYPE_MAX, DATA_VALUE_MAX, MAX_EVAL_DEPTH};
use aegis_json::JsonView;

use crate::pip::{Pip, PipLookup};

// ── Operations ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Op {
    And,
    Or,
    Not,
    Eq,
    Leq,
    Geq,
    Lt,
    Gt,
    If,
    Undefined,
}

pub(crate) fn op_from_bytes(text: &[u8]) -> Op {
    match text {
        b"and" => Op::And,
        b"or" => Op::Or,
        b"not" => Op::Not,
        b"eq" => Op::Eq,
        b"leq" => Op::Leq,
        b"geq" => Op::Geq,
        b"lt" => Op::Lt,
        b"gt" => Op::Gt,
        b"if" => Op::If,
        _ => Op::Undefined,
    }
}

/// Locate the operation and attribute list of an operation node.
///
/// Policies exist in the wild where the `operation` key is written *after*
/// `attribute_list`, in which case a naive forward search finds an operation
/// nested inside the list. The correction: keep taking the next `operation`
/// key until one starts past the list's end, and require it to still start
/// inside this node.
pub(crate) fn operation_of(view: &JsonView, node: usize) -> Option<(Op, usize)> {
    let mut op_tok = view.find_key_within(node, "operation")?;
    let attr_list = view.find_key_within(node, "attribute_list")?;
    if op_tok > attr_list {
        let (_, list_end) = view.token_range(attr_list);
        let (_, node_end) = view.token_range(node);
        while view.token_range(op_tok).0 < list_end {
            op_tok = view.find_key_from(op_tok + 1, "operation")?;
            if view.token_range(op_tok).0 >= node_end {
                return None;
            }
        }
    }
    Some((op_from_bytes(view.token_bytes(op_tok)), attr_list))
}

// ── Evaluator ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EvalError {
    /// Node is missing a required key or array member.
    MissingField,
    /// Leaf with a non-boolean type in boolean position.
    NonBoolean,
    /// Adversarially deep tree.
    DepthExceeded,
}

/// Recursive walker over an expression tree.
///
/// The policy-wide context (source bytes, token array, PIP handle) lives in
/// the evaluator; methods take a node index. Any error inside a subtree
/// collapses the enclosing node to false rather than aborting the decision.
pub struct Evaluator<'a> {
    view: &'a JsonView<'a>,
    pip: &'a dyn Pip,
}

impl<'a> Evaluator<'a> {
    pub fn new(view: &'a JsonView<'a>, pip: &'a dyn Pip) -> Self {
        Self { view, pip }
    }

    /// Evaluate the subtree at `node` as a boolean. Non-boolean or
    /// malformed subtrees evaluate to false.
    pub fn eval(&self, node: usize) -> bool {
        self.resolve(node, 0).unwrap_or(false)
    }

    fn resolve(&self, node: usize, depth: usize) -> Result<bool, EvalError> {
        if depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::DepthExceeded);
        }

        if let Some((op, attr_list)) = operation_of(self.view, node) {
            match op {
                Op::And => {
                    for i in 0..self.view.array_size(attr_list) {
                        let member = self
                            .view
                            .array_member(attr_list, i)
                            .ok_or(EvalError::MissingField)?;
                        match self.resolve(member, depth + 1) {
                            Ok(true) => {}
                            Ok(false) | Err(_) => return Ok(false),
                        }
                    }
                    Ok(true)
                }
                Op::Or => {
                    for i in 0..self.view.array_size(attr_list) {
                        let member = self
                            .view
                            .array_member(attr_list, i)
                            .ok_or(EvalError::MissingField)?;
                        match self.resolve(member, depth + 1) {
                            Ok(true) => return Ok(true),
                            Ok(false) => {}
                            Err(_) => return Ok(false),
                        }
                    }
                    Ok(false)
                }
                Op::Not => {
                    let member = self
                        .view
                        .array_member(attr_list, 0)
                        .ok_or(EvalError::MissingField)?;
                    match self.resolve(member, depth + 1) {
                        Ok(v) => Ok(!v),
                        Err(_) => Ok(false),
                    }
                }
                Op::Eq | Op::Leq | Op::Geq | Op::Lt | Op::Gt => self.compare(op, attr_list),
                // `if` belongs to obligation trees; anything else is unknown.
                Op::If | Op::Undefined => Ok(false),
            }
        } else {
            self.leaf(node)
        }
    }

    fn leaf(&self, node: usize) -> Result<bool, EvalError> {
        let leaf_type = self.field_bytes(node, "type")?;
        if leaf_type.eq_ignore_ascii_case(b"boolean") {
            let value = self.field_bytes(node, "value")?;
            Ok(value.len() >= 4 && value[..4].eq_ignore_ascii_case(b"true"))
        } else {
            // `time` leaves are handled by the validity-window walk, not
            // here; any other type has no boolean meaning.
            Err(EvalError::NonBoolean)
        }
    }

    /// Binary comparison over a two-operand attribute list.
    ///
    /// Operand 1 is always raw policy text. Operand 2's type and value texts
    /// go through the PIP: a literal stays as-is, a resolved reference is
    /// replaced by the resolved bytes, and a subject reference mirrors
    /// operand 1's text (see `PipLookup::Subject`).
    ///
    /// Types must match exactly (case-insensitive). Values compare with a
    /// length pre-check before the case-insensitive lexicographic order, so
    /// equal-width numeric encodings compare correctly while a shorter
    /// string always precedes a longer one.
    fn compare(&self, op: Op, attr_list: usize) -> Result<bool, EvalError> {
        let a = self
            .view
            .array_member(attr_list, 0)
            .ok_or(EvalError::MissingField)?;
        let b = self
            .view
            .array_member(attr_list, 1)
            .ok_or(EvalError::MissingField)?;

        let type1 = self.field_bytes(a, "type")?;
        let value1 = self.field_bytes(a, "value")?;
        let raw_type2 = self.field_bytes(b, "type")?;
        let raw_value2 = self.field_bytes(b, "value")?;

        let value2 = self.resolve_operand(raw_value2, value1, DATA_VALUE_MAX);
        let type2 = self.resolve_operand(raw_type2, type1, DATA_TYPE_MAX);

        if !(type1.len() == type2.len() && type1.eq_ignore_ascii_case(&type2)) {
            return Ok(false);
        }

        let shorter = value1.len() < value2.len();
        let longer = value1.len() > value2.len();
        let same_len = value1.len() == value2.len();
        let ord = cmp_ignore_ascii_case(value1, &value2);

        Ok(match op {
            Op::Eq => same_len && ord == Ordering::Equal,
            Op::Lt => shorter || (same_len && ord == Ordering::Less),
            Op::Leq => shorter || (same_len && ord != Ordering::Greater),
            Op::Gt => longer || (same_len && ord == Ordering::Greater),
            Op::Geq => longer || (same_len && ord != Ordering::Less),
            _ => false,
        })
    }

    fn resolve_operand(&self, raw: &[u8], counterpart: &[u8], cap: usize) -> Vec<u8> {
        match self.pip.resolve(raw) {
            PipLookup::Literal => raw.to_vec(),
            PipLookup::Subject => counterpart.to_vec(),
            PipLookup::Resolved(mut bytes) => {
                bytes.truncate(cap);
                bytes
            }
        }
    }

    fn field_bytes(&self, node: usize, name: &str) -> Result<&'a [u8], EvalError> {
        let tok = self
            .view
            .find_key_within(node, name)
            .ok_or(EvalError::MissingField)?;
        Ok(self.view.token_bytes(tok))
    }
}

fn cmp_ignore_ascii_case(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase());
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pip::NullPip;

    fn eval_src(src: &[u8]) -> bool {
        let view = JsonView::parse(src).unwrap();
        let root = view.find_key("tree").unwrap();
        Evaluator::new(&view, &NullPip).eval(root)
    }

    fn tree(body: &str) -> Vec<u8> {
        format!(r#"{{"tree":{body}}}"#).into_bytes()
    }

    const TRUE_LEAF: &str = r#"{"type":"boolean","value":"true"}"#;
    const FALSE_LEAF: &str = r#"{"type":"boolean","value":"false"}"#;

    #[test]
    fn boolean_leaves() {
        assert!(eval_src(&tree(TRUE_LEAF)));
        assert!(!eval_src(&tree(FALSE_LEAF)));
        // Case-insensitive, length >= 4.
        assert!(eval_src(&tree(r#"{"type":"Boolean","value":"TRUE"}"#)));
        assert!(!eval_src(&tree(r#"{"type":"boolean","value":"tru"}"#)));
    }

    #[test]
    fn non_boolean_leaf_is_false() {
        assert!(!eval_src(&tree(r#"{"type":"time","value":"1000"}"#)));
        assert!(!eval_src(&tree(r#"{"value":"true"}"#)));
    }

    #[test]
    fn and_or_not() {
        let and = format!(
            r#"{{"operation":"and","attribute_list":[{TRUE_LEAF},{TRUE_LEAF}]}}"#
        );
        assert!(eval_src(&tree(&and)));

        let and_false = format!(
            r#"{{"operation":"and","attribute_list":[{TRUE_LEAF},{FALSE_LEAF}]}}"#
        );
        assert!(!eval_src(&tree(&and_false)));

        let or = format!(
            r#"{{"operation":"or","attribute_list":[{FALSE_LEAF},{TRUE_LEAF}]}}"#
        );
        assert!(eval_src(&tree(&or)));

        let not = format!(r#"{{"operation":"not","attribute_list":[{FALSE_LEAF}]}}"#);
        assert!(eval_src(&tree(&not)));
    }

    #[test]
    fn error_in_child_collapses_node() {
        // The time leaf errors as a boolean; AND and OR both go false.
        let and = format!(
            r#"{{"operation":"and","attribute_list":[{TRUE_LEAF},{{"type":"time","value":"9"}}]}}"#
        );
        assert!(!eval_src(&tree(&and)));

        let or = format!(
            r#"{{"operation":"or","attribute_list":[{TRUE_LEAF},{{"type":"time","value":"9"}}]}}"#
        );
        assert!(eval_src(&tree(&or))); // short-circuits on the true leaf first

        let or_err_first = format!(
            r#"{{"operation":"or","attribute_list":[{{"type":"time","value":"9"}},{TRUE_LEAF}]}}"#
        );
        assert!(!eval_src(&tree(&or_err_first)));
    }

    #[test]
    fn eq_is_case_insensitive_same_length() {
        let eq = r#"{"operation":"eq","attribute_list":[{"type":"string","value":"Admin"},{"type":"String","value":"aDMIN"}]}"#;
        assert!(eval_src(&tree(eq)));

        let neq = r#"{"operation":"eq","attribute_list":[{"type":"string","value":"admin"},{"type":"string","value":"admins"}]}"#;
        assert!(!eval_src(&tree(neq)));
    }

    #[test]
    fn mismatched_types_are_false() {
        let eq = r#"{"operation":"eq","attribute_list":[{"type":"string","value":"10"},{"type":"number","value":"10"}]}"#;
        assert!(!eval_src(&tree(eq)));
    }

    #[test]
    fn lt_applies_length_precheck() {
        // Shorter operand is less, regardless of content.
        let lt = r#"{"operation":"lt","attribute_list":[{"type":"string","value":"zz"},{"type":"string","value":"aaa"}]}"#;
        assert!(eval_src(&tree(lt)));

        // Equal length falls back to lexicographic order.
        let lt_lex = r#"{"operation":"lt","attribute_list":[{"type":"string","value":"100"},{"type":"string","value":"200"}]}"#;
        assert!(eval_src(&tree(lt_lex)));

        let not_lt = r#"{"operation":"lt","attribute_list":[{"type":"string","value":"300"},{"type":"string","value":"200"}]}"#;
        assert!(!eval_src(&tree(not_lt)));
    }

    #[test]
    fn leq_geq_gt_orderings() {
        let leq_eq = r#"{"operation":"leq","attribute_list":[{"type":"time","value":"1000"},{"type":"time","value":"1000"}]}"#;
        assert!(eval_src(&tree(leq_eq)));

        let geq = r#"{"operation":"geq","attribute_list":[{"type":"time","value":"1500"},{"type":"time","value":"1000"}]}"#;
        assert!(eval_src(&tree(geq)));

        let gt_longer = r#"{"operation":"gt","attribute_list":[{"type":"string","value":"aaaa"},{"type":"string","value":"zzz"}]}"#;
        assert!(eval_src(&tree(gt_longer)));
    }

    #[test]
    fn operation_after_attribute_list_is_corrected() {
        // The outer node writes attribute_list first; its operation comes
        // after. The inner eq's operation must not be picked for the outer.
        let swapped = format!(
            r#"{{"attribute_list":[{{"operation":"eq","attribute_list":[{{"type":"string","value":"a"}},{{"type":"string","value":"b"}}]}}],"operation":"not"}}"#
        );
        // eq(a,b) is false; not(false) is true — only if "not" is chosen.
        assert!(eval_src(&tree(&swapped)));
    }

    #[test]
    fn unknown_operation_is_false() {
        let xor = format!(
            r#"{{"operation":"xor","attribute_list":[{TRUE_LEAF},{TRUE_LEAF}]}}"#
        );
        assert!(!eval_src(&tree(&xor)));
    }

    #[test]
    fn depth_bound_collapses_to_false() {
        // MAX_EVAL_DEPTH nested and() around a true leaf: the cut-off child
        // errors, and false propagates out through every enclosing and.
        let mut body = TRUE_LEAF.to_string();
        for _ in 0..MAX_EVAL_DEPTH {
            body = format!(r#"{{"operation":"and","attribute_list":[{body}]}}"#);
        }
        assert!(!eval_src(&tree(&body)));
    }

    #[test]
    fn subject_reference_mirrors_counterpart() {
        struct SubjectPip;
        impl Pip for SubjectPip {
            fn resolve(&self, url: &[u8]) -> PipLookup {
                if url.starts_with(b"subject.") {
                    PipLookup::Subject
                } else {
                    PipLookup::Literal
                }
            }
        }

        let src = tree(
            r#"{"operation":"eq","attribute_list":[{"type":"string","value":"door_a"},{"type":"string","value":"subject.device"}]}"#,
        );
        let view = JsonView::parse(&src).unwrap();
        let root = view.find_key("tree").unwrap();
        assert!(Evaluator::new(&view, &SubjectPip).eval(root));
    }

    #[test]
    fn resolved_reference_replaces_text() {
        struct RolePip;
        impl Pip for RolePip {
            fn resolve(&self, url: &[u8]) -> PipLookup {
                if url == b"request.subject.role" {
                    PipLookup::Resolved(b"admin".to_vec())
                } else {
                    PipLookup::Literal
                }
            }
        }

        let src = tree(
            r#"{"operation":"eq","attribute_list":[{"type":"string","value":"admin"},{"type":"string","value":"request.subject.role"}]}"#,
        );
        let view = JsonView::parse(&src).unwrap();
        let root = view.find_key("tree").unwrap();
        assert!(Evaluator::new(&view, &RolePip).eval(root));
    }
}
