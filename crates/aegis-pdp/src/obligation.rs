use aegis_core::constants::OBLIGATION_LEN;
use aegis_json::JsonView;

use crate::eval::{operation_of, Evaluator, Op};

/// Resolve the obligation subtree at `node`.
///
/// A plain subtree carries a single `obligations` leaf. An `if` subtree
/// carries a condition (first member of its attribute list) and two
/// `obligations` leaves: the first is taken when the condition holds, the
/// second otherwise. A subtree with no usable leaf resolves to nothing;
/// that is not an error.
pub fn resolve_obligation(
    view: &JsonView,
    evaluator: &Evaluator,
    node: usize,
) -> Option<String> {
    let mut obl_value = view.find_key_within(node, "obligations")?;

    if let Some((Op::If, attr_list)) = operation_of(view, node) {
        let cond = view
            .array_member(attr_list, 0)
            .map(|member| evaluator.eval(member))
            .unwrap_or(false);
        if !cond {
            // Else branch: the next obligations key, still inside this node.
            let second = view.find_key_from(obl_value + 1, "obligations")?;
            let (second_start, _) = view.token_range(second);
            let (_, node_end) = view.token_range(node);
            if second_start >= node_end {
                return None;
            }
            obl_value = second;
        }
    }

    extract_leaf(view, obl_value)
}

/// Copy the payload of an `obligations` leaf, clipped to `OBLIGATION_LEN`.
fn extract_leaf(view: &JsonView, node: usize) -> Option<String> {
    let type_tok = view.find_key_within(node, "type")?;
    if !view.token_bytes(type_tok).eq_ignore_ascii_case(b"obligation") {
        return None;
    }
    let value_tok = view.find_key_within(node, "value")?;
    let bytes = view.token_bytes(value_tok);
    let clipped = &bytes[..bytes.len().min(OBLIGATION_LEN)];
    Some(String::from_utf8_lossy(clipped).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pip::NullPip;

    fn resolve(src: &[u8]) -> Option<String> {
        let view = JsonView::parse(src).unwrap();
        let root = view.find_key("obligation_grant").unwrap();
        let evaluator = Evaluator::new(&view, &NullPip);
        resolve_obligation(&view, &evaluator, root)
    }

    #[test]
    fn plain_subtree_yields_its_leaf() {
        let src = br#"{"obligation_grant":{"obligations":{"type":"obligation","value":"log_access"}}}"#;
        assert_eq!(resolve(src).as_deref(), Some("log_access"));
    }

    #[test]
    fn if_true_takes_first_leaf() {
        let src = br#"{"obligation_grant":{"operation":"if","attribute_list":[{"type":"boolean","value":"true"}],"obligations":{"type":"obligation","value":"gold"},"obligations":{"type":"obligation","value":"silver"}}}"#;
        assert_eq!(resolve(src).as_deref(), Some("gold"));
    }

    #[test]
    fn if_false_takes_second_leaf() {
        let src = br#"{"obligation_grant":{"operation":"if","attribute_list":[{"type":"boolean","value":"false"}],"obligations":{"type":"obligation","value":"gold"},"obligations":{"type":"obligation","value":"silver"}}}"#;
        assert_eq!(resolve(src).as_deref(), Some("silver"));
    }

    #[test]
    fn if_false_without_second_leaf_is_empty() {
        let src = br#"{"obligation_grant":{"operation":"if","attribute_list":[{"type":"boolean","value":"false"}],"obligations":{"type":"obligation","value":"gold"}}}"#;
        assert_eq!(resolve(src), None);
    }

    #[test]
    fn missing_obligations_key_is_empty() {
        let src = br#"{"obligation_grant":{"note":"nothing here"}}"#;
        assert_eq!(resolve(src), None);
    }

    #[test]
    fn wrong_leaf_type_is_empty() {
        let src = br#"{"obligation_grant":{"obligations":{"type":"string","value":"log_access"}}}"#;
        assert_eq!(resolve(src), None);
    }

    #[test]
    fn payload_is_clipped() {
        let src = br#"{"obligation_grant":{"obligations":{"type":"obligation","value":"a_very_long_obligation_payload"}}}"#;
        let got = resolve(src).unwrap();
        assert_eq!(got.len(), OBLIGATION_LEN);
        assert_eq!(got, "a_very_long_obl");
    }
}
