use aegis_json::JsonView;

use crate::eval::{operation_of, Op};

/// Extract the validity window of a GRANT decision.
///
/// A second walk over the grant tree: every leaf with `type == "time"`
/// tightens `(start, stop)` according to the comparison that encloses it.
/// The window starts at `(0, 0)`; a tree with no time leaves leaves it
/// there.
pub fn validity_window(view: &JsonView, root: usize) -> (u64, u64) {
    let mut window = (0u64, 0u64);
    walk(view, root, Op::Undefined, &mut window);
    window
}

fn walk(view: &JsonView, node: usize, enclosing: Op, window: &mut (u64, u64)) {
    if let Some((op, attr_list)) = operation_of(view, node) {
        for i in 0..view.array_size(attr_list) {
            if let Some(member) = view.array_member(attr_list, i) {
                walk(view, member, op, window);
            }
        }
        return;
    }

    let Some(type_tok) = view.find_key_within(node, "type") else {
        return;
    };
    if !view.token_bytes(type_tok).eq_ignore_ascii_case(b"time") {
        return;
    }
    let Some(value_tok) = view.find_key_within(node, "value") else {
        return;
    };
    let v = parse_u64(view.token_bytes(value_tok));

    match enclosing {
        Op::Eq => {
            window.0 = v;
            window.1 = v;
        }
        Op::Leq => window.1 = v,
        Op::Geq => window.0 = v,
        // Strict bounds exclude the value itself.
        Op::Lt => window.1 = v.saturating_sub(1),
        Op::Gt => window.0 = v.saturating_add(1),
        _ => {}
    }
}

/// strtoul-style parse: leading base-10 digits, anything else reads as 0.
fn parse_u64(text: &[u8]) -> u64 {
    let digits = text.iter().take_while(|b| b.is_ascii_digit()).count();
    std::str::from_utf8(&text[..digits])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
