//! Generated content for `:before` / `:after`.
//! Spec: <https://www.w3.org/TR/css-content-3/#content-property>

use css_selectors::ElementAdapter;
use css_style_attr::DeclarationBlock;
use css_syntax::{close_span, close_string, is_css_space, unstring};

/// Which synthetic node a `content` value goes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PseudoElement {
    /// Inserted as the element's first child.
    Before,
    /// Inserted as the element's last child.
    After,
}

const QUOTE: char = '"';

/// Text produced by the block's `content` declaration for `node`.
///
/// Quoted strings are taken literally, `attr(name)` reads the element's
/// attribute (empty when absent), `open-quote`/`close-quote` produce a quote
/// mark. Other values (`counter()`, images) contribute nothing. `None` when
/// the block has no `content` or it is `none`/`normal`.
pub fn generated_content<A: ElementAdapter>(
    adapter: &A,
    node: A::Handle,
    block: &DeclarationBlock,
) -> Option<String> {
    let raw = block.get("content")?.raw_value.as_str();
    let bytes = raw.as_bytes();
    let mut text = String::new();
    let mut pos = 0;
    while let Some(&byte) = bytes.get(pos) {
        if is_css_space(byte) {
            pos = pos.saturating_add(1);
            continue;
        }
        if matches!(byte, b'"' | b'\'') {
            let close = close_string(bytes, pos).unwrap_or(bytes.len());
            let quoted = raw.get(pos..=close).or_else(|| raw.get(pos..));
            text.push_str(&unstring(quoted.unwrap_or_default()));
            pos = close.saturating_add(1);
            continue;
        }
        let end = word_end(bytes, pos);
        let word = raw.get(pos..end).unwrap_or_default();
        if bytes.get(end) == Some(&b'(') {
            let close = close_span(bytes, end).unwrap_or(bytes.len());
            if word.eq_ignore_ascii_case("attr") {
                let name = raw
                    .get(end.saturating_add(1)..close)
                    .unwrap_or_default()
                    .trim();
                text.push_str(adapter.attr(node, name).unwrap_or_default());
            }
            pos = close.saturating_add(1);
            continue;
        }
        match word.to_ascii_lowercase().as_str() {
            "none" | "normal" => return None,
            "open-quote" | "close-quote" => text.push(QUOTE),
            _ => {}
        }
        pos = end;
    }
    Some(text)
}

/// End of a bare word: whitespace, a quote or an opening paren.
fn word_end(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .and_then(|rest| {
            rest.iter()
                .position(|byte| is_css_space(*byte) || matches!(byte, b'"' | b'\'' | b'('))
        })
        .map_or(bytes.len(), |offset| start.saturating_add(offset))
}
