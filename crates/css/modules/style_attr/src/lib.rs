//! CSS Style Attributes: declaration blocks from rule bodies, `cssText` and `style="..."`.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

#![forbid(unsafe_code)]

use core::fmt;

use css_syntax::{ErrorKind, camel_case, close_span, close_string, trim, unstring};
use log::trace;

/// Marker that raises a declaration above every normal one.
const IMPORTANT: &str = "important";

/// A single `property: value` declaration.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name as written, lowercased (custom properties kept verbatim).
    pub name: String,
    /// Script-facing camel-case name (`backgroundColor`).
    pub property: String,
    /// Value with quotes removed and escapes decoded.
    pub value: String,
    /// Value text as written, without `!important`.
    pub raw_value: String,
    pub important: bool,
}

impl fmt::Display for Declaration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.name, self.raw_value)?;
        if self.important {
            formatter.write_str(" !important")?;
        }
        Ok(())
    }
}

/// Declarations of one rule body, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclarationBlock {
    pub declarations: Vec<Declaration>,
    /// Set only when no declaration survived.
    pub error: Option<ErrorKind>,
    /// Kinds of the malformed declarations that were dropped.
    pub skipped: Vec<ErrorKind>,
}

impl DeclarationBlock {
    pub const fn is_usable(&self) -> bool {
        self.error.is_none()
    }

    /// First declaration of a camel-case property.
    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|declaration| declaration.property == property)
    }
}

impl fmt::Display for DeclarationBlock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, declaration) in self.declarations.iter().enumerate() {
            if index > 0 {
                formatter.write_str(" ")?;
            }
            write!(formatter, "{declaration};")?;
        }
        Ok(())
    }
}

/// Parse a declaration list: a rule body, a `cssText` value or a `style`
/// attribute.
///
/// Items are separated by `;`; quoted strings, `(...)` and `[...]` are opaque,
/// so `content: ";"` or `url(a;b)` stay whole. A malformed item is dropped and
/// recorded in [`DeclarationBlock::skipped`]; the block only carries an error
/// when nothing usable is left.
pub fn parse_declaration_block(body: &str) -> DeclarationBlock {
    let mut block = DeclarationBlock::default();
    for item in split_items(body) {
        let item = trim(item);
        if item.is_empty() {
            continue;
        }
        match parse_declaration(item) {
            Ok(Some(declaration)) => block.declarations.push(declaration),
            Ok(None) => {}
            Err(kind) => {
                trace!(target: "css::syntax", "dropped declaration `{item}`: {kind}");
                block.skipped.push(kind);
            }
        }
    }
    if block.declarations.is_empty() {
        block.error = Some(block.skipped.first().copied().unwrap_or(ErrorKind::NoRules));
    }
    block
}

/// Cut `body` on top-level semicolons.
fn split_items(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut items = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while let Some(&byte) = bytes.get(pos) {
        let skip_to = match byte {
            b'"' | b'\'' => close_string(bytes, pos),
            b'(' | b'[' => close_span(bytes, pos),
            b';' => {
                items.push(body.get(start..pos).unwrap_or_default());
                start = pos.saturating_add(1);
                Some(pos)
            }
            _ => Some(pos),
        };
        // An unclosed group swallows the rest of the body.
        let Some(end) = skip_to else {
            break;
        };
        pos = end.saturating_add(1);
    }
    items.push(body.get(start..).unwrap_or_default());
    items
}

/// One trimmed, non-empty item. `Ok(None)` for an empty value.
fn parse_declaration(item: &str) -> Result<Option<Declaration>, ErrorKind> {
    let (raw_name, raw_value) = item.split_once(':').ok_or(ErrorKind::RuleColon)?;
    let name = trim(raw_name);
    if !is_property_name(name) {
        return Err(ErrorKind::BadRuleAttribute);
    }
    let (value_text, important) = strip_important(raw_value);
    if value_text.is_empty() {
        return Ok(None);
    }
    let name = if name.starts_with("--") {
        name.to_owned()
    } else {
        name.to_ascii_lowercase()
    };
    Ok(Some(Declaration {
        property: camel_case(&name),
        name,
        value: unstring(value_text),
        raw_value: value_text.to_owned(),
        important,
    }))
}

/// `-?[A-Za-z_][A-Za-z0-9_-]*`, or a `--custom` name.
fn is_property_name(name: &str) -> bool {
    let body = name
        .strip_prefix("--")
        .or_else(|| name.strip_prefix('-'))
        .unwrap_or(name);
    let mut bytes = body.bytes();
    let custom = name.starts_with("--");
    bytes.next().is_some_and(|first| {
        first.is_ascii_alphabetic() || first == b'_' || (custom && first.is_ascii_digit())
    }) && bytes.all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_'))
}

/// Split a trailing `!important` (any case, spaces allowed after `!`) off a value.
fn strip_important(value: &str) -> (&str, bool) {
    let value = trim(value);
    let marked = value
        .len()
        .checked_sub(IMPORTANT.len())
        .and_then(|split| Some((value.get(..split)?, value.get(split..)?)))
        .filter(|(_, tail)| tail.eq_ignore_ascii_case(IMPORTANT))
        .and_then(|(head, _)| trim(head).strip_suffix('!'));
    marked.map_or((value, false), |head| (trim(head), true))
}
