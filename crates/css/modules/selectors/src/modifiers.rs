//! Classification of the pieces after a compound's tag: `.class`, `#id`,
//! `[attr]` and `:pseudo`.
//! Spec: <https://www.w3.org/TR/selectors-3/#simple-selectors>

use css_syntax::{ErrorKind, close_span, close_string, is_css_space, trim, unstring};

use crate::compiler::compile;
use crate::nth::{NthFormula, NthKind};
use crate::{AttrOp, AttributeSelector, Modifier, PseudoClass};

/// Result of classifying one modifier.
#[derive(Debug)]
pub(crate) enum Classified {
    Modifier(Modifier),
    Flag(Flag),
}

/// Pseudo-classes kept as segment flags rather than modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flag {
    Before,
    After,
    Hover,
    Link,
}

/// Pseudo-classes that depend on user interaction or navigation history.
const DYNAMIC: [&str; 6] = [
    "visited",
    "active",
    "focus",
    "focus-within",
    "focus-visible",
    "target",
];

/// Pseudo-elements other than `before`/`after`.
const PSEUDO_ELEMENTS: [&str; 6] = [
    "first-line",
    "first-letter",
    "selection",
    "placeholder",
    "marker",
    "backdrop",
];

/// Scan the modifier starting at `pos` and return it with the index after it.
pub(crate) fn scan_modifier(text: &str, pos: usize) -> Result<(Classified, usize), ErrorKind> {
    let bytes = text.as_bytes();
    match bytes.get(pos) {
        Some(b'[') => {
            let close = close_span(bytes, pos).ok_or(ErrorKind::OpenBracket)?;
            let inner = text.get(pos.saturating_add(1)..close).unwrap_or_default();
            Ok((classify_attribute(inner)?, close.saturating_add(1)))
        }
        Some(marker @ (b'.' | b'#')) => {
            let start = pos.saturating_add(1);
            let end = word_end(bytes, start);
            let word = text.get(start..end).unwrap_or_default();
            if !is_name(word) {
                return Err(ErrorKind::BadAttribute);
            }
            let attribute = if *marker == b'.' {
                AttributeSelector::class(word)
            } else {
                AttributeSelector::id(word)
            };
            Ok((Classified::Modifier(Modifier::Attribute(attribute)), end))
        }
        Some(b':') => {
            let mut start = pos.saturating_add(1);
            let element_syntax = bytes.get(start) == Some(&b':');
            if element_syntax {
                start = start.saturating_add(1);
            }
            let end = word_end(bytes, start);
            let name = text.get(start..end).unwrap_or_default().to_ascii_lowercase();
            if bytes.get(end) == Some(&b'(') {
                let close = close_span(bytes, end).ok_or(ErrorKind::OpenBracket)?;
                let argument = text.get(end.saturating_add(1)..close).unwrap_or_default();
                let classified = classify_pseudo(&name, Some(argument), element_syntax)?;
                Ok((classified, close.saturating_add(1)))
            } else {
                Ok((classify_pseudo(&name, None, element_syntax)?, end))
            }
        }
        _ => Err(ErrorKind::BadTag),
    }
}

/// End of a class, id or pseudo name: the next modifier start or the end.
fn word_end(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .and_then(|rest| {
            rest.iter()
                .position(|byte| matches!(byte, b'.' | b'#' | b'[' | b':' | b'('))
        })
        .map_or(bytes.len(), |offset| start.saturating_add(offset))
}

/// Class and id names: identifier characters, digits allowed anywhere.
fn is_name(word: &str) -> bool {
    !word.is_empty()
        && word.bytes().all(|byte| {
            byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') || byte >= 0x80
        })
}

/// `name`, `name op value` or `name op "value"` from inside `[...]`.
fn classify_attribute(inner: &str) -> Result<Classified, ErrorKind> {
    let inner = trim(inner);
    let bytes = inner.as_bytes();
    let name_end = bytes
        .iter()
        .position(|byte| !(byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_')))
        .unwrap_or(bytes.len());
    let name = inner.get(..name_end).unwrap_or_default();
    if name.is_empty() {
        return Err(ErrorKind::BadAttribute);
    }
    let rest = trim(inner.get(name_end..).unwrap_or_default());
    let (op, value_text) = if rest.is_empty() {
        (AttrOp::Exists, "")
    } else if let Some(value) = rest.strip_prefix('=') {
        (AttrOp::Equals, value)
    } else {
        let op = match rest.get(..2) {
            Some("~=") => AttrOp::Includes,
            Some("|=") => AttrOp::DashMatch,
            Some("^=") => AttrOp::Prefix,
            Some("$=") => AttrOp::Suffix,
            Some("*=") => AttrOp::Substring,
            _ => return Err(ErrorKind::BadAttribute),
        };
        (op, rest.get(2..).unwrap_or_default())
    };
    let value = if op == AttrOp::Exists {
        String::new()
    } else {
        attribute_value(trim(value_text))?
    };
    Ok(Classified::Modifier(Modifier::Attribute(
        AttributeSelector {
            name: name.to_ascii_lowercase(),
            op,
            value,
            is_class: false,
            is_id: false,
        },
    )))
}

fn attribute_value(text: &str) -> Result<String, ErrorKind> {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b'"' | b'\'') => {
            let close = close_string(bytes, 0).ok_or(ErrorKind::OpenBracket)?;
            let trailing = text.get(close.saturating_add(1)..).unwrap_or_default();
            if !trim(trailing).is_empty() {
                return Err(ErrorKind::BadAttribute);
            }
            Ok(unstring(text.get(..=close).unwrap_or_default()))
        }
        Some(_)
            if !bytes
                .iter()
                .any(|byte| is_css_space(*byte) || matches!(byte, b'"' | b'\'')) =>
        {
            Ok(text.to_owned())
        }
        _ => Err(ErrorKind::BadAttribute),
    }
}

fn classify_pseudo(
    name: &str,
    argument: Option<&str>,
    element_syntax: bool,
) -> Result<Classified, ErrorKind> {
    let pseudo = match (name, argument) {
        ("before", None) => return Ok(Classified::Flag(Flag::Before)),
        ("after", None) => return Ok(Classified::Flag(Flag::After)),
        _ if element_syntax => return Err(ErrorKind::PseudoElement),
        ("hover", None) => return Ok(Classified::Flag(Flag::Hover)),
        ("link", None) => return Ok(Classified::Flag(Flag::Link)),
        ("not", Some(inner)) => return classify_not(inner),
        ("first-child", None) => PseudoClass::FirstChild,
        ("last-child", None) => PseudoClass::LastChild,
        ("only-child", None) => PseudoClass::OnlyChild,
        ("first-of-type", None) => PseudoClass::FirstOfType,
        ("last-of-type", None) => PseudoClass::LastOfType,
        ("only-of-type", None) => PseudoClass::OnlyOfType,
        ("empty", None) => PseudoClass::Empty,
        ("checked", None) => PseudoClass::Checked,
        ("disabled", None) => PseudoClass::Disabled,
        ("enabled", None) => PseudoClass::Enabled,
        ("read-only", None) => PseudoClass::ReadOnly,
        ("read-write", None) => PseudoClass::ReadWrite,
        ("scope", None) => PseudoClass::Scope,
        ("root", None) => PseudoClass::Root,
        ("lang", Some(code)) => {
            let code = trim(code);
            if code.is_empty() {
                return Err(ErrorKind::UnsupportedPseudo);
            }
            PseudoClass::Lang(unstring(code).to_ascii_lowercase())
        }
        (_, Some(formula)) if NthKind::from_name(name).is_some() => nth_pseudo(name, formula)?,
        _ if DYNAMIC.contains(&name) => return Err(ErrorKind::Dynamic),
        _ if PSEUDO_ELEMENTS.contains(&name) => return Err(ErrorKind::PseudoElement),
        _ => return Err(ErrorKind::UnsupportedPseudo),
    };
    Ok(Classified::Modifier(Modifier::Pseudo(pseudo)))
}

fn nth_pseudo(name: &str, formula: &str) -> Result<PseudoClass, ErrorKind> {
    let kind = NthKind::from_name(name).ok_or(ErrorKind::UnsupportedPseudo)?;
    let parsed = NthFormula::parse(formula).ok_or(ErrorKind::UnsupportedPseudo)?;
    Ok(PseudoClass::Nth(kind, parsed))
}

/// `:not(...)` takes exactly one plain selector.
fn classify_not(inner: &str) -> Result<Classified, ErrorKind> {
    let list = compile(inner, false);
    if list.selectors.len() > 1 {
        return Err(ErrorKind::ManyNot);
    }
    if let Some(kind) = list.error {
        return Err(kind);
    }
    let selector = list
        .selectors
        .into_iter()
        .next()
        .ok_or(ErrorKind::NoSelector)?;
    if selector.before || selector.after {
        return Err(ErrorKind::PseudoElement);
    }
    if selector.hover {
        return Err(ErrorKind::Dynamic);
    }
    Ok(Classified::Modifier(Modifier::Not(Box::new(selector.chain))))
}
