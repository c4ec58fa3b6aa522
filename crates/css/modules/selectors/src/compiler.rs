//! Selector text to compiled chains.
//! Spec: <https://www.w3.org/TR/selectors-3/#selector-syntax>
//!
//! Compilation never fails outright: every comma-separated piece yields a
//! [`Selector`], and problems are recorded as error codes on the segment,
//! the selector and the list.

use css_syntax::{ErrorKind, close_span, close_string, is_css_space};
use log::trace;

use crate::modifiers::{Classified, Flag, scan_modifier};
use crate::specificity::specificity;
use crate::{AtomicSelector, Combinator, Selector, SelectorChain};

/// All selectors of one descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
    /// Set only when no selector is usable.
    pub error: Option<ErrorKind>,
}

impl SelectorList {
    /// Selectors without an error, in source order.
    pub fn usable(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter().filter(|selector| selector.is_usable())
    }

    /// Highest specificity among usable selectors, 0 when none.
    pub fn highest_specificity(&self) -> u32 {
        self.usable()
            .map(|selector| selector.specificity)
            .max()
            .unwrap_or(0)
    }
}

/// Lexical pieces of a selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'text> {
    Segment(&'text str),
    Space,
    Combinator(Combinator),
    Comma,
}

/// One comma-separated piece: segments in source order, each with the
/// combinator that preceded it.
#[derive(Debug, Default)]
struct Piece<'text> {
    segments: Vec<(Combinator, &'text str)>,
    error: Option<ErrorKind>,
}

/// Compile a comma-separated selector list.
///
/// `under_at` marks selectors from inside a satisfied `@media` block; it
/// only affects specificity.
pub fn compile(text: &str, under_at: bool) -> SelectorList {
    let selectors: Vec<Selector> = split_pieces(text)
        .into_iter()
        .map(|piece| build_selector(piece, under_at))
        .collect();
    let error = list_error(&selectors);
    if let Some(kind) = error {
        trace!(target: "css::selectors", "selector list `{text}` rejected: {kind}");
    }
    SelectorList { selectors, error }
}

fn note(slot: &mut Option<ErrorKind>, kind: ErrorKind) {
    if slot.is_none() {
        *slot = Some(kind);
    }
}

fn tokenize(text: &str) -> (Vec<Token<'_>>, Option<ErrorKind>) {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(&byte) = bytes.get(pos) {
        let next = bytes.get(pos.saturating_add(1)).copied();
        let single = match byte {
            _ if is_css_space(byte) => Some(Token::Space),
            b',' => Some(Token::Comma),
            b'>' => Some(Token::Combinator(Combinator::Child)),
            b'~' if next != Some(b'=') => Some(Token::Combinator(Combinator::Sibling)),
            b'+' if !next.is_some_and(|digit| digit.is_ascii_digit()) => {
                Some(Token::Combinator(Combinator::Adjacent))
            }
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(token);
            pos = pos.saturating_add(1);
            continue;
        }
        let start = pos;
        match segment_end(bytes, pos) {
            Some(end) => {
                tokens.push(Token::Segment(text.get(start..end).unwrap_or_default()));
                pos = end;
            }
            None => {
                tokens.push(Token::Segment(text.get(start..).unwrap_or_default()));
                return (tokens, Some(ErrorKind::OpenBracket));
            }
        }
    }
    (tokens, None)
}

/// End of the compound starting at `start`; `None` if a group never closes.
fn segment_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while let Some(&byte) = bytes.get(pos) {
        let next = bytes.get(pos.saturating_add(1)).copied();
        match byte {
            b'"' | b'\'' => pos = close_string(bytes, pos)?,
            b'[' | b'(' => pos = close_span(bytes, pos)?,
            b'\\' => pos = pos.saturating_add(1),
            b',' | b'>' => return Some(pos),
            b'~' if next != Some(b'=') => return Some(pos),
            b'+' if !next.is_some_and(|digit| digit.is_ascii_digit()) => return Some(pos),
            _ if is_css_space(byte) => return Some(pos),
            _ => {}
        }
        pos = pos.saturating_add(1);
    }
    Some(bytes.len())
}

/// Group tokens into comma-separated pieces, resolving combinators.
///
/// Two segments with only whitespace between them are joined by a descendant
/// combinator. An explicit combinator with nothing on its left, or
/// right after another one, or at the end of a piece, is an error. Empty
/// pieces (extra commas) are dropped.
fn split_pieces(text: &str) -> Vec<Piece<'_>> {
    let (tokens, scan_error) = tokenize(text);
    let mut pieces = Vec::new();
    let mut piece = Piece::default();
    let mut explicit: Option<Combinator> = None;
    for token in tokens.into_iter().chain([Token::Comma]) {
        match token {
            Token::Segment(segment) => {
                let combinator = if piece.segments.is_empty() {
                    Combinator::Group
                } else {
                    explicit.unwrap_or(Combinator::Descendant)
                };
                piece.segments.push((combinator, segment));
                explicit = None;
            }
            Token::Space => {}
            Token::Combinator(combinator) => {
                if explicit.is_some() || piece.segments.is_empty() {
                    note(&mut piece.error, ErrorKind::EmptySelector);
                }
                explicit = Some(combinator);
            }
            Token::Comma => {
                if explicit.is_some() {
                    note(&mut piece.error, ErrorKind::EmptySelector);
                }
                if !piece.segments.is_empty() || piece.error.is_some() {
                    pieces.push(core::mem::take(&mut piece));
                }
                explicit = None;
            }
        }
    }
    if let Some(kind) = scan_error
        && let Some(last) = pieces.last_mut()
    {
        note(&mut last.error, kind);
    }
    pieces
}

fn build_selector(piece: Piece<'_>, under_at: bool) -> Selector {
    let mut atoms: Vec<AtomicSelector> = piece
        .segments
        .iter()
        .rev()
        .map(|(combinator, segment)| {
            let mut atom = compile_atomic(segment);
            atom.combinator = *combinator;
            atom
        })
        .collect();
    let mut error = piece.error;
    if atoms.is_empty() {
        atoms.push(AtomicSelector::default());
        note(&mut error, ErrorKind::EmptySelector);
    }
    let mut selector = Selector {
        chain: SelectorChain { atoms },
        error,
        ..Selector::default()
    };
    for (position, atom) in selector.chain.atoms.iter().enumerate() {
        if let Some(kind) = atom.error {
            note(&mut selector.error, kind);
        }
        if position > 0 && (atom.before || atom.after) {
            note(&mut selector.error, ErrorKind::InjectHigh);
        }
        selector.before |= atom.before;
        selector.after |= atom.after;
        selector.hover |= atom.hover;
    }
    selector.specificity = specificity(&selector.chain, under_at);
    selector
}

/// Compile one compound: `tag.class#id[attr]:pseudo...`.
pub(crate) fn compile_atomic(text: &str) -> AtomicSelector {
    let mut atom = AtomicSelector::default();
    let bytes = text.as_bytes();
    let tag_end = bytes
        .iter()
        .position(|byte| matches!(byte, b'.' | b'#' | b'[' | b':'))
        .unwrap_or(bytes.len());
    let tag = text.get(..tag_end).unwrap_or_default();
    if !tag.is_empty() && tag != "*" {
        if is_identifier(tag) {
            atom.tag = Some(tag.to_ascii_lowercase());
        } else {
            atom.error = Some(ErrorKind::BadTag);
            return atom;
        }
    }
    let mut pos = tag_end;
    while pos < bytes.len() {
        match scan_modifier(text, pos) {
            Ok((classified, next)) => {
                match classified {
                    Classified::Modifier(modifier) => atom.modifiers.push(modifier),
                    Classified::Flag(Flag::Before) => atom.before = true,
                    Classified::Flag(Flag::After) => atom.after = true,
                    Classified::Flag(Flag::Hover) => atom.hover = true,
                    Classified::Flag(Flag::Link) => atom.link = true,
                }
                pos = next;
            }
            Err(kind) => {
                atom.error = Some(kind);
                return atom;
            }
        }
    }
    if atom.link {
        match atom.tag.as_deref() {
            None => atom.tag = Some("a".to_owned()),
            Some("a") => {}
            Some(_) => atom.error = Some(ErrorKind::TagLink),
        }
    }
    atom
}

fn is_identifier(tag: &str) -> bool {
    let mut bytes = tag.bytes();
    bytes.next().is_some_and(|first| !first.is_ascii_digit() && is_name_byte(first))
        && bytes.all(is_name_byte)
}

const fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-') || byte >= 0x80
}

/// List-level error: set only when every selector failed.
fn list_error(selectors: &[Selector]) -> Option<ErrorKind> {
    let Some(first) = selectors.first() else {
        return Some(ErrorKind::NoSelector);
    };
    if selectors.iter().any(Selector::is_usable) {
        return None;
    }
    let shared = first.error;
    if selectors.iter().all(|selector| selector.error == shared) {
        shared
    } else {
        Some(ErrorKind::Multiple)
    }
}
