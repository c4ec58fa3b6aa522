//! Byte-level helpers: strings, balanced groups, comments and escapes.
//! Spec: <https://www.w3.org/TR/css-syntax-3/#tokenization>
//!
//! Scanners only ever stop on ASCII bytes, so every index they return is a
//! valid `str` boundary.

use core::iter::Peekable;
use core::str::Chars;

/// CSS whitespace: space, tab, line feed, carriage return and form feed.
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#whitespace>
pub const fn is_css_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

/// Strip CSS whitespace from both ends.
pub fn trim(text: &str) -> &str {
    text.trim_matches(|character: char| u8::try_from(character).is_ok_and(is_css_space))
}

/// ASCII case-insensitive prefix test on raw bytes.
pub fn starts_with_ignore_ascii_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Bytes that may continue an identifier (names, tags, at-rule keywords).
pub(crate) const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') || byte >= 0x80
}

/// Index of the quote closing the string that opens at `open`.
///
/// Backslash escapes are honored. Returns `None` for an unterminated string
/// or when `open` is not a quote.
pub fn close_string(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = *bytes.get(open)?;
    if !matches!(quote, b'"' | b'\'') {
        return None;
    }
    let mut pos = open.saturating_add(1);
    while let Some(&byte) = bytes.get(pos) {
        if byte == b'\\' {
            pos = pos.saturating_add(2);
            continue;
        }
        if byte == quote {
            return Some(pos);
        }
        pos = pos.saturating_add(1);
    }
    None
}

/// Index of the bracket balancing the `(`, `[` or `{` at `open`.
///
/// Quoted strings inside the group are skipped whole. Returns `None` when the
/// group (or a string inside it) never closes.
pub fn close_span(bytes: &[u8], open: usize) -> Option<usize> {
    let opener = *bytes.get(open)?;
    let closer = match opener {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        _ => return None,
    };
    let mut depth = 0usize;
    let mut pos = open;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'"' | b'\'' => pos = close_string(bytes, pos)?,
            b'\\' => pos = pos.saturating_add(1),
            _ if byte == opener => depth = depth.saturating_add(1),
            _ if byte == closer => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
        pos = pos.saturating_add(1);
    }
    None
}

/// Remove `/* ... */` comments.
///
/// Comment markers inside quoted strings and inside `url(...)` are left
/// alone. An unterminated comment swallows the rest of the text.
pub fn uncomment(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'"' | b'\'' => {
                pos = close_string(bytes, pos).map_or(bytes.len(), |end| end.saturating_add(1));
            }
            b'/' if bytes.get(pos.saturating_add(1)) == Some(&b'*') => {
                out.push_str(text.get(copied..pos).unwrap_or_default());
                pos = find_bytes(bytes, pos.saturating_add(2), b"*/")
                    .map_or(bytes.len(), |end| end.saturating_add(2));
                copied = pos;
            }
            b'u' | b'U'
                if starts_with_ignore_ascii_case(bytes.get(pos..).unwrap_or_default(), b"url(")
                    && (pos == 0
                        || bytes
                            .get(pos.saturating_sub(1))
                            .is_some_and(|prev| !is_ident_byte(*prev))) =>
            {
                pos = close_span(bytes, pos.saturating_add(3))
                    .map_or(bytes.len(), |end| end.saturating_add(1));
            }
            _ => pos = pos.saturating_add(1),
        }
    }
    out.push_str(text.get(copied..).unwrap_or_default());
    out
}

/// First index of `needle` at or after `from`.
pub(crate) fn find_bytes(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset.saturating_add(from))
}

/// Remove quotes and decode escapes in a value.
///
/// Handles `\n`, `\t`, `\uXXXX`, CSS hex escapes (one to six digits, with one
/// optional trailing whitespace) and `\x` for any other `x`. Quote characters
/// pair up as delimiters and are dropped; the other quote kind inside a string
/// is kept.
pub fn unstring(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(character) = chars.next() {
        match character {
            '\\' => decode_escape(&mut chars, &mut out),
            '"' | '\'' if quote.is_none() => quote = Some(character),
            _ if Some(character) == quote => quote = None,
            _ => out.push(character),
        }
    }
    out
}

fn decode_escape(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    let Some(&next) = chars.peek() else {
        return;
    };
    match next {
        'n' => {
            chars.next();
            out.push('\n');
        }
        't' => {
            chars.next();
            out.push('\t');
        }
        'u' => {
            chars.next();
            let digits = take_hex(chars, 4);
            if digits.is_empty() {
                out.push('u');
            } else {
                out.push(decode_code_point(&digits));
            }
        }
        // Escaped newline is a line continuation.
        '\n' => {
            chars.next();
        }
        _ if next.is_ascii_hexdigit() => {
            let digits = take_hex(chars, 6);
            if chars.peek().is_some_and(|space| space.is_ascii_whitespace()) {
                chars.next();
            }
            out.push(decode_code_point(&digits));
        }
        _ => {
            chars.next();
            out.push(next);
        }
    }
}

fn take_hex(chars: &mut Peekable<Chars<'_>>, limit: usize) -> String {
    let mut digits = String::new();
    while digits.len() < limit
        && let Some(&digit) = chars.peek()
        && digit.is_ascii_hexdigit()
    {
        digits.push(digit);
        chars.next();
    }
    digits
}

fn decode_code_point(digits: &str) -> char {
    u32::from_str_radix(digits, 16)
        .ok()
        .filter(|code| *code != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Convert a hyphenated property name to its script-facing camel case.
///
/// `background-color` becomes `backgroundColor`. Custom properties (`--x`)
/// are returned verbatim.
pub fn camel_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_owned();
    }
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for character in name.chars() {
        if character == '-' {
            upper = !out.is_empty();
            continue;
        }
        if upper {
            out.push(character.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(character.to_ascii_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Comments go, but not inside strings or `url()`.
    ///
    /// # Panics
    /// Panics if a comment survives or protected text is altered.
    #[test]
    fn uncomment_respects_strings_and_urls() {
        assert_eq!(uncomment("a/* x */{b:c}"), "a{b:c}");
        assert_eq!(
            uncomment(r#"p{content:"/* keep */"}/**/"#),
            r#"p{content:"/* keep */"}"#
        );
        assert_eq!(
            uncomment("div{background:url(/*x*/a.png)}"),
            "div{background:url(/*x*/a.png)}"
        );
        assert_eq!(uncomment("a{}/* never closed"), "a{}");
    }

    /// Strings and balanced groups are found past nested quotes.
    ///
    /// # Panics
    /// Panics if a closing index is wrong.
    #[test]
    fn closing_brackets_skip_strings() {
        let text = br#"[title="a]b"] rest"#;
        assert_eq!(close_span(text, 0), Some(12));
        assert_eq!(close_string(br#""a\"b" x"#, 0), Some(5));
        assert_eq!(close_string(b"'open", 0), None);
        assert_eq!(close_span(b"(a(b)c", 0), None);
    }

    /// Quotes removed, escapes decoded.
    ///
    /// # Panics
    /// Panics if an escape decodes incorrectly.
    #[test]
    fn unstring_decodes_escapes() {
        assert_eq!(unstring(r#""hello""#), "hello");
        assert_eq!(unstring(r#"'it"s'"#), "it\"s");
        assert_eq!(unstring(r#""\201C quoted""#), "\u{201C}quoted");
        assert_eq!(unstring(r#""été""#), "été");
        assert_eq!(unstring(r#""a\nb""#), "a\nb");
        assert_eq!(unstring(r#""\"""#), "\"");
        assert_eq!(unstring("plain value"), "plain value");
    }

    /// Hyphenated names become camel case; custom properties stay put.
    ///
    /// # Panics
    /// Panics if a name converts incorrectly.
    #[test]
    fn camel_case_names() {
        assert_eq!(camel_case("background-color"), "backgroundColor");
        assert_eq!(camel_case("color"), "color");
        assert_eq!(camel_case("-webkit-box-shadow"), "webkitBoxShadow");
        assert_eq!(camel_case("--Main-Color"), "--Main-Color");
    }

    /// Trimming uses the CSS whitespace set.
    ///
    /// # Panics
    /// Panics if trimming leaves whitespace behind.
    #[test]
    fn trim_css_whitespace() {
        assert_eq!(trim("\x0c\t a b \r\n"), "a b");
        assert_eq!(trim(""), "");
    }
}
