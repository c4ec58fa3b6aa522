//! Stylesheet splitting: text to raw `selector { body }` descriptors.
//! Spec: <https://www.w3.org/TR/css-syntax-3/#parse-stylesheet>

use css_media_queries::{MediaEnvironment, evaluate};
use log::{debug, trace, warn};
use url::Url;

use crate::errors::{ErrorKind, ParseStats};
use crate::imports::{IMPORT_BEGIN, IMPORT_END, ImportResolver, parse_import, resolve_target};
use crate::lexical::{
    close_span, close_string, is_css_space, is_ident_byte, starts_with_ignore_ascii_case, trim,
    uncomment,
};

/// One `selector { body }` pair, before selector or declaration compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawDescriptor {
    /// Text in front of the block (selector list or at-rule prelude).
    pub selector: String,
    /// Text inside the braces.
    pub body: String,
    /// Set when the descriptor came from inside a satisfied `@media` block.
    pub under_at: bool,
    /// Set when splitting already decided the descriptor is unusable.
    pub error: Option<ErrorKind>,
}

/// Inputs the splitter needs besides the text itself.
#[derive(Clone, Copy, Debug)]
pub struct SplitOptions<'env> {
    /// URL of the sheet, for resolving relative `@import` targets.
    pub base: Option<&'env Url>,
    /// Screen that `@media` and `@import ... <media>` are evaluated against.
    pub media: &'env MediaEnvironment,
    /// Imports nested deeper than this are dropped.
    pub max_import_depth: usize,
}

/// Where the prelude scan stopped.
enum Stop {
    Block(usize),
    Statement(usize),
    StrayClose(usize),
    End,
    Unterminated,
}

struct Splitter<'opts, 'env, 'res> {
    options: &'opts SplitOptions<'env>,
    resolver: &'res mut dyn ImportResolver,
    import_stack: Vec<Url>,
    stats: ParseStats,
    descriptors: Vec<RawDescriptor>,
}

/// Split stylesheet text into raw descriptors.
///
/// Comments are removed, `@import` statements are replaced by the imported
/// text (bracketed by `@import-begin`/`@import-end` marker descriptors) and
/// `@charset` is dropped. Satisfied `@media` blocks are flattened into
/// descriptors flagged `under_at`; other at-rules become errored descriptors.
/// The scan never fails: an unterminated string or bracket truncates the
/// remaining input.
pub fn split_stylesheet(
    text: &str,
    options: &SplitOptions<'_>,
    resolver: &mut dyn ImportResolver,
) -> (Vec<RawDescriptor>, ParseStats) {
    let mut splitter = Splitter {
        options,
        resolver,
        import_stack: options.base.into_iter().cloned().collect(),
        stats: ParseStats::default(),
        descriptors: Vec::new(),
    };
    let prepared = splitter.prepare(text, options.base, 0);
    splitter.split_region(&prepared, false);
    splitter.stats.descriptors = splitter.descriptors.len();
    debug!(
        target: "css::syntax",
        "split {} bytes into {} descriptors ({} imports, {} errors)",
        text.len(),
        splitter.stats.descriptors,
        splitter.stats.imports,
        splitter.stats.total_errors()
    );
    (splitter.descriptors, splitter.stats)
}

impl Splitter<'_, '_, '_> {
    /// Uncomment, splice imports and drop `@charset`.
    fn prepare(&mut self, text: &str, base: Option<&Url>, depth: usize) -> String {
        let uncommented = uncomment(text);
        let spliced = self.splice_imports(&uncommented, base, depth);
        strip_statements(&spliced, b"@charset")
    }

    fn splice_imports(&mut self, text: &str, base: Option<&Url>, depth: usize) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut pos = 0;
        while let Some(&byte) = bytes.get(pos) {
            match byte {
                b'"' | b'\'' => {
                    pos = close_string(bytes, pos).map_or(bytes.len(), |end| end.saturating_add(1));
                }
                b'{' => {
                    pos = close_span(bytes, pos).map_or(bytes.len(), |end| end.saturating_add(1));
                }
                b'@' if at_keyword(bytes, pos, b"@import") => {
                    let end = statement_end(bytes, pos);
                    out.push_str(text.get(copied..pos).unwrap_or_default());
                    let statement = text
                        .get(pos.saturating_add(b"@import".len())..end)
                        .unwrap_or_default();
                    if let Some(imported) = self.import(statement, base, depth) {
                        out.push_str(&imported);
                    }
                    pos = end.saturating_add(1).min(bytes.len());
                    copied = pos;
                }
                _ => pos = pos.saturating_add(1),
            }
        }
        out.push_str(text.get(copied..).unwrap_or_default());
        out
    }

    /// Load one import and return its prepared text wrapped in markers.
    fn import(&mut self, statement: &str, base: Option<&Url>, depth: usize) -> Option<String> {
        let Some(import) = parse_import(statement) else {
            debug!(target: "css::syntax", "unparseable @import{statement}");
            self.stats.record(ErrorKind::At);
            return None;
        };
        if let Some(media) = import.media.as_deref() {
            match evaluate(media, self.options.media) {
                Ok(true) => {}
                Ok(false) => {
                    trace!(target: "css::syntax", "@import {} skipped for media {media}", import.target);
                    return None;
                }
                Err(error) => {
                    debug!(target: "css::syntax", "@import {}: {error}", import.target);
                    self.stats.record(ErrorKind::BadMedia);
                    return None;
                }
            }
        }
        let url = match resolve_target(base, &import.target) {
            Ok(url) => url,
            Err(error) => {
                warn!(target: "css::syntax", "cannot resolve @import {}: {error}", import.target);
                return None;
            }
        };
        if depth >= self.options.max_import_depth {
            warn!(target: "css::syntax", "@import {url} exceeds depth {}", self.options.max_import_depth);
            return None;
        }
        if self.import_stack.contains(&url) {
            warn!(target: "css::syntax", "@import cycle through {url}");
            return None;
        }
        let text = match self.resolver.resolve(&url) {
            Ok(text) => text,
            Err(error) => {
                warn!(target: "css::syntax", "@import {url} not loaded: {error:#}");
                return None;
            }
        };
        self.stats.imports = self.stats.imports.saturating_add(1);
        self.import_stack.push(url.clone());
        let nested = self.prepare(&text, Some(&url), depth.saturating_add(1));
        self.import_stack.pop();
        Some(format!(
            "\n{IMPORT_BEGIN} {url}{{}}\n{nested}\n{IMPORT_END} {url}{{}}\n"
        ))
    }

    fn push(&mut self, selector: &str, body: &str, under_at: bool, error: Option<ErrorKind>) {
        if let Some(kind) = error {
            trace!(target: "css::syntax", "descriptor `{selector}`: {kind}");
            self.stats.record(kind);
        }
        self.descriptors.push(RawDescriptor {
            selector: trim(selector).to_owned(),
            body: body.to_owned(),
            under_at,
            error,
        });
    }

    /// Cut `text` into descriptors; `under_at` marks the inside of `@media`.
    fn split_region(&mut self, text: &str, under_at: bool) {
        let bytes = text.as_bytes();
        let mut pos = 0;
        loop {
            while bytes.get(pos).copied().is_some_and(is_css_space) {
                pos = pos.saturating_add(1);
            }
            if pos >= bytes.len() {
                return;
            }
            let start = pos;
            let at_rule = bytes.get(pos) == Some(&b'@');
            let rest = text.get(start..).unwrap_or_default();
            match scan_prelude(bytes, pos, at_rule) {
                Stop::End => {
                    self.push(rest, "", under_at, Some(ErrorKind::NoRules));
                    return;
                }
                Stop::Unterminated => {
                    self.push(rest, "", under_at, Some(ErrorKind::OpenBracket));
                    return;
                }
                Stop::StrayClose(close) => {
                    let prelude = text.get(start..close).unwrap_or_default();
                    self.push(prelude, "", under_at, Some(ErrorKind::Nested));
                    pos = close.saturating_add(1);
                }
                Stop::Statement(semicolon) => {
                    let prelude = text.get(start..semicolon).unwrap_or_default();
                    let kind = if at_rule_name(prelude).is_empty() {
                        ErrorKind::EmptyAt
                    } else {
                        ErrorKind::At
                    };
                    self.push(prelude, "", under_at, Some(kind));
                    pos = semicolon.saturating_add(1);
                }
                Stop::Block(open) => {
                    let prelude = text.get(start..open).unwrap_or_default();
                    let (close, deepest) = scan_block(bytes, open);
                    let body_end = close.unwrap_or(bytes.len());
                    let body = text
                        .get(open.saturating_add(1)..body_end)
                        .unwrap_or_default();
                    if at_rule {
                        self.at_rule(prelude, body, under_at);
                    } else if deepest > 1 {
                        self.push(prelude, body, under_at, Some(ErrorKind::Nested));
                    } else {
                        self.push(prelude, body, under_at, None);
                    }
                    match close {
                        Some(close) => pos = close.saturating_add(1),
                        None => return,
                    }
                }
            }
        }
    }

    fn at_rule(&mut self, prelude: &str, body: &str, under_at: bool) {
        let name = at_rule_name(prelude).to_ascii_lowercase();
        match name.as_str() {
            "" => self.push(prelude, body, under_at, Some(ErrorKind::EmptyAt)),
            "import-begin" | "import-end" => {
                self.push(prelude, "", under_at, Some(ErrorKind::AtProcessed));
            }
            "media" => {
                let query = prelude
                    .get(b"@media".len()..)
                    .map(trim)
                    .unwrap_or_default();
                match evaluate(query, self.options.media) {
                    Ok(true) => {
                        self.push(prelude, "", under_at, Some(ErrorKind::AtProcessed));
                        self.split_region(body, true);
                    }
                    Ok(false) => {
                        trace!(target: "css::syntax", "@media {query} does not apply");
                        self.push(prelude, "", under_at, Some(ErrorKind::AtProcessed));
                    }
                    Err(error) => {
                        debug!(target: "css::syntax", "@media {query}: {error}");
                        self.push(prelude, body, under_at, Some(ErrorKind::BadMedia));
                    }
                }
            }
            _ => self.push(prelude, body, under_at, Some(ErrorKind::NotMedia)),
        }
    }
}

/// Walk a prelude until its block, statement end or a stray `}`.
fn scan_prelude(bytes: &[u8], start: usize, at_rule: bool) -> Stop {
    let mut pos = start;
    loop {
        match bytes.get(pos) {
            None => return Stop::End,
            Some(b'{') => return Stop::Block(pos),
            Some(b';') if at_rule => return Stop::Statement(pos),
            Some(b'}') => return Stop::StrayClose(pos),
            Some(b'"' | b'\'') => match close_string(bytes, pos) {
                Some(end) => pos = end.saturating_add(1),
                None => return Stop::Unterminated,
            },
            Some(b'[' | b'(') => match close_span(bytes, pos) {
                Some(end) => pos = end.saturating_add(1),
                None => return Stop::Unterminated,
            },
            Some(_) => pos = pos.saturating_add(1),
        }
    }
}

/// Find the `}` closing the block at `open`, and the deepest brace nesting seen.
///
/// Returns `None` for the close when the block (or a string inside it) runs
/// to the end of the text.
fn scan_block(bytes: &[u8], open: usize) -> (Option<usize>, usize) {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut pos = open;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'"' | b'\'' => match close_string(bytes, pos) {
                Some(end) => pos = end,
                None => return (None, deepest),
            },
            b'\\' => pos = pos.saturating_add(1),
            b'{' => {
                depth = depth.saturating_add(1);
                deepest = deepest.max(depth);
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (Some(pos), deepest);
                }
            }
            _ => {}
        }
        pos = pos.saturating_add(1);
    }
    (None, deepest)
}

/// Name following `@`, up to the first non-identifier byte.
fn at_rule_name(prelude: &str) -> &str {
    let name = prelude.get(1..).unwrap_or_default();
    let end = name
        .bytes()
        .position(|byte| !is_ident_byte(byte))
        .unwrap_or(name.len());
    name.get(..end).unwrap_or_default()
}

/// `keyword` (with its `@`) at `pos`, not followed by more identifier bytes.
fn at_keyword(bytes: &[u8], pos: usize, keyword: &[u8]) -> bool {
    starts_with_ignore_ascii_case(bytes.get(pos..).unwrap_or_default(), keyword)
        && !bytes
            .get(pos.saturating_add(keyword.len()))
            .copied()
            .is_some_and(is_ident_byte)
}

/// Index of the `;` ending the statement at `start`, or the text length.
fn statement_end(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b';' => return pos,
            b'"' | b'\'' => match close_string(bytes, pos) {
                Some(end) => pos = end.saturating_add(1),
                None => return bytes.len(),
            },
            b'(' | b'[' => match close_span(bytes, pos) {
                Some(end) => pos = end.saturating_add(1),
                None => return bytes.len(),
            },
            _ => pos = pos.saturating_add(1),
        }
    }
    bytes.len()
}

/// Drop every top-level statement that starts with `keyword`.
fn strip_statements(text: &str, keyword: &[u8]) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'"' | b'\'' => {
                pos = close_string(bytes, pos).map_or(bytes.len(), |end| end.saturating_add(1));
            }
            b'{' => {
                pos = close_span(bytes, pos).map_or(bytes.len(), |end| end.saturating_add(1));
            }
            b'@' if at_keyword(bytes, pos, keyword) => {
                out.push_str(text.get(copied..pos).unwrap_or_default());
                pos = statement_end(bytes, pos).saturating_add(1).min(bytes.len());
                copied = pos;
            }
            _ => pos = pos.saturating_add(1),
        }
    }
    out.push_str(text.get(copied..).unwrap_or_default());
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::NoImports;

    use super::*;

    fn split(text: &str) -> (Vec<RawDescriptor>, ParseStats) {
        let env = MediaEnvironment::default();
        let options = SplitOptions {
            base: None,
            media: &env,
            max_import_depth: 8,
        };
        split_stylesheet(text, &options, &mut NoImports)
    }

    fn selectors(descriptors: &[RawDescriptor]) -> Vec<&str> {
        descriptors
            .iter()
            .map(|descriptor| descriptor.selector.as_str())
            .collect()
    }

    /// Plain rules split on braces; strings and brackets are opaque.
    ///
    /// # Panics
    /// Panics if descriptors are cut in the wrong place.
    #[test]
    fn splits_plain_rules() {
        let (descriptors, stats) =
            split(r#"p { color: red } a[title="}{"] { content: "}" } div{}"#);
        assert_eq!(selectors(&descriptors), vec!["p", r#"a[title="}{"]"#, "div"]);
        assert_eq!(descriptors[1].body, r#" content: "}" "#);
        assert!(descriptors.iter().all(|descriptor| descriptor.error.is_none()));
        assert_eq!(stats.descriptors, 3);
    }

    /// Nested braces poison only their own rule.
    ///
    /// # Panics
    /// Panics if the nested rule is accepted or the next rule is lost.
    #[test]
    fn nested_braces_are_errors() {
        let (descriptors, stats) = split("div { a { b: c } } span { color: blue }");
        assert_eq!(descriptors[0].error, Some(ErrorKind::Nested));
        assert_eq!(descriptors[1].selector, "span");
        assert_eq!(descriptors[1].error, None);
        assert_eq!(stats.count(ErrorKind::Nested), 1);
    }

    /// `@media` blocks flatten when they hold and vanish when they do not.
    ///
    /// # Panics
    /// Panics if media blocks are handled incorrectly.
    #[test]
    fn media_blocks_flatten() {
        let (descriptors, _) = split(
            "@media screen and (min-width: 800px) { .wide { x: y } } \
             @media print { .paper { x: y } } \
             @media (bogus) { .bad { x: y } }",
        );
        let wide = descriptors
            .iter()
            .find(|descriptor| descriptor.selector == ".wide");
        assert!(wide.is_some_and(|descriptor| descriptor.under_at));
        assert!(descriptors.iter().all(|descriptor| descriptor.selector != ".paper"));
        assert_eq!(
            descriptors.last().and_then(|descriptor| descriptor.error),
            Some(ErrorKind::BadMedia)
        );
        assert_eq!(descriptors[0].error, Some(ErrorKind::AtProcessed));
    }

    /// Other at-rules are kept as errored descriptors.
    ///
    /// # Panics
    /// Panics if an at-rule is classified incorrectly.
    #[test]
    fn other_at_rules() {
        let (descriptors, _) = split(
            "@font-face { font-family: x } @namespace svg url(x); @ { } @charset \"utf-8\"; p {}",
        );
        let kinds: Vec<Option<ErrorKind>> =
            descriptors.iter().map(|descriptor| descriptor.error).collect();
        assert_eq!(
            kinds,
            vec![
                Some(ErrorKind::NotMedia),
                Some(ErrorKind::At),
                Some(ErrorKind::EmptyAt),
                None
            ]
        );
    }

    /// An unterminated string truncates the rest of the sheet.
    ///
    /// # Panics
    /// Panics if the good rule is lost or the scan does not stop.
    #[test]
    fn unterminated_string_truncates() {
        let (descriptors, _) = split(r#"p { color: red } div"oops { x: y } b { }"#);
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].selector, "p");
        assert_eq!(descriptors[1].error, Some(ErrorKind::OpenBracket));
    }

    /// Leftover text and stray closing braces are reported, not fatal.
    ///
    /// # Panics
    /// Panics if recovery drops good rules.
    #[test]
    fn stray_text_recovery() {
        let (descriptors, _) = split("} p { a: b } trailing");
        assert_eq!(descriptors[0].error, Some(ErrorKind::Nested));
        assert_eq!(descriptors[1].selector, "p");
        assert_eq!(descriptors[2].error, Some(ErrorKind::NoRules));
    }

    /// Imports splice in place with markers, and cycles stop.
    ///
    /// # Panics
    /// Panics if imports are not spliced or a cycle loops.
    #[test]
    fn imports_splice_with_markers() -> Result<(), url::ParseError> {
        let base = Url::parse("https://example.com/css/main.css")?;
        let mut sheets: HashMap<String, String> = HashMap::new();
        sheets.insert(
            "https://example.com/css/a.css".to_owned(),
            "@import 'main.css'; .from-a { x: y }".to_owned(),
        );
        sheets.insert(
            "https://example.com/css/main.css".to_owned(),
            ".cycle { x: y }".to_owned(),
        );
        let env = MediaEnvironment::default();
        let options = SplitOptions {
            base: Some(&base),
            media: &env,
            max_import_depth: 8,
        };
        let text = "@charset \"utf-8\"; @import url(a.css); @import 'print.css' print; .main { x: y }";
        let (descriptors, stats) = split_stylesheet(text, &options, &mut sheets);
        assert_eq!(
            selectors(&descriptors),
            vec![
                "@import-begin https://example.com/css/a.css",
                ".from-a",
                "@import-end https://example.com/css/a.css",
                ".main"
            ]
        );
        assert_eq!(stats.imports, 1);
        assert_eq!(stats.count(ErrorKind::AtProcessed), 2);
        Ok(())
    }
}
