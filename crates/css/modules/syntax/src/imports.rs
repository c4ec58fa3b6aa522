//! `@import` statements and the resolver that loads their targets.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#at-import>

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use url::Url;

use crate::lexical::{close_span, close_string, starts_with_ignore_ascii_case, trim, unstring};

/// Selector text of the marker descriptor placed before an imported sheet.
pub const IMPORT_BEGIN: &str = "@import-begin";
/// Selector text of the marker descriptor placed after an imported sheet.
pub const IMPORT_END: &str = "@import-end";

/// Loads the text of an imported stylesheet.
///
/// Hosts usually consult their fetch cache first and go to the network on a
/// miss; either way the call is synchronous from the parser's point of view.
pub trait ImportResolver {
    /// Fetch the stylesheet at `url`.
    ///
    /// # Errors
    /// Returns an error when the stylesheet cannot be obtained; the import is
    /// then dropped and parsing continues.
    fn resolve(&mut self, url: &Url) -> Result<String>;
}

/// Resolver for contexts that never load imports.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&mut self, url: &Url) -> Result<String> {
        Err(anyhow!("imports are disabled, not loading {url}"))
    }
}

/// In-memory sheets keyed by absolute URL.
impl ImportResolver for HashMap<String, String> {
    fn resolve(&mut self, url: &Url) -> Result<String> {
        self.get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no stylesheet cached for {url}"))
    }
}

/// Target and optional media list of one `@import` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImportStatement {
    pub target: String,
    pub media: Option<String>,
}

/// Parse what follows the `@import` keyword, without the trailing `;`.
///
/// Accepts `url(x)`, `url("x")` and `"x"`, each optionally followed by a
/// media query list.
pub(crate) fn parse_import(statement: &str) -> Option<ImportStatement> {
    let statement = trim(statement);
    let bytes = statement.as_bytes();
    let (target, rest) = if starts_with_ignore_ascii_case(bytes, b"url(") {
        let close = close_span(bytes, 3)?;
        let inner = trim(statement.get(4..close)?);
        (unquote(inner), statement.get(close.saturating_add(1)..)?)
    } else if matches!(bytes.first(), Some(b'"' | b'\'')) {
        let close = close_string(bytes, 0)?;
        (
            unstring(statement.get(..=close)?),
            statement.get(close.saturating_add(1)..)?,
        )
    } else {
        return None;
    };
    if target.is_empty() {
        return None;
    }
    let media = trim(rest);
    Some(ImportStatement {
        target,
        media: (!media.is_empty()).then(|| media.to_owned()),
    })
}

fn unquote(inner: &str) -> String {
    if matches!(inner.as_bytes().first(), Some(b'"' | b'\'')) {
        unstring(inner)
    } else {
        inner.to_owned()
    }
}

/// Resolve an import target against the importing sheet's URL.
pub(crate) fn resolve_target(base: Option<&Url>, target: &str) -> Result<Url> {
    let resolved = match base {
        Some(base) => base.join(target)?,
        None => Url::parse(target)?,
    };
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every accepted spelling of the target, with and without media.
    ///
    /// # Panics
    /// Panics if a statement parses incorrectly.
    #[test]
    fn import_statement_forms() {
        let plain = parse_import(r#" "print.css" "#);
        assert_eq!(
            plain,
            Some(ImportStatement {
                target: "print.css".to_owned(),
                media: None
            })
        );
        let with_media = parse_import("url(wide.css) screen and (min-width: 900px)");
        assert_eq!(
            with_media,
            Some(ImportStatement {
                target: "wide.css".to_owned(),
                media: Some("screen and (min-width: 900px)".to_owned())
            })
        );
        let quoted_url = parse_import(r"URL('a b.css')");
        assert_eq!(
            quoted_url.map(|import| import.target),
            Some("a b.css".to_owned())
        );
        assert_eq!(parse_import("nonsense"), None);
        assert_eq!(parse_import(r#""""#), None);
    }

    /// Relative targets resolve against the importing sheet.
    ///
    /// # Panics
    /// Panics if URL joining misbehaves.
    #[test]
    fn relative_targets_join_base() -> Result<()> {
        let base = Url::parse("https://example.com/css/main.css")?;
        let joined = resolve_target(Some(&base), "../theme/dark.css")?;
        assert_eq!(joined.as_str(), "https://example.com/theme/dark.css");
        assert!(matches!(resolve_target(None, "relative.css"), Err(_)));
        Ok(())
    }
}
