//! Selector queries: `querySelector*`, `Element.matches` and the candidate
//! walks bulk passes are built on.

use core::fmt;
use std::error::Error;

use css_selectors::{
    ElementAdapter, ErrorKind, MatchContext, NodeType, Selector, SelectorList, compile,
    matches_chain,
};
use log::trace;

use crate::index::{DocList, NodeIndex};

/// A script query whose selector text did not compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryError {
    pub kind: ErrorKind,
    pub selector: String,
}

impl fmt::Display for QueryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "invalid selector `{}`: {}", self.selector, self.kind)
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

/// Ordinals of the nodes in `list` that match one selector.
///
/// Bulk passes narrow the candidates with `index`; script queries always
/// scan the whole list.
pub(crate) fn qsa1<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    list: &DocList<A::Handle>,
    index: Option<&NodeIndex>,
    selector: &Selector,
) -> Vec<usize> {
    let limit = if ctx.one_match { 1 } else { usize::MAX };
    let bucket = if ctx.bulk {
        index
            .zip(selector.chain.base())
            .and_then(|(index, base)| index.candidates(base))
    } else {
        None
    };
    let matched = |ordinal: &usize| {
        list.node(*ordinal).is_some_and(|node| {
            !(ctx.skip_root && ctx.root == Some(node))
                && matches_chain(adapter, ctx, node, &selector.chain)
        })
    };
    let found: Vec<usize> = match bucket {
        Some(ordinals) => ordinals.iter().copied().filter(matched).take(limit).collect(),
        None => (0..list.len()).filter(matched).take(limit).collect(),
    };
    if !found.is_empty() {
        trace!(
            target: "css::query",
            "{selector}: {} of {} candidates",
            found.len(),
            bucket.map_or(list.len(), <[usize]>::len)
        );
    }
    found
}

/// Union of two ordinal lists, both sorted ascending.
pub(crate) fn qsa_merge(left: &[usize], right: &[usize]) -> Vec<usize> {
    let mut merged = Vec::with_capacity(left.len().saturating_add(right.len()));
    let mut lefts = left.iter().copied().peekable();
    let mut rights = right.iter().copied().peekable();
    loop {
        let next = match (lefts.peek().copied(), rights.peek().copied()) {
            (Some(head), Some(other)) if head < other => lefts.next(),
            (Some(head), Some(other)) if head > other => rights.next(),
            (Some(_), Some(_)) => {
                rights.next();
                lefts.next()
            }
            (Some(_), None) => lefts.next(),
            (None, Some(_)) => rights.next(),
            (None, None) => break,
        };
        merged.extend(next);
    }
    merged
}

/// Ordinals matching any selector of `list` that takes part in the
/// context's mode and hover state.
pub(crate) fn qsa2<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    list: &DocList<A::Handle>,
    index: Option<&NodeIndex>,
    selectors: &SelectorList,
) -> Vec<usize> {
    let mut found = Vec::new();
    for selector in selectors
        .usable()
        .filter(|selector| selector.accepts(ctx.mode, ctx.hover))
    {
        let matched = qsa1(adapter, ctx, list, index, selector);
        found = if found.is_empty() {
            matched
        } else {
            qsa_merge(&found, &matched)
        };
    }
    // each selector stops at its own first match; the earliest across them wins
    if ctx.one_match {
        found.truncate(1);
    }
    found
}

/// First element child of a document node.
pub(crate) fn document_element<A: ElementAdapter>(
    adapter: &A,
    document: A::Handle,
) -> Option<A::Handle> {
    let mut cursor = adapter.first_child(document);
    while let Some(child) = cursor {
        if adapter.node_type(child) == NodeType::Element {
            return Some(child);
        }
        cursor = adapter.next_sibling(child);
    }
    None
}

/// Node answering `:root` for anything inside the tree containing `node`.
pub(crate) fn tree_root<A: ElementAdapter>(adapter: &A, node: A::Handle) -> Option<A::Handle> {
    let mut top = node;
    while let Some(parent) = adapter.parent(top) {
        top = parent;
    }
    match adapter.node_type(top) {
        NodeType::Document => document_element(adapter, top),
        NodeType::Element => Some(top),
        NodeType::Text | NodeType::Comment | NodeType::Other => None,
    }
}

fn compile_query(text: &str) -> Result<SelectorList, QueryError> {
    let list = compile(text, false);
    match list.error {
        Some(kind) => Err(QueryError {
            kind,
            selector: text.to_owned(),
        }),
        None => Ok(list),
    }
}

fn run_query<A: ElementAdapter>(
    adapter: &A,
    root: A::Handle,
    text: &str,
    one_match: bool,
) -> Result<Vec<A::Handle>, QueryError> {
    let selectors = compile_query(text)?;
    let scoped = adapter.node_type(root) != NodeType::Document;
    let mut ctx = MatchContext::script(if scoped {
        Some(root)
    } else {
        document_element(adapter, root)
    });
    ctx.skip_root = scoped;
    ctx.one_match = one_match;
    let list = DocList::build(adapter, root);
    Ok(qsa2(adapter, &ctx, &list, None, &selectors)
        .into_iter()
        .filter_map(|ordinal| list.node(ordinal))
        .collect())
}

/// Elements under `root` matching `selector`, in document order
/// (`querySelectorAll`).
///
/// When `root` is an element it is left out of the result and answers
/// `:scope`; ancestors outside it still take part in combinators.
///
/// # Errors
/// Returns [`QueryError`] when no selector of the list compiles.
pub fn query_selector_all<A: ElementAdapter>(
    adapter: &A,
    root: A::Handle,
    selector: &str,
) -> Result<Vec<A::Handle>, QueryError> {
    run_query(adapter, root, selector, false)
}

/// First element under `root` matching `selector` (`querySelector`).
///
/// # Errors
/// Returns [`QueryError`] when no selector of the list compiles.
pub fn query_selector<A: ElementAdapter>(
    adapter: &A,
    root: A::Handle,
    selector: &str,
) -> Result<Option<A::Handle>, QueryError> {
    Ok(run_query(adapter, root, selector, true)?.into_iter().next())
}

/// Whether anything in the document containing `node` matches `selector`.
///
/// # Errors
/// Returns [`QueryError`] when no selector of the list compiles.
pub fn matches_anywhere_in_document<A: ElementAdapter>(
    adapter: &A,
    node: A::Handle,
    selector: &str,
) -> Result<bool, QueryError> {
    let mut top = node;
    while let Some(parent) = adapter.parent(top) {
        top = parent;
    }
    Ok(query_selector(adapter, top, selector)?.is_some())
}

/// Whether `node` itself matches `selector` (`Element.matches`).
///
/// # Errors
/// Returns [`QueryError`] when no selector of the list compiles.
pub fn matches<A: ElementAdapter>(
    adapter: &A,
    node: A::Handle,
    selector: &str,
) -> Result<bool, QueryError> {
    let selectors = compile_query(selector)?;
    let ctx = MatchContext::script(tree_root(adapter, node));
    Ok(selectors
        .usable()
        .filter(|compiled| compiled.accepts(ctx.mode, ctx.hover))
        .any(|compiled| matches_chain(adapter, &ctx, node, &compiled.chain)))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use html::Document;
    use indextree::NodeId;

    use super::*;

    /// `html > body > (div#a.x > p.x, p#b, iframe > p)`
    fn sample() -> Result<(Document, [NodeId; 5])> {
        let mut doc = Document::new();
        let html = doc.append_element(doc.root(), "html", &[])?;
        let body = doc.append_element(html, "body", &[])?;
        let div = doc.append_element(body, "div", &[("id", "a"), ("class", "x")])?;
        let inner = doc.append_element(div, "p", &[("class", "x")])?;
        let outer = doc.append_element(body, "p", &[("id", "b")])?;
        let frame = doc.append_element(body, "iframe", &[])?;
        doc.append_element(frame, "p", &[])?;
        doc.set_frame(frame, true)?;
        Ok((doc, [html, body, div, inner, outer]))
    }

    /// Merging keeps order and drops duplicates.
    ///
    /// # Panics
    /// Panics if the merge is wrong.
    #[test]
    fn merge_sorted() {
        assert_eq!(qsa_merge(&[1, 4, 6], &[2, 4, 7, 9]), vec![1, 2, 4, 6, 7, 9]);
        assert_eq!(qsa_merge(&[], &[3]), vec![3]);
        assert!(qsa_merge(&[], &[]).is_empty());
    }

    /// Document queries see every element except frame content.
    ///
    /// # Panics
    /// Panics if a query returns the wrong nodes.
    #[test]
    fn document_queries() -> Result<()> {
        let (doc, [html, _, div, inner, outer]) = sample()?;
        let root = doc.root();
        assert_eq!(query_selector_all(&doc, root, "p")?, vec![inner, outer]);
        assert_eq!(query_selector_all(&doc, root, "#b, .x")?, vec![div, inner, outer]);
        assert_eq!(query_selector(&doc, root, "p")?, Some(inner));
        assert_eq!(query_selector(&doc, root, ":root")?, Some(html));
        assert_eq!(query_selector(&doc, root, "table")?, None);
        assert!(matches_anywhere_in_document(&doc, inner, "div > p")?);
        assert!(!matches_anywhere_in_document(&doc, inner, "iframe p")?);
        Ok(())
    }

    /// `querySelector` on a list returns the earliest node any alternative
    /// matches, not the first hit of the first alternative.
    ///
    /// # Panics
    /// Panics if a later alternative's earlier match is lost.
    #[test]
    fn first_match_across_alternatives() -> Result<()> {
        let (doc, [_, body, div, _, outer]) = sample()?;
        let root = doc.root();
        assert_eq!(query_selector(&doc, root, "#b, .x")?, Some(div));
        assert_eq!(query_selector(&doc, root, "p#b, div")?, Some(div));
        assert_eq!(query_selector(&doc, body, "#b, iframe")?, Some(outer));
        let all = query_selector_all(&doc, root, "#b, .x")?;
        assert_eq!(query_selector(&doc, root, "#b, .x")?, all.first().copied());
        Ok(())
    }

    /// Element-scoped queries skip the scope and answer `:scope` with it.
    ///
    /// # Panics
    /// Panics if scoping is not honoured.
    #[test]
    fn scoped_queries() -> Result<()> {
        let (doc, [_, body, div, inner, _]) = sample()?;
        assert_eq!(query_selector_all(&doc, div, ".x")?, vec![inner]);
        assert_eq!(query_selector_all(&doc, div, "body p")?, vec![inner]);
        assert_eq!(query_selector_all(&doc, body, ":scope > div")?, vec![div]);
        Ok(())
    }

    /// `matches` tests one node; bad selectors surface as errors.
    ///
    /// # Panics
    /// Panics if matching or error reporting is wrong.
    #[test]
    fn element_matches() -> Result<()> {
        let (doc, [html, _, div, inner, _]) = sample()?;
        assert!(matches(&doc, inner, "div.x > p")?);
        assert!(!matches(&doc, div, "p")?);
        assert!(matches(&doc, html, ":root")?);
        assert!(!matches(&doc, inner, "p:hover")?);
        let error = matches(&doc, inner, "a:visited");
        assert!(matches!(
            error,
            Err(QueryError {
                kind: ErrorKind::Dynamic,
                ..
            })
        ));
        assert!(matches!(query_selector_all(&doc, doc.root(), ""), Err(_)));
        let message = matches(&doc, inner, "a:not(b, i)").map_err(|failure| failure.to_string());
        assert_eq!(
            message,
            Err("invalid selector `a:not(b, i)`: more than one selector inside :not() (manynot)"
                .to_owned())
        );
        Ok(())
    }
}
