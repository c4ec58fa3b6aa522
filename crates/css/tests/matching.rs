#![cfg(test)]

use std::error::Error;

use css::{ErrorKind, matches, query_selector_all};
use html::Document;
use indextree::NodeId;

type TestResult = Result<(), Box<dyn Error>>;

/// `<html><body><a class="foo bar" href="https://x.com/path" lang="en-US">`
/// `<b lang="english"></b></body></html>`
fn links() -> Result<(Document, NodeId, NodeId), Box<dyn Error>> {
    let mut doc = Document::new();
    let html = doc.append_element(doc.root(), "html", &[])?;
    let body = doc.append_element(html, "body", &[])?;
    let link = doc.append_element(
        body,
        "a",
        &[
            ("class", "foo bar"),
            ("href", "https://x.com/path"),
            ("lang", "en-US"),
        ],
    )?;
    let bold = doc.append_element(body, "b", &[("lang", "english")])?;
    Ok((doc, link, bold))
}

#[test]
fn attribute_operator_table() -> TestResult {
    let (doc, link, bold) = links()?;
    assert!(matches(&doc, link, "[class~=foo]")?);
    assert!(!matches(&doc, link, "[class=foo]")?);
    assert!(matches(&doc, link, "[class=\"foo bar\"]")?);
    assert!(matches(&doc, link, "[href^=https]")?);
    assert!(matches(&doc, link, "[href$=path]")?);
    assert!(matches(&doc, link, "[href*='x.com']")?);
    assert!(matches(&doc, link, "[lang|=en]")?);
    assert!(!matches(&doc, bold, "[lang|=en]")?);
    assert!(matches(&doc, link, ".foo.bar")?);
    assert!(!matches(&doc, link, ".foo.baz")?);
    Ok(())
}

/// `<ul>` with six `<li>` children.
fn list() -> Result<(Document, Vec<NodeId>), Box<dyn Error>> {
    let mut doc = Document::new();
    let ul = doc.append_element(doc.root(), "ul", &[])?;
    let mut items = Vec::new();
    for number in 1..=6 {
        let item = doc.append_element(ul, "li", &[])?;
        doc.append_text(item, &number.to_string())?;
        items.push(item);
    }
    Ok((doc, items))
}

fn positions(doc: &Document, items: &[NodeId], selector: &str) -> Result<Vec<usize>, Box<dyn Error>> {
    let found = query_selector_all(doc, doc.root(), selector)?;
    Ok(found
        .iter()
        .filter_map(|node| items.iter().position(|item| item == node))
        .map(|index| index.saturating_add(1))
        .collect())
}

#[test]
fn nth_child_formulas() -> TestResult {
    let (doc, items) = list()?;
    assert_eq!(positions(&doc, &items, "li:nth-child(2n+1)")?, vec![1, 3, 5]);
    assert_eq!(positions(&doc, &items, "li:nth-child(odd)")?, vec![1, 3, 5]);
    assert_eq!(positions(&doc, &items, "li:nth-child(even)")?, vec![2, 4, 6]);
    assert!(positions(&doc, &items, "li:nth-child(0)")?.is_empty());
    assert_eq!(positions(&doc, &items, "li:nth-child(3)")?, vec![3]);
    assert_eq!(positions(&doc, &items, "li:nth-child(0n+3)")?, vec![3]);
    assert_eq!(positions(&doc, &items, "li:nth-last-child(2)")?, vec![5]);
    assert_eq!(positions(&doc, &items, "li:nth-child(-n+2)")?, vec![1, 2]);
    Ok(())
}

/// `<div><p></p><span></span><i></i><b></b><section><p></p></section></div>`
#[test]
fn combinator_semantics() -> TestResult {
    let mut doc = Document::new();
    let div = doc.append_element(doc.root(), "div", &[])?;
    let para = doc.append_element(div, "p", &[])?;
    let span = doc.append_element(div, "span", &[])?;
    doc.append_element(div, "i", &[])?;
    let bold = doc.append_element(div, "b", &[])?;
    let section = doc.append_element(div, "section", &[])?;
    let nested = doc.append_element(section, "p", &[])?;
    let root = doc.root();

    assert_eq!(query_selector_all(&doc, root, "p + span")?, vec![span]);
    assert!(query_selector_all(&doc, root, "p + b")?.is_empty());
    assert_eq!(query_selector_all(&doc, root, "span ~ b")?, vec![bold]);
    assert_eq!(query_selector_all(&doc, root, "div > p")?, vec![para]);
    assert_eq!(query_selector_all(&doc, root, "div p")?, vec![para, nested]);
    assert_eq!(query_selector_all(&doc, root, "div > p + span ~ b")?, vec![bold]);
    Ok(())
}

#[test]
fn not_takes_one_alternative() -> TestResult {
    let (doc, link, bold) = links()?;
    let error = matches(&doc, link, "a:not(b, i)");
    assert!(matches!(error, Err(css::QueryError { kind: ErrorKind::ManyNot, .. })));
    assert!(matches(&doc, bold, "b:not(a.foo)")?);
    assert!(!matches(&doc, link, "a:not(a.foo)")?);
    Ok(())
}
