//! Style application: the load-time bulk pass, computed-style lookups and
//! `cssText` assignment.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use css_cascade::{
    HoverEffect, PseudoElement, StyleHost, StyleTarget, apply_declarations, apply_inline,
    generated_content,
};
use css_selectors::{ElementAdapter, MatchContext, MatchMode, matches_chain};
use css_style_attr::parse_declaration_block;
use log::{debug, trace, warn};
use serde::Serialize;
use tracing::info_span;

use crate::config::EngineConfig;
use crate::index::{DocList, NodeIndex};
use crate::query::{document_element, qsa2, tree_root};
use crate::stylesheet::Stylesheet;

const MODES: [MatchMode; 3] = [MatchMode::Plain, MatchMode::Before, MatchMode::After];

/// What one bulk pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    /// Elements visited.
    pub elements: usize,
    /// `(descriptor, element)` matches over all six passes.
    pub matches: usize,
    /// Properties written to style targets.
    pub writes: usize,
    /// `style="..."` attributes applied.
    pub inline_blocks: usize,
    /// Synthetic before/after text nodes filled.
    pub generated: usize,
    /// Elements given a non-empty hover effect.
    pub hover_effects: usize,
}

/// Apply `sheet` to every element below `document`.
///
/// Six passes run over the same index, one per mode and hover state. Plain
/// passes write declarations; before/after passes collect `content` text;
/// hover passes only record what hovering would change. Generated content
/// and hover effects reach the host after the index is gone.
pub fn run_bulk_pass<H: StyleHost>(
    host: &mut H,
    document: H::Handle,
    sheet: &Stylesheet,
    config: &EngineConfig,
) -> BulkReport {
    host.clear_generated_content();
    let list = DocList::build(&*host, document);
    let _span = info_span!(
        "css.bulk_pass",
        descriptors = sheet.len(),
        elements = list.len()
    )
    .entered();
    let index = config.use_index.then(|| NodeIndex::build(&*host, &list));
    let root = document_element(&*host, document);
    let mut report = BulkReport {
        elements: list.len(),
        ..BulkReport::default()
    };
    // (ordinal, pseudo) -> (score, text); the higher score wins, ties keep the first
    let mut pending: BTreeMap<(usize, PseudoElement), (u32, String)> = BTreeMap::new();
    let mut hovers: BTreeMap<usize, HoverEffect> = BTreeMap::new();

    for hover in [false, true] {
        for mode in MODES {
            let ctx = MatchContext::bulk(root, mode, hover);
            for descriptor in sheet.usable() {
                let matched = qsa2(&*host, &ctx, &list, index.as_ref(), &descriptor.selectors);
                if matched.is_empty() {
                    continue;
                }
                report.matches = report.matches.saturating_add(matched.len());
                let score = descriptor.highest_specificity;
                if hover {
                    let effect = HoverEffect::from_block(&descriptor.declarations);
                    for ordinal in matched {
                        let slot = hovers.entry(ordinal).or_default();
                        *slot = slot.merge(effect);
                    }
                    continue;
                }
                let pseudo = match mode {
                    MatchMode::Plain => {
                        for node in matched.into_iter().filter_map(|ordinal| list.node(ordinal)) {
                            if let Some(style) = host.style_mut(node) {
                                let writes =
                                    apply_declarations(style, &descriptor.declarations, score);
                                report.writes = report.writes.saturating_add(writes);
                            }
                        }
                        continue;
                    }
                    MatchMode::Before => PseudoElement::Before,
                    MatchMode::After => PseudoElement::After,
                };
                for ordinal in matched {
                    let Some(node) = list.node(ordinal) else {
                        continue;
                    };
                    let Some(text) = generated_content(&*host, node, &descriptor.declarations)
                    else {
                        continue;
                    };
                    match pending.entry((ordinal, pseudo)) {
                        Entry::Vacant(slot) => {
                            slot.insert((score, text));
                        }
                        Entry::Occupied(mut slot) => {
                            if score > slot.get().0 {
                                slot.insert((score, text));
                            }
                        }
                    }
                }
            }
        }
    }

    if config.apply_style_attributes {
        for node in list.nodes().iter().copied() {
            if apply_style_attribute(host, node) > 0 {
                report.inline_blocks = report.inline_blocks.saturating_add(1);
            }
        }
    }

    drop(index);
    for ((ordinal, pseudo), (_, text)) in pending {
        let Some(node) = list.node(ordinal) else {
            continue;
        };
        match host.set_generated_content(node, pseudo, &text) {
            Ok(()) => report.generated = report.generated.saturating_add(1),
            Err(error) => warn!(target: "css::bulk", "generated content not inserted: {error:#}"),
        }
    }
    for (ordinal, effect) in hovers {
        if effect.is_empty() {
            continue;
        }
        if let Some(node) = list.node(ordinal) {
            host.set_hover_effect(node, effect);
            report.hover_effects = report.hover_effects.saturating_add(1);
        }
    }
    debug!(
        target: "css::bulk",
        "bulk pass: {} elements, {} matches, {} writes",
        report.elements,
        report.matches,
        report.writes
    );
    report
}

/// Apply the `style` attribute of `node`, if any. Returns the number of writes.
fn apply_style_attribute<H: StyleHost>(host: &mut H, node: H::Handle) -> usize {
    let Some(block) = host.attr(node, "style").map(parse_declaration_block) else {
        return 0;
    };
    if !block.is_usable() {
        return 0;
    }
    host.style_mut(node)
        .map_or(0, |style| apply_inline(style, &block))
}

/// Write the styles matching `node` into `dest` (`getComputedStyle`).
///
/// Only plain selectors take part. Each matching rule is applied at its
/// highest specificity, and the element's `style` attribute is folded in
/// last when the configuration asks for it. Returns the number of writes.
pub fn apply_computed_style<A, T>(
    adapter: &A,
    node: A::Handle,
    sheet: &Stylesheet,
    config: &EngineConfig,
    dest: &mut T,
) -> usize
where
    A: ElementAdapter,
    T: StyleTarget + ?Sized,
{
    let _span = info_span!("css.computed_style", descriptors = sheet.len()).entered();
    let ctx = MatchContext::computed_style(tree_root(adapter, node));
    let mut writes = 0usize;
    for descriptor in sheet.usable() {
        let hit = descriptor
            .selectors
            .usable()
            .filter(|selector| selector.accepts(ctx.mode, ctx.hover))
            .any(|selector| matches_chain(adapter, &ctx, node, &selector.chain));
        if hit {
            trace!(target: "css::bulk", "computed style: `{}` applies", descriptor.selector_text);
            writes = writes.saturating_add(apply_declarations(
                dest,
                &descriptor.declarations,
                descriptor.highest_specificity,
            ));
        }
    }
    if config.apply_style_attributes
        && let Some(block) = adapter.attr(node, "style").map(parse_declaration_block)
        && block.is_usable()
    {
        writes = writes.saturating_add(apply_inline(dest, &block));
    }
    writes
}

/// Assign `text` as the `cssText` of `node`'s style. Returns the number of
/// writes; a block with no usable declaration writes nothing.
pub fn apply_inline_css_text<H: StyleHost>(host: &mut H, node: H::Handle, text: &str) -> usize {
    let block = parse_declaration_block(text);
    if let Some(kind) = block.error {
        debug!(target: "css::bulk", "cssText `{text}` ignored: {kind}");
        return 0;
    }
    host.style_mut(node)
        .map_or(0, |style| apply_inline(style, &block))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use css_cascade::StyleMap;
    use html::Document;

    use super::*;

    /// Rules, `:before`/`:after` content, hover and style attributes in one pass.
    ///
    /// # Panics
    /// Panics if any part of the pass is missing.
    #[test]
    fn full_pass() -> Result<()> {
        let _logger = env_logger::builder().is_test(true).try_init();
        let mut doc = Document::new();
        let html = doc.append_element(doc.root(), "html", &[])?;
        let body = doc.append_element(html, "body", &[])?;
        let link = doc.append_element(
            body,
            "a",
            &[("id", "go"), ("class", "nav"), ("style", "margin: 2px"), ("title", "Go")],
        )?;
        let menu = doc.append_element(body, "ul", &[("class", "menu")])?;
        let config = EngineConfig::default();
        let sheet = Stylesheet::parse(
            "a { color: red; margin: 0 } \
             #go { color: blue } \
             .nav:before { content: \"[\" attr(title) \"]\" } \
             a:before { content: \"low\" } \
             .nav:after { content: none } \
             a:hover .menu, .menu:hover { display: block }",
            &config,
        );
        let root = doc.root();
        let report = run_bulk_pass(&mut doc, root, &sheet, &config);
        assert_eq!(report.elements, 4);
        assert_eq!(doc.style_property(link, "color"), Some("blue"));
        assert_eq!(doc.style_property(link, "margin"), Some("2px"));
        assert_eq!(doc.generated_text(link, PseudoElement::Before), Some("[Go]"));
        assert_eq!(doc.generated_text(link, PseudoElement::After), None);
        assert!(doc.hover_effect(menu).reveals);
        assert!(doc.hover_effect(link).is_empty());
        assert_eq!(report.generated, 1);
        assert_eq!(report.inline_blocks, 1);

        let again = run_bulk_pass(&mut doc, root, &sheet, &config);
        assert_eq!(again.generated, 1);
        assert_eq!(doc.children(link).count(), 1);
        Ok(())
    }

    /// Generated content does not change what later passes match, and content
    /// no rule produces any more is cleared.
    ///
    /// # Panics
    /// Panics if a synthetic node breaks `:empty` or stale text survives.
    #[test]
    fn repeated_passes_keep_generated_content_current() -> Result<()> {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "body", &[])?;
        let para = doc.append_element(body, "p", &[("id", "blank")])?;
        let config = EngineConfig::default();
        let sheet = Stylesheet::parse(
            "p:empty:before { content: \"(empty)\" } p:empty { color: gray }",
            &config,
        );
        let root = doc.root();
        for _ in 0..2 {
            let report = run_bulk_pass(&mut doc, root, &sheet, &config);
            assert_eq!(report.generated, 1);
            assert_eq!(doc.generated_text(para, PseudoElement::Before), Some("(empty)"));
            assert_eq!(doc.style_property(para, "color"), Some("gray"));
        }
        assert_eq!(doc.element_by_id("blank"), Some(para));

        let plain = Stylesheet::parse("p { color: black }", &config);
        let report = run_bulk_pass(&mut doc, root, &plain, &config);
        assert_eq!(report.generated, 0);
        assert_eq!(doc.generated_text(para, PseudoElement::Before), None);
        assert_eq!(doc.children(para).count(), 1);
        Ok(())
    }

    /// Computed style honours specificity and the style attribute.
    ///
    /// # Panics
    /// Panics if the wrong declaration wins.
    #[test]
    fn computed_style() -> Result<()> {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "body", &[])?;
        let para = doc.append_element(body, "p", &[("class", "lead"), ("style", "top: 1px")])?;
        let config = EngineConfig::default();
        let sheet = Stylesheet::parse(
            "p.lead { color: green } p { color: red; width: 5px } p:before { content: 'x' }",
            &config,
        );
        let mut dest = StyleMap::default();
        let writes = apply_computed_style(&doc, para, &sheet, &config, &mut dest);
        assert_eq!(dest.property("color"), Some("green"));
        assert_eq!(dest.property("width"), Some("5px"));
        assert_eq!(dest.property("top"), Some("1px"));
        assert_eq!(writes, 3);
        assert!(doc.style(para).is_none());
        Ok(())
    }

    /// `cssText` replaces earlier inline values but not important rules.
    ///
    /// # Panics
    /// Panics if inline gating is wrong.
    #[test]
    fn css_text() -> Result<()> {
        let mut doc = Document::new();
        let div = doc.append_element(doc.root(), "div", &[])?;
        let config = EngineConfig::default();
        let sheet = Stylesheet::parse("div { color: red !important; top: 0 }", &config);
        let root = doc.root();
        run_bulk_pass(&mut doc, root, &sheet, &config);
        assert_eq!(apply_inline_css_text(&mut doc, div, "color: blue; top: 3px"), 1);
        assert_eq!(apply_inline_css_text(&mut doc, div, "top: 4px"), 1);
        assert_eq!(apply_inline_css_text(&mut doc, div, "nonsense"), 0);
        assert_eq!(doc.style_property(div, "color"), Some("red"));
        assert_eq!(doc.style_property(div, "top"), Some("4px"));
        Ok(())
    }
}
