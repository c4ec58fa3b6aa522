//! Document order lists and the tag/id/class index used by bulk passes.
//!
//! Nodes are addressed by their ordinal in a [`DocList`], so every candidate
//! list is already sorted in document order and merging two of them is a
//! linear walk.

use css_selectors::{AtomicSelector, ElementAdapter, NodeType};
use log::trace;

/// Elements under a start node, in pre-order.
#[derive(Clone, Debug)]
pub struct DocList<H> {
    nodes: Vec<H>,
}

impl<H: Copy> DocList<H> {
    /// Collect `start` (when it is an element) and every element below it.
    /// Children of a frame boundary belong to another document and are left out.
    pub fn build<A: ElementAdapter<Handle = H>>(adapter: &A, start: H) -> Self {
        let mut nodes = Vec::new();
        if adapter.node_type(start) == NodeType::Element {
            nodes.push(start);
        }
        if adapter.is_frame_boundary(start) {
            return Self { nodes };
        }
        let mut stack: Vec<H> = adapter.first_child(start).into_iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(next) = adapter.next_sibling(node) {
                stack.push(next);
            }
            if adapter.node_type(node) != NodeType::Element {
                continue;
            }
            nodes.push(node);
            if !adapter.is_frame_boundary(node)
                && let Some(child) = adapter.first_child(node)
            {
                stack.push(child);
            }
        }
        Self { nodes }
    }

    pub fn node(&self, ordinal: usize) -> Option<H> {
        self.nodes.get(ordinal).copied()
    }

    pub fn nodes(&self) -> &[H] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Sorted `(key, ordinals)` buckets, looked up by binary search.
#[derive(Clone, Debug, Default)]
struct Buckets {
    entries: Vec<(String, Vec<usize>)>,
}

impl Buckets {
    fn from_pairs(mut pairs: Vec<(String, usize)>) -> Self {
        pairs.sort_unstable();
        pairs.dedup();
        let entries = pairs
            .chunk_by(|left, right| left.0 == right.0)
            .filter_map(|run| {
                let key = run.first()?.0.clone();
                Some((key, run.iter().map(|(_, ordinal)| *ordinal).collect()))
            })
            .collect();
        Self { entries }
    }

    fn find(&self, key: &str) -> &[usize] {
        self.entries
            .binary_search_by(|(probe, _)| probe.as_str().cmp(key))
            .ok()
            .and_then(|position| self.entries.get(position))
            .map_or(&[], |(_, ordinals)| ordinals.as_slice())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Lookup tables over one [`DocList`].
///
/// Tags are keyed lowercased; ids and classes are case-sensitive. A class
/// attribute is indexed under each of its words and under the whole string.
#[derive(Clone, Debug, Default)]
pub struct NodeIndex {
    tags: Buckets,
    ids: Buckets,
    classes: Buckets,
}

impl NodeIndex {
    pub fn build<A: ElementAdapter>(adapter: &A, list: &DocList<A::Handle>) -> Self {
        let mut tags = Vec::with_capacity(list.len());
        let mut ids = Vec::new();
        let mut classes = Vec::new();
        for (ordinal, node) in list.nodes().iter().copied().enumerate() {
            tags.push((adapter.tag_name(node).to_ascii_lowercase(), ordinal));
            if let Some(id) = adapter.element_id(node) {
                ids.push((id.to_owned(), ordinal));
            }
            if let Some(class) = adapter.class_name(node) {
                classes.extend(
                    class
                        .split_ascii_whitespace()
                        .map(|word| (word.to_owned(), ordinal)),
                );
                classes.push((class.to_owned(), ordinal));
            }
        }
        let index = Self {
            tags: Buckets::from_pairs(tags),
            ids: Buckets::from_pairs(ids),
            classes: Buckets::from_pairs(classes),
        };
        trace!(
            target: "css::query",
            "indexed {} elements: {} tags, {} ids, {} classes",
            list.len(),
            index.tags.len(),
            index.ids.len(),
            index.classes.len()
        );
        index
    }

    /// Smallest bucket the subject compound `atom` restricts matches to, or
    /// `None` when it names no tag, id or class.
    pub fn candidates(&self, atom: &AtomicSelector) -> Option<&[usize]> {
        let tag = atom.tag.as_deref().map(|tag| self.tags.find(tag));
        let id = atom.id().map(|id| self.ids.find(id));
        let classes = atom.classes().map(|class| self.classes.find(class));
        tag.into_iter()
            .chain(id)
            .chain(classes)
            .min_by_key(|bucket| bucket.len())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use css_selectors::compile;
    use html::Document;

    use super::*;

    fn subject(text: &str) -> AtomicSelector {
        compile(text, false)
            .selectors
            .first()
            .and_then(|selector| selector.chain.base().cloned())
            .unwrap_or_default()
    }

    /// Pre-order walk that stops at frame boundaries.
    ///
    /// # Panics
    /// Panics if the order is wrong or frame content leaks in.
    #[test]
    fn doclist_order() -> Result<()> {
        let mut doc = Document::new();
        let html = doc.append_element(doc.root(), "html", &[])?;
        let body = doc.append_element(html, "body", &[])?;
        let first = doc.append_element(body, "div", &[("id", "a")])?;
        doc.append_text(first, "text")?;
        let inner = doc.append_element(first, "span", &[("id", "b")])?;
        let frame = doc.append_element(body, "iframe", &[("id", "c")])?;
        doc.append_element(frame, "p", &[("id", "hidden")])?;
        doc.set_frame(frame, true)?;
        let last = doc.append_element(body, "p", &[("id", "d")])?;
        let list = DocList::build(&doc, doc.root());
        assert_eq!(list.nodes(), &[html, body, first, inner, frame, last]);
        assert_eq!(DocList::build(&doc, first).nodes(), &[first, inner]);
        Ok(())
    }

    /// Buckets hold ordinals, and class strings are indexed whole and per word.
    ///
    /// # Panics
    /// Panics if a bucket is missing or unsorted.
    #[test]
    fn buckets() -> Result<()> {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "BODY", &[])?;
        doc.append_element(body, "p", &[("class", "foo bar")])?;
        doc.append_element(body, "P", &[("class", "bar"), ("id", "x")])?;
        doc.append_element(body, "div", &[("class", "Foo")])?;
        let list = DocList::build(&doc, doc.root());
        let index = NodeIndex::build(&doc, &list);
        assert_eq!(index.tags.find("p"), &[1, 2]);
        assert_eq!(index.classes.find("bar"), &[1, 2]);
        assert_eq!(index.classes.find("foo bar"), &[1]);
        assert_eq!(index.classes.find("Foo"), &[3]);
        assert_eq!(index.classes.find("missing"), &[] as &[usize]);
        assert_eq!(index.candidates(&subject("p.foo")), Some(&[1][..]));
        assert_eq!(index.candidates(&subject("p#x.bar")), Some(&[2][..]));
        assert_eq!(index.candidates(&subject("[title]")), None);
        assert_eq!(index.candidates(&subject("*:not(.foo)")), None);
        Ok(())
    }
}
