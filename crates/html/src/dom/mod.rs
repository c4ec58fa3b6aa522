mod printing;
mod updating;

use std::collections::HashMap;

use css_cascade::{HoverEffect, PseudoElement, StyleHost, StyleMap, StyleTarget as _};
use css_selectors::{ElementAdapter, NodeType};
use indextree::{Arena, Node, NodeId};
use serde::Serialize;
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

/// A script-visible property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    /// Live properties set by script; they shadow attributes of the same name.
    pub properties: HashMap<String, PropertyValue>,
    /// Style object, created when the cascade first writes to the element.
    pub style: Option<StyleMap>,
    pub hover: HoverEffect,
    /// Synthetic `::before`/`::after` text; invisible to selector matching.
    pub generated: bool,
    /// Children belong to a nested browsing context.
    pub frame: bool,
}

impl DomNode {
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Document | NodeKind::Text { .. } | NodeKind::Comment { .. } => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
    /// Synthetic text nodes created for generated content, reused across passes.
    generated: HashMap<(NodeId, PseudoElement), NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        Self {
            arena,
            root,
            generated: HashMap::new(),
        }
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, node: NodeId) -> Option<&DomNode> {
        self.arena.get(node).map(Node::get)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut DomNode> {
        self.arena.get_mut(node).map(Node::get_mut)
    }

    /// Live child ids of `node`, in order.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    /// Style written to `node` by the cascade, if any.
    pub fn style(&self, node: NodeId) -> Option<&StyleMap> {
        self.get(node).and_then(|entry| entry.style.as_ref())
    }

    /// Shorthand for one property of [`Document::style`].
    pub fn style_property(&self, node: NodeId, property: &str) -> Option<&str> {
        self.style(node).and_then(|style| style.property(property))
    }

    pub fn hover_effect(&self, node: NodeId) -> HoverEffect {
        self.get(node).map(|entry| entry.hover).unwrap_or_default()
    }

    /// Text of the synthetic node generated for `pseudo` on `node`.
    /// `None` when the last pass produced no content for it.
    pub fn generated_text(&self, node: NodeId, pseudo: PseudoElement) -> Option<&str> {
        let synthetic = *self.generated.get(&(node, pseudo))?;
        if synthetic.is_removed(&self.arena) {
            return None;
        }
        match &self.get(synthetic)?.kind {
            NodeKind::Text { text } if !text.is_empty() => Some(text),
            NodeKind::Document
            | NodeKind::Element { .. }
            | NodeKind::Text { .. }
            | NodeKind::Comment { .. } => None,
        }
    }

    /// First element with `id`, in document order.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|node| self.get(*node).and_then(|entry| entry.attr("id")) == Some(id))
    }

    /// First node from `cursor` on, walking siblings, that is not generated content.
    fn skip_generated(&self, mut cursor: Option<NodeId>, forward: bool) -> Option<NodeId> {
        while let Some(node) = cursor {
            if !self.get(node).is_some_and(|entry| entry.generated) {
                return Some(node);
            }
            let link = self.arena.get(node)?;
            cursor = if forward {
                link.next_sibling()
            } else {
                link.previous_sibling()
            };
        }
        None
    }
}

impl ElementAdapter for Document {
    type Handle = NodeId;

    fn node_type(&self, node: NodeId) -> NodeType {
        match self.get(node).map(|entry| &entry.kind) {
            Some(NodeKind::Element { .. }) => NodeType::Element,
            Some(NodeKind::Text { .. }) => NodeType::Text,
            Some(NodeKind::Comment { .. }) => NodeType::Comment,
            Some(NodeKind::Document) => NodeType::Document,
            None => NodeType::Other,
        }
    }

    fn tag_name(&self, node: NodeId) -> &str {
        self.get(node).and_then(DomNode::tag).unwrap_or_default()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|entry| entry.attr(name))
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.get(node)?.kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => Some(text),
            NodeKind::Document | NodeKind::Element { .. } => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.skip_generated(self.arena.get(node)?.first_child(), true)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.skip_generated(self.arena.get(node)?.next_sibling(), true)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.skip_generated(self.arena.get(node)?.previous_sibling(), false)
    }

    fn is_frame_boundary(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|entry| entry.frame)
    }

    fn string_property(&self, node: NodeId, name: &str) -> Option<String> {
        let entry = self.get(node)?;
        match entry.properties.get(name) {
            Some(PropertyValue::Text(text)) => Some(text.clone()),
            Some(PropertyValue::Bool(flag)) => Some(flag.to_string()),
            None => entry.attr(name).map(ToOwned::to_owned),
        }
    }

    fn bool_property(&self, node: NodeId, name: &str) -> Option<bool> {
        let entry = self.get(node)?;
        match entry.properties.get(name) {
            Some(PropertyValue::Bool(flag)) => Some(*flag),
            Some(PropertyValue::Text(text)) => Some(!text.is_empty()),
            None => entry.attr(name).map(|_| true),
        }
    }

    fn has_property(&self, node: NodeId, name: &str) -> bool {
        self.get(node).is_some_and(|entry| {
            entry.properties.contains_key(name) || entry.attr(name).is_some()
        })
    }
}

impl StyleHost for Document {
    type Style = StyleMap;

    fn style_mut(&mut self, node: NodeId) -> Option<&mut StyleMap> {
        let entry = self.get_mut(node)?;
        if entry.tag().is_none() {
            return None;
        }
        Some(entry.style.get_or_insert_with(StyleMap::default))
    }

    fn set_generated_content(
        &mut self,
        node: NodeId,
        pseudo: PseudoElement,
        text: &str,
    ) -> anyhow::Result<()> {
        if let Some(&synthetic) = self.generated.get(&(node, pseudo))
            && !synthetic.is_removed(&self.arena)
            && let Some(entry) = self.get_mut(synthetic)
        {
            entry.kind = NodeKind::Text {
                text: text.to_owned(),
            };
            return Ok(());
        }
        let synthetic = self.create(NodeKind::Text {
            text: text.to_owned(),
        });
        if let Some(entry) = self.get_mut(synthetic) {
            entry.generated = true;
        }
        match pseudo {
            PseudoElement::Before => node.checked_prepend(synthetic, &mut self.arena)?,
            PseudoElement::After => node.checked_append(synthetic, &mut self.arena)?,
        }
        self.generated.insert((node, pseudo), synthetic);
        Ok(())
    }

    fn clear_generated_content(&mut self) {
        let synthetic: Vec<NodeId> = self.generated.values().copied().collect();
        for node in synthetic {
            if let Some(entry) = self.get_mut(node) {
                entry.kind = NodeKind::Text {
                    text: String::new(),
                };
            }
        }
    }

    fn set_hover_effect(&mut self, node: NodeId, effect: HoverEffect) {
        if let Some(entry) = self.get_mut(node) {
            entry.hover = effect;
        }
    }
}
