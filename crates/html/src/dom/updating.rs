//! Tree construction and mutation.

use anyhow::{Result, anyhow};
use indextree::NodeId;
use smallvec::SmallVec;

use super::{Document, DomNode, NodeKind, PropertyValue};

impl Document {
    pub(super) fn create(&mut self, kind: NodeKind) -> NodeId {
        self.arena.new_node(DomNode {
            kind,
            ..DomNode::default()
        })
    }

    /// Append an element with `attrs` as the last child of `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not a live node of this document.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId> {
        let node = self.create(NodeKind::Element {
            tag: tag.to_owned(),
        });
        if let Some(entry) = self.get_mut(node) {
            entry.attrs = attrs
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), (*value).to_owned()))
                .collect::<SmallVec<_, 4>>();
        }
        self.attach(parent, node)
    }

    /// Append a text node as the last child of `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not a live node of this document.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let node = self.create(NodeKind::Text {
            text: text.to_owned(),
        });
        self.attach(parent, node)
    }

    /// Append a comment as the last child of `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not a live node of this document.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let node = self.create(NodeKind::Comment {
            text: text.to_owned(),
        });
        self.attach(parent, node)
    }

    fn attach(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId> {
        if parent.is_removed(&self.arena) {
            return Err(anyhow!("cannot append to removed node {parent:?}"));
        }
        parent.checked_append(node, &mut self.arena)?;
        Ok(node)
    }

    /// Set or replace an attribute on an element.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let entry = self.element_mut(node)?;
        let name = name.to_ascii_lowercase();
        if let Some(slot) = entry.attrs.iter_mut().find(|(key, _)| *key == name) {
            value.clone_into(&mut slot.1);
        } else {
            entry.attrs.push((name, value.to_owned()));
        }
        Ok(())
    }

    /// Set a script-visible property, shadowing the attribute of the same name.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element.
    pub fn set_property(&mut self, node: NodeId, name: &str, value: PropertyValue) -> Result<()> {
        self.element_mut(node)?
            .properties
            .insert(name.to_owned(), value);
        Ok(())
    }

    /// Mark `node` as hosting a nested browsing context.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element.
    pub fn set_frame(&mut self, node: NodeId, frame: bool) -> Result<()> {
        self.element_mut(node)?.frame = frame;
        Ok(())
    }

    /// Detach and drop `node` with its subtree.
    pub fn remove(&mut self, node: NodeId) {
        if node != self.root {
            node.remove_subtree(&mut self.arena);
            self.generated
                .retain(|(owner, _), synthetic| *owner != node && *synthetic != node);
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut DomNode> {
        self.get_mut(node)
            .filter(|entry| entry.tag().is_some())
            .ok_or_else(|| anyhow!("node {node:?} is not an element"))
    }
}
