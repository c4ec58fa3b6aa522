//! Deterministic dumps of a document and the styles the cascade wrote.

use core::fmt;

use indextree::NodeId;
use serde_json::{Map, Value, json};

use super::{Document, DomNode, NodeKind};

fn flush_text(children: &mut Vec<Value>, pending: &mut String) {
    if !pending.trim().is_empty() {
        children.push(json!({ "type": "text", "text": pending.clone() }));
    }
    pending.clear();
}

/// Children with adjacent text nodes merged and blank text dropped.
fn coalesce_children(doc: &Document, id: NodeId) -> Vec<Value> {
    let mut children = Vec::new();
    let mut pending = String::new();
    for child in id.children(&doc.arena) {
        let Some(entry) = doc.get(child) else {
            continue;
        };
        match &entry.kind {
            NodeKind::Text { text } => pending.push_str(text),
            NodeKind::Comment { .. } => {}
            NodeKind::Document | NodeKind::Element { .. } => {
                flush_text(&mut children, &mut pending);
                children.push(node_to_json(doc, child, entry));
            }
        }
    }
    flush_text(&mut children, &mut pending);
    children
}

fn sorted_object<'pair>(pairs: impl Iterator<Item = (&'pair str, &'pair str)>) -> Value {
    let mut sorted: Vec<(&str, &str)> = pairs.collect();
    sorted.sort_unstable();
    let object: Map<String, Value> = sorted
        .into_iter()
        .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
        .collect();
    Value::Object(object)
}

fn node_to_json(doc: &Document, id: NodeId, entry: &DomNode) -> Value {
    match &entry.kind {
        NodeKind::Element { tag } => {
            let attrs = entry
                .attrs
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()));
            let mut element = json!({
                "type": "element",
                "tag": tag.to_ascii_lowercase(),
                "attrs": sorted_object(attrs),
            });
            if let Some(style) = entry.style.as_ref().filter(|style| !style.is_empty())
                && let Some(object) = element.as_object_mut()
            {
                object.insert("style".to_owned(), sorted_object(style.properties()));
            }
            if let Some(object) = element.as_object_mut() {
                object.insert("children".to_owned(), Value::Array(coalesce_children(doc, id)));
            }
            element
        }
        NodeKind::Document => json!({ "type": "document", "children": coalesce_children(doc, id) }),
        NodeKind::Text { text } | NodeKind::Comment { text } => {
            json!({ "type": "text", "text": text })
        }
    }
}

impl Document {
    /// Build a deterministic JSON representation of the document.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "style": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    ///
    /// `style` is present only on elements the cascade wrote to.
    pub fn to_json_value(&self) -> Value {
        self.get(self.root)
            .map_or(Value::Null, |entry| node_to_json(self, self.root, entry))
    }

    /// Pretty JSON string for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_else(|_| String::from("{}"))
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(character),
        }
    }
    out
}

fn write_node(
    doc: &Document,
    id: NodeId,
    formatter: &mut fmt::Formatter<'_>,
    depth: usize,
) -> fmt::Result {
    let Some(entry) = doc.get(id) else {
        return Ok(());
    };
    let indent = "  ".repeat(depth);
    match &entry.kind {
        NodeKind::Document => writeln!(formatter, "{indent}#document")?,
        NodeKind::Element { tag } => {
            write!(formatter, "{indent}<{}", tag.to_ascii_lowercase())?;
            let mut pairs: Vec<&(String, String)> = entry.attrs.iter().collect();
            pairs.sort_unstable();
            for (key, value) in pairs {
                write!(formatter, " {key}=\"{}\"", escape_text(value))?;
            }
            writeln!(formatter, ">")?;
        }
        NodeKind::Text { text } => {
            if !text.trim().is_empty() {
                writeln!(formatter, "{indent}\"{}\"", escape_text(text))?;
            }
            return Ok(());
        }
        NodeKind::Comment { text } => {
            writeln!(formatter, "{indent}<!--{text}-->")?;
            return Ok(());
        }
    }
    for child in id.children(&doc.arena) {
        write_node(doc, child, formatter, depth.saturating_add(1))?;
    }
    Ok(())
}

impl fmt::Debug for Document {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self, self.root, formatter, 0)
    }
}
