use std::collections::{BTreeMap, HashSet};

use crate::StyleTarget;

/// In-memory style target: property values plus the score that set each one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: BTreeMap<String, (String, u32)>,
    inherited: HashSet<String>,
}

impl StyleMap {
    /// A map whose prototype already provides `names`.
    pub fn with_inherited<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: BTreeMap::new(),
            inherited: names.into_iter().map(Into::into).collect(),
        }
    }

    /// `(property, value)` pairs in property-name order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, (value, _))| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StyleTarget for StyleMap {
    fn property(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|(value, _)| value.as_str())
    }

    fn set_property(&mut self, name: &str, value: &str) {
        let entry = self
            .entries
            .entry(name.to_owned())
            .or_insert_with(|| (String::new(), 0));
        value.clone_into(&mut entry.0);
    }

    fn is_inherited(&self, name: &str) -> bool {
        self.inherited.contains(name)
    }

    fn specificity(&self, name: &str) -> Option<u32> {
        self.entries.get(name).map(|(_, score)| *score)
    }

    fn set_specificity(&mut self, name: &str, score: u32) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.1 = score;
        }
    }
}
