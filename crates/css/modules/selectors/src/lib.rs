//! Selectors Level 3: compilation, specificity and element matching.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! Supported here:
//! - Type, universal, class, id and attribute selectors (`= ~= |= ^= $= *=`)
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Structural, input and language pseudo-classes, `:nth-*()` and `:not()`
//! - `:before`, `:after`, `:hover` and `:link`, carried as flags on a segment
//!
//! Compiled selectors are chains stored subject first: the last compound in
//! the source text is element 0. Matching walks the chain from there toward
//! the leftmost compound, backtracking over ancestors and siblings.

#![forbid(unsafe_code)]

mod compiler;
mod context;
mod matcher;
mod modifiers;
mod nth;
mod serialize;
mod specificity;

pub use compiler::{SelectorList, compile};
pub use context::{MatchContext, MatchMode};
pub use css_syntax::ErrorKind;
pub use matcher::{
    matches_atomic, matches_chain, next_element, parent_element, previous_element,
};
pub use nth::{NthFormula, NthKind};
pub use specificity::{AT_RULE_BONUS, specificity};

/// Kind of a DOM node, as far as matching cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
    Other,
}

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// Properties are the live state a script can change (`checked`,
/// `disabled`, `lang`, ...). DOMs without a separate property store can rely
/// on the defaults, which read the attribute of the same name.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    fn node_type(&self, node: Self::Handle) -> NodeType;

    /// Tag name of an element; empty for other nodes.
    fn tag_name(&self, node: Self::Handle) -> &str;

    /// Attribute value if present. Attribute names are ASCII case-insensitive.
    fn attr(&self, node: Self::Handle, name: &str) -> Option<&str>;

    /// Character data of a text or comment node.
    fn text(&self, node: Self::Handle) -> Option<&str>;

    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    fn first_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    fn next_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling of any node type.
    ///
    /// The default walks forward from the parent's first child, so DOMs with
    /// a back link should override it.
    fn previous_sibling(&self, node: Self::Handle) -> Option<Self::Handle> {
        let parent = self.parent(node)?;
        let mut previous = None;
        let mut cursor = self.first_child(parent);
        while let Some(child) = cursor {
            if child == node {
                return previous;
            }
            previous = Some(child);
            cursor = self.next_sibling(child);
        }
        None
    }

    fn element_id(&self, node: Self::Handle) -> Option<&str> {
        self.attr(node, "id")
    }

    fn class_name(&self, node: Self::Handle) -> Option<&str> {
        self.attr(node, "class")
    }

    /// True for an element whose children belong to a separate document
    /// (a frame); such children are never candidates of the outer document.
    fn is_frame_boundary(&self, node: Self::Handle) -> bool {
        let _ = node;
        false
    }

    fn string_property(&self, node: Self::Handle, name: &str) -> Option<String> {
        self.attr(node, name).map(ToOwned::to_owned)
    }

    fn bool_property(&self, node: Self::Handle, name: &str) -> Option<bool> {
        self.attr(node, name).map(|_| true)
    }

    fn has_property(&self, node: Self::Handle, name: &str) -> bool {
        self.attr(node, name).is_some()
    }
}

/// How a segment relates to the segment after it in the chain.
///
/// Each segment records the combinator that preceded it in the source text;
/// the leftmost segment records [`Combinator::Group`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Start of a selector in a `,` separated group.
    #[default]
    Group,
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
    /// `+`
    Adjacent,
    /// `~`
    Sibling,
}

/// Attribute comparison operator.
/// Spec: Section 6.3, 6.3.2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOp {
    /// `[name]`
    Exists,
    /// `[name=value]`
    Equals,
    /// `[name~=value]`, one of the space-separated words.
    Includes,
    /// `[name|=value]`, equal or followed by `-`.
    DashMatch,
    /// `[name^=value]`
    Prefix,
    /// `[name$=value]`
    Suffix,
    /// `[name*=value]`
    Substring,
}

impl AttrOp {
    /// Compare an attribute value against the selector's value.
    pub fn test(self, actual: &str, wanted: &str) -> bool {
        match self {
            Self::Exists => true,
            Self::Equals => actual == wanted,
            Self::Includes => {
                !wanted.is_empty() && actual.split_ascii_whitespace().any(|word| word == wanted)
            }
            Self::DashMatch => {
                actual == wanted
                    || actual
                        .strip_prefix(wanted)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !wanted.is_empty() && actual.starts_with(wanted),
            Self::Suffix => !wanted.is_empty() && actual.ends_with(wanted),
            Self::Substring => !wanted.is_empty() && actual.contains(wanted),
        }
    }

    /// Operator text as written in a selector; empty for [`AttrOp::Exists`].
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
        }
    }
}

/// One attribute test. `.x` and `#x` compile to attribute tests too.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Lowercased attribute name.
    pub name: String,
    pub op: AttrOp,
    pub value: String,
    /// Compiled from `.value`; answered from the class name.
    pub is_class: bool,
    /// Compiled from `#value`; answered from the element id.
    pub is_id: bool,
}

impl AttributeSelector {
    pub(crate) fn class(value: &str) -> Self {
        Self {
            name: "class".to_owned(),
            op: AttrOp::Includes,
            value: value.to_owned(),
            is_class: true,
            is_id: false,
        }
    }

    pub(crate) fn id(value: &str) -> Self {
        Self {
            name: "id".to_owned(),
            op: AttrOp::Equals,
            value: value.to_owned(),
            is_class: false,
            is_id: true,
        }
    }
}

/// Supported pseudo-classes.
/// Spec: Section 6.6
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Checked,
    Disabled,
    Enabled,
    ReadOnly,
    ReadWrite,
    Scope,
    Root,
    /// `:lang(code)`, code lowercased.
    Lang(String),
    Nth(NthKind, NthFormula),
}

/// One test inside a compound, after the tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Attribute(AttributeSelector),
    Pseudo(PseudoClass),
    /// `:not(...)`, a single negated chain.
    Not(Box<SelectorChain>),
}

/// A compound selector: optional tag plus modifiers, with its flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AtomicSelector {
    /// Lowercased tag; `None` for `*` or no tag.
    pub tag: Option<String>,
    /// Combinator that preceded this segment in the source text.
    pub combinator: Combinator,
    pub modifiers: Vec<Modifier>,
    pub before: bool,
    pub after: bool,
    pub hover: bool,
    pub link: bool,
    pub error: Option<ErrorKind>,
}

impl AtomicSelector {
    /// Id value of a non-negated `#id` modifier.
    pub fn id(&self) -> Option<&str> {
        self.attributes()
            .find(|attribute| attribute.is_id)
            .map(|attribute| attribute.value.as_str())
    }

    /// Class values of non-negated `.class` modifiers.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes()
            .filter(|attribute| attribute.is_class)
            .map(|attribute| attribute.value.as_str())
    }

    fn attributes(&self) -> impl Iterator<Item = &AttributeSelector> {
        self.modifiers.iter().filter_map(|modifier| match modifier {
            Modifier::Attribute(attribute) => Some(attribute),
            Modifier::Pseudo(_) | Modifier::Not(_) => None,
        })
    }
}

/// A compiled selector without its comma group, subject first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectorChain {
    pub atoms: Vec<AtomicSelector>,
}

impl SelectorChain {
    /// The subject compound (rightmost in the source text).
    pub fn base(&self) -> Option<&AtomicSelector> {
        self.atoms.first()
    }
}

/// One selector of a comma-separated list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    pub chain: SelectorChain,
    pub error: Option<ErrorKind>,
    /// Subject carries `:before`.
    pub before: bool,
    /// Subject carries `:after`.
    pub after: bool,
    /// Some segment carries `:hover`.
    pub hover: bool,
    pub specificity: u32,
}

impl Selector {
    pub const fn is_usable(&self) -> bool {
        self.error.is_none()
    }

    /// Whether this selector takes part in a pass of the given mode.
    pub const fn accepts(&self, mode: MatchMode, hover: bool) -> bool {
        if self.hover != hover {
            return false;
        }
        match mode {
            MatchMode::Plain => !self.before && !self.after,
            MatchMode::Before => self.before,
            MatchMode::After => self.after,
        }
    }
}
