//! CSS selector matching engine.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! Chains are matched subject first. Descendant and general-sibling
//! combinators backtrack: every ancestor (or earlier sibling) is tried
//! before the chain is rejected.

use core::iter::successors;

use crate::{
    AtomicSelector, AttributeSelector, Combinator, ElementAdapter, MatchContext, Modifier, NodeType,
    NthKind, PseudoClass, SelectorChain,
};

/// Match a compiled chain against a node.
/// Spec: Section 8: Combinators
pub fn matches_chain<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    node: A::Handle,
    chain: &SelectorChain,
) -> bool {
    matches_atoms(adapter, ctx, node, &chain.atoms)
}

fn matches_atoms<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    node: A::Handle,
    atoms: &[AtomicSelector],
) -> bool {
    let Some((atom, rest)) = atoms.split_first() else {
        return false;
    };
    if !matches_atomic(adapter, ctx, node, atom) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match atom.combinator {
        Combinator::Group => matches_atoms(adapter, ctx, node, rest),
        Combinator::Child => parent_element(adapter, node)
            .is_some_and(|parent| matches_atoms(adapter, ctx, parent, rest)),
        Combinator::Adjacent => previous_element(adapter, node)
            .is_some_and(|sibling| matches_atoms(adapter, ctx, sibling, rest)),
        Combinator::Sibling => successors(previous_element(adapter, node), |&sibling| {
            previous_element(adapter, sibling)
        })
        .any(|sibling| matches_atoms(adapter, ctx, sibling, rest)),
        Combinator::Descendant => successors(parent_element(adapter, node), |&ancestor| {
            parent_element(adapter, ancestor)
        })
        .any(|ancestor| matches_atoms(adapter, ctx, ancestor, rest)),
    }
}

/// Match one compound against a node, ignoring combinators.
/// Spec: Section 6: Simple selectors
pub fn matches_atomic<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    node: A::Handle,
    atom: &AtomicSelector,
) -> bool {
    if adapter.node_type(node) != NodeType::Element {
        return false;
    }
    if let Some(tag) = atom.tag.as_deref()
        && !adapter.tag_name(node).eq_ignore_ascii_case(tag)
    {
        return false;
    }
    atom.modifiers
        .iter()
        .all(|modifier| matches_modifier(adapter, ctx, node, modifier))
}

fn matches_modifier<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    node: A::Handle,
    modifier: &Modifier,
) -> bool {
    match modifier {
        Modifier::Attribute(attribute) => matches_attribute(adapter, node, attribute),
        Modifier::Pseudo(pseudo) => matches_pseudo(adapter, ctx, node, pseudo),
        Modifier::Not(chain) => !matches_chain(adapter, ctx, node, chain),
    }
}

/// Spec: Section 6.3: Attribute selectors
fn matches_attribute<A: ElementAdapter>(
    adapter: &A,
    node: A::Handle,
    attribute: &AttributeSelector,
) -> bool {
    let actual = if attribute.is_class {
        adapter.class_name(node)
    } else if attribute.is_id {
        adapter.element_id(node)
    } else {
        adapter.attr(node, &attribute.name)
    };
    actual.is_some_and(|value| attribute.op.test(value, &attribute.value))
}

/// Spec: Section 6.6: Pseudo-classes
fn matches_pseudo<A: ElementAdapter>(
    adapter: &A,
    ctx: &MatchContext<A::Handle>,
    node: A::Handle,
    pseudo: &PseudoClass,
) -> bool {
    match pseudo {
        PseudoClass::FirstChild => previous_element(adapter, node).is_none(),
        PseudoClass::LastChild => next_element(adapter, node).is_none(),
        PseudoClass::OnlyChild => {
            previous_element(adapter, node).is_none() && next_element(adapter, node).is_none()
        }
        PseudoClass::FirstOfType => sibling_position(adapter, node, NthKind::OfType) == 1,
        PseudoClass::LastOfType => sibling_position(adapter, node, NthKind::LastOfType) == 1,
        PseudoClass::OnlyOfType => {
            sibling_position(adapter, node, NthKind::OfType) == 1
                && sibling_position(adapter, node, NthKind::LastOfType) == 1
        }
        PseudoClass::Empty => is_empty(adapter, node),
        PseudoClass::Checked => input_flag(adapter, node, "checked"),
        PseudoClass::Disabled => input_flag(adapter, node, "disabled"),
        PseudoClass::Enabled => {
            is_input_like(adapter, node) && !input_flag(adapter, node, "disabled")
        }
        PseudoClass::ReadOnly => input_flag(adapter, node, "readonly"),
        PseudoClass::ReadWrite => {
            is_input_like(adapter, node) && !input_flag(adapter, node, "readonly")
        }
        PseudoClass::Scope | PseudoClass::Root => ctx.root == Some(node),
        PseudoClass::Lang(code) => lang_matches(adapter, node, code),
        PseudoClass::Nth(kind, formula) => {
            let position = sibling_position(adapter, node, *kind);
            i32::try_from(position).is_ok_and(|index| formula.matches(index))
        }
    }
}

/// Parent, if it is an element on this side of any frame boundary.
pub fn parent_element<A: ElementAdapter>(adapter: &A, node: A::Handle) -> Option<A::Handle> {
    adapter
        .parent(node)
        .filter(|parent| adapter.node_type(*parent) == NodeType::Element)
        .filter(|parent| !adapter.is_frame_boundary(*parent))
}

/// Nearest earlier sibling that is an element.
pub fn previous_element<A: ElementAdapter>(adapter: &A, node: A::Handle) -> Option<A::Handle> {
    successors(adapter.previous_sibling(node), |&sibling| {
        adapter.previous_sibling(sibling)
    })
    .find(|sibling| adapter.node_type(*sibling) == NodeType::Element)
}

/// Nearest later sibling that is an element.
pub fn next_element<A: ElementAdapter>(adapter: &A, node: A::Handle) -> Option<A::Handle> {
    successors(adapter.next_sibling(node), |&sibling| adapter.next_sibling(sibling))
        .find(|sibling| adapter.node_type(*sibling) == NodeType::Element)
}

/// 1-based position among element siblings, as counted by `kind`.
fn sibling_position<A: ElementAdapter>(adapter: &A, node: A::Handle, kind: NthKind) -> usize {
    let step = |sibling: &A::Handle| {
        if kind.from_end() {
            next_element(adapter, *sibling)
        } else {
            previous_element(adapter, *sibling)
        }
    };
    let tag = adapter.tag_name(node);
    successors(step(&node), step)
        .filter(|sibling| !kind.of_type() || adapter.tag_name(*sibling).eq_ignore_ascii_case(tag))
        .count()
        .saturating_add(1)
}

/// `:empty`: only comments and empty text nodes as children.
fn is_empty<A: ElementAdapter>(adapter: &A, node: A::Handle) -> bool {
    successors(adapter.first_child(node), |&child| adapter.next_sibling(child)).all(|child| {
        match adapter.node_type(child) {
            NodeType::Comment => true,
            NodeType::Text => adapter.text(child).is_none_or(str::is_empty),
            NodeType::Element | NodeType::Document | NodeType::Other => false,
        }
    })
}

fn is_input_like<A: ElementAdapter>(adapter: &A, node: A::Handle) -> bool {
    let tag = adapter.tag_name(node);
    ["input", "select", "button"]
        .iter()
        .any(|name| tag.eq_ignore_ascii_case(name))
}

/// Boolean property of a form control; always false on other elements.
///
/// A property that exists but does not read as a boolean counts as set.
fn input_flag<A: ElementAdapter>(adapter: &A, node: A::Handle, name: &str) -> bool {
    is_input_like(adapter, node)
        && adapter.has_property(node, name)
        && adapter.bool_property(node, name).unwrap_or(true)
}

/// `:lang(code)`: nearest declared language equals `code` or starts with `code-`.
fn lang_matches<A: ElementAdapter>(adapter: &A, node: A::Handle, code: &str) -> bool {
    let declared = successors(Some(node), |&element| parent_element(adapter, element))
        .find_map(|element| {
            adapter
                .string_property(element, "lang")
                .filter(|lang| !lang.is_empty())
        });
    declared.is_some_and(|lang| {
        lang.eq_ignore_ascii_case(code)
            || (lang
                .get(..code.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(code))
                && lang.as_bytes().get(code.len()) == Some(&b'-'))
    })
}
