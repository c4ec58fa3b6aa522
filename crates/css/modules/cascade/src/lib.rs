//! CSS Cascading: writing matched declarations onto per-node style targets.
//! Spec: <https://www.w3.org/TR/css-cascade-4/>
//!
//! The cascade here is the one a script-facing style object needs: each
//! property remembers the score of the declaration that set it, and a later
//! declaration only replaces it with a strictly higher score. Inline styles
//! and `!important` are expressed as score offsets on top of the selector
//! specificity.

#![forbid(unsafe_code)]

mod apply;
mod content;
mod hover;
mod style_map;

pub use apply::{apply_declarations, apply_inline};
pub use content::{PseudoElement, generated_content};
pub use hover::HoverEffect;
pub use style_map::StyleMap;

use css_selectors::ElementAdapter;

/// Score of `style="..."` and `cssText` declarations, above any selector.
pub const INLINE_SPECIFICITY: u32 = 1_000_000_000;

/// Added to the score of `!important` declarations.
pub const IMPORTANT_BONUS: u32 = 2_000_000_000;

/// A style object declarations are written to.
///
/// Property names are the camel-case names script sees (`backgroundColor`).
pub trait StyleTarget {
    fn property(&self, name: &str) -> Option<&str>;

    fn set_property(&mut self, name: &str, value: &str);

    /// True when `name` resolves through a prototype rather than an own
    /// property; such properties are never overwritten.
    fn is_inherited(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Score of the declaration that last wrote `name`.
    fn specificity(&self, name: &str) -> Option<u32>;

    fn set_specificity(&mut self, name: &str, score: u32);
}

/// A document that owns style targets and receives generated content.
pub trait StyleHost: ElementAdapter {
    type Style: StyleTarget;

    /// Style target of an element, created on first use. `None` for nodes
    /// that cannot carry a style.
    fn style_mut(&mut self, node: Self::Handle) -> Option<&mut Self::Style>;

    /// Put `text` into the synthetic `::before`/`::after` node of `node`.
    ///
    /// # Errors
    /// Returns an error if the host cannot create or update the synthetic node.
    fn set_generated_content(
        &mut self,
        node: Self::Handle,
        pseudo: PseudoElement,
        text: &str,
    ) -> anyhow::Result<()>;

    /// Empty every synthetic node filled by an earlier pass, so content no
    /// rule produces any more does not linger. Synthetic nodes may be kept
    /// for reuse.
    fn clear_generated_content(&mut self) {}

    /// Record what hovering over `node` would change.
    fn set_hover_effect(&mut self, node: Self::Handle, effect: HoverEffect);
}
