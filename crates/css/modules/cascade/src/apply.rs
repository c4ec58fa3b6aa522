//! Declaration application with specificity gating.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#cascade-sort>

use std::collections::HashMap;

use css_style_attr::DeclarationBlock;
use log::trace;

use crate::{IMPORTANT_BONUS, INLINE_SPECIFICITY, StyleTarget};

/// Write a matched block onto `target` at `specificity`.
///
/// Within one block the first declaration of a property wins, unless a later
/// one is `!important` and the first is not. A property is only replaced when
/// the new score is strictly higher than the recorded one, and properties
/// inherited from a prototype are left alone. Returns the number of writes.
pub fn apply_declarations<T: StyleTarget + ?Sized>(
    target: &mut T,
    block: &DeclarationBlock,
    specificity: u32,
) -> usize {
    apply_with(target, block, specificity, false)
}

/// Write an inline block (`style="..."`, `cssText`) onto `target`.
///
/// Inline writes replace earlier inline writes of the same property, so a
/// second `cssText` assignment takes effect.
pub fn apply_inline<T: StyleTarget + ?Sized>(target: &mut T, block: &DeclarationBlock) -> usize {
    apply_with(target, block, INLINE_SPECIFICITY, true)
}

fn apply_with<T: StyleTarget + ?Sized>(
    target: &mut T,
    block: &DeclarationBlock,
    specificity: u32,
    replace_equal: bool,
) -> usize {
    // property -> whether the write that claimed it was important
    let mut claimed: HashMap<&str, bool> = HashMap::new();
    let mut writes = 0usize;
    for declaration in &block.declarations {
        let property = declaration.property.as_str();
        if claimed
            .get(property)
            .is_some_and(|important| *important || !declaration.important)
        {
            continue;
        }
        if target.is_inherited(property) {
            continue;
        }
        let score = if declaration.important {
            specificity.saturating_add(IMPORTANT_BONUS)
        } else {
            specificity
        };
        let blocked = target.specificity(property).is_some_and(|previous| {
            if replace_equal {
                previous > score
            } else {
                previous >= score
            }
        });
        if blocked {
            continue;
        }
        trace!(target: "css::bulk", "{property} = {} @{score}", declaration.value);
        target.set_property(property, &declaration.value);
        target.set_specificity(property, score);
        claimed.insert(property, declaration.important);
        writes = writes.saturating_add(1);
    }
    writes
}
