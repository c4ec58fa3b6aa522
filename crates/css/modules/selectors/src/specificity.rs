//! Selector specificity as a single ordered score.
//! Spec: <https://www.w3.org/TR/selectors-3/#specificity>
//!
//! This is a coarse ranking rather than the (a, b, c) triple: each of the
//! first three segments, subject first, contributes a small value in a
//! base-1000 place. Only the relative order matters to the cascade.

use crate::{AtomicSelector, Modifier, SelectorChain};

/// Flat bonus for selectors compiled inside a satisfied `@media` block.
pub const AT_RULE_BONUS: u32 = 10;

/// Place values for the subject and the two segments left of it.
const PLACES: [u32; 3] = [1_000_000, 1_000, 1];

/// Modifiers beyond this many per segment do not add to the score.
const MODIFIER_CAP: u32 = 7;

/// Score a compiled chain.
///
/// Per segment: four points per counted modifier (`:not()` excluded), two
/// for an id while under the cap, one for a tag. A chain that scores zero
/// (no tag, only negations) falls back to one plus the subject's negations.
pub fn specificity(chain: &SelectorChain, under_at: bool) -> u32 {
    let mut score = chain
        .atoms
        .iter()
        .zip(PLACES)
        .map(|(atom, place)| segment_value(atom).saturating_mul(place))
        .fold(0u32, u32::saturating_add);
    if score == 0 {
        let negations = chain.base().map_or(0, |base| {
            base.modifiers
                .iter()
                .filter(|modifier| matches!(modifier, Modifier::Not(_)))
                .count()
        });
        score = u32::try_from(negations)
            .unwrap_or(MODIFIER_CAP)
            .saturating_add(1);
    }
    if under_at {
        score = score.saturating_add(AT_RULE_BONUS);
    }
    score
}

fn segment_value(atom: &AtomicSelector) -> u32 {
    let counted = atom
        .modifiers
        .iter()
        .filter(|modifier| !matches!(modifier, Modifier::Not(_)))
        .count();
    let capped = u32::try_from(counted)
        .unwrap_or(MODIFIER_CAP)
        .min(MODIFIER_CAP);
    let mut value = capped.saturating_mul(4);
    if capped < MODIFIER_CAP && atom.id().is_some() {
        value = value.saturating_add(2);
    }
    if atom.tag.is_some() {
        value = value.saturating_add(1);
    }
    value
}
