use css_style_attr::DeclarationBlock;

/// What a `:hover` rule would change on an element.
///
/// Hover rules are never written to the style target; only `display`,
/// `visibility` and `color` are inspected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HoverEffect {
    /// Hovering shows something (`display` other than `none`, or `visibility: visible`).
    pub reveals: bool,
    /// Hovering changes the text colour.
    pub colors: bool,
}

impl HoverEffect {
    pub fn from_block(block: &DeclarationBlock) -> Self {
        let value = |property: &str| {
            block
                .get(property)
                .map(|declaration| declaration.value.trim().to_ascii_lowercase())
        };
        let displays = value("display").is_some_and(|display| display != "none");
        let visible = value("visibility").is_some_and(|visibility| visibility == "visible");
        Self {
            reveals: displays || visible,
            colors: value("color").is_some(),
        }
    }

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            reveals: self.reveals || other.reveals,
            colors: self.colors || other.colors,
        }
    }

    pub const fn is_empty(self) -> bool {
        !self.reveals && !self.colors
    }
}

#[cfg(test)]
mod tests {
    use css_style_attr::parse_declaration_block;

    use super::*;

    /// Only display, visibility and colour count.
    ///
    /// # Panics
    /// Panics if an effect is misreported.
    #[test]
    fn inspects_three_properties() {
        let effect = |body: &str| HoverEffect::from_block(&parse_declaration_block(body));
        assert_eq!(
            effect("display: block; margin: 0"),
            HoverEffect {
                reveals: true,
                colors: false
            }
        );
        assert!(effect("display: none; width: 3px").is_empty());
        assert!(effect("visibility: VISIBLE").reveals);
        assert!(!effect("visibility: hidden").reveals);
        assert_eq!(
            effect("color: red").merge(effect("display: inline")),
            HoverEffect {
                reveals: true,
                colors: true
            }
        );
    }
}
