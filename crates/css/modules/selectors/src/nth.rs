//! `An+B` formulas for the `:nth-*()` pseudo-classes.
//! Spec: <https://www.w3.org/TR/selectors-3/#nth-child-pseudo>

use core::fmt;

/// Which sibling position an `:nth-*()` pseudo-class counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NthKind {
    /// `:nth-child()`, counting from the first element sibling.
    Child,
    /// `:nth-last-child()`, counting from the last element sibling.
    LastChild,
    /// `:nth-of-type()`, counting siblings with the same tag.
    OfType,
    /// `:nth-last-of-type()`
    LastOfType,
}

impl NthKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nth-child" => Some(Self::Child),
            "nth-last-child" => Some(Self::LastChild),
            "nth-of-type" => Some(Self::OfType),
            "nth-last-of-type" => Some(Self::LastOfType),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Child => "nth-child",
            Self::LastChild => "nth-last-child",
            Self::OfType => "nth-of-type",
            Self::LastOfType => "nth-last-of-type",
        }
    }

    /// Counts from the end of the sibling list.
    pub const fn from_end(self) -> bool {
        matches!(self, Self::LastChild | Self::LastOfType)
    }

    /// Counts only siblings of the same tag.
    pub const fn of_type(self) -> bool {
        matches!(self, Self::OfType | Self::LastOfType)
    }
}

/// `step * n + offset` for `n >= 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NthFormula {
    pub step: i32,
    pub offset: i32,
}

impl NthFormula {
    /// Parse `odd`, `even`, `B`, `An`, `An+B` or `An-B`, with any spacing.
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "" => return None,
            "odd" => return Some(Self { step: 2, offset: 1 }),
            "even" => return Some(Self { step: 2, offset: 0 }),
            _ => {}
        }
        let Some((coefficient, rest)) = compact.split_once('n') else {
            return Some(Self {
                step: 0,
                offset: compact.parse().ok()?,
            });
        };
        let step = match coefficient {
            "" | "+" => 1,
            "-" => -1,
            digits => digits.parse().ok()?,
        };
        let offset = if rest.is_empty() {
            0
        } else if rest.starts_with(['+', '-']) {
            rest.parse().ok()?
        } else {
            return None;
        };
        Some(Self { step, offset })
    }

    /// Whether the 1-based sibling `position` is selected.
    pub const fn matches(self, position: i32) -> bool {
        if self.step == 0 {
            return position == self.offset;
        }
        let diff = position.saturating_sub(self.offset);
        matches!(
            (diff.checked_rem(self.step), diff.checked_div(self.step)),
            (Some(0), Some(quotient)) if quotient >= 0
        )
    }
}

impl fmt::Display for NthFormula {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 0 {
            write!(formatter, "{}", self.offset)
        } else {
            write!(formatter, "{}n{:+}", self.step, self.offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(text: &str) -> Option<(i32, i32)> {
        NthFormula::parse(text).map(|parsed| (parsed.step, parsed.offset))
    }

    /// Keyword and arithmetic spellings.
    ///
    /// # Panics
    /// Panics if a formula parses to the wrong coefficients.
    #[test]
    fn parses_formulas() {
        assert_eq!(formula("odd"), Some((2, 1)));
        assert_eq!(formula(" EVEN "), Some((2, 0)));
        assert_eq!(formula("3"), Some((0, 3)));
        assert_eq!(formula("2n + 1"), Some((2, 1)));
        assert_eq!(formula("-n+3"), Some((-1, 3)));
        assert_eq!(formula("n"), Some((1, 0)));
        assert_eq!(formula("4n-2"), Some((4, -2)));
        assert_eq!(formula(""), None);
        assert_eq!(formula("2n3"), None);
        assert_eq!(formula("x"), None);
    }

    /// Positions selected by common formulas.
    ///
    /// # Panics
    /// Panics if a position is selected incorrectly.
    #[test]
    fn selects_positions() {
        let first_three = NthFormula {
            step: -1,
            offset: 3,
        };
        let picked: Vec<i32> = (1..=6)
            .filter(|position| first_three.matches(*position))
            .collect();
        assert_eq!(picked, vec![1, 2, 3]);

        let odd = NthFormula { step: 2, offset: 1 };
        let picked_odd: Vec<i32> = (1..=6).filter(|position| odd.matches(*position)).collect();
        assert_eq!(picked_odd, vec![1, 3, 5]);

        let exact = NthFormula { step: 0, offset: 4 };
        assert!(exact.matches(4));
        assert!(!exact.matches(8));
    }

    /// Display output parses back to the same formula.
    ///
    /// # Panics
    /// Panics if the display form does not parse back.
    #[test]
    fn display_parses_back() {
        for text in ["odd", "-n+3", "5", "3n-1"] {
            let parsed = NthFormula::parse(text);
            let reparsed = parsed.and_then(|value| NthFormula::parse(&value.to_string()));
            assert_eq!(parsed, reparsed);
        }
    }
}
