//! Error taxonomy shared by every stage of stylesheet processing.

use core::error::Error;
use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;

/// Why a descriptor, selector or atomic selector was excluded from matching.
///
/// Errors never abort a stylesheet: the affected piece is kept (for
/// statistics and debug dumps) but skipped by every matching pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Block with no selector text in front of it.
    NoSelector,
    /// `:not()` holding more than one comma-separated alternative.
    ManyNot,
    /// Braces nested inside an ordinary rule, or a stray `}`.
    Nested,
    /// Empty segment between combinators, or a dangling combinator.
    EmptySelector,
    /// Block without a usable declaration, or text with no block at all.
    NoRules,
    /// Declaration without a `:` separator.
    RuleColon,
    /// `[`, `(` or a quote that is never closed.
    OpenBracket,
    /// Tag name with characters outside an identifier.
    BadTag,
    /// Malformed attribute selector, class or id.
    BadAttribute,
    /// Malformed property name in a declaration.
    BadRuleAttribute,
    /// Dynamic pseudo-class a headless browser never satisfies.
    Dynamic,
    /// `:link` attached to a tag other than `a`.
    TagLink,
    /// `:before`/`:after` on a segment other than the subject.
    InjectHigh,
    /// Pseudo-element other than `before`/`after`.
    PseudoElement,
    /// Pseudo-class outside the supported set.
    UnsupportedPseudo,
    /// Selectors of one descriptor failed for different reasons.
    Multiple,
    /// `@` with no rule name.
    EmptyAt,
    /// Block at-rule other than `@media`.
    NotMedia,
    /// `@media` prelude that does not evaluate.
    BadMedia,
    /// At-rule consumed by the parser itself; informational only.
    AtProcessed,
    /// Statement at-rule that is not understood.
    At,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 21] = [
        Self::NoSelector,
        Self::ManyNot,
        Self::Nested,
        Self::EmptySelector,
        Self::NoRules,
        Self::RuleColon,
        Self::OpenBracket,
        Self::BadTag,
        Self::BadAttribute,
        Self::BadRuleAttribute,
        Self::Dynamic,
        Self::TagLink,
        Self::InjectHigh,
        Self::PseudoElement,
        Self::UnsupportedPseudo,
        Self::Multiple,
        Self::EmptyAt,
        Self::NotMedia,
        Self::BadMedia,
        Self::AtProcessed,
        Self::At,
    ];

    /// Short stable code used in debug dumps.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoSelector => "nosel",
            Self::ManyNot => "manynot",
            Self::Nested => "nested",
            Self::EmptySelector => "sel0",
            Self::NoRules => "norules",
            Self::RuleColon => "rulecolon",
            Self::OpenBracket => "openbrack",
            Self::BadTag => "tag",
            Self::BadAttribute => "attr",
            Self::BadRuleAttribute => "rattr",
            Self::Dynamic => "dynamic",
            Self::TagLink => "taglink",
            Self::InjectHigh => "injecthigh",
            Self::PseudoElement => "pe",
            Self::UnsupportedPseudo => "unsup",
            Self::Multiple => "multiple",
            Self::EmptyAt => "at0",
            Self::NotMedia => "notmedia",
            Self::BadMedia => "media",
            Self::AtProcessed => "atproc",
            Self::At => "at",
        }
    }

    /// Informational kinds mark descriptors the parser handled itself.
    pub const fn is_informational(self) -> bool {
        matches!(self, Self::AtProcessed)
    }

    /// Human-readable explanation used by `Display`.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::NoSelector => "empty selector list",
            Self::ManyNot => "more than one selector inside :not()",
            Self::Nested => "nested braces in a rule block",
            Self::EmptySelector => "empty selector between combinators",
            Self::NoRules => "no declarations",
            Self::RuleColon => "declaration without a colon",
            Self::OpenBracket => "unclosed bracket or string",
            Self::BadTag => "invalid tag name",
            Self::BadAttribute => "invalid attribute selector",
            Self::BadRuleAttribute => "invalid property name",
            Self::Dynamic => "dynamic pseudo-class",
            Self::TagLink => ":link on a tag other than a",
            Self::InjectHigh => ":before/:after before the last combinator",
            Self::PseudoElement => "unsupported pseudo-element",
            Self::UnsupportedPseudo => "unsupported pseudo-class",
            Self::Multiple => "selectors failed for different reasons",
            Self::EmptyAt => "empty at-rule name",
            Self::NotMedia => "block at-rule other than @media",
            Self::BadMedia => "invalid media query",
            Self::AtProcessed => "at-rule processed",
            Self::At => "unsupported at-rule",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({})", self.summary(), self.code())
    }
}

impl Error for ErrorKind {}

/// Per-stylesheet counters, kept for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Descriptors produced, including errored and informational ones.
    pub descriptors: usize,
    /// Imported stylesheets that were fetched and spliced in.
    pub imports: usize,
    /// Occurrences of each error kind.
    pub errors: BTreeMap<ErrorKind, usize>,
}

impl ParseStats {
    /// Count one occurrence of `kind`.
    pub fn record(&mut self, kind: ErrorKind) {
        let slot = self.errors.entry(kind).or_insert(0);
        *slot = slot.saturating_add(1);
    }

    /// Occurrences of `kind` so far.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.get(&kind).copied().unwrap_or(0)
    }

    /// Occurrences of every non-informational kind.
    pub fn total_errors(&self) -> usize {
        self.errors
            .iter()
            .filter(|(kind, _)| !kind.is_informational())
            .map(|(_, count)| *count)
            .sum()
    }

    /// Fold another sheet's counters into these.
    pub fn merge(&mut self, other: &Self) {
        self.descriptors = self.descriptors.saturating_add(other.descriptors);
        self.imports = self.imports.saturating_add(other.imports);
        for (kind, count) in &other.errors {
            let slot = self.errors.entry(*kind).or_insert(0);
            *slot = slot.saturating_add(*count);
        }
    }
}
