//! Compiled stylesheets: descriptors with their selectors and declarations.

use core::fmt;

use css_selectors::{SelectorList, compile};
use css_style_attr::{DeclarationBlock, parse_declaration_block};
use css_syntax::{ErrorKind, ImportResolver, NoImports, ParseStats, RawDescriptor, split_stylesheet};
use log::debug;
use url::Url;

use crate::config::EngineConfig;

/// One `selector-list { declarations }` rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub selector_text: String,
    pub body_text: String,
    pub selectors: SelectorList,
    pub declarations: DeclarationBlock,
    /// From inside a satisfied `@media` block.
    pub under_at: bool,
    pub error: Option<ErrorKind>,
    /// Highest specificity among the usable selectors; the score every
    /// declaration of this rule is applied with.
    pub highest_specificity: u32,
}

impl Descriptor {
    fn compile(raw: RawDescriptor) -> Self {
        let mut descriptor = Self {
            selector_text: raw.selector,
            body_text: raw.body,
            under_at: raw.under_at,
            error: raw.error,
            ..Self::default()
        };
        if descriptor.error.is_some() {
            return descriptor;
        }
        descriptor.selectors = compile(&descriptor.selector_text, descriptor.under_at);
        descriptor.declarations = parse_declaration_block(&descriptor.body_text);
        descriptor.error = descriptor.selectors.error.or(descriptor.declarations.error);
        descriptor.highest_specificity = descriptor.selectors.highest_specificity();
        if let Some(kind) = descriptor.error {
            debug!(
                target: "css::syntax",
                "rule `{}` rejected: {kind}",
                descriptor.selector_text
            );
        }
        descriptor
    }

    pub const fn is_usable(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for selector in self.selectors.usable() {
            if !first {
                formatter.write_str(", ")?;
            }
            first = false;
            write!(formatter, "{selector}")?;
        }
        write!(formatter, " {{ {} }}", self.declarations)
    }
}

/// A parsed stylesheet, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    descriptors: Vec<Descriptor>,
    stats: ParseStats,
}

impl Stylesheet {
    /// Parse a sheet that has no base URL; `@import` statements are dropped.
    pub fn parse(text: &str, config: &EngineConfig) -> Self {
        Self::parse_with(text, None, config, &mut NoImports)
    }

    /// Parse a sheet loaded from `base`, fetching imports through `resolver`.
    pub fn parse_with(
        text: &str,
        base: Option<&Url>,
        config: &EngineConfig,
        resolver: &mut dyn ImportResolver,
    ) -> Self {
        let (raw, mut stats) = split_stylesheet(text, &config.split_options(base), resolver);
        let descriptors: Vec<Descriptor> = raw
            .into_iter()
            .map(|descriptor| {
                let split_error = descriptor.error.is_some();
                let compiled = Descriptor::compile(descriptor);
                if !split_error && let Some(kind) = compiled.error {
                    stats.record(kind);
                }
                compiled
            })
            .collect();
        Self { descriptors, stats }
    }

    /// Add the rules of a later sheet (a further `<style>` or `<link>`).
    pub fn append(&mut self, other: Self) {
        self.stats.merge(&other.stats);
        self.descriptors.extend(other.descriptors);
    }

    /// Every descriptor, errored and informational ones included.
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Descriptors that take part in matching.
    pub fn usable(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter().filter(|descriptor| descriptor.is_usable())
    }

    pub const fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Usable rules only; rules from `@media` blocks are wrapped in `@media all`
/// so they keep their bonus when parsed again.
impl fmt::Display for Stylesheet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for descriptor in self.usable() {
            if descriptor.under_at {
                writeln!(formatter, "@media all {{ {descriptor} }}")?;
            } else {
                writeln!(formatter, "{descriptor}")?;
            }
        }
        Ok(())
    }
}
