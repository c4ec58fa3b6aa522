//! CSS engine for a headless, script-capable browser.
//!
//! Stylesheet text is split and compiled into [`Descriptor`]s, matched
//! against any DOM that implements [`ElementAdapter`], and written to the
//! style targets a [`StyleHost`] hands out. The same matcher answers the
//! script entry points: [`query_selector`], [`query_selector_all`],
//! [`matches`], [`match_media`] and computed-style lookups.
//!
//! The individual CSS concerns live in the `css_*` module crates; this crate
//! ties them together and owns the node index and the bulk pass.

#![forbid(unsafe_code)]

mod bulk;
mod config;
mod index;
mod query;
mod stylesheet;

pub use bulk::{BulkReport, apply_computed_style, apply_inline_css_text, run_bulk_pass};
pub use config::EngineConfig;
pub use index::{DocList, NodeIndex};
pub use query::{
    QueryError, matches, matches_anywhere_in_document, query_selector, query_selector_all,
};
pub use stylesheet::{Descriptor, Stylesheet};

pub use css_cascade::{
    HoverEffect, IMPORTANT_BONUS, INLINE_SPECIFICITY, PseudoElement, StyleHost, StyleMap,
    StyleTarget,
};
pub use css_media_queries::{MediaEnvironment, MediaError};
pub use css_selectors::{ElementAdapter, ErrorKind, NodeType};
pub use css_syntax::{ImportResolver, NoImports, ParseStats};

use css_media_queries::evaluate;
use log::debug;
use url::Url;

/// Evaluate a media query list against `env` (`window.matchMedia`).
/// Text that does not parse matches nothing.
pub fn match_media(query: &str, env: &MediaEnvironment) -> bool {
    evaluate(query, env).unwrap_or_else(|error| {
        debug!(target: "css::media", "matchMedia(`{query}`): {error}");
        false
    })
}

/// The stylesheets of one page plus the configuration they were parsed with.
#[derive(Clone, Debug, Default)]
pub struct StyleEngine {
    config: EngineConfig,
    sheet: Stylesheet,
}

impl StyleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sheet: Stylesheet::default(),
        }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All rules added so far, in the order their sheets were added.
    pub const fn stylesheet(&self) -> &Stylesheet {
        &self.sheet
    }

    /// Parse and add an inline `<style>` sheet.
    pub fn add_stylesheet(&mut self, text: &str) -> &ParseStats {
        self.sheet.append(Stylesheet::parse(text, &self.config));
        self.sheet.stats()
    }

    /// Parse and add a sheet loaded from `base`, fetching its imports
    /// through `resolver`.
    pub fn add_stylesheet_from(
        &mut self,
        text: &str,
        base: &Url,
        resolver: &mut dyn ImportResolver,
    ) -> &ParseStats {
        self.sheet.append(Stylesheet::parse_with(
            text,
            Some(base),
            &self.config,
            resolver,
        ));
        self.sheet.stats()
    }

    /// Drop every rule, e.g. before a reload.
    pub fn clear(&mut self) {
        self.sheet = Stylesheet::default();
    }

    /// Style every element under `document`.
    pub fn run_bulk_pass<H: StyleHost>(&self, host: &mut H, document: H::Handle) -> BulkReport {
        run_bulk_pass(host, document, &self.sheet, &self.config)
    }

    /// Write the styles matching `node` into `dest`.
    pub fn apply_computed_style<A, T>(&self, adapter: &A, node: A::Handle, dest: &mut T) -> usize
    where
        A: ElementAdapter,
        T: StyleTarget + ?Sized,
    {
        apply_computed_style(adapter, node, &self.sheet, &self.config, dest)
    }

    /// `matchMedia` against the configured screen.
    pub fn match_media(&self, query: &str) -> bool {
        match_media(query, &self.config.media)
    }
}
