//! Engine configuration.

use css_media_queries::MediaEnvironment;
use css_syntax::SplitOptions;
use serde::{Deserialize, Serialize};
use url::Url;

/// Knobs a host sets once per page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen that `@media`, `@import ... <media>` and `matchMedia` see.
    pub media: MediaEnvironment,
    /// Deeper `@import` chains are cut off.
    pub max_import_depth: usize,
    /// Use the tag/id/class index for bulk passes; `false` scans every element.
    pub use_index: bool,
    /// Apply `style="..."` attributes after stylesheet rules.
    pub apply_style_attributes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            media: MediaEnvironment::default(),
            max_import_depth: 8,
            use_index: true,
            apply_style_attributes: true,
        }
    }
}

impl EngineConfig {
    /// Splitter options for a sheet loaded from `base`.
    pub const fn split_options<'cfg>(&'cfg self, base: Option<&'cfg Url>) -> SplitOptions<'cfg> {
        SplitOptions {
            base,
            media: &self.media,
            max_import_depth: self.max_import_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Missing fields fall back to defaults when loading JSON.
    ///
    /// # Panics
    /// Panics if a default is not applied.
    #[test]
    fn partial_json() -> Result<(), serde_json::Error> {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "use_index": false, "media": { "scripting": true } }"#)?;
        assert!(!config.use_index);
        assert!(config.media.scripting);
        assert_eq!(config.max_import_depth, 8);
        assert!((config.media.width - 1024.0).abs() < f32::EPSILON);
        Ok(())
    }
}
