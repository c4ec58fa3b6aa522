/// Which rendering context a bulk pass serves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Ordinary selectors, matched for their declarations.
    #[default]
    Plain,
    /// Selectors whose subject carries `:before`.
    Before,
    /// Selectors whose subject carries `:after`.
    After,
}

/// Per-pass matching state, passed explicitly through every matcher call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchContext<H> {
    /// Node answering `:root` and `:scope`.
    pub root: Option<H>,
    /// Leave `root` itself out of the candidate list.
    pub skip_root: bool,
    /// Stop at the first match.
    pub one_match: bool,
    /// Load-time pass over the whole document; enables the node index.
    pub bulk: bool,
    /// Computed-style lookup for a single element.
    pub computed_style: bool,
    pub mode: MatchMode,
    /// Hover pass: only `:hover` selectors take part.
    pub hover: bool,
}

impl<H> MatchContext<H> {
    /// Context for a script query (`querySelector*`, `matches`).
    pub const fn script(root: Option<H>) -> Self {
        Self {
            root,
            skip_root: false,
            one_match: false,
            bulk: false,
            computed_style: false,
            mode: MatchMode::Plain,
            hover: false,
        }
    }

    /// Context for one mode/hover combination of a bulk pass.
    pub const fn bulk(root: Option<H>, mode: MatchMode, hover: bool) -> Self {
        Self {
            root,
            skip_root: false,
            one_match: false,
            bulk: true,
            computed_style: false,
            mode,
            hover,
        }
    }

    /// Context for a computed-style lookup.
    pub const fn computed_style(root: Option<H>) -> Self {
        Self {
            root,
            skip_root: false,
            one_match: false,
            bulk: false,
            computed_style: true,
            mode: MatchMode::Plain,
            hover: false,
        }
    }
}
