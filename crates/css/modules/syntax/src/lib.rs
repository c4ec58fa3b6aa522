//! CSS Syntax Module Level 3: stylesheet scanning and rule splitting.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Stylesheets are processed as bytes: comments are dropped, `@import`
//! statements are spliced in place, `@charset` is discarded and the rest is
//! cut into raw `selector { body }` descriptors. Quoted strings, `[...]` and
//! `(...)` groups are opaque everywhere, so a brace or semicolon inside them
//! never ends a rule.

#![forbid(unsafe_code)]

mod errors;
mod imports;
mod lexical;
mod sheet;

pub use errors::{ErrorKind, ParseStats};
pub use imports::{IMPORT_BEGIN, IMPORT_END, ImportResolver, NoImports};
pub use lexical::{
    camel_case, close_span, close_string, is_css_space, starts_with_ignore_ascii_case, trim,
    uncomment, unstring,
};
pub use sheet::{RawDescriptor, SplitOptions, split_stylesheet};
