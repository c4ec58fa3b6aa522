//! Selector text from compiled chains.
//! Spec: <https://drafts.csswg.org/cssom/#serializing-selectors>
//!
//! The output compiles back to an equivalent chain; it is not byte-identical
//! to the source (case, spacing and `*` are normalized).

use core::fmt::{self, Write as _};

use crate::{AtomicSelector, AttrOp, Combinator, Modifier, PseudoClass, Selector, SelectorChain};

impl Combinator {
    /// Separator text written in front of a segment with this combinator.
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Group => "",
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::Adjacent => " + ",
            Self::Sibling => " ~ ",
        }
    }
}

fn write_quoted(formatter: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    formatter.write_char('"')?;
    for character in value.chars() {
        match character {
            '"' | '\\' => {
                formatter.write_char('\\')?;
                formatter.write_char(character)?;
            }
            '\n' => formatter.write_str("\\a ")?,
            _ => formatter.write_char(character)?,
        }
    }
    formatter.write_char('"')
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstChild => "first-child",
            Self::LastChild => "last-child",
            Self::OnlyChild => "only-child",
            Self::FirstOfType => "first-of-type",
            Self::LastOfType => "last-of-type",
            Self::OnlyOfType => "only-of-type",
            Self::Empty => "empty",
            Self::Checked => "checked",
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
            Self::Scope => "scope",
            Self::Root => "root",
            Self::Lang(code) => return write!(formatter, ":lang({code})"),
            Self::Nth(kind, formula) => return write!(formatter, ":{}({formula})", kind.name()),
        };
        write!(formatter, ":{name}")
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(attribute) if attribute.is_class => {
                write!(formatter, ".{}", attribute.value)
            }
            Self::Attribute(attribute) if attribute.is_id => {
                write!(formatter, "#{}", attribute.value)
            }
            Self::Attribute(attribute) if attribute.op == AttrOp::Exists => {
                write!(formatter, "[{}]", attribute.name)
            }
            Self::Attribute(attribute) => {
                write!(formatter, "[{}{}", attribute.name, attribute.op.symbol())?;
                write_quoted(formatter, &attribute.value)?;
                formatter.write_char(']')
            }
            Self::Pseudo(pseudo) => write!(formatter, "{pseudo}"),
            Self::Not(chain) => write!(formatter, ":not({chain})"),
        }
    }
}

impl fmt::Display for AtomicSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flagged = self.before || self.after || self.hover || self.link;
        match self.tag.as_deref() {
            Some(tag) => formatter.write_str(tag)?,
            None if self.modifiers.is_empty() && !flagged => formatter.write_char('*')?,
            None => {}
        }
        for modifier in &self.modifiers {
            write!(formatter, "{modifier}")?;
        }
        if self.link {
            formatter.write_str(":link")?;
        }
        if self.hover {
            formatter.write_str(":hover")?;
        }
        if self.before {
            formatter.write_str(":before")?;
        }
        if self.after {
            formatter.write_str(":after")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for atom in self.atoms.iter().rev() {
            if !first {
                formatter.write_str(atom.combinator.separator())?;
            }
            first = false;
            write!(formatter, "{atom}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.chain)
    }
}
