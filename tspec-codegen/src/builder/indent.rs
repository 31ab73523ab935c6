//! Indentation configuration for code generation.

use std::borrow::Cow;

/// Indentation style for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Spaces with the specified width (e.g., 2 or 4).
    Spaces(u8),
    /// Tab character.
    Tab,
}

impl Indent {
    /// 2-space indentation, the TypeSpec formatter default.
    pub const TYPESPEC: Self = Self::Spaces(2);

    /// The text of one indent level.
    pub fn unit(&self) -> Cow<'static, str> {
        match self {
            Self::Spaces(2) => Cow::Borrowed("  "),
            Self::Spaces(4) => Cow::Borrowed("    "),
            Self::Spaces(width) => Cow::Owned(" ".repeat(usize::from(*width))),
            Self::Tab => Cow::Borrowed("\t"),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::TYPESPEC
    }
}
