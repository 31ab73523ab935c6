//! TypeSpec enum builder.

use crate::builder::{CodeBuilder, CodeFragment, Renderable, string_literal};

/// An enum member: identifier and its string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub ident: String,
    pub value: String,
}

/// Builder for TypeSpec enums.
#[derive(Debug, Clone)]
pub struct Enum {
    name: String,
    members: Vec<EnumMember>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn member(mut self, ident: impl Into<String>, value: impl Into<String>) -> Self {
        self.members.push(EnumMember {
            ident: ident.into(),
            value: value.into(),
        });
        self
    }

    /// Build the enum as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typespec();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Enum {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        if self.members.is_empty() {
            return vec![CodeFragment::Line(format!("enum {} {{}}", self.name))];
        }
        vec![CodeFragment::Block {
            header: format!("enum {} {{", self.name),
            body: self
                .members
                .iter()
                .map(|m| CodeFragment::Line(format!("{}: {};", m.ident, string_literal(&m.value))))
                .collect(),
            close: Some("}".to_string()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_enum() {
        assert_eq!(Enum::new("Nothing").build(), "enum Nothing {}\n");
    }

    #[test]
    fn test_enum_members() {
        let e = Enum::new("Status")
            .member("DRAFT", "draft")
            .member("IN_REVIEW", "in review")
            .build();
        assert_eq!(
            e,
            "enum Status {\n  DRAFT: \"draft\";\n  IN_REVIEW: \"in review\";\n}\n"
        );
    }

    #[test]
    fn test_member_value_is_escaped() {
        let e = Enum::new("Quote").member("SAY", "say \"hi\"").build();
        assert!(e.contains(r#"SAY: "say \"hi\"";"#));
    }
}
