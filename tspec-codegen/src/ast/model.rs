//! TypeSpec model builder.

use crate::builder::{CodeBuilder, CodeFragment, Renderable};
use crate::naming;

/// A property in a TypeSpec model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProperty {
    pub name: String,
    pub ty: String,
    pub optional: bool,
    /// Rendered as `@doc("...")` lines above the property, in order.
    pub docs: Vec<String>,
}

impl ModelProperty {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            optional: false,
            docs: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.docs.push(text.into());
        self
    }

    fn to_fragments(&self) -> impl Iterator<Item = CodeFragment> + '_ {
        let optional = if self.optional { "?" } else { "" };
        self.docs
            .iter()
            .map(|doc| CodeFragment::doc(doc.as_str()))
            .chain(std::iter::once(CodeFragment::Line(format!(
                "{}{}: {};",
                naming::property_name(&self.name),
                optional,
                self.ty
            ))))
    }
}

/// Builder for TypeSpec models.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    properties: Vec<ModelProperty>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a required property.
    pub fn property(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.properties.push(ModelProperty::new(name, ty));
        self
    }

    /// Add an optional property.
    pub fn optional_property(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.properties.push(ModelProperty::new(name, ty).optional());
        self
    }

    /// Add a property with full configuration.
    pub fn property_with(mut self, property: ModelProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Build the model as a string.
    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::typespec();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Model {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        if self.properties.is_empty() {
            return vec![CodeFragment::Line(format!("model {} {{}}", self.name))];
        }
        vec![CodeFragment::Block {
            header: format!("model {} {{", self.name),
            body: self
                .properties
                .iter()
                .flat_map(ModelProperty::to_fragments)
                .collect(),
            close: Some("}".to_string()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_model() {
        assert_eq!(Model::new("Empty").build(), "model Empty {}\n");
    }

    #[test]
    fn test_model_with_properties() {
        let m = Model::new("Users")
            .property("name", "string")
            .optional_property("age", "int32")
            .build();
        assert_eq!(m, "model Users {\n  name: string;\n  age?: int32;\n}\n");
    }

    #[test]
    fn test_docs_precede_property() {
        let m = Model::new("Posts")
            .property_with(
                ModelProperty::new("title", "string")
                    .doc("default: untitled")
                    .doc("limit: 80")
                    .optional(),
            )
            .build();
        assert_eq!(
            m,
            "model Posts {\n  @doc(\"default: untitled\")\n  @doc(\"limit: 80\")\n  title?: string;\n}\n"
        );
    }

    #[test]
    fn test_non_identifier_property_is_quoted() {
        let m = Model::new("Odd").property("first name", "string").build();
        assert!(m.contains("  `first name`: string;\n"));
    }
}
