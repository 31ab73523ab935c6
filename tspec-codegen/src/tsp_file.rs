//! TspFile abstraction for structured TypeSpec file generation.

use crate::builder::{CodeBuilder, CodeFragment, Indent, Renderable};

/// A structured representation of one `.tsp` file.
///
/// An optional `namespace X;` header is followed by a blank line and the
/// body declarations, separated from each other by blank lines.
///
/// # Example
///
/// ```
/// use tspec_codegen::{TspFile, ast::Model};
///
/// let file = TspFile::new()
///     .namespace(Some("App.Models".to_string()))
///     .add(Model::new("Users").property("name", "string"))
///     .render();
///
/// assert_eq!(file, "namespace App.Models;\n\nmodel Users {\n  name: string;\n}\n");
/// ```
#[derive(Debug, Default)]
pub struct TspFile {
    namespace: Option<String>,
    body: Vec<Vec<CodeFragment>>,
}

impl TspFile {
    /// Create a new empty TspFile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace header. Blank names are treated as absent.
    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.trim().is_empty());
        self
    }

    /// Add a body element (any Renderable).
    #[allow(clippy::should_implement_trait)]
    pub fn add<R: Renderable>(mut self, node: R) -> Self {
        self.body.push(node.to_fragments());
        self
    }

    /// Render the file with 2-space indentation.
    pub fn render(&self) -> String {
        self.render_with_indent(Indent::TYPESPEC)
    }

    /// Render the file with custom indentation.
    pub fn render_with_indent(&self, indent: Indent) -> String {
        let mut builder = CodeBuilder::new(indent);

        if let Some(namespace) = &self.namespace {
            builder.push_line(&format!("namespace {};", namespace.trim()));
            builder.push_blank();
        }

        for (i, fragments) in self.body.iter().enumerate() {
            if i > 0 {
                builder.push_blank();
            }
            for fragment in fragments {
                builder.apply_fragment(fragment.clone());
            }
        }

        builder.build()
    }

    /// Check if the file has no declarations.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Enum, Model};

    #[test]
    fn test_without_namespace() {
        let out = TspFile::new().add(Model::new("A").property("x", "int32")).render();
        assert_eq!(out, "model A {\n  x: int32;\n}\n");
    }

    #[test]
    fn test_blank_namespace_is_ignored() {
        let out = TspFile::new()
            .namespace(Some("  ".into()))
            .add(Model::new("A"))
            .render();
        assert_eq!(out, "model A {}\n");
    }

    #[test]
    fn test_declarations_are_separated() {
        let file = TspFile::new()
            .namespace(Some("Db".into()))
            .add(Enum::new("Mood").member("HAPPY", "happy"))
            .add(Model::new("People"));
        assert!(!file.is_empty());
        assert_eq!(
            file.render(),
            "namespace Db;\n\nenum Mood {\n  HAPPY: \"happy\";\n}\n\nmodel People {}\n"
        );
    }

    #[test]
    fn test_tab_indent() {
        let out = TspFile::new()
            .add(Model::new("A").property("x", "int32"))
            .render_with_indent(Indent::Tab);
        assert_eq!(out, "model A {\n\tx: int32;\n}\n");
    }
}
