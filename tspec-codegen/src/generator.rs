//! TypeSpec generation from an extracted schema.

use std::collections::HashMap;

use tspec_core::{Diagnostics, GenerationResult, ParsedSchema, TypespecDocument};

use crate::{
    renderer::Renderer,
    type_mapper::{TypeMapper, TypeSpecTypeMapper},
};

/// Produces one `<ClassName>.tsp` document per table and per enum.
///
/// ```
/// use tspec_codegen::Generator;
/// use tspec_core::{ColumnDefinition, ParsedSchema, TableDefinition};
///
/// let mut schema = ParsedSchema::default();
/// schema.tables.push(TableDefinition {
///     name: "users".into(),
///     class_name: "Users".into(),
///     columns: vec![ColumnDefinition::new("age", "integer")],
/// });
///
/// let result = Generator::new().generate(schema);
/// assert_eq!(result.models[0].name, "Users.tsp");
/// assert_eq!(result.models[0].content, "model Users {\n  age?: int32;\n}\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator<M = TypeSpecTypeMapper> {
    renderer: Renderer<M>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap every document in `namespace <ns>;`.
    pub fn with_namespace(namespace: Option<String>) -> Self {
        Self::with_mapper(TypeSpecTypeMapper, namespace)
    }
}

impl<M: TypeMapper> Generator<M> {
    pub fn with_mapper(mapper: M, namespace: Option<String>) -> Self {
        Self {
            renderer: Renderer::new(mapper, namespace),
        }
    }

    /// Render every table and enum of `schema`.
    ///
    /// Documents are produced even when the schema carries errors; the
    /// caller decides whether to write them.
    pub fn generate(&self, schema: ParsedSchema) -> GenerationResult {
        let models = schema
            .tables
            .iter()
            .map(|table| TypespecDocument {
                name: document_name(&table.class_name),
                content: self.renderer.render_model(table),
                table_name: Some(table.name.clone()),
                enum_name: None,
            })
            .collect::<Vec<_>>();

        let enums = schema
            .enums
            .iter()
            .map(|definition| TypespecDocument {
                name: document_name(&definition.class_name),
                content: self.renderer.render_enum(definition),
                table_name: None,
                enum_name: Some(definition.name.clone()),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            models = models.len(),
            enums = enums.len(),
            "rendered typespec documents"
        );

        let mut diagnostics = schema.diagnostics;
        warn_on_shared_names(models.iter().chain(&enums), &mut diagnostics);

        GenerationResult {
            models,
            enums,
            tables: schema.tables,
            diagnostics,
        }
    }
}

fn document_name(class_name: &str) -> String {
    format!("{class_name}.tsp")
}

/// Documents are written in order, so a later one replaces an earlier
/// document with the same file name.
fn warn_on_shared_names<'a>(
    documents: impl Iterator<Item = &'a TypespecDocument>,
    diagnostics: &mut Diagnostics,
) {
    let mut seen: HashMap<&str, &TypespecDocument> = HashMap::new();
    for document in documents {
        if let Some(earlier) = seen.insert(&document.name, document) {
            diagnostics.warn(format!(
                "{} is generated for both {} and {}; the {} overwrites it",
                document.name,
                origin(earlier),
                origin(document),
                origin(document)
            ));
        }
    }
}

fn origin(document: &TypespecDocument) -> String {
    match (&document.table_name, &document.enum_name) {
        (Some(table), _) => format!("table {table}"),
        (None, Some(name)) => format!("enum {name}"),
        (None, None) => "unnamed schema item".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tspec_core::{EnumDefinition, TableDefinition};

    use super::*;

    fn schema() -> ParsedSchema {
        let mut schema = ParsedSchema::default();
        schema.tables.push(TableDefinition {
            name: "blog_posts".into(),
            class_name: "BlogPosts".into(),
            columns: vec![],
        });
        schema.enums.push(EnumDefinition {
            name: "post_state".into(),
            class_name: "PostState".into(),
            values: vec!["open".into()],
        });
        schema.diagnostics.warn("careful");
        schema
    }

    #[test]
    fn test_document_names_and_links() {
        let result = Generator::new().generate(schema());
        assert_eq!(result.models.len(), 1);
        assert_eq!(result.models[0].name, "BlogPosts.tsp");
        assert_eq!(result.models[0].table_name.as_deref(), Some("blog_posts"));
        assert_eq!(result.models[0].enum_name, None);
        assert_eq!(result.enums[0].name, "PostState.tsp");
        assert_eq!(result.enums[0].enum_name.as_deref(), Some("post_state"));
        assert_eq!(result.tables[0].name, "blog_posts");
    }

    #[test]
    fn test_diagnostics_are_carried_over() {
        let result = Generator::new().generate(schema());
        assert_eq!(result.diagnostics.warnings, ["careful"]);
        assert!(result.diagnostics.errors.is_empty());
    }

    #[test]
    fn test_documents_models_first() {
        let result = Generator::with_namespace(Some("Blog".into())).generate(schema());
        let names: Vec<_> = result.documents().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["BlogPosts.tsp", "PostState.tsp"]);
        assert!(result.documents().all(|d| d.content.starts_with("namespace Blog;\n\n")));
    }

    #[test]
    fn test_shared_document_name_warns() {
        let mut schema = ParsedSchema::default();
        schema.tables.push(TableDefinition {
            name: "status".into(),
            class_name: "Status".into(),
            columns: vec![],
        });
        schema.enums.push(EnumDefinition {
            name: "status".into(),
            class_name: "Status".into(),
            values: vec!["on".into()],
        });

        let result = Generator::new().generate(schema);
        assert_eq!(result.models.len(), 1);
        assert_eq!(result.enums.len(), 1);
        assert_eq!(
            result.diagnostics.warnings,
            ["Status.tsp is generated for both table status and enum status; the enum status overwrites it"]
        );
        assert!(result.diagnostics.errors.is_empty());
    }

    #[test]
    fn test_empty_schema() {
        let result = Generator::new().generate(ParsedSchema::default());
        assert_eq!(result, GenerationResult::default());
    }
}
