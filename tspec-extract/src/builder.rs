//! Schema model assembly from matched DSL calls.

use serde_json::{Value, json};
use tspec_core::{
    ColumnDefinition, ColumnOptions, EnumDefinition, ParsedSchema, TableDefinition,
    to_pascal_case, value_to_string,
};

use crate::literal::LiteralResolver;
use crate::matcher::{self, ColumnCall, SchemaCall};
use crate::node::{self, Materialize};

/// Option keys that link an `enum` column to its enum type, by priority.
const ENUM_LINK_KEYS: &[&str] = &["enum_type", "enum", "name"];

/// Extract tables and enums from a syntax tree.
///
/// The returned schema has empty diagnostics; the caller adds whatever the
/// provider reported.
pub fn extract_schema<N: Materialize + ?Sized>(root: &N, source: &str) -> ParsedSchema {
    let root = root.materialize();
    SchemaBuilder::new(LiteralResolver::new(source)).build(&root)
}

/// Builds a [`ParsedSchema`] by walking a tree and matching each node.
pub struct SchemaBuilder<'s> {
    resolver: LiteralResolver<'s>,
}

impl<'s> SchemaBuilder<'s> {
    pub fn new(resolver: LiteralResolver<'s>) -> Self {
        Self { resolver }
    }

    /// Tables and enums come out in first-encounter order.
    pub fn build(&self, root: &Value) -> ParsedSchema {
        let mut schema = ParsedSchema::default();

        node::walk(root, |node, parent| {
            match matcher::match_schema_call(node, parent, &self.resolver) {
                Some(SchemaCall::CreateTable { name, block }) => {
                    let table = self.build_table(name, block);
                    tracing::debug!(
                        table = %table.name,
                        columns = table.columns.len(),
                        "extracted table"
                    );
                    schema.tables.push(table);
                }
                Some(SchemaCall::CreateEnum { name, values }) => {
                    tracing::debug!(name = %name, values = values.len(), "extracted enum");
                    schema.enums.push(EnumDefinition {
                        class_name: to_pascal_case(&name),
                        name,
                        values,
                    });
                }
                None => {}
            }
        });

        schema
    }

    fn build_table(&self, name: String, block: &Value) -> TableDefinition {
        let mut columns = Vec::new();
        for statement in node::body_statements(block) {
            match matcher::match_column(statement, &self.resolver) {
                Some(ColumnCall::Column { name, ty, options }) => {
                    columns.push(column_definition(name, ty, options));
                }
                Some(ColumnCall::Timestamps) => columns.extend(timestamp_columns()),
                None => {}
            }
        }

        TableDefinition {
            class_name: to_pascal_case(&name),
            name,
            columns,
        }
    }
}

/// Build a column, resolving the enum link for `enum` columns.
pub fn column_definition(name: String, ty: String, options: ColumnOptions) -> ColumnDefinition {
    let enum_name = if ty == "enum" {
        resolve_enum_name(&options)
    } else {
        None
    };
    ColumnDefinition {
        name,
        ty,
        options,
        enum_name,
    }
}

/// Enum type name from the first present of `enum_type`, `enum` or `name`.
pub fn resolve_enum_name(options: &ColumnOptions) -> Option<String> {
    ENUM_LINK_KEYS
        .iter()
        .filter_map(|key| options.get(*key))
        .map(value_to_string)
        .find(|s| !s.is_empty())
        .map(|s| to_pascal_case(&s))
}

/// `created_at` and `updated_at`, both `datetime` and `null: false`.
fn timestamp_columns() -> [ColumnDefinition; 2] {
    ["created_at", "updated_at"]
        .map(|name| ColumnDefinition::new(name, "datetime").with_option("null", json!(false)))
}
