//! Extracted schema model.
//!
//! These types are the canonical result of extraction and look the same no
//! matter which backend produced them. Field names serialize in camelCase;
//! snake_case spellings are accepted when deserializing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Diagnostics;

/// Column options in declaration order (e.g. `null: false, limit: 255`).
pub type ColumnOptions = IndexMap<String, Value>;

/// A single column declared inside a `create_table` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column name as written in the DSL (snake_case).
    pub name: String,
    /// Raw DSL type tag (e.g. "string", "references", "enum").
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub options: ColumnOptions,
    /// Resolved enum type name, only for `enum` columns with a linkage option.
    #[serde(
        default,
        alias = "enum_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub enum_name: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            options: ColumnOptions::new(),
            enum_name: None,
        }
    }

    /// Set an option, replacing any previous value for the key.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Get an option value.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// A column is required only when declared with `null: false`.
    pub fn is_required(&self) -> bool {
        matches!(self.option("null"), Some(Value::Bool(false)))
    }

    /// Whether `polymorphic: true` was given.
    pub fn is_polymorphic(&self) -> bool {
        matches!(self.option("polymorphic"), Some(Value::Bool(true)))
    }
}

/// A table declared with `create_table`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Raw DSL table name.
    pub name: String,
    /// TypeSpec model name derived from `name`.
    #[serde(default, alias = "class_name")]
    pub class_name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// An enum type declared with `create_enum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    /// Raw DSL enum name.
    pub name: String,
    /// TypeSpec enum name derived from `name`.
    #[serde(default, alias = "class_name")]
    pub class_name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Result of extracting one schema text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSchema {
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
    #[serde(default)]
    pub enums: Vec<EnumDefinition>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl ParsedSchema {
    /// An empty result carrying a single error.
    pub fn failed(error: impl Into<String>) -> Self {
        let mut schema = Self::default();
        schema.diagnostics.error(error);
        schema
    }

    /// Find a table by its raw name.
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Find an enum by its raw name.
    pub fn enum_def(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.enums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_required_only_with_explicit_null_false() {
        let col = ColumnDefinition::new("name", "string");
        assert!(!col.is_required());

        let col = col.with_option("null", json!(false));
        assert!(col.is_required());

        let col = ColumnDefinition::new("name", "string").with_option("null", json!(true));
        assert!(!col.is_required());

        // Only the boolean counts
        let col = ColumnDefinition::new("name", "string").with_option("null", json!("false"));
        assert!(!col.is_required());
    }

    #[test]
    fn test_polymorphic() {
        let col = ColumnDefinition::new("owner", "references");
        assert!(!col.is_polymorphic());
        let col = col.with_option("polymorphic", json!(true));
        assert!(col.is_polymorphic());
    }

    #[test]
    fn test_options_keep_declaration_order() {
        let col = ColumnDefinition::new("title", "string")
            .with_option("limit", json!(80))
            .with_option("default", json!(""))
            .with_option("null", json!(false));
        let keys: Vec<_> = col.options.keys().map(String::as_str).collect();
        assert_eq!(keys, ["limit", "default", "null"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let col = ColumnDefinition {
            enum_name: Some("Status".to_string()),
            ..ColumnDefinition::new("status", "enum")
        };
        let value = serde_json::to_value(&col).unwrap();
        assert_eq!(value["type"], "enum");
        assert_eq!(value["enumName"], "Status");

        let plain = serde_json::to_value(ColumnDefinition::new("age", "integer")).unwrap();
        assert!(plain.get("enumName").is_none());
    }

    #[test]
    fn test_deserializes_snake_case_aliases() {
        let table: TableDefinition = serde_json::from_value(json!({
            "name": "users",
            "class_name": "Users",
            "columns": [{ "name": "status", "type": "enum", "enum_name": "Status" }]
        }))
        .unwrap();
        assert_eq!(table.class_name, "Users");
        assert_eq!(table.columns[0].enum_name.as_deref(), Some("Status"));
        assert!(table.columns[0].options.is_empty());
    }

    #[test]
    fn test_failed_schema() {
        let schema = ParsedSchema::failed("boom");
        assert!(schema.is_empty());
        assert_eq!(schema.diagnostics.errors, ["boom"]);
    }
}
