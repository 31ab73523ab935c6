//! Rendered TypeSpec documents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Diagnostics, GeneratedFile, TableDefinition};

/// One rendered model or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypespecDocument {
    /// Target file name (e.g. "Users.tsp").
    pub name: String,
    pub content: String,
    /// Raw table name, for model documents.
    #[serde(default, alias = "table_name", skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Raw enum name, for enum documents.
    #[serde(default, alias = "enum_name", skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
}

impl GeneratedFile for TypespecDocument {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(&self.name)
    }

    fn render(&self) -> String {
        self.content.clone()
    }
}

/// Everything produced for one schema text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub models: Vec<TypespecDocument>,
    pub enums: Vec<TypespecDocument>,
    pub tables: Vec<TableDefinition>,
    pub diagnostics: Diagnostics,
}

impl GenerationResult {
    /// All documents, models first.
    pub fn documents(&self) -> impl Iterator<Item = &TypespecDocument> {
        self.models.iter().chain(self.enums.iter())
    }
}
