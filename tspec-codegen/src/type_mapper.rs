//! TypeSpec type mapper implementation.

use tspec_core::ColumnDefinition;

/// Maps DSL column types to target-language type names.
pub trait TypeMapper {
    /// The target language name
    fn language(&self) -> &'static str;

    /// Map a plain DSL type tag, `None` when the tag is not in the table.
    fn map_tag(&self, tag: &str) -> Option<&'static str>;

    /// Type used for anything that cannot be mapped.
    fn unknown_type(&self) -> &'static str;

    /// Type used for foreign-key style columns.
    fn reference_type(&self) -> &'static str;

    /// Type used for `enum` columns whose enum name could not be resolved.
    fn unresolved_enum_type(&self) -> &'static str;

    /// Map a whole column. Never fails: unrecognized tags map to
    /// [`unknown_type`](Self::unknown_type).
    fn map_column(&self, column: &ColumnDefinition) -> String {
        match column.ty.to_lowercase().as_str() {
            "enum" => column
                .enum_name
                .clone()
                .unwrap_or_else(|| self.unresolved_enum_type().to_string()),
            "references" | "belongs_to" | "foreign_key" => {
                if column.is_polymorphic() {
                    self.unknown_type().to_string()
                } else {
                    self.reference_type().to_string()
                }
            }
            tag => self.map_tag(tag).unwrap_or(self.unknown_type()).to_string(),
        }
    }
}

/// TypeSpec type mapper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSpecTypeMapper;

impl TypeMapper for TypeSpecTypeMapper {
    fn language(&self) -> &'static str {
        "typespec"
    }

    fn map_tag(&self, tag: &str) -> Option<&'static str> {
        let ty = match tag {
            "string" | "text" => "string",
            "integer" | "int" => "int32",
            "bigint" => "int64",
            "float" => "float64",
            "decimal" | "numeric" => "decimal",
            "boolean" => "boolean",
            "datetime" | "timestamp" | "timestamptz" => "utcDateTime",
            "date" => "plainDate",
            "time" => "plainTime",
            "binary" => "bytes",
            "json" | "jsonb" => "Record<unknown>",
            _ => return None,
        };
        Some(ty)
    }

    fn unknown_type(&self) -> &'static str {
        "unknown"
    }

    fn reference_type(&self) -> &'static str {
        "int64"
    }

    fn unresolved_enum_type(&self) -> &'static str {
        "string"
    }
}
