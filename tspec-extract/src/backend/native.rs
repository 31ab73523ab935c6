use tspec_core::ParsedSchema;

use super::SchemaBackend;
use crate::builder::extract_schema;

/// Parses in-process with `tspec-syntax` and extracts from its tree.
///
/// Syntax errors do not stop extraction: whatever the parser recovered is
/// still walked, and the errors are reported next to the partial result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl SchemaBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn parse(&self, source: &str) -> ParsedSchema {
        let output = tspec_syntax::parse(source);
        let mut schema = extract_schema(&output.root, source);

        for message in output.error_messages() {
            schema.diagnostics.error(message);
        }
        for message in output.warning_messages() {
            schema.diagnostics.warn(message);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_result_with_errors() {
        let source = "create_enum \"mood\", [\"ok\"]\n1 + 2\ncreate_table \"t\" do |t|\n  t.string \"a\"\nend\n";
        let schema = NativeBackend.parse(source);

        assert_eq!(schema.enums.len(), 1);
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(
            schema.diagnostics.errors,
            ["line 2, column 3: unsupported operator '+'"]
        );
    }

    #[test]
    fn test_parser_warnings_surface() {
        let source = "create_table \"t\" do |t|\n  t.string \"a\", null: true, null: false\nend\n";
        let schema = NativeBackend.parse(source);

        assert!(schema.diagnostics.errors.is_empty());
        assert_eq!(schema.diagnostics.warnings.len(), 1);
        assert!(schema.diagnostics.warnings[0].contains("'null'"));
        // The later value wins
        assert!(schema.tables[0].columns[0].is_required());
    }
}
