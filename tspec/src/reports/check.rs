//! Check command report data structures.

use std::path::PathBuf;

use miette::NamedSource;
use tspec_core::ParsedSchema;
use tspec_syntax::SyntaxError;

use super::output::{Output, Report};

/// Extraction result for one schema file.
#[derive(Debug)]
pub struct CheckedFile {
    pub schema_path: PathBuf,
    pub source: String,
    pub schema: ParsedSchema,
    /// Structural errors with source spans, when the built-in parser ran.
    pub syntax_errors: Vec<SyntaxError>,
}

impl CheckedFile {
    pub fn is_valid(&self) -> bool {
        !self.schema.diagnostics.has_errors()
    }

    fn render_errors(&self, out: &mut dyn Output) {
        if self.syntax_errors.is_empty() {
            for error in &self.schema.diagnostics.errors {
                out.error(&format!("{}: {}", self.schema_path.display(), error));
            }
            return;
        }

        let name = self.schema_path.display().to_string();
        for error in &self.syntax_errors {
            let report = miette::Report::new(error.clone())
                .with_source_code(NamedSource::new(&name, self.source.clone()));
            out.diagnostic(&format!("{:?}", report));
        }
    }
}

/// Report data from schema validation.
#[derive(Debug)]
pub struct CheckReport {
    pub files: Vec<CheckedFile>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.files.iter().all(CheckedFile::is_valid)
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for file in &self.files {
            let path = file.schema_path.display();
            for warning in &file.schema.diagnostics.warnings {
                out.warning(&format!("{}: {}", path, warning));
            }
            file.render_errors(out);

            let schema = &file.schema;
            let status = if file.is_valid() { "✓" } else { "✗" };
            out.section(&format!(
                "{} {} ({} table{}, {} enum{})",
                status,
                path,
                schema.tables.len(),
                if schema.tables.len() == 1 { "" } else { "s" },
                schema.enums.len(),
                if schema.enums.len() == 1 { "" } else { "s" }
            ));
            for table in &schema.tables {
                out.list_item(&format!(
                    "model {} ← {} ({} column{})",
                    table.class_name,
                    table.name,
                    table.columns.len(),
                    if table.columns.len() == 1 { "" } else { "s" }
                ));
            }
            for definition in &schema.enums {
                out.list_item(&format!(
                    "enum {} ← {} ({})",
                    definition.class_name,
                    definition.name,
                    definition.values.join(", ")
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tspec_core::{ColumnDefinition, EnumDefinition, TableDefinition};

    use super::*;
    use crate::reports::RecordingOutput;

    #[test]
    fn test_valid_summary() {
        let mut schema = ParsedSchema::default();
        schema.tables.push(TableDefinition {
            name: "users".into(),
            class_name: "Users".into(),
            columns: vec![ColumnDefinition::new("name", "string")],
        });
        schema.enums.push(EnumDefinition {
            name: "mood".into(),
            class_name: "Mood".into(),
            values: vec!["happy".into(), "sad".into()],
        });
        let report = CheckReport {
            files: vec![CheckedFile {
                schema_path: "schema.rb".into(),
                source: String::new(),
                schema,
                syntax_errors: vec![],
            }],
        };
        assert!(report.is_valid());

        let mut out = RecordingOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.stdout,
            [
                "✓ schema.rb (1 table, 1 enum):",
                "  - model Users ← users (1 column)",
                "  - enum Mood ← mood (happy, sad)",
            ]
        );
    }

    #[test]
    fn test_syntax_errors_render_with_source() {
        let source = "create_table \"a\" do |t|\n  t.integer \"x\", 1 + 2\nend\n";
        let output = tspec_syntax::parse(source);
        let mut schema = ParsedSchema::default();
        for message in output.error_messages() {
            schema.diagnostics.error(message);
        }
        let report = CheckReport {
            files: vec![CheckedFile {
                schema_path: "schema.rb".into(),
                source: source.to_string(),
                schema,
                syntax_errors: output.errors,
            }],
        };
        assert!(!report.is_valid());

        let mut out = RecordingOutput::default();
        report.render(&mut out);
        assert!(!out.stderr.is_empty());
        assert!(out.stderr.iter().any(|e| e.contains("unsupported operator '+'")));
        assert!(out.stdout[0].starts_with("✗ schema.rb"));
    }
}
