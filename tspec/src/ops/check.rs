//! Check operation - extraction without generation.

use std::path::PathBuf;

use eyre::Result;
use tspec_extract::Orchestrator;

use super::read_schema;
use crate::reports::{CheckReport, CheckedFile};

/// Execute the check operation.
///
/// When the built-in parser is in use its structural errors are kept with
/// their spans so they can be shown against the source.
pub fn check(schemas: &[PathBuf], orchestrator: &Orchestrator) -> Result<CheckReport> {
    let native = orchestrator.backend_name() == "native";
    let mut files = Vec::with_capacity(schemas.len());

    for schema_path in schemas {
        let source = read_schema(schema_path)?;
        let schema = orchestrator.parse(&source);
        let syntax_errors = if native && schema.diagnostics.has_errors() {
            tspec_syntax::parse(&source).errors
        } else {
            Vec::new()
        };

        files.push(CheckedFile {
            schema_path: schema_path.clone(),
            source,
            schema,
            syntax_errors,
        });
    }

    Ok(CheckReport { files })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tspec_extract::{Availability, FallbackConfig};

    use super::*;

    #[test]
    fn test_check_collects_syntax_errors() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.rb");
        let bad = temp.path().join("bad.rb");
        fs::write(&good, "create_table \"a\" do |t|\n  t.text \"b\"\nend\n").unwrap();
        fs::write(&bad, "create_table \"a\" do |t|\n").unwrap();

        let orchestrator =
            Orchestrator::for_availability(&Availability::Native, FallbackConfig::default());
        let report = check(&[good, bad], &orchestrator).unwrap();

        assert!(report.files[0].is_valid());
        assert!(report.files[0].syntax_errors.is_empty());
        assert!(!report.files[1].is_valid());
        assert!(!report.files[1].syntax_errors.is_empty());
        assert!(!report.is_valid());
    }
}
