//! Generate command report data structures.

use std::path::PathBuf;

use tspec_core::{Diagnostics, TypespecDocument};

use super::output::{Output, Report};

/// What happened to one schema file.
#[derive(Debug)]
pub struct FileOutcome {
    pub schema_path: PathBuf,
    pub diagnostics: Diagnostics,
    /// Rendered documents; empty when the schema had errors.
    pub documents: Vec<TypespecDocument>,
    /// Files written to disk; empty on dry runs.
    pub written: Vec<PathBuf>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Report data from a generate run.
#[derive(Debug)]
pub struct GenerateReport {
    pub files: Vec<FileOutcome>,
    pub dry_run: bool,
}

impl GenerateReport {
    /// Whether every schema converted without errors.
    pub fn is_success(&self) -> bool {
        self.files.iter().all(FileOutcome::is_success)
    }

    pub fn document_count(&self) -> usize {
        self.files.iter().map(|f| f.documents.len()).sum()
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for file in &self.files {
            let path = file.schema_path.display();
            for (severity, message) in file.diagnostics.iter() {
                let line = format!("{}: {}", path, message);
                if severity.is_error() {
                    out.error(&line);
                } else {
                    out.warning(&line);
                }
            }

            if self.dry_run {
                for document in &file.documents {
                    out.divider(&document.name);
                    out.preformatted(document.content.trim_end());
                    out.newline();
                }
            } else if !file.written.is_empty() {
                out.section(&path.to_string());
                for written in &file.written {
                    out.added_item(&written.display().to_string());
                }
            }
        }

        let failed = self.files.iter().filter(|f| !f.is_success()).count();
        if failed > 0 {
            out.error(&format!(
                "{} of {} schema{} had errors, nothing written for {}",
                failed,
                self.files.len(),
                if self.files.len() == 1 { "" } else { "s" },
                if failed == 1 { "it" } else { "them" }
            ));
        } else if !self.dry_run {
            let count = self.document_count();
            out.preformatted(&format!(
                "✓ generated {} document{}",
                count,
                if count == 1 { "" } else { "s" }
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::RecordingOutput;

    fn document(name: &str, content: &str) -> TypespecDocument {
        TypespecDocument {
            name: name.into(),
            content: content.into(),
            table_name: None,
            enum_name: None,
        }
    }

    #[test]
    fn test_dry_run_prints_documents() {
        let report = GenerateReport {
            files: vec![FileOutcome {
                schema_path: "db/schema.rb".into(),
                diagnostics: Diagnostics::default(),
                documents: vec![document("Users.tsp", "model Users {}\n")],
                written: vec![],
            }],
            dry_run: true,
        };
        let mut out = RecordingOutput::default();
        report.render(&mut out);
        assert_eq!(out.stdout, ["── Users.tsp ──", "model Users {}", ""]);
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn test_errors_are_reported() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.error("line 1, column 1: boom");
        diagnostics.warn("heads up");
        let report = GenerateReport {
            files: vec![FileOutcome {
                schema_path: "schema.rb".into(),
                diagnostics,
                documents: vec![],
                written: vec![],
            }],
            dry_run: false,
        };
        assert!(!report.is_success());

        let mut out = RecordingOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.stderr,
            [
                "error: schema.rb: line 1, column 1: boom",
                "warning: schema.rb: heads up",
                "error: 1 of 1 schema had errors, nothing written for it",
            ]
        );
        assert!(out.stdout.is_empty());
    }

    #[test]
    fn test_written_summary() {
        let report = GenerateReport {
            files: vec![FileOutcome {
                schema_path: "schema.rb".into(),
                diagnostics: Diagnostics::default(),
                documents: vec![document("A.tsp", ""), document("B.tsp", "")],
                written: vec!["out/A.tsp".into(), "out/B.tsp".into()],
            }],
            dry_run: false,
        };
        let mut out = RecordingOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.stdout,
            ["schema.rb:", "  + out/A.tsp", "  + out/B.tsp", "✓ generated 2 documents"]
        );
    }
}
