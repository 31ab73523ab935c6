//! Generate operation - schema files to TypeSpec documents.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tspec_codegen::Generator;
use tspec_core::GeneratedFile;
use tspec_extract::Orchestrator;

use super::read_schema;
use crate::reports::{FileOutcome, GenerateReport};

/// Where rendered documents go.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Directory(&'a Path),
    DryRun,
}

/// Execute the generate operation.
///
/// Each schema is converted independently. A schema with errors produces no
/// files; the others are still written.
pub fn generate(
    schemas: &[PathBuf],
    orchestrator: &Orchestrator,
    generator: &Generator,
    target: Target<'_>,
) -> Result<GenerateReport> {
    let mut files = Vec::with_capacity(schemas.len());

    for schema_path in schemas {
        let source = read_schema(schema_path)?;
        let result = generator.generate(orchestrator.parse(&source));

        let documents: Vec<_> = if result.diagnostics.has_errors() {
            Vec::new()
        } else {
            result.documents().cloned().collect()
        };

        let mut written = Vec::new();
        if let Target::Directory(dir) = target {
            for document in &documents {
                let path = document
                    .write(dir)
                    .wrap_err_with(|| format!("failed to write '{}'", document.name))?;
                tracing::debug!(path = %path.display(), "wrote document");
                written.push(path);
            }
        }

        files.push(FileOutcome {
            schema_path: schema_path.clone(),
            diagnostics: result.diagnostics,
            documents,
            written,
        });
    }

    Ok(GenerateReport {
        files,
        dry_run: matches!(target, Target::DryRun),
    })
}
