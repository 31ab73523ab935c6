use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use tspec_extract::Orchestrator;

use crate::config::Config;
use crate::ops;

#[derive(Args)]
pub struct ParseCommand {
    /// Schema file to parse
    pub schema: PathBuf,
}

impl ParseCommand {
    /// Print the extracted schema, diagnostics included, as pretty JSON.
    ///
    /// Exits with status 1 when the schema had errors.
    pub fn run(&self, config: Config) -> Result<()> {
        let source = ops::read_schema(&self.schema)?;
        let schema = Orchestrator::new(config.fallback).parse(&source);

        let json = serde_json::to_string_pretty(&schema).wrap_err("failed to serialize schema")?;
        println!("{}", json);

        if schema.diagnostics.has_errors() {
            std::process::exit(1);
        }
        Ok(())
    }
}
