use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tspec_extract::Orchestrator;

use crate::config::Config;
use crate::ops;
use crate::reports::{Report, TerminalOutput};

#[derive(Args)]
pub struct CheckCommand {
    /// Schema files to validate
    #[arg(required = true)]
    pub schemas: Vec<PathBuf>,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self, config: Config) -> Result<()> {
        let orchestrator = Orchestrator::new(config.fallback);
        let report = ops::check(&self.schemas, &orchestrator)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
