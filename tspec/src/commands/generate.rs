use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tspec_codegen::Generator;
use tspec_extract::Orchestrator;

use crate::config::Config;
use crate::ops::{self, generate::Target};
use crate::reports::{Report, TerminalOutput};

#[derive(Args)]
pub struct GenerateCommand {
    /// Schema files to convert
    #[arg(required = true)]
    pub schemas: Vec<PathBuf>,

    /// Output directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Namespace for every document (overrides tspec.toml)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Print generated documents without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self, config: Config) -> Result<()> {
        let config = config.with_namespace(self.namespace.clone());
        let orchestrator = Orchestrator::new(config.fallback);
        let generator = Generator::with_namespace(config.namespace);

        let target = if self.dry_run {
            Target::DryRun
        } else {
            Target::Directory(&self.output)
        };
        let report = ops::generate(&self.schemas, &orchestrator, &generator, target)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_success() {
            std::process::exit(1);
        }
        Ok(())
    }
}
