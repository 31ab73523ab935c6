mod check;
mod completions;
mod generate;
mod parse;

use std::path::PathBuf;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use parse::ParseCommand;

use crate::config::{self, Config};

/// Extension trait for exiting on config errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "tspec")]
#[command(version)]
#[command(about = "Convert Rails schema.rb files into TypeSpec models and enums")]
pub(crate) struct Cli {
    /// Path to tspec.toml (defaults to ./tspec.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logs (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(self.load_config()),
            Commands::Parse(cmd) => cmd.run(self.load_config()),
            Commands::Check(cmd) => cmd.run(self.load_config()),
            Commands::Completions(cmd) => cmd.run(),
        }
    }

    fn load_config(&self) -> Config {
        Config::load(self.config.as_deref()).unwrap_or_exit()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TypeSpec documents from schema files
    Generate(GenerateCommand),

    /// Print the extracted schema as JSON
    Parse(ParseCommand),

    /// Validate schema files without generating documents
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
