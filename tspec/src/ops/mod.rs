//! Core operations.
//!
//! This module contains the business logic for tspec commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod generate;

use std::path::Path;

use eyre::{Context, Result};

pub use check::check;
pub use generate::generate;

/// Read a schema file as UTF-8 text.
pub fn read_schema(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read schema '{}'", path.display()))
}
