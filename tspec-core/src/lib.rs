//! Core types and utilities for the tspec TypeSpec generator.
//!
//! This crate provides the backend-independent schema model produced by
//! extraction and consumed by code generation, plus a few shared helpers.

mod diagnostics;
mod document;
mod file;
mod schema;
mod utils;

// Diagnostics
pub use diagnostics::{Diagnostics, Severity};
// Rendered output
pub use document::{GenerationResult, TypespecDocument};
// File operations
pub use file::GeneratedFile;
// Extracted schema model
pub use schema::{ColumnDefinition, ColumnOptions, EnumDefinition, ParsedSchema, TableDefinition};
// String utilities
pub use utils::{to_pascal_case, value_to_string};
