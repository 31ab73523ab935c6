//! Code generation building blocks.
//!
//! - [`CodeBuilder`] - Fluent API for building indented code
//! - [`CodeFragment`] - Intermediate representation for code pieces
//! - [`Renderable`] - Trait for types that can be converted to code fragments
//! - [`Indent`] - Indentation configuration

mod code_builder;
mod indent;
mod renderable;

pub use code_builder::{CodeBuilder, string_literal};
pub use indent::Indent;
pub use renderable::{CodeFragment, Renderable};
