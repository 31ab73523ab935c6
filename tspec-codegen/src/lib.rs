//! TypeSpec code generation for the tspec schema converter.
//!
//! Turns a [`ParsedSchema`](tspec_core::ParsedSchema) into one TypeSpec
//! document per table (`model`) and per enum (`enum`).
//!
//! - [`builder`] - Indentation-aware code builder and renderable fragments
//! - [`ast`] - Model and enum declaration builders
//! - [`TypeMapper`] - DSL column type to TypeSpec type mapping
//! - [`Generator`] - The generation pipeline producing a `GenerationResult`

pub mod ast;
pub mod builder;

mod generator;
mod naming;
mod renderer;
mod tsp_file;
mod type_mapper;

pub use builder::{CodeBuilder, CodeFragment, Indent, Renderable};
pub use generator::Generator;
pub use naming::{enum_member_identifier, is_identifier, property_name};
pub use renderer::Renderer;
pub use tsp_file::TspFile;
pub use type_mapper::{TypeMapper, TypeSpecTypeMapper};
