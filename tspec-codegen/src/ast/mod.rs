//! TypeSpec AST builders for models and enums.
//!
//! These provide a high-level API for constructing TypeSpec declarations,
//! which can then be rendered via CodeBuilder.

mod enums;
mod model;

pub use enums::{Enum, EnumMember};
pub use model::{Model, ModelProperty};
