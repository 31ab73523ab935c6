//! Schema extraction for tspec.
//!
//! Turns Rails `schema.rb` text into a [`ParsedSchema`]. The tree-walking
//! part ([`node`], [`literal`], [`matcher`], [`builder`]) works on any JSON
//! syntax tree, whichever provider produced it; [`backend`] decides whether
//! that tree comes from the in-process parser or whether an external parser
//! produces the schema directly.
//!
//! ```no_run
//! use tspec_extract::{FallbackConfig, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(FallbackConfig::default());
//! let schema = orchestrator.parse(r#"create_enum "mood", ["happy", "sad"]"#);
//! assert_eq!(schema.enums[0].class_name, "Mood");
//! ```

pub mod backend;
pub mod builder;
mod error;
pub mod literal;
pub mod matcher;
pub mod node;

pub use backend::{
    Availability, DISABLE_NATIVE_ENV, FallbackBackend, FallbackConfig, Orchestrator,
    SchemaBackend, availability,
};
#[cfg(feature = "native")]
pub use backend::NativeBackend;
pub use builder::extract_schema;
pub use error::FallbackError;
pub use node::Materialize;
pub use tspec_core::ParsedSchema;
