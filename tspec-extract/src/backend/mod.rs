//! Backend selection.
//!
//! The in-process parser is preferred. Whether it can be used is probed once
//! per process and the answer never changes afterwards; when it is not
//! available every schema goes through the external fallback parser.

mod fallback;
#[cfg(feature = "native")]
mod native;

use std::sync::OnceLock;

use tspec_core::ParsedSchema;

pub use fallback::{FallbackBackend, FallbackConfig};
#[cfg(feature = "native")]
pub use native::NativeBackend;

/// Environment variable that forces the fallback parser when set to a
/// non-empty value.
pub const DISABLE_NATIVE_ENV: &str = "TSPEC_DISABLE_NATIVE";

/// A strategy turning schema text into a [`ParsedSchema`].
///
/// Implementations never fail: problems are reported through the
/// diagnostics of the returned schema.
pub trait SchemaBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn parse(&self, source: &str) -> ParsedSchema;
}

/// Outcome of probing for the in-process parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Native,
    Unavailable { reason: String },
}

static AVAILABILITY: OnceLock<Availability> = OnceLock::new();

/// The cached probe result for this process.
pub fn availability() -> &'static Availability {
    AVAILABILITY.get_or_init(|| {
        let availability = probe(std::env::var_os(DISABLE_NATIVE_ENV).is_some_and(|v| !v.is_empty()));
        tracing::debug!(?availability, "probed native parser");
        availability
    })
}

fn probe(disabled_by_env: bool) -> Availability {
    if !cfg!(feature = "native") {
        return Availability::Unavailable {
            reason: "tspec was built without the `native` feature".to_string(),
        };
    }
    if disabled_by_env {
        return Availability::Unavailable {
            reason: format!("{DISABLE_NATIVE_ENV} is set"),
        };
    }
    Availability::Native
}

/// Parses schemas with the backend chosen by the capability probe.
pub struct Orchestrator {
    backend: Box<dyn SchemaBackend>,
}

impl Orchestrator {
    /// Select the backend from the cached process-wide probe.
    pub fn new(config: FallbackConfig) -> Self {
        Self::for_availability(availability(), config)
    }

    /// Select the backend for an explicit probe result.
    pub fn for_availability(availability: &Availability, config: FallbackConfig) -> Self {
        let backend: Box<dyn SchemaBackend> = match availability {
            #[cfg(feature = "native")]
            Availability::Native => Box::new(NativeBackend),
            #[cfg(not(feature = "native"))]
            Availability::Native => Box::new(FallbackBackend::new(
                config,
                "tspec was built without the `native` feature",
            )),
            Availability::Unavailable { reason } => {
                tracing::warn!(%reason, "native parser unavailable, using fallback parser");
                Box::new(FallbackBackend::new(config, reason.clone()))
            }
        };
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Box<dyn SchemaBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn parse(&self, source: &str) -> ParsedSchema {
        tracing::debug!(backend = self.backend.name(), bytes = source.len(), "parsing schema");
        let schema = self.backend.parse(source);
        tracing::debug!(
            tables = schema.tables.len(),
            enums = schema.enums.len(),
            errors = schema.diagnostics.errors.len(),
            warnings = schema.diagnostics.warnings.len(),
            "parsed schema"
        );
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_respects_env_switch() {
        assert!(matches!(probe(true), Availability::Unavailable { reason } if reason.contains(DISABLE_NATIVE_ENV)));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_probe_native_available() {
        assert_eq!(probe(false), Availability::Native);
        let orchestrator = Orchestrator::for_availability(&Availability::Native, FallbackConfig::default());
        assert_eq!(orchestrator.backend_name(), "native");
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn test_probe_without_native_feature() {
        assert!(matches!(probe(false), Availability::Unavailable { .. }));
    }

    #[test]
    fn test_unavailable_selects_fallback() {
        let orchestrator = Orchestrator::for_availability(
            &Availability::Unavailable { reason: "testing".into() },
            FallbackConfig::default(),
        );
        assert_eq!(orchestrator.backend_name(), "fallback");
    }

    #[test]
    fn test_availability_is_cached() {
        assert!(std::ptr::eq(availability(), availability()));
    }

    struct Fixed;

    impl SchemaBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn parse(&self, _source: &str) -> ParsedSchema {
            ParsedSchema::failed("fixed")
        }
    }

    #[test]
    fn test_custom_backend() {
        let orchestrator = Orchestrator::with_backend(Box::new(Fixed));
        assert_eq!(orchestrator.parse("").diagnostics.errors, ["fixed"]);
    }
}
