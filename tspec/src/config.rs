//! `tspec.toml` loading.

use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;
use tspec_extract::FallbackConfig;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tspec.toml";

/// Result type for config loading (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(tspec::config_io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {filename}")]
    #[diagnostic(
        code(tspec::config_parse),
        help("recognized keys are `namespace` and the `[fallback]` table")
    )]
    Parse {
        filename: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings shared by all commands.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Wrap every document in `namespace <ns>;`.
    pub namespace: Option<String>,
    /// How to run the external parser when the built-in one is unavailable.
    pub fallback: FallbackConfig,
}

impl Config {
    /// Load the explicit config file, or `tspec.toml` when it exists.
    ///
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        let config = Self::from_str_with_filename(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| {
            Box::new(Error::Parse {
                filename: filename.to_string(),
                src: NamedSource::new(filename, content.to_string()),
                span: source.span().map(SourceSpan::from),
                source,
            })
        })
    }

    /// The command-line namespace wins over the file.
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        if namespace.is_some() {
            self.namespace = namespace;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = Config::from_str_with_filename("", "tspec.toml").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fallback.command, "ruby");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_str_with_filename(
            r#"
            namespace = "MyApp.Models"

            [fallback]
            command = "bundle"
            args = ["exec", "ruby", "extract.rb"]
            timeout_secs = 30
            "#,
            "tspec.toml",
        )
        .unwrap();
        assert_eq!(config.namespace.as_deref(), Some("MyApp.Models"));
        assert_eq!(config.fallback.command, "bundle");
        assert_eq!(config.fallback.args, ["exec", "ruby", "extract.rb"]);
        assert_eq!(config.fallback.timeout_secs, Some(30));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_str_with_filename("namespac = \"X\"", "custom.toml").unwrap_err();
        assert!(matches!(*err, Error::Parse { ref filename, .. } if filename == "custom.toml"));
        assert_eq!(err.to_string(), "failed to parse custom.toml");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here/tspec.toml"))).unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }

    #[test]
    fn test_namespace_override() {
        let config = Config {
            namespace: Some("File".into()),
            ..Config::default()
        };
        assert_eq!(
            config.clone().with_namespace(Some("Flag".into())).namespace.as_deref(),
            Some("Flag")
        );
        assert_eq!(config.with_namespace(None).namespace.as_deref(), Some("File"));
    }
}
