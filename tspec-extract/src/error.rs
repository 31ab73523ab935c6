use std::io;

use thiserror::Error;

/// Failures of the external fallback parser.
///
/// These never escape the backend: each one becomes an entry in
/// `Diagnostics::errors` of the schema being parsed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FallbackError {
    #[error("failed to launch fallback parser `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to communicate with fallback parser: {0}")]
    Io(#[from] io::Error),

    #[error("fallback parser timed out after {0}s and was killed")]
    Timeout(u64),

    #[error("fallback parser output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fallback parser exited with non-zero status {status}{}", stderr_suffix(.stderr))]
    NonZeroExit { status: String, stderr: String },
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_message() {
        let err = FallbackError::NonZeroExit {
            status: "3".into(),
            stderr: "\n".into(),
        };
        assert_eq!(err.to_string(), "fallback parser exited with non-zero status 3");

        let err = FallbackError::NonZeroExit {
            status: "1".into(),
            stderr: "syntax error\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "fallback parser exited with non-zero status 1: syntax error"
        );
    }
}
