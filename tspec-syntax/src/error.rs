use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Structural errors reported while parsing schema source.
///
/// Parsing never stops at the first error; the parser records it, skips to
/// the next statement and keeps building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[non_exhaustive]
pub enum SyntaxError {
    #[error("invalid token '{text}'")]
    #[diagnostic(code(tspec::invalid_token))]
    InvalidToken {
        text: String,
        #[label("not recognized")]
        span: SourceSpan,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(tspec::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("unexpected {found}")]
        span: SourceSpan,
    },

    #[error("unexpected end of input, expected {expected}")]
    #[diagnostic(code(tspec::unexpected_eof))]
    UnexpectedEndOfInput {
        expected: String,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("unsupported operator '{operator}'")]
    #[diagnostic(
        code(tspec::unsupported_operator),
        help("only literals, constants, method calls and blocks are understood")
    )]
    UnsupportedOperator {
        operator: String,
        #[label("not supported here")]
        span: SourceSpan,
    },

    #[error("expression nests deeper than {limit} levels")]
    #[diagnostic(code(tspec::nesting_too_deep))]
    NestingTooDeep {
        limit: usize,
        #[label("nesting limit reached here")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    /// The source span this error points at.
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxError::InvalidToken { span, .. }
            | SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnexpectedEndOfInput { span, .. }
            | SyntaxError::UnsupportedOperator { span, .. }
            | SyntaxError::NestingTooDeep { span, .. } => *span,
        }
    }
}

/// Non-fatal findings reported while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[non_exhaustive]
pub enum SyntaxWarning {
    #[error("key '{key}' is duplicated and overwritten")]
    #[diagnostic(code(tspec::duplicate_key), severity(Warning))]
    DuplicateKey {
        key: String,
        #[label("overwrites the earlier value")]
        span: SourceSpan,
    },
}

impl SyntaxWarning {
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxWarning::DuplicateKey { span, .. } => *span,
        }
    }
}
