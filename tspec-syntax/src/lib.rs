//! Parser for the Ruby subset used by Rails `schema.rb` files.
//!
//! [`parse`] turns source text into a JSON node tree shaped after Prism's
//! node types. Every node carries a `type` tag and a `location` with byte
//! offsets; absent children are omitted rather than written as `null`.
//!
//! ```
//! let output = tspec_syntax::parse(r#"create_enum "mood", ["happy", "sad"]"#);
//! assert!(output.errors.is_empty());
//! let call = &output.root["statements"]["body"][0];
//! assert_eq!(call["type"], "CallNode");
//! assert_eq!(call["name"], "create_enum");
//! ```

mod error;
mod lexer;
mod parser;
mod token;

pub use error::{SyntaxError, SyntaxWarning};
pub use lexer::{SpannedToken, tokenize};
pub use parser::MAX_NESTING_DEPTH;
pub use token::Token;

use miette::SourceSpan;
use serde_json::Value;

/// Result of parsing one source text.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The `ProgramNode` root. Present even when errors were reported.
    pub root: Value,
    pub errors: Vec<SyntaxError>,
    pub warnings: Vec<SyntaxWarning>,
    line_starts: Vec<usize>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        (line.max(1), offset - line_start + 1)
    }

    /// Error messages prefixed with their position.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| self.positioned(e.span(), &e.to_string()))
            .collect()
    }

    /// Warning messages prefixed with their position.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(|w| self.positioned(w.span(), &w.to_string()))
            .collect()
    }

    fn positioned(&self, span: SourceSpan, message: &str) -> String {
        let (line, column) = self.line_col(span.offset());
        format!("line {line}, column {column}: {message}")
    }
}

/// Parse schema source text into a node tree.
///
/// Never fails: lexical and structural problems are collected in
/// [`ParseOutput::errors`] and the tree holds whatever could be parsed.
/// A statement nesting deeper than [`MAX_NESTING_DEPTH`] is dropped with an
/// error instead of exhausting the stack.
pub fn parse(source: &str) -> ParseOutput {
    let (tokens, mut errors) = tokenize(source);
    let token_count = tokens.len();

    let (root, parse_errors, warnings) = parser::Parser::new(source, tokens).parse_program();
    errors.extend(parse_errors);
    errors.sort_by_key(|e| e.span().offset());

    tracing::debug!(
        tokens = token_count,
        errors = errors.len(),
        warnings = warnings.len(),
        "parsed schema source"
    );

    let line_starts = std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    ParseOutput {
        root,
        errors,
        warnings,
        line_starts,
    }
}
