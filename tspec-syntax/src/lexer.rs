use logos::Logos;
use miette::SourceSpan;

use crate::error::SyntaxError;
use crate::token::Token;

/// A token paired with its source span.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
    pub text: String,
    /// Whether whitespace separates this token from the previous one.
    pub space_before: bool,
}

impl SpannedToken {
    pub fn span(&self) -> SourceSpan {
        (self.start, self.end - self.start).into()
    }
}

/// Tokenizes schema source text into a sequence of spanned tokens.
///
/// Unlike a strict lexer, invalid bytes do not abort tokenization: each one
/// is reported as `SyntaxError::InvalidToken` and skipped so that the parser
/// can still build a partial tree.
pub fn tokenize(source: &str) -> (Vec<SpannedToken>, Vec<SyntaxError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut last_end = 0;

    let lexer = Token::lexer(source);
    for (result, range) in lexer.spanned() {
        let space_before = range.start > last_end;
        last_end = range.end;
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                start: range.start,
                end: range.end,
                text: source[range].to_string(),
                space_before,
            }),
            Err(()) => errors.push(SyntaxError::InvalidToken {
                text: source[range.clone()].to_string(),
                span: (range.start, range.end - range.start).into(),
            }),
        }
    }

    (tokens, errors)
}
