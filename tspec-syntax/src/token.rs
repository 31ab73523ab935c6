use logos::Logos;

/// Tokens produced by the schema DSL lexer.
///
/// Newlines are significant (they end statements). Other whitespace, line
/// continuations and `#` comments are skipped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"\\\r?\n")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("\n")]
    Newline,

    #[token(";")]
    Semicolon,

    // -- Keywords --
    #[token("do")]
    Do,

    #[token("end")]
    End,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("nil")]
    Nil,

    // -- Punctuation --
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("::")]
    ColonColon,

    #[token("=>")]
    FatArrow,

    #[token("->")]
    Arrow,

    #[token("|")]
    Pipe,

    #[token("=")]
    Assign,

    #[token("-")]
    Minus,

    /// Operators the parser does not interpret.
    #[regex(r"[+*/<>!&?%^~]+|==|!=|\|\||&&")]
    Operator,

    // -- Names --
    #[regex(r"[a-z_][A-Za-z0-9_]*[?!]?")]
    Identifier,

    #[regex(r"[A-Z][A-Za-z0-9_]*")]
    Constant,

    /// A name followed by `::` (e.g. `ActiveRecord::`).
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*::")]
    ScopedName,

    /// A hash key in label form (e.g. `null:`).
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*[?!]?:")]
    Label,

    // -- Literals --
    #[regex(r":[A-Za-z_][A-Za-z0-9_]*[?!]?")]
    Symbol,

    #[regex(r#":"([^"\\]|\\.)*""#)]
    QuotedSymbol,

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    #[regex(r"'([^'\\]|\\.)*'")]
    SingleQuoted,

    #[regex(r"[0-9][0-9_]*")]
    Integer,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*")]
    Float,

    /// `%w[...]` / `%i[...]` word and symbol arrays.
    #[regex(r"%[wWiI]\[[^\]]*\]")]
    #[regex(r"%[wWiI]\([^)]*\)")]
    WordArray,
}

impl Token {
    /// Human-readable description used in error messages.
    pub fn description(&self) -> &'static str {
        match self {
            Token::Newline => "newline",
            Token::Semicolon => "';'",
            Token::Do => "'do'",
            Token::End => "'end'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::Nil => "'nil'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Comma => "','",
            Token::Dot => "'.'",
            Token::ColonColon => "'::'",
            Token::FatArrow => "'=>'",
            Token::Arrow => "'->'",
            Token::Pipe => "'|'",
            Token::Assign => "'='",
            Token::Minus => "'-'",
            Token::Operator => "operator",
            Token::Identifier => "identifier",
            Token::Constant => "constant",
            Token::ScopedName => "scoped constant",
            Token::Label => "label",
            Token::Symbol | Token::QuotedSymbol => "symbol",
            Token::DoubleQuoted | Token::SingleQuoted => "string",
            Token::Integer => "integer",
            Token::Float => "float",
            Token::WordArray => "word array",
        }
    }

    /// Whether this token ends a statement.
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::Newline | Token::Semicolon)
    }
}
