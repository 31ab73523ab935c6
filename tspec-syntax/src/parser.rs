use std::collections::HashSet;
use std::str::Chars;

use serde_json::{Map, Value, json};

use crate::error::{SyntaxError, SyntaxWarning};
use crate::lexer::SpannedToken;
use crate::token::Token;

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest expression nesting accepted before the statement is abandoned.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Builds one tree node: a JSON object with a `type` tag and a `location`.
struct NodeBuilder {
    map: Map<String, Value>,
}

impl NodeBuilder {
    fn new(ty: &str, start: usize, end: usize) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(ty));
        map.insert(
            "location".to_string(),
            json!({ "start_offset": start, "end_offset": end }),
        );
        Self { map }
    }

    fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    fn maybe(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    fn build(self) -> Value {
        Value::Object(self.map)
    }
}

/// Recursive descent parser for the Ruby subset used by schema files.
///
/// Produces a node tree shaped after Prism's node types (`CallNode`,
/// `ArgumentsNode`, `BlockNode`, ...). Errors are collected rather than
/// returned so a partial tree is always available.
pub(crate) struct Parser<'s> {
    source: &'s str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    prev_end: usize,
    /// Block parameters and assigned names, innermost scope last.
    locals: Vec<Vec<String>>,
    /// Expressions currently being parsed, outermost included.
    depth: usize,
    errors: Vec<SyntaxError>,
    warnings: Vec<SyntaxWarning>,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(source: &'s str, tokens: Vec<SpannedToken>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            prev_end: 0,
            locals: vec![Vec::new()],
            depth: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // -- Cursor helpers --

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<Token> {
        self.peek().map(|st| st.token)
    }

    fn peek_nth(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.pos + n)
    }

    fn at(&self, token: Token) -> bool {
        self.peek_token() == Some(token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        self.prev_end = tok.end;
        Some(tok)
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken> {
        if self.at(expected) {
            self.bump()
        } else {
            Err(self.unexpected(expected.description()))
        }
    }

    /// Consume the current token, which the caller has already peeked.
    fn bump(&mut self) -> ParseResult<SpannedToken> {
        self.advance().ok_or_else(|| self.unexpected("token"))
    }

    fn skip_newlines(&mut self) {
        while self.at(Token::Newline) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while self.peek_token().is_some_and(|t| t.is_separator()) {
            self.advance();
        }
    }

    /// Build the error for the current token not matching `expected`.
    fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(st) if st.token == Token::Operator => SyntaxError::UnsupportedOperator {
                operator: st.text.clone(),
                span: st.span(),
            },
            Some(st) => SyntaxError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{} ('{}')", st.token.description(), st.text.escape_default()),
                span: st.span(),
            },
            None => SyntaxError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                span: (self.source.len(), 0).into(),
            },
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.locals.iter().rev().any(|scope| scope.iter().any(|n| n == name))
    }

    fn declare_local(&mut self, name: &str) {
        if let Some(scope) = self.locals.last_mut() {
            scope.push(name.to_string());
        }
    }

    // -- Grammar productions --

    /// program = statements EOF
    pub(crate) fn parse_program(mut self) -> (Value, Vec<SyntaxError>, Vec<SyntaxWarning>) {
        let body = self.parse_statements(&[]);
        let end = self.source.len();
        let statements = NodeBuilder::new("StatementsNode", 0, end)
            .field("body", body)
            .build();
        let root = NodeBuilder::new("ProgramNode", 0, end)
            .field("statements", statements)
            .build();
        (root, self.errors, self.warnings)
    }

    /// statements = (statement (NEWLINE | ';'))*
    ///
    /// Stops before any token in `terminators` (e.g. `end` of a block).
    fn parse_statements(&mut self, terminators: &[Token]) -> Vec<Value> {
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            match self.peek_token() {
                None => break,
                Some(t) if terminators.contains(&t) => break,
                Some(_) => {}
            }

            let start_pos = self.pos;
            match self.parse_statement() {
                Ok(node) => {
                    body.push(node);
                    if !self.at_statement_end(terminators) {
                        let err = self.unexpected("end of statement");
                        self.errors.push(err);
                        self.recover(terminators);
                    }
                }
                Err(err) => {
                    self.errors.push(err);
                    self.recover(terminators);
                }
            }

            if self.pos == start_pos {
                self.advance();
            }
        }
        body
    }

    fn at_statement_end(&self, terminators: &[Token]) -> bool {
        match self.peek_token() {
            None => true,
            Some(t) => t.is_separator() || terminators.contains(&t),
        }
    }

    /// Skip to the end of the current statement, stepping over nested
    /// blocks so their bodies do not produce follow-up errors.
    fn recover(&mut self, terminators: &[Token]) {
        let mut depth = 0usize;
        while let Some(token) = self.peek_token() {
            match token {
                Token::Do | Token::LBrace => depth += 1,
                Token::End | Token::RBrace if depth > 0 => depth -= 1,
                t if depth == 0 && (t.is_separator() || terminators.contains(&t)) => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// statement = IDENT '=' expression | expression
    fn parse_statement(&mut self) -> ParseResult<Value> {
        let is_assignment = self.at(Token::Identifier)
            && self.peek_nth(1).is_some_and(|t| t.token == Token::Assign);
        if !is_assignment {
            return self.parse_expression(true);
        }

        let name_tok = self.expect(Token::Identifier)?;
        self.expect(Token::Assign)?;
        self.skip_newlines();
        let value = self.parse_expression(true)?;
        self.declare_local(&name_tok.text);
        Ok(
            NodeBuilder::new("LocalVariableWriteNode", name_tok.start, self.prev_end)
                .field("name", name_tok.text)
                .field("value", value)
                .build(),
        )
    }

    /// expression = primary postfix*
    ///
    /// `allow_do` is false while parsing the arguments of a command call
    /// without parentheses, so that a trailing `do ... end` block binds to
    /// the outer call as it does in Ruby.
    fn parse_expression(&mut self, allow_do: bool) -> ParseResult<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = match self.peek() {
                Some(st) => st.span(),
                None => (self.source.len(), 0).into(),
            };
            return Err(SyntaxError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span,
            });
        }

        self.depth += 1;
        let result = self.parse_nested_expression(allow_do);
        self.depth -= 1;
        result
    }

    fn parse_nested_expression(&mut self, allow_do: bool) -> ParseResult<Value> {
        let start = self.peek().map(|t| t.start).unwrap_or(self.source.len());
        let primary = self.parse_primary(allow_do)?;
        self.parse_postfix(primary, start, allow_do)
    }

    fn parse_primary(&mut self, allow_do: bool) -> ParseResult<Value> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected("expression"));
        };

        match tok.token {
            Token::DoubleQuoted | Token::SingleQuoted => {
                self.advance();
                Ok(self.string_node(&tok))
            }
            Token::Symbol => {
                self.advance();
                Ok(NodeBuilder::new("SymbolNode", tok.start, tok.end)
                    .field("unescaped", &tok.text[1..])
                    .build())
            }
            Token::QuotedSymbol => {
                self.advance();
                let inner = &tok.text[2..tok.text.len() - 1];
                Ok(NodeBuilder::new("SymbolNode", tok.start, tok.end)
                    .field("unescaped", unescape_double(inner))
                    .build())
            }
            Token::Integer | Token::Float => {
                self.advance();
                Ok(number_node(&tok.text, tok.token, tok.start, tok.end, false))
            }
            Token::Minus => self.parse_negative_number(),
            Token::True => {
                self.advance();
                Ok(NodeBuilder::new("TrueNode", tok.start, tok.end).build())
            }
            Token::False => {
                self.advance();
                Ok(NodeBuilder::new("FalseNode", tok.start, tok.end).build())
            }
            Token::Nil => {
                self.advance();
                Ok(NodeBuilder::new("NilNode", tok.start, tok.end).build())
            }
            Token::WordArray => {
                self.advance();
                Ok(word_array_node(&tok))
            }
            Token::LBracket => self.parse_array(),
            Token::LBrace => self.parse_hash(),
            Token::Arrow => self.parse_lambda(),
            Token::LParen => {
                self.advance();
                self.skip_newlines();
                let body = self.parse_expression(true)?;
                self.skip_newlines();
                self.expect(Token::RParen)?;
                Ok(NodeBuilder::new("ParenthesesNode", tok.start, self.prev_end)
                    .field("body", body)
                    .build())
            }
            Token::Constant => {
                self.advance();
                Ok(NodeBuilder::new("ConstantReadNode", tok.start, tok.end)
                    .field("name", tok.text)
                    .build())
            }
            Token::ScopedName => self.parse_constant_path(),
            Token::ColonColon => {
                self.advance();
                let name = self.expect(Token::Constant)?;
                Ok(NodeBuilder::new("ConstantPathNode", tok.start, name.end)
                    .field("name", name.text)
                    .build())
            }
            Token::Identifier => self.parse_identifier(allow_do),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// '-' NUMBER, with no space between the sign and the digits.
    fn parse_negative_number(&mut self) -> ParseResult<Value> {
        let is_number = self.peek_nth(1).is_some_and(|t| {
            matches!(t.token, Token::Integer | Token::Float) && !t.space_before
        });
        if !is_number {
            return Err(self.unexpected("number"));
        }

        let minus = self.bump()?;
        let digits = self.bump()?;
        Ok(number_node(&digits.text, digits.token, minus.start, digits.end, true))
    }

    /// constant_path = SCOPED_NAME* (CONSTANT | IDENT)
    fn parse_constant_path(&mut self) -> ParseResult<Value> {
        let first = self.expect(Token::ScopedName)?;
        let mut node = NodeBuilder::new("ConstantReadNode", first.start, first.end - 2)
            .field("name", first.text.trim_end_matches("::"))
            .build();

        while self.at(Token::ScopedName) {
            let seg = self.bump()?;
            node = NodeBuilder::new("ConstantPathNode", first.start, seg.end - 2)
                .field("parent", node)
                .field("name", seg.text.trim_end_matches("::"))
                .build();
        }

        match self.peek_token() {
            Some(Token::Constant | Token::Identifier) => {
                let last = self.bump()?;
                Ok(NodeBuilder::new("ConstantPathNode", first.start, last.end)
                    .field("parent", node)
                    .field("name", last.text)
                    .build())
            }
            _ => Err(self.unexpected("constant")),
        }
    }

    /// A bare identifier: a local variable read or a receiverless call.
    fn parse_identifier(&mut self, allow_do: bool) -> ParseResult<Value> {
        let tok = self.expect(Token::Identifier)?;

        let has_paren_args = self
            .peek()
            .is_some_and(|t| t.token == Token::LParen && !t.space_before);
        if self.is_local(&tok.text) && !has_paren_args {
            return Ok(NodeBuilder::new("LocalVariableReadNode", tok.start, tok.end)
                .field("name", tok.text)
                .build());
        }

        self.parse_call_rest(None, tok.text, tok.start, allow_do)
    }

    /// Arguments and block of a call whose name has just been consumed.
    fn parse_call_rest(
        &mut self,
        receiver: Option<Value>,
        name: String,
        start: usize,
        allow_do: bool,
    ) -> ParseResult<Value> {
        let args_start = self.peek().map(|t| t.start).unwrap_or(self.prev_end);

        let arguments = if self
            .peek()
            .is_some_and(|t| t.token == Token::LParen && !t.space_before)
        {
            self.advance();
            let args = self.parse_arg_list(Token::RParen)?;
            self.expect(Token::RParen)?;
            Some(args)
        } else if self.can_start_command_arg() {
            Some(self.parse_command_args()?)
        } else {
            None
        };
        let arguments = arguments.map(|args| {
            NodeBuilder::new("ArgumentsNode", args_start, self.prev_end)
                .field("arguments", args)
                .build()
        });

        let block = self.parse_block_opt(allow_do)?;

        Ok(NodeBuilder::new("CallNode", start, self.prev_end)
            .maybe("receiver", receiver)
            .field("name", name)
            .maybe("arguments", arguments)
            .maybe("block", block)
            .build())
    }

    /// Whether the current token can begin an argument of a command call
    /// written without parentheses (`create_table "users", force: :cascade`).
    fn can_start_command_arg(&self) -> bool {
        let Some(tok) = self.peek() else {
            return false;
        };
        if !tok.space_before {
            return false;
        }
        match tok.token {
            Token::DoubleQuoted
            | Token::SingleQuoted
            | Token::Symbol
            | Token::QuotedSymbol
            | Token::Integer
            | Token::Float
            | Token::Identifier
            | Token::Constant
            | Token::ScopedName
            | Token::ColonColon
            | Token::Label
            | Token::WordArray
            | Token::True
            | Token::False
            | Token::Nil
            | Token::Arrow
            | Token::LBracket
            | Token::LParen => true,
            Token::Minus => self.peek_nth(1).is_some_and(|t| {
                matches!(t.token, Token::Integer | Token::Float) && !t.space_before
            }),
            _ => false,
        }
    }

    /// command_args = argument (',' NEWLINE* argument)*
    fn parse_command_args(&mut self) -> ParseResult<Vec<Value>> {
        let mut args = ArgCollector::default();
        loop {
            self.parse_argument(&mut args, false)?;
            if self.eat(Token::Comma) {
                self.skip_newlines();
            } else {
                break;
            }
        }
        Ok(args.finish(self.prev_end))
    }

    /// arg_list = (argument (',' argument)* ','?)? up to `close`
    fn parse_arg_list(&mut self, close: Token) -> ParseResult<Vec<Value>> {
        let mut args = ArgCollector::default();
        self.skip_newlines();
        while !self.at(close) {
            self.parse_argument(&mut args, true)?;
            self.skip_newlines();
            if !self.eat(Token::Comma) {
                break;
            }
            self.skip_newlines();
        }
        Ok(args.finish(self.prev_end))
    }

    /// argument = LABEL expression | expression ('=>' expression)?
    fn parse_argument(&mut self, args: &mut ArgCollector, allow_do: bool) -> ParseResult<()> {
        let start = self.peek().map(|t| t.start).unwrap_or(self.prev_end);

        if self.at(Token::Label) {
            let (key, key_text) = self.parse_label_key()?;
            self.skip_newlines();
            let value = self.parse_expression(allow_do)?;
            let pair = self.assoc(key, value, start);
            self.check_duplicate(&mut args.keys, key_text, start);
            args.pair(pair, start);
            return Ok(());
        }

        let expr = self.parse_expression(allow_do)?;
        if self.eat(Token::FatArrow) {
            self.skip_newlines();
            let value = self.parse_expression(allow_do)?;
            if let Some(key_text) = static_key(&expr) {
                self.check_duplicate(&mut args.keys, key_text, start);
            }
            let pair = self.assoc(expr, value, start);
            args.pair(pair, start);
        } else {
            args.positional(expr);
        }
        Ok(())
    }

    fn parse_label_key(&mut self) -> ParseResult<(Value, String)> {
        let label = self.expect(Token::Label)?;
        let text = label.text.trim_end_matches(':').to_string();
        let key = NodeBuilder::new("SymbolNode", label.start, label.end - 1)
            .field("unescaped", text.clone())
            .build();
        Ok((key, text))
    }

    fn assoc(&self, key: Value, value: Value, start: usize) -> Value {
        NodeBuilder::new("AssocNode", start, self.prev_end)
            .field("key", key)
            .field("value", value)
            .build()
    }

    fn check_duplicate(&mut self, seen: &mut HashSet<String>, key: String, start: usize) {
        if !seen.insert(key.clone()) {
            self.warnings.push(SyntaxWarning::DuplicateKey {
                key,
                span: (start, self.prev_end - start).into(),
            });
        }
    }

    /// array = '[' (expression (',' expression)* ','?)? ']'
    fn parse_array(&mut self) -> ParseResult<Value> {
        let open = self.expect(Token::LBracket)?;
        let mut elements = Vec::new();
        self.skip_newlines();
        while !self.at(Token::RBracket) {
            elements.push(self.parse_expression(true)?);
            self.skip_newlines();
            if !self.eat(Token::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.expect(Token::RBracket)?;
        Ok(NodeBuilder::new("ArrayNode", open.start, self.prev_end)
            .field("elements", elements)
            .build())
    }

    /// hash = '{' (pair (',' pair)* ','?)? '}'
    fn parse_hash(&mut self) -> ParseResult<Value> {
        let open = self.expect(Token::LBrace)?;
        let mut elements = Vec::new();
        let mut seen = HashSet::new();
        self.skip_newlines();
        while !self.at(Token::RBrace) {
            let start = self.peek().map(|t| t.start).unwrap_or(self.prev_end);
            let (key, key_text) = if self.at(Token::Label) {
                let (key, text) = self.parse_label_key()?;
                (key, Some(text))
            } else {
                let key = self.parse_expression(true)?;
                self.skip_newlines();
                self.expect(Token::FatArrow)?;
                let text = static_key(&key);
                (key, text)
            };
            self.skip_newlines();
            let value = self.parse_expression(true)?;
            if let Some(text) = key_text {
                self.check_duplicate(&mut seen, text, start);
            }
            elements.push(self.assoc(key, value, start));
            self.skip_newlines();
            if !self.eat(Token::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.expect(Token::RBrace)?;
        Ok(NodeBuilder::new("HashNode", open.start, self.prev_end)
            .field("elements", elements)
            .build())
    }

    /// lambda = '->' ('(' params ')' | IDENT*) block
    fn parse_lambda(&mut self) -> ParseResult<Value> {
        let arrow = self.expect(Token::Arrow)?;
        let mut params = Vec::new();
        if self.eat(Token::LParen) {
            params = self.parse_param_names(Token::RParen)?;
            self.expect(Token::RParen)?;
        }

        let Some(block) = self.parse_block_opt(true)? else {
            return Err(self.unexpected("lambda body"));
        };
        Ok(NodeBuilder::new("LambdaNode", arrow.start, self.prev_end)
            .field("parameters", params)
            .maybe("body", block.get("body").cloned())
            .build())
    }

    fn parse_param_names(&mut self, close: Token) -> ParseResult<Vec<Value>> {
        let mut names = Vec::new();
        while !self.at(close) {
            let name = self.expect(Token::Identifier)?;
            names.push(Value::from(name.text));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(names)
    }

    /// block = '{' params? statements '}' | 'do' params? statements 'end'
    fn parse_block_opt(&mut self, allow_do: bool) -> ParseResult<Option<Value>> {
        let close = match self.peek_token() {
            Some(Token::LBrace) => Token::RBrace,
            Some(Token::Do) if allow_do => Token::End,
            _ => return Ok(None),
        };
        let open = self.bump()?;

        let mut parameters = None;
        if self.eat(Token::Pipe) {
            let params_start = self.prev_end - 1;
            let names = self.parse_param_names(Token::Pipe)?;
            self.expect(Token::Pipe)?;
            parameters = Some(
                NodeBuilder::new("BlockParametersNode", params_start, self.prev_end)
                    .field("parameters", names)
                    .build(),
            );
        }

        let param_names: Vec<String> = parameters
            .as_ref()
            .and_then(|p| p.get("parameters"))
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        self.locals.push(param_names);
        let body_start = self.prev_end;
        let statements = self.parse_statements(&[close]);
        self.locals.pop();
        let body = NodeBuilder::new("StatementsNode", body_start, self.prev_end)
            .field("body", statements)
            .build();

        self.expect(close)?;
        Ok(Some(
            NodeBuilder::new("BlockNode", open.start, self.prev_end)
                .maybe("parameters", parameters)
                .field("body", body)
                .build(),
        ))
    }

    /// postfix = '.' IDENT call_rest | '[' args ']' | '::' CONSTANT
    fn parse_postfix(&mut self, mut node: Value, start: usize, allow_do: bool) -> ParseResult<Value> {
        loop {
            if self.at(Token::Newline) && self.leading_dot_follows() {
                self.skip_newlines();
            }

            match self.peek() {
                Some(t) if t.token == Token::Dot => {
                    self.advance();
                    self.skip_newlines();
                    let name = match self.peek_token() {
                        Some(Token::Identifier | Token::Constant) => {
                            self.bump()?.text
                        }
                        _ => return Err(self.unexpected("method name")),
                    };
                    node = self.parse_call_rest(Some(node), name, start, allow_do)?;
                }
                Some(t) if t.token == Token::LBracket && !t.space_before => {
                    let args_start = t.start;
                    self.advance();
                    let args = self.parse_arg_list(Token::RBracket)?;
                    self.expect(Token::RBracket)?;
                    let arguments = NodeBuilder::new("ArgumentsNode", args_start, self.prev_end)
                        .field("arguments", args)
                        .build();
                    node = NodeBuilder::new("CallNode", start, self.prev_end)
                        .field("receiver", node)
                        .field("name", "[]")
                        .field("arguments", arguments)
                        .build();
                }
                Some(t) if t.token == Token::ColonColon => {
                    self.advance();
                    let name = self.expect(Token::Constant)?;
                    node = NodeBuilder::new("ConstantPathNode", start, name.end)
                        .field("parent", node)
                        .field("name", name.text)
                        .build();
                }
                _ => return Ok(node),
            }
        }
    }

    /// Whether the next non-newline token is a `.` (method chain continued
    /// on the following line).
    fn leading_dot_follows(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| t.token != Token::Newline)
            .is_some_and(|t| t.token == Token::Dot)
    }

    fn string_node(&self, tok: &SpannedToken) -> Value {
        let inner = &tok.text[1..tok.text.len() - 1];
        if tok.token == Token::SingleQuoted {
            return NodeBuilder::new("StringNode", tok.start, tok.end)
                .field("unescaped", unescape_single(inner))
                .build();
        }

        if !inner.contains("#{") {
            return NodeBuilder::new("StringNode", tok.start, tok.end)
                .field("unescaped", unescape_double(inner))
                .build();
        }

        let parts = interpolation_parts(inner, tok.start + 1);
        NodeBuilder::new("InterpolatedStringNode", tok.start, tok.end)
            .field("parts", parts)
            .build()
    }
}

/// Collects call arguments, grouping `key: value` pairs into a
/// `KeywordHashNode` at the position where they appear.
#[derive(Default)]
struct ArgCollector {
    args: Vec<Value>,
    pairs: Vec<Value>,
    pairs_start: usize,
    keys: HashSet<String>,
}

impl ArgCollector {
    fn positional(&mut self, node: Value) {
        self.flush_pairs(None);
        self.args.push(node);
    }

    fn pair(&mut self, node: Value, start: usize) {
        if self.pairs.is_empty() {
            self.pairs_start = start;
        }
        self.pairs.push(node);
    }

    fn flush_pairs(&mut self, end: Option<usize>) {
        if self.pairs.is_empty() {
            return;
        }
        let end = end.unwrap_or_else(|| last_end(&self.pairs).unwrap_or(self.pairs_start));
        let elements = std::mem::take(&mut self.pairs);
        self.args.push(
            NodeBuilder::new("KeywordHashNode", self.pairs_start, end)
                .field("elements", elements)
                .build(),
        );
    }

    fn finish(mut self, end: usize) -> Vec<Value> {
        self.flush_pairs(Some(end));
        self.args
    }
}

fn last_end(nodes: &[Value]) -> Option<usize> {
    nodes
        .last()?
        .pointer("/location/end_offset")?
        .as_u64()
        .map(|n| n as usize)
}

/// The literal text of a string or symbol key, for duplicate detection.
fn static_key(node: &Value) -> Option<String> {
    match node.get("type")?.as_str()? {
        "StringNode" | "SymbolNode" => node.get("unescaped")?.as_str().map(str::to_string),
        _ => None,
    }
}

fn number_node(text: &str, token: Token, start: usize, end: usize, negative: bool) -> Value {
    let digits = text.replace('_', "");
    let sign = if negative { -1 } else { 1 };
    if token == Token::Integer {
        if let Ok(n) = digits.parse::<i64>() {
            return NodeBuilder::new("IntegerNode", start, end)
                .field("value", sign * n)
                .build();
        }
    }
    let value = digits.parse::<f64>().map(|f| f * sign as f64).ok();
    let ty = if token == Token::Integer {
        "IntegerNode"
    } else {
        "FloatNode"
    };
    NodeBuilder::new(ty, start, end)
        .maybe("value", value.map(Value::from))
        .build()
}

/// `%w[a b]` becomes an array of strings, `%i[a b]` an array of symbols.
fn word_array_node(tok: &SpannedToken) -> Value {
    let symbols = matches!(tok.text.as_bytes().get(1), Some(b'i' | b'I'));
    let inner = &tok.text[3..tok.text.len() - 1];
    let inner_start = tok.start + 3;

    let elements: Vec<Value> = inner
        .split_whitespace()
        .map(|word| {
            let offset = inner_start + (word.as_ptr() as usize - inner.as_ptr() as usize);
            let ty = if symbols { "SymbolNode" } else { "StringNode" };
            NodeBuilder::new(ty, offset, offset + word.len())
                .field("unescaped", word)
                .build()
        })
        .collect();

    NodeBuilder::new("ArrayNode", tok.start, tok.end)
        .field("elements", elements)
        .build()
}

/// Split the inside of a double-quoted string into literal parts and
/// `#{...}` segments. `base` is the offset of `inner` in the source.
fn interpolation_parts(inner: &str, base: usize) -> Vec<Value> {
    let mut parts = Vec::new();
    let mut literal_start = 0;
    let bytes = inner.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'#' && bytes.get(i + 1) == Some(&b'{') {
            if i > literal_start {
                parts.push(
                    NodeBuilder::new("StringNode", base + literal_start, base + i)
                        .field("unescaped", unescape_double(&inner[literal_start..i]))
                        .build(),
                );
            }
            let mut depth = 0usize;
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            let end = (j + 1).min(bytes.len());
            parts.push(NodeBuilder::new("EmbeddedStatementsNode", base + i, base + end).build());
            i = end;
            literal_start = end;
            continue;
        }
        i += 1;
    }

    if literal_start < inner.len() {
        parts.push(
            NodeBuilder::new("StringNode", base + literal_start, base + inner.len())
                .field("unescaped", unescape_double(&inner[literal_start..]))
                .build(),
        );
    }
    parts
}

fn unescape_single(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\\' | '\'')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn unescape_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('s') => out.push(' '),
            Some('e') => out.push('\u{1b}'),
            Some('u') => match unicode_escape(&mut chars) {
                Some(decoded) => out.push_str(&decoded),
                None => out.push_str("\\u"),
            },
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Decode what follows `\u`: four hex digits, or `{...}` holding one or
/// more space separated code points. `None` leaves `chars` untouched.
fn unicode_escape(chars: &mut Chars<'_>) -> Option<String> {
    let rest = chars.as_str();
    let (code_points, consumed) = match rest.strip_prefix('{') {
        Some(braced) => {
            let close = braced.find('}')?;
            (braced[..close].split_whitespace().collect::<Vec<_>>(), close + 2)
        }
        None => (vec![rest.get(..4)?], 4),
    };

    let decoded = code_points
        .iter()
        .map(|hex| {
            if !(1..=6).contains(&hex.len()) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        })
        .collect::<Option<String>>()?;
    if decoded.is_empty() {
        return None;
    }

    *chars = rest[consumed..].chars();
    Some(decoded)
}
