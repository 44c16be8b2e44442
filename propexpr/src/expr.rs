//! Property expression lexer, AST, parser, and evaluator.
//!
//! The language covers int/float/bool/string literals, `+ - * / **`
//! arithmetic, parentheses, comma tuples, symbols resolved through a
//! [`PropertySource`], and juxtaposition calls handled by a [`CallResolver`].
//!
//! Operator precedence (lowest → highest):
//!   call  →  tuple  →  additive  →  multiplicative  →  exponent  →  factor
//!
//! The whole input must match; [`evaluate`] reduces any parse failure to
//! [`Value::Absent`], while [`parse_expr`] reports the offset and reason.

use std::fmt;

use crate::value::{BinOp, Value};

// ── PropertySource ────────────────────────────────────────────────────────────

/// Dependency-injection interface giving the evaluator access to named
/// properties.
///
/// Symbol expressions read through this trait during reduction; anything
/// that can enumerate, read, and write named values can back an evaluation.
pub trait PropertySource {
    /// Names of all properties currently known to the source.
    fn names(&self) -> Vec<String>;

    /// Read a property. Unknown names read as [`Value::Absent`].
    fn read(&self, name: &str) -> Value;

    /// Create or overwrite a property.
    fn write(&mut self, name: &str, value: Value);
}

// ── CallResolver ──────────────────────────────────────────────────────────────

/// Hook invoked when an expression applies one value to another by
/// juxtaposition (`callee argument`).
///
/// Both sides are reduced before the hook runs. The grammar fixes the shape
/// of an application but not its meaning; hosts that want real call
/// semantics implement this trait and pass it to [`evaluate_with`].
pub trait CallResolver {
    fn resolve(&self, callee: &Value, argument: &Value) -> Value;
}

/// Default [`CallResolver`]: every application reduces to the placeholder
/// string `"FUNCTION"`.
#[derive(Debug, Default)]
pub struct StubResolver;

impl CallResolver for StubResolver {
    fn resolve(&self, _callee: &Value, _argument: &Value) -> Value {
        Value::Str("FUNCTION".into())
    }
}

// ── ParseError ────────────────────────────────────────────────────────────────

/// Why an expression failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Byte offset into the source where the failure was detected.
    pub at: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}: {}", self.at, self.message)
    }
}

impl std::error::Error for ParseError {}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Ident(String),

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Comma,
    LParen,
    RParen,
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    /// Whether the previous token can end an operand. A `+`/`-` right after
    /// an operand is an operator; anywhere else it may sign a number.
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            after_operand: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos + 1).copied()
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(
            self.peek(),
            Some(b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
        ) {
            self.pos += 1;
        }
    }

    /// Whether the input at `pos` begins a numeric literal: an optional
    /// sign, then a digit or a `.` with a digit behind it.
    fn starts_number(&self) -> bool {
        let b = self.src.as_bytes();
        let mut i = self.pos;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        match b.get(i) {
            Some(b'0'..=b'9') => true,
            Some(b'.') => matches!(b.get(i + 1), Some(b'0'..=b'9')),
            _ => false,
        }
    }

    fn read_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let b = self.src.as_bytes();
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            // An exponent only belongs to the literal when it is complete;
            // a dangling `e` stays in the input as a symbol.
            if matches!(self.peek(), Some(b'e' | b'E')) {
                let mut i = self.pos + 1;
                if matches!(b.get(i), Some(b'+' | b'-')) {
                    i += 1;
                }
                if matches!(b.get(i), Some(b'0'..=b'9')) {
                    self.pos = i;
                    while matches!(self.peek(), Some(b'0'..=b'9')) {
                        self.pos += 1;
                    }
                }
            }
        }

        let text = &self.src[start..self.pos];
        if !is_float {
            // Integers keep the dotless form; values too big for i64 fall
            // through to the float parse.
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Token::Int(n));
            }
        }
        match text.parse::<f64>() {
            Ok(x) => Ok(Token::Float(x)),
            Err(_) => Err(ParseError {
                at: start,
                message: format!("malformed number {text:?}"),
            }),
        }
    }

    /// Read a string literal body. The opening delimiter is already
    /// consumed; `\<delim>` collapses to the delimiter, every other byte
    /// (including a lone backslash) is literal. Empty bodies are an error.
    fn read_string(&mut self, quote: u8, at: usize) -> Result<Token, ParseError> {
        let mut s = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError {
                        at,
                        message: "unterminated string literal".into(),
                    })
                }
                Some(b'\\') if self.peek2() == Some(quote) => {
                    self.pos += 2;
                    s.push(quote as char);
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    // Copy everything up to the next delimiter or escape in
                    // one slice; both stop bytes are ASCII, so the slice
                    // always ends on a character boundary.
                    let seg = self.pos;
                    while let Some(c) = self.peek() {
                        if c == quote || (c == b'\\' && self.peek2() == Some(quote)) {
                            break;
                        }
                        self.pos += 1;
                    }
                    s.push_str(&self.src[seg..self.pos]);
                }
            }
        }
        if s.is_empty() {
            return Err(ParseError {
                at,
                message: "empty string literal".into(),
            });
        }
        Ok(Token::Str(s))
    }

    fn read_word(&mut self) -> Token {
        let b = self.src.as_bytes();
        // Bool literals match as bare prefixes, before the identifier rule.
        if b[self.pos..].starts_with(b"true") {
            self.pos += 4;
            return Token::Bool(true);
        }
        if b[self.pos..].starts_with(b"false") {
            self.pos += 5;
            return Token::Bool(false);
        }
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        Token::Ident(self.src[start..self.pos].to_owned())
    }

    fn next_token(&mut self) -> Result<(Token, usize), ParseError> {
        self.skip_ws();
        let at = self.pos;
        let ch = match self.peek() {
            None => return Ok((Token::Eof, at)),
            Some(c) => c,
        };

        let tok = match ch {
            b'"' | b'\'' => {
                self.pos += 1;
                self.read_string(ch, at)?
            }
            b'0'..=b'9' | b'.' if self.starts_number() => self.read_number()?,
            b'+' | b'-' if !self.after_operand && self.starts_number() => self.read_number()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.read_word(),
            b'+' => {
                self.pos += 1;
                Token::Plus
            }
            b'-' => {
                self.pos += 1;
                Token::Minus
            }
            b'*' => {
                self.pos += 1;
                if self.eat(b'*') {
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            b'/' => {
                self.pos += 1;
                Token::Slash
            }
            b',' => {
                self.pos += 1;
                Token::Comma
            }
            b'(' => {
                self.pos += 1;
                Token::LParen
            }
            b')' => {
                self.pos += 1;
                Token::RParen
            }
            _ => {
                let c = self.src[at..].chars().next().unwrap_or('?');
                return Err(ParseError {
                    at,
                    message: format!("unexpected character {c:?}"),
                });
            }
        };

        self.after_operand = matches!(
            tok,
            Token::Int(_)
                | Token::Float(_)
                | Token::Str(_)
                | Token::Bool(_)
                | Token::Ident(_)
                | Token::RParen
        );
        Ok((tok, at))
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let (t, at) = self.next_token()?;
            let done = matches!(t, Token::Eof);
            tokens.push((t, at));
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Symbol(String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Tuple(Vec<Expr>),
    Call(Box<Expr>, Box<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, usize)>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|(t, _)| t).unwrap_or(&Token::Eof)
    }

    fn at(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, at)| *at).unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let t = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        if self.peek() != &Token::Eof {
            return Err(ParseError {
                at: self.at(),
                message: "trailing input after expression".into(),
            });
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let callee = self.parse_tuple()?;
        // A juxtaposed expression applies the tuple to it. This is the
        // grammar's one backtrack point: a failed application attempt
        // leaves the tuple standing on its own.
        let save = self.pos;
        match self.parse_expression() {
            Ok(argument) => Ok(Expr::Call(Box::new(callee), Box::new(argument))),
            Err(_) => {
                self.pos = save;
                Ok(callee)
            }
        }
    }

    fn parse_tuple(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_additive()?;
        if self.peek() == &Token::Comma {
            let mut items = vec![first];
            while self.eat(&Token::Comma) {
                items.push(self.parse_additive()?);
            }
            Ok(Expr::Tuple(items))
        } else {
            Ok(first)
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_exponent()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_exponent()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        // `**` folds left like the other operators.
        while self.eat(&Token::StarStar) {
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary(BinOp::Pow, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let at = self.at();
        let tok = self.advance();
        match tok {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Bool(b) => Ok(Expr::Literal(Value::Bool(b))),
            Token::Ident(name) => Ok(Expr::Symbol(name)),
            Token::LParen => {
                let inner = self.parse_expression()?;
                if !self.eat(&Token::RParen) {
                    return Err(ParseError {
                        at: self.at(),
                        message: "expected ')'".into(),
                    });
                }
                Ok(inner)
            }
            other => Err(ParseError {
                at,
                message: format!("unexpected token {other:?}"),
            }),
        }
    }
}

/// Parse an expression string into an AST.
///
/// The whole input must parse; trailing input is an error.
pub fn parse_expr(src: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_statement()
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Reduce an [`Expr`] to a [`Value`].
///
/// Reduction never fails: unknown symbols, missing sources, and impossible
/// coercions all come back as [`Value::Absent`]. The source is only ever
/// read from.
pub fn eval_expr(
    expr: &Expr,
    source: Option<&dyn PropertySource>,
    resolver: &dyn CallResolver,
) -> Value {
    match expr {
        Expr::Literal(v) => v.clone(),

        Expr::Symbol(name) => match source {
            Some(props) => props.read(name),
            None => Value::Absent,
        },

        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs, source, resolver);
            let r = eval_expr(rhs, source, resolver);
            l.combine(&r, *op)
        }

        Expr::Tuple(items) => {
            let values: Vec<Value> = items
                .iter()
                .map(|item| eval_expr(item, source, resolver))
                .collect();
            Value::from(values)
        }

        Expr::Call(callee, argument) => {
            let c = eval_expr(callee, source, resolver);
            let a = eval_expr(argument, source, resolver);
            resolver.resolve(&c, &a)
        }
    }
}

/// Parse and evaluate `src` against an optional property source.
///
/// Any failure to parse, look up, or combine reduces to [`Value::Absent`].
pub fn evaluate(src: &str, source: Option<&dyn PropertySource>) -> Value {
    evaluate_with(src, source, &StubResolver)
}

/// [`evaluate`] with a custom call resolver.
pub fn evaluate_with(
    src: &str,
    source: Option<&dyn PropertySource>,
    resolver: &dyn CallResolver,
) -> Value {
    match parse_expr(src) {
        Ok(expr) => eval_expr(&expr, source, resolver),
        Err(_) => Value::Absent,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
