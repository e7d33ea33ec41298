//! # Call Specifications
//!
//! Solvers and drivers are named in configuration files with constructor-like strings such
//! as `om.NonlinearBlockGS(maxiter=100, rtol=1e-6)`. These strings are parsed, never
//! evaluated, by a deliberately small grammar:
//!
//! ```text
//! call    := path [ "(" [ kwarg { "," kwarg } [ "," ] ] ")" ]
//! path    := ident { "." ident }
//! kwarg   := ident "=" literal
//! literal := [ "+" | "-" ] ( integer | float )
//!          | 'string' | "string"
//!          | true | false | True | False
//! ```
//!
//! Positional arguments, nested calls, expressions, escape sequences and `None` are all
//! rejected.

use crate::core::config::value::ScalarValue;
use logos::Logos;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token<'src> {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token("True")]
    #[token("true")]
    True,
    #[token("False")]
    #[token("false")]
    False,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'src str),
    #[regex(r"[0-9]+")]
    Integer(&'src str),
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float(&'src str),
    #[regex(r#"'[^'\\\n]*'"#)]
    #[regex(r#""[^"\\\n]*""#)]
    Str(&'src str),
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::True | Token::False => "a boolean".to_string(),
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Integer(_) | Token::Float(_) => "a number".to_string(),
            Token::Str(_) => "a string".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct CallSpecError {
    pub offset: usize,
    pub message: String,
}

/// A parsed `target(name=value, ...)` specification.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    /// The full dotted callee, e.g. `om.ScipyOptimizeDriver`.
    pub target: String,
    /// Keyword arguments in declaration order; names are unique.
    pub arguments: Vec<(String, ScalarValue)>,
}

impl CallSpec {
    pub fn parse(text: &str) -> Result<Self, CallSpecError> {
        let mut tokens = Vec::new();
        for (token, span) in Token::lexer(text).spanned() {
            match token {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(CallSpecError {
                        offset: span.start,
                        message: format!("unexpected character sequence '{}'", &text[span]),
                    });
                }
            }
        }
        Parser {
            tokens,
            pos: 0,
            end: text.len(),
        }
        .parse_call()
    }

    /// The last segment of the target, e.g. `NonlinearBlockGS` for `om.NonlinearBlockGS`.
    pub fn kind(&self) -> &str {
        self.target.rsplit('.').next().unwrap_or(&self.target)
    }

    pub fn argument(&self, name: &str) -> Option<&ScalarValue> {
        self.arguments
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for CallSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.target)?;
        for (i, (name, value)) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    end: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, CallSpecError> {
        Err(CallSpecError {
            offset: self.offset(),
            message: message.into(),
        })
    }

    fn unexpected<T>(&self, expected: &str) -> Result<T, CallSpecError> {
        match self.peek() {
            Some(token) => self.error(format!("expected {expected}, found {}", token.describe())),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    fn parse_call(mut self) -> Result<CallSpec, CallSpecError> {
        let target = self.parse_path()?;
        let mut arguments: Vec<(String, ScalarValue)> = Vec::new();

        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            loop {
                if self.peek() == Some(&Token::RParen) {
                    self.pos += 1;
                    break;
                }
                let (name, value) = self.parse_kwarg()?;
                if arguments.iter().any(|(existing, _)| *existing == name) {
                    return self.error(format!("duplicate keyword argument '{name}'"));
                }
                arguments.push((name, value));
                match self.peek() {
                    Some(Token::Comma) => self.pos += 1,
                    Some(Token::RParen) => {}
                    _ => return self.unexpected("',' or ')'"),
                }
            }
        }

        if self.peek().is_some() {
            return self.unexpected("end of specification");
        }
        Ok(CallSpec { target, arguments })
    }

    fn parse_path(&mut self) -> Result<String, CallSpecError> {
        let mut path = match self.peek() {
            Some(Token::Ident(name)) => name.to_string(),
            _ => return self.unexpected("a solver or driver name"),
        };
        self.pos += 1;
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            match self.peek() {
                Some(Token::Ident(name)) => {
                    path.push('.');
                    path.push_str(name);
                    self.pos += 1;
                }
                _ => return self.unexpected("an identifier after '.'"),
            }
        }
        Ok(path)
    }

    fn parse_kwarg(&mut self) -> Result<(String, ScalarValue), CallSpecError> {
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.to_string(),
            Some(Token::Integer(_) | Token::Float(_) | Token::Str(_) | Token::True | Token::False) => {
                return self.error("positional arguments are not supported; use name=value");
            }
            _ => return self.unexpected("a keyword argument name"),
        };
        self.pos += 1;
        if self.peek() != Some(&Token::Equals) {
            return self.unexpected("'=' after keyword argument name");
        }
        self.pos += 1;
        let value = self.parse_literal()?;
        Ok((name, value))
    }

    fn parse_literal(&mut self) -> Result<ScalarValue, CallSpecError> {
        let start = self.offset();
        let negative = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                true
            }
            Some(Token::Plus) => {
                self.pos += 1;
                false
            }
            _ => {
                return match self.peek() {
                    Some(Token::Str(quoted)) => {
                        let inner = quoted[1..quoted.len() - 1].to_string();
                        self.pos += 1;
                        Ok(ScalarValue::String(inner))
                    }
                    Some(Token::True) => {
                        self.pos += 1;
                        Ok(ScalarValue::Bool(true))
                    }
                    Some(Token::False) => {
                        self.pos += 1;
                        Ok(ScalarValue::Bool(false))
                    }
                    Some(Token::Integer(_) | Token::Float(_)) => self.parse_number(false, start),
                    Some(Token::Ident(name)) => {
                        let name = name.to_string();
                        self.error(format!(
                            "'{name}' is not a literal; only numbers, quoted strings and booleans are allowed"
                        ))
                    }
                    _ => self.unexpected("a literal value"),
                };
            }
        };
        match self.peek() {
            Some(Token::Integer(_) | Token::Float(_)) => self.parse_number(negative, start),
            _ => self.unexpected("a number after sign"),
        }
    }

    fn parse_number(&mut self, negative: bool, start: usize) -> Result<ScalarValue, CallSpecError> {
        let overflow = |digits: &str| CallSpecError {
            offset: start,
            message: format!("number '{digits}' is out of range"),
        };
        match self.next() {
            Some(Token::Integer(digits)) => {
                let text = if negative {
                    format!("-{digits}")
                } else {
                    digits.to_string()
                };
                text.parse::<i64>()
                    .map(ScalarValue::Integer)
                    .map_err(|_| overflow(digits))
            }
            Some(Token::Float(digits)) => {
                let value: f64 = digits.parse().map_err(|_| overflow(digits))?;
                if !value.is_finite() {
                    return Err(overflow(digits));
                }
                Ok(ScalarValue::Float(if negative { -value } else { value }))
            }
            _ => self.unexpected("a number"),
        }
    }
}
