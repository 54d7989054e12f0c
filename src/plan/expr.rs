//! Restricted arithmetic expressions over an explicit variable context.
//!
//! Plan arguments are expressions like `i0 * 40 - r / 2`. The grammar is
//! numbers, bound identifiers, unary minus, `+ - * /`, and parentheses;
//! nothing else. Variables live in a typed map passed to `eval`, never in
//! any ambient scope, so the interpreter exposes no scripting surface.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected `{0}`")]
    UnexpectedToken(String),
    #[error("malformed number `{0}`")]
    BadNumber(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
}

/// Variable bindings for one plan execution.
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: HashMap<String, f64>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: f64) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.bindings.get(name).copied()
    }
}

/// Whether `name` can be bound: a letter or underscore followed by
/// letters, digits, or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Evaluate an expression against the context.
pub fn eval(expr: &str, ctx: &Context) -> Result<f64, ExprError> {
    let tokens = lex(expr)?;
    let mut parser = Parser { tokens, pos: 0, ctx };
    let value = parser.expression()?;
    parser.expect_end()?;
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

fn lex(expr: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_ascii_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LeftParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RightParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::BadNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    ctx: &'a Context,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Ident(name)) => {
                self.ctx.get(&name).ok_or(ExprError::UnknownVariable(name))
            }
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::LeftParen) => {
                let value = self.expression()?;
                match self.next() {
                    Some(Token::RightParen) => Ok(value),
                    Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expect_end(&mut self) -> Result<(), ExprError> {
        match self.next() {
            None => Ok(()),
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
        }
    }
}
