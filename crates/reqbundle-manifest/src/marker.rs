//! Environment-marker expressions.
//!
//! A requirement may be guarded by a boolean condition over recognized
//! environment keys, e.g. `sys_platform == "linux" or sys_platform ==
//! "darwin"`. The grammar is the subset the bundle manifests actually use:
//! `==`/`!=` comparisons between a key and a quoted string (either operand
//! order), combined with `and`/`or` and parentheses. `and` binds tighter
//! than `or`.
//!
//! Unknown keys are rejected at parse time, so a parsed expression always
//! evaluates cleanly against any [`Platform`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use thiserror::Error;

use crate::platform::{Platform, KEYS};

/// Errors from parsing a marker expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("unexpected character '{ch}' at column {col}")]
    UnexpectedChar { ch: char, col: usize },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unknown environment key '{0}'")]
    UnknownKey(String),

    #[error("comparison must test an environment key against a quoted string")]
    BadComparison,
}

/// Comparison operator in a marker leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Ne => write!(f, "!="),
        }
    }
}

/// Parsed marker expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerExpr {
    Or(Box<MarkerExpr>, Box<MarkerExpr>),
    And(Box<MarkerExpr>, Box<MarkerExpr>),
    Compare {
        key: Arc<str>,
        op: CompareOp,
        value: Arc<str>,
        /// Written as `"value" == key` in the source
        flipped: bool,
    },
}

impl MarkerExpr {
    /// Evaluate against a target platform
    pub fn eval(&self, platform: &Platform) -> bool {
        match self {
            MarkerExpr::Or(a, b) => a.eval(platform) || b.eval(platform),
            MarkerExpr::And(a, b) => a.eval(platform) && b.eval(platform),
            MarkerExpr::Compare { key, op, value, .. } => match op {
                // Keys are validated at parse time, so the lookup succeeds
                CompareOp::Eq => platform.get(key).is_some_and(|v| v == value.as_ref()),
                CompareOp::Ne => platform.get(key).is_some_and(|v| v != value.as_ref()),
            },
        }
    }
}

// =============================================================================
// LEXER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Op(CompareOp),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{s}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Op(op) => write!(f, "{op}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn lex(input: &str) -> Result<SmallVec<[Token; 8]>, MarkerError> {
    let mut tokens = SmallVec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ch {
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    return Err(MarkerError::UnterminatedString);
                }
                tokens.push(Token::Str(value));
            }
            '=' | '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push(Token::Op(if ch == '=' {
                        CompareOp::Eq
                    } else {
                        CompareOp::Ne
                    })),
                    _ => return Err(MarkerError::UnexpectedChar { ch, col: pos + 1 }),
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            _ => return Err(MarkerError::UnexpectedChar { ch, col: pos + 1 }),
        }
    }

    Ok(tokens)
}

// =============================================================================
// PARSER - recursive descent, `or` > `and` > atom
// =============================================================================

struct Parser {
    tokens: SmallVec<[Token; 8]>,
    pos: usize,
}

impl Parser {
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

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if s == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<MarkerExpr, MarkerError> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = MarkerExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<MarkerExpr, MarkerError> {
        let mut left = self.atom()?;
        while self.eat_keyword("and") {
            let right = self.atom()?;
            left = MarkerExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn atom(&mut self) -> Result<MarkerExpr, MarkerError> {
        if matches!(self.peek(), Some(Token::LParen)) {
            self.pos += 1;
            let inner = self.or_expr()?;
            match self.next() {
                Some(Token::RParen) => return Ok(inner),
                Some(other) => return Err(MarkerError::UnexpectedToken(other.to_string())),
                None => return Err(MarkerError::UnexpectedEnd),
            }
        }

        let left = self.operand()?;
        let op = match self.next() {
            Some(Token::Op(op)) => op,
            Some(other) => return Err(MarkerError::UnexpectedToken(other.to_string())),
            None => return Err(MarkerError::UnexpectedEnd),
        };
        let right = self.operand()?;

        match (left, right) {
            (Operand::Key(key), Operand::Value(value)) => Ok(MarkerExpr::Compare {
                key,
                op,
                value,
                flipped: false,
            }),
            (Operand::Value(value), Operand::Key(key)) => Ok(MarkerExpr::Compare {
                key,
                op,
                value,
                flipped: true,
            }),
            _ => Err(MarkerError::BadComparison),
        }
    }

    fn operand(&mut self) -> Result<Operand, MarkerError> {
        match self.next() {
            Some(Token::Ident(name)) => {
                if name == "and" || name == "or" {
                    return Err(MarkerError::UnexpectedToken(name));
                }
                if !KEYS.contains(&name.as_str()) {
                    return Err(MarkerError::UnknownKey(name));
                }
                Ok(Operand::Key(Arc::from(name.as_str())))
            }
            Some(Token::Str(value)) => Ok(Operand::Value(Arc::from(value.as_str()))),
            Some(other) => Err(MarkerError::UnexpectedToken(other.to_string())),
            None => Err(MarkerError::UnexpectedEnd),
        }
    }
}

enum Operand {
    Key(Arc<str>),
    Value(Arc<str>),
}

impl FromStr for MarkerExpr {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        if tokens.is_empty() {
            return Err(MarkerError::UnexpectedEnd);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or_expr()?;
        match parser.next() {
            None => Ok(expr),
            Some(extra) => Err(MarkerError::UnexpectedToken(extra.to_string())),
        }
    }
}

impl fmt::Display for MarkerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerExpr::Or(a, b) => {
                // A right-grouped `or` child keeps its parens so re-parsing
                // rebuilds the same tree; the left child is already
                // left-associated
                write!(f, "{a} or ")?;
                fmt_grouped(b, f)
            }
            MarkerExpr::And(a, b) => {
                // An `or` child needs parens to keep precedence on re-parse
                fmt_grouped(a, f)?;
                write!(f, " and ")?;
                fmt_grouped(b, f)
            }
            MarkerExpr::Compare {
                key,
                op,
                value,
                flipped,
            } => {
                if *flipped {
                    write!(f, "\"{value}\" {op} {key}")
                } else {
                    write!(f, "{key} {op} \"{value}\"")
                }
            }
        }
    }
}

/// Parenthesize `or` subtrees so precedence and grouping survive a re-parse
fn fmt_grouped(expr: &MarkerExpr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if matches!(expr, MarkerExpr::Or(..)) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl Serialize for MarkerExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MarkerExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
