use std::collections::HashSet;
use std::fmt;

use anyhow::Error;
use num_bigint::BigInt;
use regex::Regex;

use super::{MultiPoly, Rational, RationalFunction, Ring};
use crate::errors::IdentError;

// --- Parser errors (local) ---
#[derive(Debug)]
pub enum ParseError {
    UnexpectedChar(char, usize),
    UnexpectedEnd,
    UnknownVar(String),
    InvalidNumber(String),
    UnbalancedParens,
    DivisionByZero,
    Other(String),
}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseError::*;
        match self {
            UnexpectedChar(c, i) => write!(f, "Unexpected char '{}' at {}", c, i),
            UnexpectedEnd => write!(f, "Unexpected end of input"),
            UnknownVar(s) => write!(f, "Unknown variable '{}'", s),
            InvalidNumber(s) => write!(f, "Invalid number '{}'", s),
            UnbalancedParens => write!(f, "Unbalanced parentheses"),
            DivisionByZero => write!(f, "Division by zero"),
            Other(s) => write!(f, "{}", s),
        }
    }
}
impl std::error::Error for ParseError {}

impl ParseError {
    fn into_ident_error(self, input: &str) -> IdentError {
        match self {
            ParseError::UnknownVar(name) => IdentError::UnknownVariable(name),
            other => IdentError::Parse {
                input: input.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

// --- AST ---
#[derive(Debug, Clone)]
enum Node {
    Var(String),
    Const(BigInt),
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Div(Box<Node>, Box<Node>),
    Neg(Box<Node>),
    Pow(Box<Node>, u32),
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}
impl Parser {
    fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
            pos: 0,
        }
    }
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }
    fn eat_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse(&mut self) -> Result<Node, ParseError> {
        self.eat_ws();
        let n = self.parse_expr()?;
        self.eat_ws();
        if self.pos < self.chars.len() {
            return Err(match self.chars[self.pos] {
                ')' => ParseError::UnbalancedParens,
                c => ParseError::UnexpectedChar(c, self.pos),
            });
        }
        Ok(n)
    }

    fn parse_expr(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_term()?;
        loop {
            self.eat_ws();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    node = Node::Add(Box::new(node), Box::new(rhs));
                }
                Some('-') => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    node = Node::Sub(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_factor()?;
        loop {
            self.eat_ws();
            match (self.peek(), self.peek_second()) {
                // '**' is the power operator, handled in factor
                (Some('*'), Some('*')) => break,
                (Some('*'), _) => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    node = Node::Mul(Box::new(node), Box::new(rhs));
                }
                (Some('/'), _) => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    node = Node::Div(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Node, ParseError> {
        self.eat_ws();
        match self.peek() {
            Some('(') => {
                self.bump();
                let inner = self.parse_expr()?;
                self.eat_ws();
                if self.peek() == Some(')') {
                    self.bump();
                    self.parse_pow_suffix(inner)
                } else {
                    Err(ParseError::UnbalancedParens)
                }
            }
            Some(c) if is_ident_start(c) => {
                let id = self.parse_ident();
                self.parse_pow_suffix(Node::Var(id))
            }
            Some(c) if c.is_ascii_digit() => {
                let n = self.parse_number()?;
                self.parse_pow_suffix(Node::Const(n))
            }
            Some('-') => {
                self.bump();
                let f = self.parse_factor()?;
                Ok(Node::Neg(Box::new(f)))
            }
            Some('+') => {
                self.bump();
                self.parse_factor()
            }
            Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_pow_suffix(&mut self, base: Node) -> Result<Node, ParseError> {
        self.eat_ws();
        match (self.peek(), self.peek_second()) {
            (Some('^'), _) => {
                self.bump();
            }
            (Some('*'), Some('*')) => {
                self.pos += 2;
            }
            _ => return Ok(base),
        }
        self.eat_ws();
        let e = self.parse_unsigned_integer()?;
        let e = u32::try_from(e).map_err(|_| ParseError::Other(format!("exponent {} too large", e)))?;
        Ok(Node::Pow(Box::new(base), e))
    }

    fn parse_ident(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s
    }

    fn parse_digits(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s
    }

    fn parse_number(&mut self) -> Result<BigInt, ParseError> {
        let s = self.parse_digits();
        s.parse::<BigInt>().map_err(|_| ParseError::InvalidNumber(s))
    }

    fn parse_unsigned_integer(&mut self) -> Result<u64, ParseError> {
        let s = self.parse_digits();
        if s.is_empty() {
            return Err(ParseError::Other("expected integer".into()));
        }
        s.parse::<u64>()
            .map_err(|_| ParseError::Other(format!("invalid {}", s)))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// --- Convert AST to a rational function over the ring ---
fn ast_to_function(node: &Node, ring: &Ring) -> Result<RationalFunction, ParseError> {
    let poly = |p: MultiPoly<Rational>| RationalFunction::from_poly(p);
    match node {
        Node::Var(name) => {
            let index = ring
                .index_of(name)
                .ok_or_else(|| ParseError::UnknownVar(name.clone()))?;
            Ok(poly(ring.gen(index)))
        }
        Node::Const(n) => Ok(poly(ring.constant(Rational::from_integer(n.clone())))),
        Node::Add(l, r) => Ok(ast_to_function(l, ring)? + ast_to_function(r, ring)?),
        Node::Sub(l, r) => Ok(ast_to_function(l, ring)? - ast_to_function(r, ring)?),
        Node::Mul(l, r) => Ok(ast_to_function(l, ring)? * ast_to_function(r, ring)?),
        Node::Div(l, r) => {
            let den = ast_to_function(r, ring)?;
            if num_traits::Zero::is_zero(&den) {
                return Err(ParseError::DivisionByZero);
            }
            Ok(ast_to_function(l, ring)? / den)
        }
        Node::Neg(inner) => Ok(-ast_to_function(inner, ring)?),
        Node::Pow(base, exp) => {
            let base = ast_to_function(base, ring)?;
            let (num, den) = base.into_parts();
            let pow = RationalFunction::new(num.pow(*exp), den.pow(*exp))
                .map_err(|e| ParseError::Other(e.to_string()))?;
            Ok(pow)
        }
    }
}

// --- Public entry point ---
/// Parse `input` into a [`RationalFunction`] over `ring`.
///
/// Rules for input:
/// - Variables: names of `ring` (letters, digits, underscores; not starting with a digit)
/// - Constants: non-negative integers of any size
/// - Operations: `+`, `-`, `*`, `/`, `^` or `**` (non-negative integer power),
///   parentheses for grouping
///
/// e.g. `(a*b + 1) * y_1 - 3*k^2 / (2 - x)`
pub fn parse_rational_function(input: &str, ring: &Ring) -> Result<RationalFunction, Error> {
    let mut parser = Parser::new(input);
    let ast = parser.parse().map_err(|e| e.into_ident_error(input))?;
    let f = ast_to_function(&ast, ring).map_err(|e| e.into_ident_error(input))?;
    Ok(f)
}

// Extract variable names from an expression, in order of first appearance
pub fn extract_variable_names(input: &str) -> Vec<String> {
    // Matches identifiers starting with a letter or underscore, then alphanumeric/underscore
    let re = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern is valid");
    let mut seen = HashSet::new();
    let mut vars = Vec::new();

    for cap in re.find_iter(input) {
        let name = cap.as_str().to_string();
        // Avoid duplicates while preserving order
        if seen.insert(name.clone()) {
            vars.push(name);
        }
    }

    vars
}
