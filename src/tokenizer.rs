use compact_str::{CompactString, ToCompactString};
use std::fmt;
use thiserror::Error;

pub fn is_digit_or_dot(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

pub fn is_operator(c: char) -> bool {
    Operation::from_char(c).is_some()
}

pub fn is_paren(c: char) -> bool {
    matches!(c, '(' | ')')
}

/// Keypad character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Number,
    Operator,
    LeftParen,
    RightParen,
}

impl CharClass {
    pub fn of(c: char) -> Option<Self> {
        match c {
            '(' => Some(CharClass::LeftParen),
            ')' => Some(CharClass::RightParen),
            _ if is_digit_or_dot(c) => Some(CharClass::Number),
            _ if is_operator(c) => Some(CharClass::Operator),
            _ => None,
        }
    }

    /// Parentheses are typed like digits: they glue to their neighbours
    /// without a separating space.
    pub fn is_number_like(self) -> bool {
        !matches!(self, CharClass::Operator)
    }
}

/// Rewrites a keypad buffer so that it splits on spaces into well-formed
/// tokens, making implicit multiplication explicit (`3(4` -> `3 × ( 4`).
pub fn adapt(expr: &str) -> String {
    let mut result = String::with_capacity(expr.len() * 2);
    let mut chars = expr.chars().peekable();

    while let Some(curr) = chars.next() {
        result.push(curr);
        let Some(&next) = chars.peek() else {
            break;
        };

        let implicit_mul = ((is_digit_or_dot(curr) || curr == ')') && next == '(')
            || (curr == ')' && is_digit_or_dot(next));

        if implicit_mul {
            result.push_str(" × ");
        } else if (is_paren(curr) && next != ' ') || (is_paren(next) && curr != ' ') {
            result.push(' ');
        }
    }

    log::debug!("Adapted expression: {result}");
    result
}

/// Splits adapted text on spaces into tokens.
pub fn tokenize(adapted: &str) -> Result<Vec<Token>, TokenizeError> {
    adapted
        .split(' ')
        .filter(|raw| !raw.is_empty())
        .map(Token::parse)
        .collect()
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unexpected token: {0}")]
    UnexpectedToken(CompactString),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Num(CompactString),
    Op(Operation),
    LParen,
    RParen,
}

impl Token {
    fn parse(raw: &str) -> Result<Token, TokenizeError> {
        let mut chars = raw.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };

        match (single, single.and_then(Operation::from_char)) {
            (_, Some(op)) => Ok(Token::Op(op)),
            (Some('('), _) => Ok(Token::LParen),
            (Some(')'), _) => Ok(Token::RParen),
            _ if is_number(raw.strip_prefix('-').unwrap_or(raw)) => Ok(Token::Num(raw.into())),
            _ => Err(TokenizeError::UnexpectedToken(raw.to_compact_string())),
        }
    }
}

/// Digits and dots only. A computed negative result keeps its sign.
fn is_number(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(is_digit_or_dot)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => f.write_str(n),
            Token::Op(op) => write!(f, "{}", op.glyph()),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    pub fn from_char(c: char) -> Option<Operation> {
        match c {
            '+' => Some(Operation::Add),
            '-' => Some(Operation::Sub),
            '×' => Some(Operation::Mul),
            '÷' => Some(Operation::Div),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '×',
            Operation::Div => '÷',
        }
    }

    /// Higher binds tighter. Every operation is left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            Operation::Add | Operation::Sub => 1,
            Operation::Mul | Operation::Div => 2,
        }
    }
}
