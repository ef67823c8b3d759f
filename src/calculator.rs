use crate::converter::to_postfix;
use crate::tokenizer::{adapt, Operation, Token, TokenizeError};
use thiserror::Error;

pub type Value = f64;

/// Postfix evaluator working off a value stack.
#[derive(Debug, Default)]
pub struct Calculator {
    stack: Vec<Value>,
}

impl Calculator {
    pub fn handle_token(&mut self, token: &Token) -> Result<(), CalculatorError> {
        match token {
            // Anything that is not a decimal turns into NaN and is caught at finalize
            Token::Num(n) => self.stack.push(n.parse().unwrap_or(Value::NAN)),
            Token::Op(op) => {
                let (Some(r), Some(l)) = (self.stack.pop(), self.stack.pop()) else {
                    return Err(CalculatorError::InvalidResult);
                };
                self.stack.push(Action { l, op: *op }.execute(r)?);
            }
            Token::LParen | Token::RParen => return Err(CalculatorError::InvalidResult),
        }

        Ok(())
    }

    pub fn finalize(&mut self) -> Result<Value, CalculatorError> {
        let result = match self.stack.as_slice() {
            [v] if v.is_finite() => Ok(*v),
            _ => Err(CalculatorError::InvalidResult),
        };
        self.stack.clear();
        result
    }
}

#[derive(Debug)]
struct Action {
    l: Value,
    op: Operation,
}

impl Action {
    fn execute(self, r: Value) -> Result<Value, CalculatorError> {
        Ok(match self.op {
            Operation::Add => self.l + r,
            Operation::Sub => self.l - r,
            Operation::Mul => self.l * r,
            Operation::Div if r == 0.0 => return Err(CalculatorError::DivisionByZero),
            Operation::Div => self.l / r,
        })
    }
}

pub fn evaluate(postfix: &[Token]) -> Result<Value, CalculatorError> {
    let mut calculator = Calculator::default();
    for token in postfix {
        calculator.handle_token(token)?;
    }
    calculator.finalize()
}

/// Runs a keypad buffer through adaptation, conversion and evaluation.
pub fn evaluate_expression(expr: &str) -> Result<Value, CalculatorError> {
    evaluate(&to_postfix(&adapt(expr))?)
}

/// Renders a value the way the display shows it: plain decimal notation,
/// no exponent, and no negative zero.
pub fn format_value(v: Value) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    v.to_string()
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("Mismatched parentheses")]
    MismatchedParentheses,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Invalid result")]
    InvalidResult,
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate_expression("2 + 3 × 4"), Ok(14.0));
        assert_eq!(evaluate_expression("(2 + 3) × 4"), Ok(20.0));
        assert_eq!(evaluate_expression("10 - 4 ÷ 2 × 3"), Ok(4.0));
        assert_eq!(evaluate_expression("8 - 3 - 2"), Ok(3.0));
        assert_eq!(evaluate_expression("16 ÷ 4 ÷ 2"), Ok(2.0));
    }

    #[test]
    fn test_implicit_mul() {
        assert_eq!(evaluate_expression("3(4"), Err(CalculatorError::MismatchedParentheses));
        assert_eq!(evaluate_expression("3(4)"), Ok(12.0));
        assert_eq!(evaluate_expression("(1 + 1)(2 + 3)"), Ok(10.0));
        assert_eq!(evaluate_expression("(2)5"), Ok(10.0));
    }

    #[test]
    fn test_decimals() {
        assert_eq!(evaluate_expression("1.5 × 4"), Ok(6.0));
        assert_eq!(evaluate_expression("7 ÷ 2"), Ok(3.5));
        assert_eq!(evaluate_expression(".5 + 1"), Ok(1.5));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate_expression("6 ÷ 0"), Err(CalculatorError::DivisionByZero));
        assert_eq!(evaluate_expression("0 ÷ 0"), Err(CalculatorError::DivisionByZero));
        assert_eq!(
            evaluate_expression("1 ÷ (2 - 2)"),
            Err(CalculatorError::DivisionByZero)
        );
    }

    #[test]
    fn test_invalid_result() {
        assert_eq!(evaluate_expression("2 +"), Err(CalculatorError::InvalidResult));
        assert_eq!(evaluate_expression(""), Err(CalculatorError::InvalidResult));
        assert_eq!(evaluate_expression("1.2.3"), Err(CalculatorError::InvalidResult));
        assert_eq!(evaluate_expression("()"), Err(CalculatorError::InvalidResult));
    }

    #[test]
    fn test_evaluate_postfix_directly() {
        let postfix = vec![
            Token::Num("9".into()),
            Token::Num("3".into()),
            Token::Op(Operation::Div),
            Token::Num("2".into()),
            Token::Op(Operation::Sub),
        ];
        assert_eq!(evaluate(&postfix), Ok(1.0));
        assert_eq!(
            evaluate(&[Token::Num("1".into()), Token::Num("2".into())]),
            Err(CalculatorError::InvalidResult)
        );
    }

    #[test]
    fn test_negative_number() {
        assert_eq!(evaluate_expression("-3"), Ok(-3.0));
        assert_eq!(evaluate_expression("-3 × 2"), Ok(-6.0));
    }

    #[test]
    fn test_parenthesis_in_postfix() {
        let postfix = vec![Token::LParen, Token::Num("1".into()), Token::RParen];
        assert_eq!(evaluate(&postfix), Err(CalculatorError::InvalidResult));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(14.0), "14");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(-3.0), "-3");
        assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_value(1e20), "100000000000000000000");
    }
}
