use crate::calculator::CalculatorError;
use crate::tokenizer::{tokenize, Token};

/// Shunting-yard conversion of adapted infix text into postfix order.
///
/// A `)` without a matching `(` is not reported immediately; like an
/// unclosed `(`, it fails the conversion once the input is exhausted.
pub fn to_postfix(adapted: &str) -> Result<Vec<Token>, CalculatorError> {
    let mut output = vec![];
    let mut operators: Vec<Token> = vec![];
    let mut unmatched_close = false;

    for token in tokenize(adapted)? {
        match token {
            Token::Num(_) => output.push(token),
            Token::LParen => operators.push(token),
            Token::RParen => loop {
                match operators.pop() {
                    Some(Token::LParen) => break,
                    Some(op) => output.push(op),
                    None => {
                        unmatched_close = true;
                        break;
                    }
                }
            },
            Token::Op(op) => {
                // Equal precedence pops first: left associativity
                while let Some(&Token::Op(top)) = operators.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    operators.pop();
                    output.push(Token::Op(top));
                }
                operators.push(token);
            }
        }
    }

    while let Some(token) = operators.pop() {
        if token == Token::LParen {
            return Err(CalculatorError::MismatchedParentheses);
        }
        output.push(token);
    }

    if unmatched_close {
        return Err(CalculatorError::MismatchedParentheses);
    }

    log::debug!(
        "Postfix: {}",
        output
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TokenizeError;

    fn postfix(expr: &str) -> Result<String, CalculatorError> {
        let tokens = to_postfix(expr)?;
        Ok(tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(postfix("2 + 3 × 4"), Ok("2 3 4 × +".to_string()));
        assert_eq!(postfix("2 × 3 + 4"), Ok("2 3 × 4 +".to_string()));
        assert_eq!(postfix("1 + 6 ÷ 3 - 2"), Ok("1 6 3 ÷ + 2 -".to_string()));
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(postfix("8 - 3 - 2"), Ok("8 3 - 2 -".to_string()));
        assert_eq!(postfix("8 ÷ 4 × 2"), Ok("8 4 ÷ 2 ×".to_string()));
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(postfix("( 2 + 3 ) × 4"), Ok("2 3 + 4 ×".to_string()));
        assert_eq!(
            postfix("2 × ( 3 - ( 4 + 1 ) )"),
            Ok("2 3 4 1 + - ×".to_string())
        );
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(
            postfix("( 2 + 3"),
            Err(CalculatorError::MismatchedParentheses)
        );
        assert_eq!(
            postfix("2 + 3 )"),
            Err(CalculatorError::MismatchedParentheses)
        );
        assert_eq!(
            postfix(") ( 1"),
            Err(CalculatorError::MismatchedParentheses)
        );
    }

    #[test]
    fn test_unexpected_token() {
        assert_eq!(
            postfix("2 ^ 3"),
            Err(CalculatorError::Tokenize(TokenizeError::UnexpectedToken(
                "^".into()
            )))
        );
    }
}
