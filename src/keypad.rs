use crate::calculator::{evaluate_expression, format_value, CalculatorError, Value};
use crate::tokenizer::{is_digit_or_dot, CharClass};
use thiserror::Error;

/// Longest number the keypad accepts, and longest result it will display.
pub const MAX_NUMBER_LENGTH: usize = 20;

const ERROR: &str = "ERROR";

/// One physical key of the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Append(char),
    Delete,
    ClearAll,
    Compute,
}

impl Key {
    /// Maps a typed character to a key. ASCII stand-ins are accepted for
    /// the multiplication and division glyphs.
    pub fn from_char(c: char) -> Result<Key, KeyError> {
        match c {
            '=' => Ok(Key::Compute),
            '<' | '\u{8}' | '\u{7f}' => Ok(Key::Delete),
            'c' | 'C' => Ok(Key::ClearAll),
            '*' | 'x' => Ok(Key::Append('×')),
            '/' => Ok(Key::Append('÷')),
            _ if CharClass::of(c).is_some() => Ok(Key::Append(c)),
            _ => Err(KeyError::UnknownKey(c)),
        }
    }
}

/// Expression buffer driven one keypress at a time.
///
/// The buffer is always either `"0"`, an expression in progress, or a
/// sentinel starting with `E`/`N` left behind by a failed computation.
#[derive(Debug)]
pub struct Keypad {
    buffer: String,
    dot_placed: bool,
    previous: String,
}

impl Default for Keypad {
    fn default() -> Self {
        Keypad {
            buffer: "0".to_string(),
            dot_placed: false,
            previous: String::new(),
        }
    }
}

impl Keypad {
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn previous_display(&self) -> &str {
        &self.previous
    }

    pub fn is_error(&self) -> bool {
        self.buffer.starts_with(['E', 'N'])
    }

    pub fn press(&mut self, c: char) -> Result<(), KeyError> {
        if c.is_whitespace() {
            return Ok(());
        }

        match Key::from_char(c)? {
            Key::Append(c) => self.append(c)?,
            Key::Delete => self.delete_last(),
            Key::ClearAll => self.clear_all(),
            Key::Compute => {
                self.compute().ok();
            }
        }
        Ok(())
    }

    pub fn append(&mut self, c: char) -> Result<(), KeyError> {
        use CharClass::*;

        let Some(class) = CharClass::of(c) else {
            return Err(KeyError::UnknownKey(c));
        };

        // A negative result can only be replaced by a fresh number
        if self.buffer.starts_with('-') {
            if c.is_ascii_digit() {
                self.replace_with(c);
            }
            return Ok(());
        }

        if self.is_error() {
            if is_digit_or_dot(c) {
                self.replace_with(c);
            }
            return Ok(());
        }

        let last = self.buffer.chars().next_back().and_then(CharClass::of);

        match (last, class) {
            (Some(LeftParen), Operator) | (Some(Operator), RightParen) => return Ok(()),
            _ => {}
        }

        if c == '.' {
            self.place_dot(last);
            return Ok(());
        }

        if c.is_ascii_digit() && self.current_number().len() >= MAX_NUMBER_LENGTH {
            return Ok(());
        }

        let same_class = last.is_some_and(|last| last.is_number_like() == class.is_number_like());

        if same_class {
            if class == Operator {
                // Consecutive operators: keep the first one
                self.dot_placed = false;
            } else {
                if self.buffer == "0" {
                    self.buffer.clear();
                }
                self.buffer.push(c);
                self.sync_dot_flag();
            }
        } else if self.buffer != "0" {
            self.buffer.push(' ');
            self.buffer.push(c);
            self.dot_placed = false;
        }

        Ok(())
    }

    fn place_dot(&mut self, last: Option<CharClass>) {
        if self.dot_placed {
            return;
        }

        // "0" becomes "0."; after an operator the dot starts a new number
        if last == Some(CharClass::Operator) {
            self.buffer.push_str(" .");
        } else {
            self.buffer.push('.');
        }
        self.dot_placed = true;
    }

    fn replace_with(&mut self, c: char) {
        self.buffer.clear();
        self.buffer.push(c);
        self.dot_placed = c == '.';
    }

    /// Trailing run of digits and dots, empty if the buffer ends otherwise.
    fn current_number(&self) -> &str {
        let start = self
            .buffer
            .char_indices()
            .rev()
            .find(|&(_, c)| !is_digit_or_dot(c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        &self.buffer[start..]
    }

    fn sync_dot_flag(&mut self) {
        self.dot_placed = self.current_number().contains('.');
    }

    /// Removes the last character, or the last operator/paren token together
    /// with the space in front of it.
    pub fn delete_last(&mut self) {
        let mut tail = self.buffer.chars().rev();
        let removed_token = tail.nth(1) == Some(' ');

        self.buffer.pop();
        if removed_token {
            self.buffer.pop();
        }
        if self.buffer.is_empty() {
            self.buffer.push('0');
        }
        self.sync_dot_flag();
    }

    /// First press resets the buffer, a second press on a clean buffer
    /// clears the previous expression as well.
    pub fn clear_all(&mut self) {
        if self.buffer != "0" {
            self.buffer = "0".to_string();
            self.dot_placed = false;
        } else {
            self.previous.clear();
        }
    }

    pub fn compute(&mut self) -> Result<Value, ComputeError> {
        self.previous = self.buffer.clone();

        let outcome = evaluate_expression(&self.buffer)
            .map_err(ComputeError::from)
            .and_then(|v| {
                let text = format_value(v);
                if text.len() > MAX_NUMBER_LENGTH {
                    Err(ComputeError::ResultTooLong(text))
                } else {
                    Ok((v, text))
                }
            });

        match outcome {
            Ok((v, text)) => {
                self.dot_placed = text.contains('.');
                self.buffer = text;
                Ok(v)
            }
            Err(e) => {
                log::warn!("Computation of '{}' failed: {}", self.previous, e);
                self.buffer = ERROR.to_string();
                self.dot_placed = false;
                Err(e)
            }
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("Unknown key: {0:?}")]
    UnknownKey(char),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComputeError {
    #[error(transparent)]
    Calculation(#[from] CalculatorError),
    #[error("Result too long: {0}")]
    ResultTooLong(String),
}
