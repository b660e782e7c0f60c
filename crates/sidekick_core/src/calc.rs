//! Arithmetic evaluator for omnibox calculations.
//!
//! Recursive descent over numeric literals, `+ - * /`, unary sign and
//! parentheses. Nothing else is accepted.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use thiserror::Error;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("expression nests too deeply")]
    TooDeep,
}

/// Evaluate `input` to a finite `f64`.
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    let mut parser = Parser::new(input);
    let value = parser.expr()?;
    parser.skip_whitespace();
    if let Some((offset, found)) = parser.peek() {
        return Err(CalcError::UnexpectedChar { found, offset });
    }
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.input[self.pos..].chars().next().map(|c| (self.pos, c))
    }

    fn bump(&mut self) {
        if let Some((_, c)) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Next non-whitespace character, without consuming it.
    fn next_token(&mut self) -> Option<(usize, char)> {
        self.skip_whitespace();
        self.peek()
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some((_, op @ ('+' | '-'))) = self.next_token() {
            self.bump();
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some((_, op @ ('*' | '/'))) = self.next_token() {
            self.bump();
            let rhs = self.factor()?;
            value = if op == '*' {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        let result = self.factor_inner();
        self.depth -= 1;
        result
    }

    fn factor_inner(&mut self) -> Result<f64, CalcError> {
        match self.next_token() {
            None => Err(CalcError::UnexpectedEnd),
            Some((_, '+')) => {
                self.bump();
                self.factor()
            }
            Some((_, '-')) => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some((_, '(')) => {
                self.bump();
                let value = self.expr()?;
                match self.next_token() {
                    Some((_, ')')) => {
                        self.bump();
                        Ok(value)
                    }
                    Some((offset, found)) => Err(CalcError::UnexpectedChar { found, offset }),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some((_, c)) if c.is_ascii_digit() || c == '.' => self.number(),
            Some((offset, found)) => Err(CalcError::UnexpectedChar { found, offset }),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while matches!(self.peek(), Some((_, c)) if c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        let literal = &self.input[start..self.pos];
        literal
            .parse::<f64>()
            .map_err(|_| CalcError::InvalidNumber(literal.to_string()))
    }
}
