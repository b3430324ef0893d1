//! Safe evaluator for hazard-rate equations.
//!
//! Handbook equations are products of named factors, occasionally with a
//! parenthesised sum, e.g. `lambdab * (N1 * piC + N2 * (piC + 13.0)) * piQ * piE`.
//! The grammar accepted here is exactly that:
//!
//! ```text
//! sum     := product ('+' product)*
//! product := atom ('*' atom)*
//! atom    := number | name | '(' sum ')'
//! ```
//!
//! Evaluation never defaults a missing factor to zero; it fails with
//! [`EvaluationError::UnknownFactor`].

use crate::attributes::AttributeProvider;
use crate::error::EvaluationError;

/// Parsed equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    Factor(String),
    Product(Vec<Expression>),
    Sum(Vec<Expression>),
}

impl Expression {
    /// Parses `text` into an expression tree.
    pub fn parse(text: &str) -> Result<Self, EvaluationError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(EvaluationError::EmptyExpression);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.sum()?;
        if let Some((at, tok)) = parser.tokens.get(parser.pos) {
            return Err(EvaluationError::Malformed {
                position: *at,
                message: format!("unexpected {tok:?}"),
            });
        }
        Ok(expr)
    }

    /// Evaluates against a factor source.
    pub fn evaluate<F: AttributeProvider + ?Sized>(&self, factors: &F) -> Result<f64, EvaluationError> {
        match self {
            Expression::Number(v) => Ok(*v),
            Expression::Factor(name) => factors
                .get(name)
                .ok_or_else(|| EvaluationError::UnknownFactor(name.clone())),
            Expression::Product(terms) => terms
                .iter()
                .try_fold(1.0, |acc, t| Ok(acc * t.evaluate(factors)?)),
            Expression::Sum(terms) => terms
                .iter()
                .try_fold(0.0, |acc, t| Ok(acc + t.evaluate(factors)?)),
        }
    }

    /// Names of all factors referenced, in first-appearance order.
    pub fn factor_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Number(_) => {}
            Expression::Factor(n) => {
                if !out.contains(&n.as_str()) {
                    out.push(n);
                }
            }
            Expression::Product(ts) | Expression::Sum(ts) => {
                for t in ts {
                    t.collect_names(out);
                }
            }
        }
    }
}

/// Parses and evaluates `text` in one step.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use u_reliability::expression::evaluate;
///
/// let mut f = BTreeMap::new();
/// f.insert("lambdab".to_string(), 0.002);
/// f.insert("piQ".to_string(), 3.0);
/// f.insert("piE".to_string(), 10.0);
/// let lp = evaluate("lambdab * piQ * piE", &f).unwrap();
/// assert!((lp - 0.06).abs() < 1e-12);
/// ```
pub fn evaluate<F: AttributeProvider + ?Sized>(text: &str, factors: &F) -> Result<f64, EvaluationError> {
    Expression::parse(text)?.evaluate(factors)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Star,
    Plus,
    Open,
    Close,
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, EvaluationError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '*' => {
                out.push((i, Token::Star));
                i += 1;
            }
            '+' => {
                out.push((i, Token::Plus));
                i += 1;
            }
            '(' => {
                out.push((i, Token::Open));
                i += 1;
            }
            ')' => {
                out.push((i, Token::Close));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < bytes.len() {
                    let d = bytes[i] as char;
                    let exp_sign = (d == '-' || d == '+')
                        && i > start
                        && matches!(bytes[i - 1] as char, 'e' | 'E');
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exp_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let lit = &text[start..i];
                let v = lit.parse::<f64>().map_err(|_| EvaluationError::Malformed {
                    position: start,
                    message: format!("invalid number `{lit}`"),
                })?;
                out.push((start, Token::Number(v)));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len() && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                out.push((start, Token::Name(text[start..i].to_string())));
            }
            other => {
                return Err(EvaluationError::Malformed {
                    position: i,
                    message: format!("unsupported character `{other}`"),
                })
            }
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(p, _)| *p)
            .or_else(|| self.tokens.last().map(|(p, _)| p + 1))
            .unwrap_or(0)
    }

    fn sum(&mut self) -> Result<Expression, EvaluationError> {
        let mut terms = vec![self.product()?];
        while self.peek() == Some(&Token::Plus) {
            self.pos += 1;
            terms.push(self.product()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expression::Sum(terms)
        })
    }

    fn product(&mut self) -> Result<Expression, EvaluationError> {
        let mut terms = vec![self.atom()?];
        while self.peek() == Some(&Token::Star) {
            self.pos += 1;
            terms.push(self.atom()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expression::Product(terms)
        })
    }

    fn atom(&mut self) -> Result<Expression, EvaluationError> {
        let position = self.position();
        match self.tokens.get(self.pos).map(|(_, t)| t.clone()) {
            Some(Token::Number(v)) => {
                self.pos += 1;
                Ok(Expression::Number(v))
            }
            Some(Token::Name(n)) => {
                self.pos += 1;
                Ok(Expression::Factor(n))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let inner = self.sum()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(EvaluationError::Malformed {
                        position: self.position(),
                        message: "expected `)`".into(),
                    });
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(tok) => Err(EvaluationError::Malformed {
                position,
                message: format!("expected factor, found {tok:?}"),
            }),
            None => Err(EvaluationError::Malformed {
                position,
                message: "unexpected end of expression".into(),
            }),
        }
    }
}
