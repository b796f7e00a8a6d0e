//! Formula parser
//!
//! Formula text is split into tokens up front, then parsed by binding power:
//! each infix operator carries a left and right power, so one loop handles
//! every precedence level and right-associative `^`.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{ErrorValue, FormulaError, FormulaResult};
use sheetgrid_core::{CellAddress, CellRange};

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use sheetgrid_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let body = formula
        .trim()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let tokens = tokenize(body)?;
    if tokens.is_empty() {
        return Err(FormulaError::Parse("Empty formula".into()));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression(0)?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            token
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Bool(bool),
    ErrorLit(ErrorValue),
    Cell(CellAddress),
    Name(String),
    /// Name immediately followed by `(`
    Call(String),
    Op(char),
    Compare(BinaryOperator),
    Colon,
    Comma,
    Open,
    Close,
}

// === Tokenizer ===

fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> FormulaResult<Option<Token>> {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match c {
            '+' | '-' | '*' | '/' | '^' | '%' | '&' => {
                self.chars.next();
                Token::Op(c)
            }
            ':' => self.single(Token::Colon),
            ',' => self.single(Token::Comma),
            '(' => self.single(Token::Open),
            ')' => self.single(Token::Close),
            '=' => self.single(Token::Compare(BinaryOperator::Equal)),
            '<' => {
                self.chars.next();
                if self.chars.next_if(|&(_, c)| c == '=').is_some() {
                    Token::Compare(BinaryOperator::LessEqual)
                } else if self.chars.next_if(|&(_, c)| c == '>').is_some() {
                    Token::Compare(BinaryOperator::NotEqual)
                } else {
                    Token::Compare(BinaryOperator::LessThan)
                }
            }
            '>' => {
                self.chars.next();
                if self.chars.next_if(|&(_, c)| c == '=').is_some() {
                    Token::Compare(BinaryOperator::GreaterEqual)
                } else {
                    Token::Compare(BinaryOperator::GreaterThan)
                }
            }
            '"' => self.text()?,
            '#' => self.error_literal(start),
            c if c.is_ascii_digit() || c == '.' => self.number(start)?,
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => self.word(start),
            other => {
                return Err(FormulaError::Parse(format!(
                    "Unexpected character '{}'",
                    other
                )))
            }
        };
        Ok(Some(token))
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn end_of_run(&mut self, start: usize, keep: impl Fn(char) -> bool) -> usize {
        while self.chars.next_if(|&(_, c)| keep(c)).is_some() {}
        self.chars.peek().map_or(self.input.len(), |&(i, _)| i).max(start)
    }

    fn text(&mut self) -> FormulaResult<Token> {
        self.chars.next();
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, '"')) => {
                    if self.chars.next_if(|&(_, c)| c == '"').is_some() {
                        text.push('"');
                    } else {
                        return Ok(Token::Text(text));
                    }
                }
                Some((_, c)) => text.push(c),
                None => return Err(FormulaError::Parse("Unterminated string literal".into())),
            }
        }
    }

    fn number(&mut self, start: usize) -> FormulaResult<Token> {
        let mut end = self.end_of_run(start, |c| c.is_ascii_digit() || c == '.');

        // Exponent only when a digit or sign follows the `e`
        let rest = &self.input[end..];
        let mut exp = rest.chars();
        if matches!(exp.next(), Some('e' | 'E'))
            && matches!(exp.next(), Some(c) if c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.chars.next();
            self.chars.next_if(|&(_, c)| c == '+' || c == '-');
            end = self.end_of_run(end, |c| c.is_ascii_digit());
        }

        let lexeme = &self.input[start..end];
        lexeme
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", lexeme)))
    }

    fn error_literal(&mut self, start: usize) -> Token {
        self.chars.next();
        let end = self.end_of_run(start, |c| {
            c.is_ascii_alphanumeric() || matches!(c, '!' | '/' | '?')
        });
        let lexeme = &self.input[start..end];
        match ErrorValue::parse(lexeme) {
            Some(e) => Token::ErrorLit(e),
            None => Token::Name(lexeme.to_string()),
        }
    }

    fn word(&mut self, start: usize) -> Token {
        let end = self.end_of_run(start, |c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.')
        });
        let word = &self.input[start..end];

        if self.input[end..].trim_start().starts_with('(') {
            // TRUE( and LOG10( are calls, not literals or references
            return Token::Call(word.to_uppercase());
        }
        if word.eq_ignore_ascii_case("true") {
            return Token::Bool(true);
        }
        if word.eq_ignore_ascii_case("false") {
            return Token::Bool(false);
        }
        match CellAddress::parse(word) {
            Ok(addr) if looks_like_reference(word) => Token::Cell(addr),
            _ => Token::Name(word.to_string()),
        }
    }
}

/// `[$]letters[$]digits` and nothing else
fn looks_like_reference(word: &str) -> bool {
    let body = word.strip_prefix('$').unwrap_or(word);
    let digits_at = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let (letters, rest) = body.split_at(digits_at);
    let digits = rest.strip_prefix('$').unwrap_or(rest);
    !letters.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// === Parser ===

/// Prefix `-` binds tighter than `^`, so `-2^2` is 4
const PREFIX_POWER: u8 = 11;
const PERCENT_POWER: u8 = 13;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_close(&mut self) -> FormulaResult<()> {
        if self.eat(&Token::Close) {
            Ok(())
        } else {
            Err(FormulaError::Parse(match self.peek() {
                Some(token) => format!("Expected ')', got {:?}", token),
                None => "Expected ')' before end of formula".into(),
            }))
        }
    }

    /// Parse operators whose left power is at least `min_power`
    fn expression(&mut self, min_power: u8) -> FormulaResult<FormulaExpr> {
        let mut lhs = self.prefix()?;

        loop {
            if self.peek() == Some(&Token::Op('%')) {
                if PERCENT_POWER < min_power {
                    break;
                }
                self.pos += 1;
                lhs = FormulaExpr::UnaryOp {
                    op: UnaryOperator::Percent,
                    operand: Box::new(lhs),
                };
                continue;
            }

            let Some((op, left, right)) = self.peek().and_then(infix_power) else {
                break;
            };
            if left < min_power {
                break;
            }
            self.pos += 1;
            let rhs = self.expression(right)?;
            lhs = FormulaExpr::BinaryOp {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn prefix(&mut self) -> FormulaResult<FormulaExpr> {
        let token = self
            .bump()
            .ok_or_else(|| FormulaError::Parse("Unexpected end of formula".into()))?;

        match token {
            Token::Op('-') => Ok(FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(self.expression(PREFIX_POWER)?),
            }),
            Token::Op('+') => self.expression(PREFIX_POWER),
            Token::Number(n) => Ok(FormulaExpr::Number(n)),
            Token::Text(s) => Ok(FormulaExpr::String(s)),
            Token::Bool(b) => Ok(FormulaExpr::Boolean(b)),
            Token::ErrorLit(e) => Ok(FormulaExpr::Error(e)),
            Token::Name(name) => Ok(FormulaExpr::NameRef(name)),
            Token::Cell(start) => {
                if !self.eat(&Token::Colon) {
                    return Ok(FormulaExpr::CellRef(start));
                }
                match self.bump() {
                    Some(Token::Cell(end)) => Ok(FormulaExpr::RangeRef(CellRange::new(start, end))),
                    _ => Err(FormulaError::Parse(
                        "Range operator ':' requires cell references on both sides".into(),
                    )),
                }
            }
            Token::Open => {
                let inner = self.expression(0)?;
                self.expect_close()?;
                Ok(inner)
            }
            Token::Call(name) => self.call(name),
            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }

    fn call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        if !self.eat(&Token::Open) {
            return Err(FormulaError::Parse(format!("Expected '(' after {}", name)));
        }

        let mut args = Vec::new();
        if !self.eat(&Token::Close) {
            loop {
                args.push(self.expression(0)?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect_close()?;
        }

        Ok(FormulaExpr::Function { name, args })
    }
}

/// Operator and (left, right) binding powers of an infix token
fn infix_power(token: &Token) -> Option<(BinaryOperator, u8, u8)> {
    let entry = match token {
        Token::Compare(op) => (*op, 1, 2),
        Token::Op('&') => (BinaryOperator::Concat, 3, 4),
        Token::Op('+') => (BinaryOperator::Add, 5, 6),
        Token::Op('-') => (BinaryOperator::Subtract, 5, 6),
        Token::Op('*') => (BinaryOperator::Multiply, 7, 8),
        Token::Op('/') => (BinaryOperator::Divide, 7, 8),
        Token::Op('^') => (BinaryOperator::Power, 10, 9),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> FormulaExpr {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn num(n: f64) -> FormulaExpr {
        FormulaExpr::Number(n)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), num(42.0));
        assert_eq!(parse_formula("=3.5").unwrap(), num(3.5));
        assert_eq!(parse_formula("=.5").unwrap(), num(0.5));
        assert_eq!(parse_formula("=1e3").unwrap(), num(1000.0));
        assert_eq!(parse_formula("=2.5E-1").unwrap(), num(0.25));
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(
            parse_formula("=\"say \"\"hi\"\"\"").unwrap(),
            FormulaExpr::String("say \"hi\"".into())
        );
        assert!(parse_formula("=\"open").is_err());
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_formula("=TRUE").unwrap(), FormulaExpr::Boolean(true));
        assert_eq!(parse_formula("=false").unwrap(), FormulaExpr::Boolean(false));
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(
            parse_formula("=1+2*3").unwrap(),
            bin(BinaryOperator::Add, num(1.0), bin(BinaryOperator::Multiply, num(2.0), num(3.0)))
        );
        assert_eq!(
            parse_formula("=8-2-1").unwrap(),
            bin(BinaryOperator::Subtract, bin(BinaryOperator::Subtract, num(8.0), num(2.0)), num(1.0))
        );
        assert_eq!(
            parse_formula("=2^3^2").unwrap(),
            bin(BinaryOperator::Power, num(2.0), bin(BinaryOperator::Power, num(3.0), num(2.0)))
        );
        assert_eq!(
            parse_formula("=1&2=\"12\"").unwrap(),
            bin(
                BinaryOperator::Equal,
                bin(BinaryOperator::Concat, num(1.0), num(2.0)),
                FormulaExpr::String("12".into())
            )
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_power() {
        let negated = FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(num(2.0)),
        };
        assert_eq!(
            parse_formula("=-2^2").unwrap(),
            bin(BinaryOperator::Power, negated, num(2.0))
        );
        assert_eq!(
            parse_formula("=50%*2").unwrap(),
            bin(
                BinaryOperator::Multiply,
                FormulaExpr::UnaryOp {
                    op: UnaryOperator::Percent,
                    operand: Box::new(num(50.0)),
                },
                num(2.0)
            )
        );
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            parse_formula("=B3").unwrap(),
            FormulaExpr::CellRef(CellAddress::new(2, 1))
        );
        assert_eq!(
            parse_formula("=$A$1").unwrap(),
            FormulaExpr::CellRef(CellAddress::with_absolute(0, 0, true, true))
        );
        assert_eq!(
            parse_formula("=LOG10").unwrap(),
            FormulaExpr::CellRef(CellAddress::parse("LOG10").unwrap())
        );
        assert_eq!(
            parse_formula("=profit").unwrap(),
            FormulaExpr::NameRef("profit".into())
        );
    }

    #[test]
    fn test_parse_range_reference() {
        assert_eq!(
            parse_formula("=SUM(B2:A1)").unwrap(),
            FormulaExpr::Function {
                name: "SUM".into(),
                args: vec![FormulaExpr::RangeRef(CellRange::from_indices(0, 0, 1, 1))],
            }
        );
    }

    #[test]
    fn test_parse_function_name_is_uppercased() {
        match parse_formula("=sum(1, 2)").unwrap() {
            FormulaExpr::Function { name, args } => {
                assert_eq!(name, "SUM");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected AST: {:?}", other),
        }
        assert_eq!(
            parse_formula("=TRUE ()").unwrap(),
            FormulaExpr::Function {
                name: "TRUE".into(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_parse_error_literal() {
        assert_eq!(
            parse_formula("=#DIV/0!").unwrap(),
            FormulaExpr::Error(ErrorValue::Div0)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("1+2").is_err());
        assert!(parse_formula("=").is_err());
        assert!(parse_formula("=1+").is_err());
        assert!(parse_formula("=(1+2").is_err());
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("=1:2").is_err());
        assert!(parse_formula("=A1 @ 2").is_err());
        assert!(parse_formula("=SUM(1,)").is_err());
        assert!(parse_formula("=1..2").is_err());
    }

    #[test]
    fn test_references() {
        let ast = parse_formula("=A1+SUM(B1:B3)*C2").unwrap();
        assert_eq!(
            ast.references(),
            vec![
                CellRange::single(CellAddress::new(0, 0)),
                CellRange::from_indices(0, 1, 2, 1),
                CellRange::single(CellAddress::new(1, 2)),
            ]
        );
    }
}
