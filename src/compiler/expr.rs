//! Expression and statement syntax used between template delimiters.

use super::value::number;
use crate::error::{Error, Result};
use serde_json::Value;

/// Expression tree evaluated against the render context.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    /// `object.property` or `object[property]`
    Member {
        object: Box<Expression>,
        property: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Array(Vec<Expression>),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Nullish,
}

/// A single statement between statement delimiters.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    If(Expression),
    ElseIf(Expression),
    Else,
    End,
    For {
        item: String,
        key: Option<String>,
        iterable: Expression,
    },
    Assign {
        target: String,
        value: Expression,
    },
    Eval(Expression),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Punct(&'static str),
}

// Longest operators first so `===` is not read as `==` followed by `=`.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "(", ")", "[", "]", ",", ".",
    "?", ":", "!", "-", "+", "*", "/", "%", "<", ">", "=",
];

fn tokenize(code: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '\'' || c == '"' {
            let (text, next) = read_string(&chars, i)?;
            tokens.push(Token::Str(text));
            i = next;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| Error::Syntax(format!("invalid number '{text}'")))?;
            tokens.push(Token::Num(value));
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
            let punct = PUNCTUATION
                .iter()
                .find(|p| rest.starts_with(**p))
                .ok_or_else(|| Error::Syntax(format!("unexpected character '{c}' in '{code}'")))?;
            tokens.push(Token::Punct(punct));
            i += punct.chars().count();
        }
    }

    Ok(tokens)
}

fn read_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| Error::Syntax("unterminated string literal".to_string()))?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => *other,
                });
                i += 2;
            }
            c if c == quote => return Ok((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(Error::Syntax("unterminated string literal".to_string()))
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(code: &str) -> Result<Self> {
        Ok(Self { tokens: tokenize(code)?, position: 0 })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(Error::Syntax(format!("expected '{punct}', found {}", self.describe())))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            other => Err(Error::Syntax(format!("expected an identifier, found {other:?}"))),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(Error::Syntax(format!("unexpected {}", self.describe()))),
        }
    }

    fn describe(&self) -> String {
        match self.peek() {
            Some(Token::Ident(name)) => format!("'{name}'"),
            Some(Token::Str(text)) => format!("string '{text}'"),
            Some(Token::Num(n)) => format!("number {n}"),
            Some(Token::Punct(p)) => format!("'{p}'"),
            None => "end of input".to_string(),
        }
    }

    fn expression(&mut self) -> Result<Expression> {
        let condition = self.logical_or()?;
        if self.eat("?") {
            let then = self.expression()?;
            self.expect(":")?;
            let otherwise = self.expression()?;
            return Ok(Expression::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(condition)
    }

    fn logical_or(&mut self) -> Result<Expression> {
        let mut left = self.logical_and()?;
        loop {
            let op = if self.eat("||") {
                BinaryOperator::Or
            } else if self.eat("??") {
                BinaryOperator::Nullish
            } else {
                return Ok(left);
            };
            let right = self.logical_and()?;
            left = binary(left, op, right);
        }
    }

    fn logical_and(&mut self) -> Result<Expression> {
        let mut left = self.equality()?;
        while self.eat("&&") {
            let right = self.equality()?;
            left = binary(left, BinaryOperator::And, right);
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expression> {
        let mut left = self.comparison()?;
        loop {
            let op = if self.eat("===") || self.eat("==") {
                BinaryOperator::Eq
            } else if self.eat("!==") || self.eat("!=") {
                BinaryOperator::NotEq
            } else {
                return Ok(left);
            };
            let right = self.comparison()?;
            left = binary(left, op, right);
        }
    }

    fn comparison(&mut self) -> Result<Expression> {
        let mut left = self.additive()?;
        loop {
            let op = if self.eat("<=") {
                BinaryOperator::Le
            } else if self.eat(">=") {
                BinaryOperator::Ge
            } else if self.eat("<") {
                BinaryOperator::Lt
            } else if self.eat(">") {
                BinaryOperator::Gt
            } else {
                return Ok(left);
            };
            let right = self.additive()?;
            left = binary(left, op, right);
        }
    }

    fn additive(&mut self) -> Result<Expression> {
        let mut left = self.multiplicative()?;
        loop {
            let op = if self.eat("+") {
                BinaryOperator::Add
            } else if self.eat("-") {
                BinaryOperator::Sub
            } else {
                return Ok(left);
            };
            let right = self.multiplicative()?;
            left = binary(left, op, right);
        }
    }

    fn multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.unary()?;
        loop {
            let op = if self.eat("*") {
                BinaryOperator::Mul
            } else if self.eat("/") {
                BinaryOperator::Div
            } else if self.eat("%") {
                BinaryOperator::Rem
            } else {
                return Ok(left);
            };
            let right = self.unary()?;
            left = binary(left, op, right);
        }
    }

    fn unary(&mut self) -> Result<Expression> {
        let op = if self.eat("!") {
            UnaryOperator::Not
        } else if self.eat("-") {
            UnaryOperator::Neg
        } else {
            return self.postfix();
        };
        let operand = self.unary()?;
        Ok(Expression::Unary { op, operand: Box::new(operand) })
    }

    fn postfix(&mut self) -> Result<Expression> {
        let mut expression = self.primary()?;
        loop {
            if self.eat(".") {
                let property = self.expect_ident()?;
                expression = Expression::Member {
                    object: Box::new(expression),
                    property: Box::new(Expression::Literal(Value::String(property))),
                };
            } else if self.eat("[") {
                let property = self.expression()?;
                self.expect("]")?;
                expression = Expression::Member {
                    object: Box::new(expression),
                    property: Box::new(property),
                };
            } else if self.eat("(") {
                let args = self.list(")")?;
                expression = Expression::Call { callee: Box::new(expression), args };
            } else {
                return Ok(expression);
            }
        }
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(Expression::Literal(number(n))),
            Some(Token::Str(text)) => Ok(Expression::Literal(Value::String(text))),
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" => Expression::Literal(Value::Bool(true)),
                "false" => Expression::Literal(Value::Bool(false)),
                "null" | "undefined" => Expression::Literal(Value::Null),
                _ => Expression::Variable(name),
            }),
            Some(Token::Punct("(")) => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(Token::Punct("[")) => Ok(Expression::Array(self.list("]")?)),
            other => Err(Error::Syntax(format!("unexpected token {other:?}"))),
        }
    }

    /// Comma-separated expressions up to the closing punctuation.
    fn list(&mut self, close: &str) -> Result<Vec<Expression>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.expression()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(",")?;
        }
    }
}

fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::Binary { left: Box::new(left), op, right: Box::new(right) }
}

/// Parses a full expression; trailing tokens are an error.
pub fn parse_expression(code: &str) -> Result<Expression> {
    let mut parser = Parser::new(code)?;
    let expression = parser.expression()?;
    parser.expect_end()?;
    Ok(expression)
}

/// Parses statement code.
///
/// Both keyword forms (`if x`, `else`, `end`, `for item in items`) and
/// brace forms (`if (x) {`, `} else {`, `}`, `for (const item of items) {`)
/// are accepted. `context_name` allows `$.key = value` assignments.
pub fn parse_statement(code: &str, context_name: &str) -> Result<Statement> {
    let mut code = code.trim().trim_end_matches(';').trim();
    if let Some(rest) = code.strip_prefix('}') {
        code = rest.trim();
        if code.is_empty() {
            return Ok(Statement::End);
        }
    }
    if let Some(rest) = code.strip_suffix('{') {
        code = rest.trim();
    }

    match code {
        "end" | "endif" | "endfor" => return Ok(Statement::End),
        "else" => return Ok(Statement::Else),
        _ => {}
    }

    if let Some(rest) = keyword(code, "else if").or_else(|| keyword(code, "elif")) {
        return Ok(Statement::ElseIf(parse_expression(rest)?));
    }
    if let Some(rest) = keyword(code, "if") {
        return Ok(Statement::If(parse_expression(rest)?));
    }
    if let Some(rest) = keyword(code, "for") {
        return parse_for(rest);
    }

    let (code, declared) = match ["let", "set", "var", "const"]
        .iter()
        .find_map(|kw| keyword(code, kw))
    {
        Some(rest) => (rest, true),
        None => (code, false),
    };

    let mut parser = Parser::new(code)?;
    if let Some(target) = assignment_target(&mut parser, context_name) {
        let value = parser.expression()?;
        parser.expect_end()?;
        return Ok(Statement::Assign { target, value });
    }
    if declared {
        return Err(Error::Syntax(format!("expected an assignment, found '{code}'")));
    }
    let expression = parser.expression()?;
    parser.expect_end()?;
    Ok(Statement::Eval(expression))
}

fn parse_for(code: &str) -> Result<Statement> {
    let mut code = code.trim();
    if code.starts_with('(') && code.ends_with(')') {
        code = code[1..code.len() - 1].trim();
    }
    if let Some(rest) = ["const", "let", "var"].iter().find_map(|kw| keyword(code, kw)) {
        code = rest;
    }

    let mut parser = Parser::new(code)?;
    let item = parser.expect_ident()?;
    let key = if parser.eat(",") { Some(parser.expect_ident()?) } else { None };
    match parser.advance() {
        Some(Token::Ident(word)) if word == "in" || word == "of" => {}
        other => {
            return Err(Error::Syntax(format!("expected 'in' in for loop, found {other:?}")))
        }
    }
    let iterable = parser.expression()?;
    parser.expect_end()?;
    Ok(Statement::For { item, key, iterable })
}

/// Consumes `name =` or `<context>.name =` and returns the target key.
fn assignment_target(parser: &mut Parser, context_name: &str) -> Option<String> {
    match parser.tokens.as_slice() {
        [Token::Ident(name), Token::Punct("="), ..] => {
            let name = name.clone();
            parser.position = 2;
            Some(name)
        }
        [Token::Ident(ctx), Token::Punct("."), Token::Ident(name), Token::Punct("="), ..]
            if ctx == context_name =>
        {
            let name = name.clone();
            parser.position = 4;
            Some(name)
        }
        _ => None,
    }
}

/// Strips a leading keyword followed by whitespace or `(`.
fn keyword<'a>(code: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = code.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if c.is_whitespace() || c == '(' => Some(rest.trim()),
        _ => None,
    }
}
