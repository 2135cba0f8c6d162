//! ECMAScript-family engine.
//!
//! A restricted tree-walking interpreter: lexer, recursive-descent parser,
//! and evaluator over a small value set. The program sees only a captured
//! `print`/`console.log` surface and a whitelist of pure builtins; there
//! is no dynamic code construction and no path to host resources. A step
//! budget and an output cap bound every run.
//!
//! Supported subset: `let`/`const`/`var` declarations and assignment,
//! number/string/boolean/array literals, template literals, arithmetic
//! and comparison operators, `if`/`else`, `for`/`while` loops, postfix
//! `++`/`--`, `throw`, `Math.*`, and a few string/array methods. Scoping
//! is a single flat environment.

use crate::trait_::{EngineOutput, Executable};
use scriptorium_core::{CoreResult, Language};
use std::collections::HashMap;

const DEFAULT_MAX_STEPS: u64 = 100_000;
const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Restricted ECMAScript-family interpreter
pub struct EcmaEngine {
    max_steps: u64,
    max_output_bytes: usize,
}

impl EcmaEngine {
    /// Create an engine with default budgets
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    /// Set the step budget
    #[must_use]
    pub fn with_max_steps(mut self, max: u64) -> Self {
        self.max_steps = max;
        self
    }

    /// Set the output byte cap
    #[must_use]
    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }
}

impl Default for EcmaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Executable for EcmaEngine {
    fn language(&self) -> Language {
        Language::EcmaScript
    }

    fn run(&self, code: &str) -> CoreResult<EngineOutput> {
        let tokens = match lex(code) {
            Ok(tokens) => tokens,
            Err(message) => return Ok(EngineOutput::failure(format!("syntax error: {}", message))),
        };
        let program = match Parser::new(tokens).parse_program() {
            Ok(program) => program,
            Err(message) => return Ok(EngineOutput::failure(format!("syntax error: {}", message))),
        };

        let mut interp = Interp::new(self.max_steps, self.max_output_bytes);
        match interp.exec_stmts(&program) {
            Ok(()) => Ok(EngineOutput::success(interp.out)),
            Err(EvalError { message }) => Ok(EngineOutput::failure(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Str(String),
    Ident(String),
    Template(Vec<TplTok>),
    Let,
    Const,
    Var,
    If,
    Else,
    For,
    While,
    True,
    False,
    Null,
    Throw,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
enum TplTok {
    Lit(String),
    Expr(String),
}

fn keyword(word: &str) -> Option<Tok> {
    match word {
        "let" => Some(Tok::Let),
        "const" => Some(Tok::Const),
        "var" => Some(Tok::Var),
        "if" => Some(Tok::If),
        "else" => Some(Tok::Else),
        "for" => Some(Tok::For),
        "while" => Some(Tok::While),
        "true" => Some(Tok::True),
        "false" => Some(Tok::False),
        "null" => Some(Tok::Null),
        "throw" => Some(Tok::Throw),
        _ => None,
    }
}

fn lex(source: &str) -> Result<Vec<Tok>, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                if i + 1 >= chars.len() {
                    return Err("unterminated comment".to_string());
                }
                i += 2;
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value: f64 = text
                    .parse()
                    .map_err(|_| format!("invalid number: {}", text))?;
                tokens.push(Tok::Num(value));
            }
            '"' | '\'' => {
                let (text, next) = lex_string(&chars, i, c)?;
                tokens.push(Tok::Str(text));
                i = next;
            }
            '`' => {
                let (parts, next) = lex_template(&chars, i)?;
                tokens.push(Tok::Template(parts));
                i = next;
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(keyword(&word).unwrap_or(Tok::Ident(word)));
            }
            _ => {
                let (token, width) = lex_punct(&chars, i)?;
                tokens.push(token);
                i += width;
            }
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &[char], start: usize, quote: char) -> Result<(String, usize), String> {
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let escaped = chars.get(i + 1).ok_or("unterminated string")?;
                text.push(unescape(*escaped));
                i += 2;
            }
            c if c == quote => return Ok((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err("unterminated string".to_string())
}

fn lex_template(chars: &[char], start: usize) -> Result<(Vec<TplTok>, usize), String> {
    let mut parts = Vec::new();
    let mut lit = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '`' => {
                if !lit.is_empty() {
                    parts.push(TplTok::Lit(lit));
                }
                return Ok((parts, i + 1));
            }
            '\\' => {
                let escaped = chars.get(i + 1).ok_or("unterminated template literal")?;
                lit.push(unescape(*escaped));
                i += 2;
            }
            '$' if chars.get(i + 1) == Some(&'{') => {
                if !lit.is_empty() {
                    parts.push(TplTok::Lit(std::mem::take(&mut lit)));
                }
                let mut depth = 1;
                let mut expr = String::new();
                i += 2;
                while i < chars.len() && depth > 0 {
                    match chars[i] {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    if depth > 0 {
                        expr.push(chars[i]);
                    }
                    i += 1;
                }
                if depth > 0 {
                    return Err("unterminated template expression".to_string());
                }
                parts.push(TplTok::Expr(expr));
            }
            c => {
                lit.push(c);
                i += 1;
            }
        }
    }
    Err("unterminated template literal".to_string())
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

fn lex_punct(chars: &[char], i: usize) -> Result<(Tok, usize), String> {
    let two: String = chars[i..chars.len().min(i + 2)].iter().collect();
    let three: String = chars[i..chars.len().min(i + 3)].iter().collect();

    // Strict and loose equality collapse in this subset
    if three == "===" {
        return Ok((Tok::EqEq, 3));
    }
    if three == "!==" {
        return Ok((Tok::NotEq, 3));
    }
    match two.as_str() {
        "==" => return Ok((Tok::EqEq, 2)),
        "!=" => return Ok((Tok::NotEq, 2)),
        "<=" => return Ok((Tok::Le, 2)),
        ">=" => return Ok((Tok::Ge, 2)),
        "&&" => return Ok((Tok::AndAnd, 2)),
        "||" => return Ok((Tok::OrOr, 2)),
        "++" => return Ok((Tok::PlusPlus, 2)),
        "--" => return Ok((Tok::MinusMinus, 2)),
        "+=" => return Ok((Tok::PlusEq, 2)),
        "-=" => return Ok((Tok::MinusEq, 2)),
        "*=" => return Ok((Tok::StarEq, 2)),
        "/=" => return Ok((Tok::SlashEq, 2)),
        _ => {}
    }
    let token = match chars[i] {
        '+' => Tok::Plus,
        '-' => Tok::Minus,
        '*' => Tok::Star,
        '/' => Tok::Slash,
        '%' => Tok::Percent,
        '=' => Tok::Assign,
        '<' => Tok::Lt,
        '>' => Tok::Gt,
        '!' => Tok::Bang,
        '(' => Tok::LParen,
        ')' => Tok::RParen,
        '{' => Tok::LBrace,
        '}' => Tok::RBrace,
        '[' => Tok::LBracket,
        ']' => Tok::RBracket,
        ',' => Tok::Comma,
        ';' => Tok::Semi,
        '.' => Tok::Dot,
        other => return Err(format!("unexpected character: {}", other)),
    };
    Ok((token, 1))
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Array(Vec<Expr>),
    Ident(String),
    Template(Vec<TplPart>),
    Unary {
        negate: bool,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        target: String,
        op: Option<BinOp>,
        value: Box<Expr>,
    },
    Postfix {
        target: String,
        increment: bool,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        target: Box<Expr>,
        name: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone)]
enum TplPart {
    Lit(String),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone)]
enum Stmt {
    Decl {
        name: String,
        init: Option<Expr>,
    },
    Expr(Expr),
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Throw(Expr),
    Block(Vec<Stmt>),
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Tok>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Tok> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Tok) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Tok) -> Result<(), String> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {:?}", token, self.peek()))
        }
    }

    fn parse_program(&mut self) -> Result<Vec<Stmt>, String> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, String> {
        match self.peek() {
            Some(Tok::Let) | Some(Tok::Const) | Some(Tok::Var) => {
                let stmt = self.parse_decl()?;
                self.eat(&Tok::Semi);
                Ok(stmt)
            }
            Some(Tok::If) => self.parse_if(),
            Some(Tok::For) => self.parse_for(),
            Some(Tok::While) => self.parse_while(),
            Some(Tok::Throw) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.eat(&Tok::Semi);
                Ok(Stmt::Throw(expr))
            }
            Some(Tok::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            Some(Tok::Semi) => {
                self.advance();
                Ok(Stmt::Block(Vec::new()))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.eat(&Tok::Semi);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_decl(&mut self) -> Result<Stmt, String> {
        self.advance(); // let / const / var
        let name = match self.advance() {
            Some(Tok::Ident(name)) => name,
            other => return Err(format!("expected identifier, found {:?}", other)),
        };
        let init = if self.eat(&Tok::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Stmt::Decl { name, init })
    }

    fn parse_if(&mut self) -> Result<Stmt, String> {
        self.advance(); // if
        self.expect(&Tok::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&Tok::RParen)?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.eat(&Tok::Else) {
            if self.peek() == Some(&Tok::If) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_body()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, String> {
        self.advance(); // for
        self.expect(&Tok::LParen)?;

        let init = if self.eat(&Tok::Semi) {
            None
        } else {
            let stmt = match self.peek() {
                Some(Tok::Let) | Some(Tok::Const) | Some(Tok::Var) => self.parse_decl()?,
                _ => Stmt::Expr(self.parse_expr()?),
            };
            self.expect(&Tok::Semi)?;
            Some(Box::new(stmt))
        };

        let cond = if self.peek() == Some(&Tok::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Tok::Semi)?;

        let step = if self.peek() == Some(&Tok::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Tok::RParen)?;

        let body = self.parse_body()?;
        Ok(Stmt::For {
            init,
            cond,
            step,
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, String> {
        self.advance(); // while
        self.expect(&Tok::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&Tok::RParen)?;
        let body = self.parse_body()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_body(&mut self) -> Result<Vec<Stmt>, String> {
        if self.peek() == Some(&Tok::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, String> {
        self.expect(&Tok::LBrace)?;
        let mut stmts = Vec::new();
        while self.peek().is_some() && self.peek() != Some(&Tok::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&Tok::RBrace)?;
        Ok(stmts)
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Expr, String> {
        let lhs = self.parse_or()?;
        let op = match self.peek() {
            Some(Tok::Assign) => None,
            Some(Tok::PlusEq) => Some(BinOp::Add),
            Some(Tok::MinusEq) => Some(BinOp::Sub),
            Some(Tok::StarEq) => Some(BinOp::Mul),
            Some(Tok::SlashEq) => Some(BinOp::Div),
            _ => return Ok(lhs),
        };
        self.advance();
        let target = match lhs {
            Expr::Ident(name) => name,
            _ => return Err("invalid assignment target".to_string()),
        };
        let value = self.parse_assign()?;
        Ok(Expr::Assign {
            target,
            op,
            value: Box::new(value),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Tok::OrOr) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary {
                op: BinOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Tok::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary {
                op: BinOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(Tok::EqEq) => BinOp::Eq,
                Some(Tok::NotEq) => BinOp::Ne,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Lt) => BinOp::Lt,
                Some(Tok::Le) => BinOp::Le,
                Some(Tok::Gt) => BinOp::Gt,
                Some(Tok::Ge) => BinOp::Ge,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::Div,
                Some(Tok::Percent) => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Tok::Minus) {
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                negate: true,
                expr: Box::new(expr),
            });
        }
        if self.eat(&Tok::Bang) {
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                negate: false,
                expr: Box::new(expr),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Tok::Dot) => {
                    self.advance();
                    let name = match self.advance() {
                        Some(Tok::Ident(name)) => name,
                        other => return Err(format!("expected member name, found {:?}", other)),
                    };
                    expr = Expr::Member {
                        target: Box::new(expr),
                        name,
                    };
                }
                Some(Tok::LBracket) => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&Tok::RBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Some(Tok::LParen) => {
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != Some(&Tok::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.eat(&Tok::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(&Tok::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Some(Tok::PlusPlus) | Some(Tok::MinusMinus) => {
                    let increment = self.peek() == Some(&Tok::PlusPlus);
                    let target = match expr {
                        Expr::Ident(ref name) => name.clone(),
                        _ => return Err("invalid increment target".to_string()),
                    };
                    self.advance();
                    expr = Expr::Postfix { target, increment };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Tok::Num(value)) => Ok(Expr::Number(value)),
            Some(Tok::Str(text)) => Ok(Expr::Str(text)),
            Some(Tok::True) => Ok(Expr::Bool(true)),
            Some(Tok::False) => Ok(Expr::Bool(false)),
            Some(Tok::Null) => Ok(Expr::Null),
            Some(Tok::Ident(name)) => Ok(Expr::Ident(name)),
            Some(Tok::Template(parts)) => {
                let mut mapped = Vec::with_capacity(parts.len());
                for part in parts {
                    match part {
                        TplTok::Lit(text) => mapped.push(TplPart::Lit(text)),
                        TplTok::Expr(source) => {
                            let tokens = lex(&source)?;
                            let mut inner = Parser::new(tokens);
                            let expr = inner.parse_expr()?;
                            if inner.peek().is_some() {
                                return Err("trailing tokens in template expression".to_string());
                            }
                            mapped.push(TplPart::Expr(Box::new(expr)));
                        }
                    }
                }
                Ok(Expr::Template(mapped))
            }
            Some(Tok::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(&Tok::RParen)?;
                Ok(expr)
            }
            Some(Tok::LBracket) => {
                let mut items = Vec::new();
                if self.peek() != Some(&Tok::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.eat(&Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RBracket)?;
                Ok(Expr::Array(items))
            }
            other => Err(format!("unexpected token: {:?}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Array(Vec<Value>),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Null => false,
            Self::Array(_) => true,
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Number(n) => display_number(*n),
            Self::Str(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Null => "null".to_string(),
            Self::Array(items) => items
                .iter()
                .map(Value::display)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::Array(_) => "array",
        }
    }
}

fn display_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

struct EvalError {
    message: String,
}

impl EvalError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

struct Interp {
    vars: HashMap<String, Value>,
    out: String,
    steps_left: u64,
    max_output_bytes: usize,
}

impl Interp {
    fn new(max_steps: u64, max_output_bytes: usize) -> Self {
        Self {
            vars: HashMap::new(),
            out: String::new(),
            steps_left: max_steps,
            max_output_bytes,
        }
    }

    fn charge(&mut self) -> Result<(), EvalError> {
        if self.steps_left == 0 {
            return Err(EvalError::new("step budget exhausted"));
        }
        self.steps_left -= 1;
        Ok(())
    }

    fn emit(&mut self, text: &str) -> Result<(), EvalError> {
        if self.out.len() + text.len() > self.max_output_bytes {
            return Err(EvalError::new("output limit exceeded"));
        }
        self.out.push_str(text);
        Ok(())
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<(), EvalError> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), EvalError> {
        self.charge()?;
        match stmt {
            Stmt::Decl { name, init } => {
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                self.vars.insert(name.clone(), value);
                Ok(())
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond)?.truthy() {
                    self.exec_stmts(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmts(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.exec_stmt(init)?;
                }
                loop {
                    self.charge()?;
                    if let Some(cond) = cond {
                        if !self.eval(cond)?.truthy() {
                            break;
                        }
                    }
                    self.exec_stmts(body)?;
                    if let Some(step) = step {
                        self.eval(step)?;
                    }
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                loop {
                    self.charge()?;
                    if !self.eval(cond)?.truthy() {
                        break;
                    }
                    self.exec_stmts(body)?;
                }
                Ok(())
            }
            Stmt::Throw(expr) => {
                let value = self.eval(expr)?;
                Err(EvalError::new(format!(
                    "uncaught exception: {}",
                    value.display()
                )))
            }
            Stmt::Block(stmts) => self.exec_stmts(stmts),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.charge()?;
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::Array(values))
            }
            Expr::Ident(name) => self
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::new(format!("{} is not defined", name))),
            Expr::Template(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        TplPart::Lit(lit) => text.push_str(lit),
                        TplPart::Expr(expr) => text.push_str(&self.eval(expr)?.display()),
                    }
                }
                Ok(Value::Str(text))
            }
            Expr::Unary { negate, expr } => {
                let value = self.eval(expr)?;
                if *negate {
                    match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(EvalError::new(format!(
                            "cannot negate a {}",
                            other.type_name()
                        ))),
                    }
                } else {
                    Ok(Value::Bool(!value.truthy()))
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                // Short-circuit before evaluating the right side
                if *op == BinOp::And {
                    let lhs = self.eval(lhs)?;
                    if !lhs.truthy() {
                        return Ok(Value::Bool(false));
                    }
                    return Ok(Value::Bool(self.eval(rhs)?.truthy()));
                }
                if *op == BinOp::Or {
                    let lhs = self.eval(lhs)?;
                    if lhs.truthy() {
                        return Ok(Value::Bool(true));
                    }
                    return Ok(Value::Bool(self.eval(rhs)?.truthy()));
                }
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.eval_binary(*op, lhs, rhs)
            }
            Expr::Assign { target, op, value } => {
                let value = self.eval(value)?;
                let value = match op {
                    None => value,
                    Some(op) => {
                        let current = self
                            .vars
                            .get(target)
                            .cloned()
                            .ok_or_else(|| EvalError::new(format!("{} is not defined", target)))?;
                        self.eval_binary(*op, current, value)?
                    }
                };
                self.vars.insert(target.clone(), value.clone());
                Ok(value)
            }
            Expr::Postfix { target, increment } => {
                let current = self
                    .vars
                    .get(target)
                    .cloned()
                    .ok_or_else(|| EvalError::new(format!("{} is not defined", target)))?;
                let Value::Number(n) = current else {
                    return Err(EvalError::new(format!(
                        "cannot increment a {}",
                        current.type_name()
                    )));
                };
                let next = if *increment { n + 1.0 } else { n - 1.0 };
                self.vars.insert(target.clone(), Value::Number(next));
                Ok(Value::Number(n))
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                let Value::Number(i) = index else {
                    return Err(EvalError::new("index must be a number"));
                };
                match target {
                    Value::Array(items) => Ok(items
                        .get(i as usize)
                        .cloned()
                        .unwrap_or(Value::Null)),
                    Value::Str(s) => Ok(s
                        .chars()
                        .nth(i as usize)
                        .map(|c| Value::Str(c.to_string()))
                        .unwrap_or(Value::Null)),
                    other => Err(EvalError::new(format!(
                        "cannot index a {}",
                        other.type_name()
                    ))),
                }
            }
            Expr::Member { target, name } => {
                let value = self.eval(target)?;
                match (value, name.as_str()) {
                    (Value::Str(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
                    (Value::Array(items), "length") => Ok(Value::Number(items.len() as f64)),
                    (other, name) => Err(EvalError::new(format!(
                        "unknown property {} on {}",
                        name,
                        other.type_name()
                    ))),
                }
            }
            Expr::Call { callee, args } => self.eval_call(callee, args),
        }
    }

    fn eval_binary(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
        use BinOp::*;
        match op {
            Add => match (&lhs, &rhs) {
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{}{}", lhs.display(), rhs.display())))
                }
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                _ => Err(EvalError::new(format!(
                    "cannot add {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                ))),
            },
            Sub | Mul | Div | Rem => {
                let (Value::Number(a), Value::Number(b)) = (&lhs, &rhs) else {
                    return Err(EvalError::new(format!(
                        "arithmetic needs numbers, got {} and {}",
                        lhs.type_name(),
                        rhs.type_name()
                    )));
                };
                let n = match op {
                    Sub => a - b,
                    Mul => a * b,
                    Div => a / b,
                    _ => a % b,
                };
                Ok(Value::Number(n))
            }
            Eq => Ok(Value::Bool(lhs == rhs)),
            Ne => Ok(Value::Bool(lhs != rhs)),
            Lt | Le | Gt | Ge => match (&lhs, &rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(match op {
                    Lt => a < b,
                    Le => a <= b,
                    Gt => a > b,
                    _ => a >= b,
                })),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(match op {
                    Lt => a < b,
                    Le => a <= b,
                    Gt => a > b,
                    _ => a >= b,
                })),
                _ => Err(EvalError::new(format!(
                    "cannot compare {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                ))),
            },
            And | Or => unreachable!("short-circuit ops handled in eval"),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, EvalError> {
        match callee {
            Expr::Ident(name) if name == "print" => self.call_print(args),
            Expr::Member { target, name } => match target.as_ref() {
                Expr::Ident(object) if object == "console" && name == "log" => {
                    self.call_print(args)
                }
                Expr::Ident(object) if object == "Math" => self.call_math(name, args),
                // arr.push(..) mutates the named variable in place
                Expr::Ident(variable) if name == "push" => {
                    let mut pushed = Vec::with_capacity(args.len());
                    for arg in args {
                        pushed.push(self.eval(arg)?);
                    }
                    let slot = self
                        .vars
                        .get_mut(variable)
                        .ok_or_else(|| EvalError::new(format!("{} is not defined", variable)))?;
                    let Value::Array(items) = slot else {
                        return Err(EvalError::new(format!(
                            "cannot push onto a {}",
                            slot.type_name()
                        )));
                    };
                    items.extend(pushed);
                    let len = items.len();
                    Ok(Value::Number(len as f64))
                }
                _ => {
                    let value = self.eval(target)?;
                    self.call_method(value, name, args)
                }
            },
            _ => Err(EvalError::new("not a function")),
        }
    }

    fn call_print(&mut self, args: &[Expr]) -> Result<Value, EvalError> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.eval(arg)?.display());
        }
        let line = format!("{}\n", parts.join(" "));
        self.emit(&line)?;
        Ok(Value::Null)
    }

    fn call_math(&mut self, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match self.eval(arg)? {
                Value::Number(n) => values.push(n),
                other => {
                    return Err(EvalError::new(format!(
                        "Math.{} needs numbers, got {}",
                        name,
                        other.type_name()
                    )));
                }
            }
        }
        let unary = |values: &[f64]| -> Result<f64, EvalError> {
            values
                .first()
                .copied()
                .ok_or_else(|| EvalError::new(format!("Math.{} needs an argument", name)))
        };
        let n = match name {
            "abs" => unary(&values)?.abs(),
            "floor" => unary(&values)?.floor(),
            "ceil" => unary(&values)?.ceil(),
            "round" => unary(&values)?.round(),
            "sqrt" => unary(&values)?.sqrt(),
            "pow" => {
                if values.len() != 2 {
                    return Err(EvalError::new("Math.pow needs two arguments"));
                }
                values[0].powf(values[1])
            }
            "min" => values.iter().copied().fold(f64::INFINITY, f64::min),
            "max" => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            _ => return Err(EvalError::new(format!("unknown builtin Math.{}", name))),
        };
        Ok(Value::Number(n))
    }

    fn call_method(&mut self, value: Value, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        if !args.is_empty() {
            return Err(EvalError::new(format!(
                "{} takes no arguments in this subset",
                name
            )));
        }
        match (value, name) {
            (Value::Str(s), "toUpperCase") => Ok(Value::Str(s.to_uppercase())),
            (Value::Str(s), "toLowerCase") => Ok(Value::Str(s.to_lowercase())),
            (other, name) => Err(EvalError::new(format!(
                "unknown method {} on {}",
                name,
                other.type_name()
            ))),
        }
    }
}
