//! Recursive-descent parser producing statements.

use std::sync::Arc;

use super::lexer::{tokenize, Tok, Token};

/// Deepest expression tree the parser builds. Evaluation recurses per node.
const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BinOp {
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

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Num(f64),
    Str(String),
    Bool(bool),
    Var { name: String, offset: usize },
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    Let(String, Expr),
    Fn(String, Arc<FnDef>),
    Expr(Expr),
}

#[derive(Debug, PartialEq)]
pub(crate) struct FnDef {
    pub params: Vec<String>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParseError {
    pub message: String,
    pub offset: usize,
}

pub(crate) fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let tokens = tokenize(source).map_err(|e| ParseError {
        message: e.message,
        offset: e.offset,
    })?;
    Parser {
        tokens,
        pos: 0,
        depth: 0,
    }
    .program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].tok
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError {
            message: format!("expected {expected}, found {}", self.peek().describe()),
            offset: self.offset(),
        }
    }

    fn expect(&mut self, tok: Tok, expected: &str) -> Result<(), ParseError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn nest(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError {
                message: "expression nested too deeply".into(),
                offset: self.offset(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn ident(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek().clone() {
            Tok::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn program(mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            while self.eat(&Tok::Sep) {}
            if *self.peek() == Tok::Eof {
                return Ok(stmts);
            }
            stmts.push(self.statement()?);
            match self.peek() {
                Tok::Sep | Tok::Eof => {}
                _ => return Err(self.unexpected("end of statement")),
            }
        }
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Tok::Let => {
                self.advance();
                let name = self.ident("a name after `let`")?;
                self.expect(Tok::Assign, "`=`")?;
                Ok(Stmt::Let(name, self.expr()?))
            }
            Tok::Fn => {
                self.advance();
                let name = self.ident("a function name")?;
                self.expect(Tok::LParen, "`(`")?;
                let mut params = Vec::new();
                if !self.eat(&Tok::RParen) {
                    loop {
                        params.push(self.ident("a parameter name")?);
                        if self.eat(&Tok::RParen) {
                            break;
                        }
                        self.expect(Tok::Comma, "`,` or `)`")?;
                    }
                }
                self.expect(Tok::Assign, "`=`")?;
                let body = self.expr()?;
                Ok(Stmt::Fn(name, Arc::new(FnDef { params, body })))
            }
            _ => Ok(Stmt::Expr(self.expr()?)),
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.nest()?;
        let expr = self.conditional();
        self.depth -= 1;
        expr
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Tok::If) {
            let cond = self.expr()?;
            self.expect(Tok::Then, "`then`")?;
            let then = self.expr()?;
            self.expect(Tok::Else, "`else`")?;
            let otherwise = self.expr()?;
            return Ok(Expr::If(Box::new(cond), Box::new(then), Box::new(otherwise)));
        }
        self.binary(0)
    }

    /// Precedence climbing over the binary operator table.
    /// Every operator folded into `lhs` deepens the tree by one level.
    fn binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let entered = self.depth;
        let folded = self.fold_binary(min_prec);
        self.depth = entered;
        folded
    }

    fn fold_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some((op, prec)) = binary_op(self.peek()) {
            if prec < min_prec {
                break;
            }
            self.nest()?;
            self.advance();
            let rhs = self.binary(prec + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.eat(&Tok::Minus) {
            UnOp::Neg
        } else if self.eat(&Tok::Bang) {
            UnOp::Not
        } else {
            return self.primary();
        };
        self.nest()?;
        let operand = self.unary();
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand?)))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let offset = self.offset();
        match self.peek().clone() {
            Tok::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Tok::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Tok::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Tok::Ident(name) => {
                self.advance();
                if !self.eat(&Tok::LParen) {
                    return Ok(Expr::Var { name, offset });
                }
                let mut args = Vec::new();
                if !self.eat(&Tok::RParen) {
                    loop {
                        args.push(self.expr()?);
                        if self.eat(&Tok::RParen) {
                            break;
                        }
                        self.expect(Tok::Comma, "`,` or `)`")?;
                    }
                }
                Ok(Expr::Call { name, args })
            }
            Tok::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(Tok::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

fn binary_op(tok: &Tok) -> Option<(BinOp, u8)> {
    let entry = match tok {
        Tok::OrOr => (BinOp::Or, 1),
        Tok::AndAnd => (BinOp::And, 2),
        Tok::EqEq => (BinOp::Eq, 3),
        Tok::NotEq => (BinOp::Ne, 3),
        Tok::Lt => (BinOp::Lt, 4),
        Tok::Le => (BinOp::Le, 4),
        Tok::Gt => (BinOp::Gt, 4),
        Tok::Ge => (BinOp::Ge, 4),
        Tok::Plus => (BinOp::Add, 5),
        Tok::Minus => (BinOp::Sub, 5),
        Tok::Star => (BinOp::Mul, 6),
        Tok::Slash => (BinOp::Div, 6),
        Tok::Percent => (BinOp::Rem, 6),
        _ => return None,
    };
    Some(entry)
}
