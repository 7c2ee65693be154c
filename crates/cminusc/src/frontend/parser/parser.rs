//! Recursive descent parser for C-Minus

use crate::common::{CompileError, CompileResult, LineIndex, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for C-Minus
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    lines: LineIndex,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            lines: LineIndex::new(source),
        })
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut declarations = Vec::new();

        while !self.at_end() {
            declarations.push(self.parse_declaration()?);
        }

        Ok(Program::new(declarations))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        Ok(prev)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        if let TokenKind::Identifier(_) = self.current.kind {
            let token = self.advance()?;
            if let TokenKind::Identifier(name) = token.kind {
                return Ok((name, token.span));
            }
        }
        Err(self.unexpected("identifier"))
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        CompileError::parser(
            format!("expected {}, found {}", expected, self.current.kind),
            self.current.span,
        )
    }

    fn line(&self, span: Span) -> usize {
        self.lines.line_of(span.start)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_type_specifier(&mut self) -> CompileResult<ExpType> {
        match self.current.kind {
            TokenKind::Int => {
                self.advance()?;
                Ok(ExpType::Integer)
            }
            TokenKind::Void => {
                self.advance()?;
                Ok(ExpType::Void)
            }
            _ => Err(self.unexpected("type specifier")),
        }
    }

    fn parse_declaration(&mut self) -> CompileResult<Declaration> {
        let start = self.current.span;
        let line = self.line(start);
        let ty = self.parse_type_specifier()?;
        let (name, _) = self.expect_identifier()?;

        if self.match_token(&TokenKind::LParen)? {
            let params = self.parse_params()?;
            self.expect(TokenKind::RParen)?;
            let body = self.parse_compound()?;
            let span = start.merge(body.span);
            let func = FunDecl::new(name, ty, params, body, line, span);
            return Ok(Declaration::new(DeclKind::Function(func), line, span));
        }

        let var = self.parse_var_rest(name, ty, start)?;
        let span = var.span;
        Ok(Declaration::new(DeclKind::Variable(var), line, span))
    }

    /// Optional `[NUM]` and the terminating `;` of a variable declaration
    fn parse_var_rest(&mut self, name: String, ty: ExpType, start: Span) -> CompileResult<VarDecl> {
        let line = self.line(start);
        let mut size = None;

        if self.match_token(&TokenKind::LBracket)? {
            match self.current.kind {
                TokenKind::IntLiteral(value) => {
                    self.advance()?;
                    size = Some(value);
                }
                _ => return Err(self.unexpected("array size")),
            }
            self.expect(TokenKind::RBracket)?;
        }

        let semi = self.expect(TokenKind::Semi)?;
        let var = VarDecl::new(name, ty, line, start.merge(semi.span));
        Ok(match size {
            Some(size) => var.with_size(size),
            None => var,
        })
    }

    fn parse_params(&mut self) -> CompileResult<Vec<Param>> {
        let mut params = Vec::new();

        loop {
            let start = self.current.span;
            let line = self.line(start);
            let ty = self.parse_type_specifier()?;

            // `(void)`: no parameters
            if ty.is_void() && params.is_empty() && self.check(&TokenKind::RParen) {
                params.push(Param::void(line, start));
                break;
            }

            let (name, name_span) = self.expect_identifier()?;
            let mut param = Param::new(name, ty, line, start.merge(name_span));
            if self.match_token(&TokenKind::LBracket)? {
                let close = self.expect(TokenKind::RBracket)?;
                param.span = param.span.merge(close.span);
                param = param.with_array();
            }
            params.push(param);

            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }

        Ok(params)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_compound(&mut self) -> CompileResult<Compound> {
        let open = self.expect(TokenKind::LBrace)?;
        let line = self.line(open.span);

        let mut declarations = Vec::new();
        while self.current.kind.is_type_specifier() {
            let start = self.current.span;
            let ty = self.parse_type_specifier()?;
            let (name, _) = self.expect_identifier()?;
            declarations.push(self.parse_var_rest(name, ty, start)?);
        }

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }

        let close = self.expect(TokenKind::RBrace)?;
        Ok(Compound::new(declarations, statements, line, open.span.merge(close.span)))
    }

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        let line = self.line(start);

        match self.current.kind {
            TokenKind::LBrace => {
                let block = self.parse_compound()?;
                let span = block.span;
                Ok(Stmt::new(StmtKind::Compound(block), line, span))
            }
            TokenKind::If => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let then_branch = Box::new(self.parse_statement()?);
                let else_branch = if self.match_token(&TokenKind::Else)? {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                let end = else_branch.as_ref().map_or(then_branch.span, |s| s.span);
                Ok(Stmt::new(
                    StmtKind::If { condition, then_branch, else_branch },
                    line,
                    start.merge(end),
                ))
            }
            TokenKind::While => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                let span = start.merge(body.span);
                Ok(Stmt::new(StmtKind::While { condition, body }, line, span))
            }
            TokenKind::Return => {
                self.advance()?;
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let semi = self.expect(TokenKind::Semi)?;
                Ok(Stmt::new(StmtKind::Return(value), line, start.merge(semi.span)))
            }
            TokenKind::Semi => {
                self.advance()?;
                Ok(Stmt::new(StmtKind::Empty, line, start))
            }
            _ => {
                let expr = self.parse_expression()?;
                let semi = self.expect(TokenKind::Semi)?;
                Ok(Stmt::new(StmtKind::Expr(expr), line, start.merge(semi.span)))
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// expression -> simple-expression [ '=' expression ]
    ///
    /// Any expression is accepted on the left; the type checker rejects
    /// targets that are not variables.
    fn parse_expression(&mut self) -> CompileResult<Expr> {
        let target = self.parse_simple_expression()?;

        if self.check(&TokenKind::Eq) {
            let op = self.advance()?;
            let value = self.parse_expression()?;
            let span = target.span.merge(value.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                self.line(op.span),
                span,
            ));
        }

        Ok(target)
    }

    /// Relational operators do not chain
    fn parse_simple_expression(&mut self) -> CompileResult<Expr> {
        let left = self.parse_additive()?;

        if self.current.kind.is_relop() {
            return self.finish_binary(left, Self::parse_additive);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_term()?;
        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            left = self.finish_binary(left, Self::parse_term)?;
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_factor()?;
        while matches!(self.current.kind, TokenKind::Star | TokenKind::Slash) {
            left = self.finish_binary(left, Self::parse_factor)?;
        }
        Ok(left)
    }

    /// Consume the operator at `current` and parse its right operand
    fn finish_binary(
        &mut self,
        left: Expr,
        operand: fn(&mut Self) -> CompileResult<Expr>,
    ) -> CompileResult<Expr> {
        let op_token = self.advance()?;
        let op = match op_token.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::Ne,
            _ => {
                return Err(CompileError::parser(
                    format!("expected binary operator, found {}", op_token.kind),
                    op_token.span,
                ));
            }
        };

        let right = operand(self)?;
        let span = left.span.merge(right.span);
        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            self.line(op_token.span),
            span,
        ))
    }

    fn parse_factor(&mut self) -> CompileResult<Expr> {
        let start = self.current.span;
        let line = self.line(start);

        match self.current.kind {
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::IntLiteral(value) => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Const(value), line, start))
            }
            TokenKind::Identifier(_) => {
                let (name, name_span) = self.expect_identifier()?;

                if self.match_token(&TokenKind::LParen)? {
                    let args = self.parse_args()?;
                    let close = self.expect(TokenKind::RParen)?;
                    return Ok(Expr::new(
                        ExprKind::Call { name, args },
                        line,
                        name_span.merge(close.span),
                    ));
                }

                if self.check(&TokenKind::LBracket) {
                    let open = self.advance()?;
                    let subscript = self.parse_expression()?;
                    let close = self.expect(TokenKind::RBracket)?;
                    let index_span = open.span.merge(close.span);
                    let index = Expr::new(
                        ExprKind::Index(Box::new(subscript)),
                        self.line(open.span),
                        index_span,
                    );
                    return Ok(Expr::new(
                        ExprKind::Identifier {
                            name,
                            index: Some(Box::new(index)),
                        },
                        line,
                        name_span.merge(index_span),
                    ));
                }

                Ok(Expr::new(ExprKind::Identifier { name, index: None }, line, name_span))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_args(&mut self) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(args)
    }
}
