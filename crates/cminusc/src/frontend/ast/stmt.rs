//! Statement AST nodes

use super::{Expr, VarDecl};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Compound statement (block): { decls stmts }
    Compound(Compound),

    /// If statement: if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) body
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Return statement: return [expr];
    Return(Option<Expr>),

    /// Expression statement: expr;
    Expr(Expr),

    /// Empty statement: ;
    Empty,
}

/// Compound statement: local declarations first, then statements
#[derive(Debug, Clone)]
pub struct Compound {
    pub declarations: Vec<VarDecl>,
    pub statements: Vec<Stmt>,
    pub line: usize,
    pub span: Span,
}

impl Compound {
    pub fn new(declarations: Vec<VarDecl>, statements: Vec<Stmt>, line: usize, span: Span) -> Self {
        Self { declarations, statements, line, span }
    }
}
