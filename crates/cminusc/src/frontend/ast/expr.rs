//! Expression AST nodes

use std::cell::Cell;
use std::fmt;

use super::ExpType;
use crate::common::Span;

/// Expression node
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
    pub span: Span,
    /// Type of this expression (filled in by the type checker)
    pub ty: Cell<Option<ExpType>>,
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize, span: Span) -> Self {
        Self {
            kind,
            line,
            span,
            ty: Cell::new(None),
        }
    }

    /// Inferred type, if the checker resolved one
    pub fn ty(&self) -> Option<ExpType> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: Option<ExpType>) {
        self.ty.set(ty);
    }
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Assignment: target = value
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// Binary operation: a + b, x < y
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Integer literal
    Const(i64),

    /// Variable reference, optionally subscripted: x, a[i]
    ///
    /// The subscript, when present, is always an `Index` node.
    Identifier {
        name: String,
        index: Option<Box<Expr>>,
    },

    /// Function call: f(a, b)
    Call {
        name: String,
        args: Vec<Expr>,
    },

    /// Array subscript wrapper around the index expression
    Index(Box<Expr>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        };
        write!(f, "{}", s)
    }
}
