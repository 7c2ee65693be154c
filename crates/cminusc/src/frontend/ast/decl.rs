//! Declaration AST nodes

use super::{Compound, ExpType};
use crate::common::Span;

/// Top-level declaration node
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub line: usize,
    pub span: Span,
}

impl Declaration {
    pub fn new(kind: DeclKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }
}

/// Declaration kinds
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Variable declaration: int x; int a[10];
    Variable(VarDecl),

    /// Function definition
    Function(FunDecl),
}

/// Variable declaration
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub ty: ExpType,
    /// Declared array bound; `None` for scalars
    pub size: Option<i64>,
    pub line: usize,
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: ExpType, line: usize, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            size: None,
            line,
            span,
        }
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Function parameter
///
/// `(void)` parameter lists are a single unnamed `void` parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<String>,
    pub ty: ExpType,
    pub array: bool,
    pub line: usize,
    pub span: Span,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ExpType, line: usize, span: Span) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            array: false,
            line,
            span,
        }
    }

    /// The "no parameters" marker produced by `(void)`
    pub fn void(line: usize, span: Span) -> Self {
        Self {
            name: None,
            ty: ExpType::Void,
            array: false,
            line,
            span,
        }
    }

    pub fn with_array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn is_void_marker(&self) -> bool {
        self.name.is_none() && self.ty.is_void() && !self.array
    }

    /// Type a caller must supply for this parameter
    pub fn value_type(&self) -> ExpType {
        if self.array { ExpType::Array } else { self.ty }
    }
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FunDecl {
    pub name: String,
    pub return_type: ExpType,
    pub params: Vec<Param>,
    pub body: Compound,
    pub line: usize,
    pub span: Span,
}

impl FunDecl {
    pub fn new(
        name: impl Into<String>,
        return_type: ExpType,
        params: Vec<Param>,
        body: Compound,
        line: usize,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
            body,
            line,
            span,
        }
    }
}
