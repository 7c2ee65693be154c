//! Semantic diagnostics
//!
//! Both passes report user errors here instead of returning `Err`, so one run
//! surfaces every independent problem in the program.

use std::fmt;

use crate::common::Span;

/// Categories of semantic errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Variable or function declared twice in one scope
    DuplicateDeclaration,
    /// Identifier or call with no visible declaration
    UndeclaredReference,
    /// Array bound that is not positive
    InvalidArraySize,
    /// `void` variable, or `void` parameter other than `(void)`
    VoidVariable,
    /// Function declared with more parameters than a signature holds
    TooManyParameters,
    /// Operand, argument, arity, index, assignment or return type error
    TypeMismatch,
    /// Non-integer `if`/`while` test
    InvalidCondition,
    /// Assignment to something other than a variable
    InvalidAssignmentTarget,
}

impl DiagnosticKind {
    /// Short code shown by the reporter
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateDeclaration => "E0001",
            DiagnosticKind::UndeclaredReference => "E0002",
            DiagnosticKind::InvalidArraySize => "E0003",
            DiagnosticKind::VoidVariable => "E0004",
            DiagnosticKind::TooManyParameters => "E0005",
            DiagnosticKind::TypeMismatch => "E0006",
            DiagnosticKind::InvalidCondition => "E0007",
            DiagnosticKind::InvalidAssignmentTarget => "E0008",
        }
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    /// Offending symbol, when the error is about a name
    pub name: Option<String>,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, line: usize, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            name: None,
            span,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at line {}: {}", self.line, self.message)
    }
}

/// Ordered sink of diagnostics; non-empty means the program has errors
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// The global error flag
    pub fn has_errors(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics of one kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.items.iter().map(|d| d.kind).collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
