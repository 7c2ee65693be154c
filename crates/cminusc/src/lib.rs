//! C-Minus Compiler - semantic analysis front end
//!
//! This library lexes and parses C-Minus programs, builds a tree of named
//! scopes with per-scope symbol tables, and type checks every expression.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): Lexer, parser, AST and semantic analysis
//! - **Common** (`common/`): Shared infrastructure (errors, spans, reporting)
//!
//! Semantic errors never abort analysis: they are collected as
//! [`Diagnostic`](frontend::sema::Diagnostic)s so one run reports all of them.

pub mod common;
pub mod frontend;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use frontend::{AnalyzedProgram, CMinusFrontend, CompileContext, FrontendConfig};
pub use frontend::sema::{Analysis, AnalyzerConfig, SemanticAnalyzer};
