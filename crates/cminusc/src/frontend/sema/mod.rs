//! Semantic analysis module
//!
//! Symbol table construction over a tree of named scopes, followed by type
//! checking. Both passes share one scope-tracking walk and report into one
//! diagnostics sink.

mod analyzer;
mod build;
mod check;
mod diagnostic;
mod namer;
mod scope;
mod symbol;
mod walk;

pub use analyzer::{Analysis, AnalyzerConfig, SemanticAnalyzer};
pub use build::{Bindings, SymbolTableBuilder};
pub use check::TypeChecker;
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use namer::BlockNamer;
pub use scope::{Resolution, Scope, ScopeId, ScopeOrigin, ScopeTree, SymbolError, GLOBAL_SCOPE};
pub use symbol::{
    hash, ArrayLen, Signature, SignatureParam, Symbol, SymbolId, HASH_SIZE, MAX_PARAMS,
};
pub use walk::{ScopeWalk, ScopedPass};
