//! Abstract Syntax Tree definitions

mod types;
mod expr;
mod stmt;
mod decl;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;

/// A complete program: the top-level declaration sequence
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

impl Program {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }
}
