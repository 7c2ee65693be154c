//! Parser module for C-Minus

#[allow(clippy::module_inception)]
mod parser;

pub use parser::Parser;
