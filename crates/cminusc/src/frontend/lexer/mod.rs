//! Lexer module for tokenizing C-Minus source code

mod token;
mod scanner;

pub use token::{Token, TokenKind};
pub use scanner::Lexer;
