//! Type representations in the AST

use std::fmt;

/// Expression/declaration type
///
/// The language has one value type (`int`); `Array` is the type of a whole
/// array reference, `Function` the type of a bare function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpType {
    Void,
    Integer,
    Array,
    Function,
}

impl ExpType {
    pub fn is_integer(self) -> bool {
        matches!(self, ExpType::Integer)
    }

    pub fn is_void(self) -> bool {
        matches!(self, ExpType::Void)
    }
}

impl fmt::Display for ExpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpType::Void => write!(f, "void"),
            ExpType::Integer => write!(f, "int"),
            ExpType::Array => write!(f, "int[]"),
            ExpType::Function => write!(f, "function"),
        }
    }
}
