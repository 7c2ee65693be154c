//! Symbol records and function signatures

use crate::frontend::ast::{ExpType, FunDecl};

/// Number of hash buckets per scope
pub const HASH_SIZE: usize = 211;

/// Maximum number of parameters a signature records
pub const MAX_PARAMS: usize = 10;

/// Power of two used as multiplier in the hash
const SHIFT: u32 = 4;

/// Order-sensitive string hash into `0..HASH_SIZE`
pub fn hash(key: &str) -> usize {
    key.bytes()
        .fold(0, |acc, byte| ((acc << SHIFT) + usize::from(byte)) % HASH_SIZE)
}

/// Index of a symbol in its [`ScopeTree`](super::ScopeTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(super) usize);

/// Array marker of a declared name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
    /// `int a[N]` with `N > 0`
    Fixed(usize),
    /// `int a[]` parameter
    Open,
}

/// One parameter of a function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParam {
    pub ty: ExpType,
    pub name: String,
}

/// Declared return type and ordered parameters of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub return_type: ExpType,
    pub params: Vec<SignatureParam>,
}

impl Signature {
    pub fn new(return_type: ExpType, params: Vec<SignatureParam>) -> Self {
        Self { return_type, params }
    }

    /// Record the signature of a function declaration.
    ///
    /// A lone `(void)` parameter yields no parameters. At most
    /// [`MAX_PARAMS`] parameters are kept.
    pub fn from_decl(func: &FunDecl) -> Self {
        let params = match func.params.as_slice() {
            [only] if only.is_void_marker() => Vec::new(),
            params => params
                .iter()
                .take(MAX_PARAMS)
                .map(|p| SignatureParam {
                    ty: p.value_type(),
                    name: p.name.clone().unwrap_or_default(),
                })
                .collect(),
        };
        Self::new(func.return_type, params)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// The record stored for one declared name in one scope
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Declared type; element type for arrays
    pub ty: ExpType,
    pub array: Option<ArrayLen>,
    /// Storage slot, fixed at insertion
    pub slot: usize,
    /// Reference lines in discovery order, declaration line first
    pub lines: Vec<usize>,
    pub signature: Option<Signature>,
}

impl Symbol {
    pub fn is_function(&self) -> bool {
        self.ty == ExpType::Function
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    /// Type of an unsubscripted reference to this symbol
    pub fn value_type(&self) -> ExpType {
        if self.is_array() { ExpType::Array } else { self.ty }
    }

    pub fn declared_line(&self) -> usize {
        self.lines.first().copied().unwrap_or_default()
    }

    pub fn sorted_lines(&self) -> Vec<usize> {
        let mut lines = self.lines.clone();
        lines.sort_unstable();
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::frontend::ast::{Compound, Param};

    fn func(params: Vec<Param>) -> FunDecl {
        let body = Compound::new(Vec::new(), Vec::new(), 1, Span::default());
        FunDecl::new("f", ExpType::Integer, params, body, 1, Span::default())
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        assert_ne!(hash("ab"), hash("ba"));
        assert_eq!(hash(""), 0);
        assert_eq!(hash("a"), 97);
        assert!(hash("a_rather_long_identifier") < HASH_SIZE);
    }

    #[test]
    fn test_void_marker_yields_empty_signature() {
        let sig = Signature::from_decl(&func(vec![Param::void(1, Span::default())]));
        assert_eq!(sig.arity(), 0);
        assert_eq!(sig.return_type, ExpType::Integer);
    }

    #[test]
    fn test_signature_records_params_in_order() {
        let sig = Signature::from_decl(&func(vec![
            Param::new("a", ExpType::Integer, 1, Span::default()).with_array(),
            Param::new("n", ExpType::Integer, 1, Span::default()),
        ]));
        assert_eq!(
            sig.params,
            vec![
                SignatureParam { ty: ExpType::Array, name: "a".to_string() },
                SignatureParam { ty: ExpType::Integer, name: "n".to_string() },
            ]
        );
    }

    #[test]
    fn test_signature_is_bounded() {
        let params = (0..MAX_PARAMS + 3)
            .map(|i| Param::new(format!("p{i}"), ExpType::Integer, 1, Span::default()))
            .collect();
        assert_eq!(Signature::from_decl(&func(params)).arity(), MAX_PARAMS);
    }
}
