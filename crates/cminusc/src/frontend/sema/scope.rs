//! Scope tree and per-scope symbol tables
//!
//! Scopes live in an arena and refer to each other by [`ScopeId`]. Every
//! scope owns a fixed number of hash buckets; each bucket chains the ids of
//! the symbols whose names hash to it. Scopes are never removed, so the whole
//! tree is still available for listings after analysis.

use std::collections::HashMap;

use thiserror::Error;

use super::symbol::{hash, ArrayLen, Signature, Symbol, SymbolId, HASH_SIZE};
use crate::frontend::ast::{ExpType, FunDecl};

/// Name of the root scope. Not a valid identifier, so no function scope can
/// take it.
pub const GLOBAL_SCOPE: &str = "<global>";

/// Index of a scope in its [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// What opened a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOrigin {
    Global,
    /// Function scope, keyed by the index of its top-level declaration
    Function { decl: usize },
    Block,
}

/// A named lexical scope
#[derive(Debug)]
pub struct Scope {
    name: String,
    origin: ScopeOrigin,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    buckets: Vec<Vec<SymbolId>>,
    next_slot: usize,
}

impl Scope {
    fn new(name: String, origin: ScopeOrigin, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            origin,
            parent,
            children: Vec::new(),
            buckets: vec![Vec::new(); HASH_SIZE],
            next_slot: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> ScopeOrigin {
        self.origin
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Slot the next inserted symbol will receive
    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    /// Symbol ids in bucket order, most recent first within a bucket
    pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.buckets.iter().flat_map(|chain| chain.iter().rev().copied())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol '{name}' already declared in scope '{scope}'")]
    Duplicate { name: String, scope: String },
}

/// Outcome of a name lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The starting scope does not exist
    ScopeNotFound,
    /// The scope exists but the name is not visible from it
    NotFound(ScopeId),
    /// The name resolved to `symbol`, declared in `scope`
    Found { scope: ScopeId, symbol: SymbolId },
}

impl Resolution {
    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Resolution::Found { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, Resolution::Found { .. })
    }
}

/// Tree of all scopes of one compilation unit
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    by_name: HashMap<String, ScopeId>,
}

impl ScopeTree {
    /// A tree holding only the empty global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(GLOBAL_SCOPE.to_string(), ScopeOrigin::Global, None)],
            symbols: Vec::new(),
            by_name: HashMap::from([(GLOBAL_SCOPE.to_string(), ScopeId(0))]),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Symbols of one scope, in bucket order
    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> + '_ {
        self.scope(scope).symbol_ids().map(move |id| self.symbol(id))
    }

    // =========================================================================
    // Scope creation and search
    // =========================================================================

    /// Append a block scope `name` under the scope named `parent`.
    ///
    /// Returns `None` if the parent does not exist or `name` is taken.
    pub fn create_scope(&mut self, parent: &str, name: &str) -> Option<ScopeId> {
        self.add_scope(parent, name, ScopeOrigin::Block)
    }

    /// Like [`create_scope`](Self::create_scope), for the scope of the
    /// top-level declaration at index `decl`
    pub fn create_function_scope(
        &mut self,
        parent: &str,
        name: &str,
        decl: usize,
    ) -> Option<ScopeId> {
        self.add_scope(parent, name, ScopeOrigin::Function { decl })
    }

    fn add_scope(&mut self, parent: &str, name: &str, origin: ScopeOrigin) -> Option<ScopeId> {
        let parent = self.find_scope(parent)?;
        if self.by_name.contains_key(name) {
            return None;
        }

        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(name.to_string(), origin, Some(parent)));
        self.scopes[parent.0].children.push(id);
        self.by_name.insert(name.to_string(), id);
        Some(id)
    }

    /// Find a scope by name. Names are unique across the tree.
    pub fn find_scope(&self, name: &str) -> Option<ScopeId> {
        self.by_name.get(name).copied()
    }

    /// Scope opened by the function declared at top-level index `decl`
    pub fn function_scope(&self, decl: usize) -> Option<ScopeId> {
        self.scope(self.root())
            .children
            .iter()
            .copied()
            .find(|&id| self.scope(id).origin == ScopeOrigin::Function { decl })
    }

    /// All scopes: each sibling group in order, then the children of its
    /// members, last member first
    pub fn traversal_order(&self) -> Vec<ScopeId> {
        let root = [self.root()];
        let mut order = Vec::with_capacity(self.scopes.len());
        let mut pending: Vec<&[ScopeId]> = vec![&root[..]];

        while let Some(siblings) = pending.pop() {
            order.extend_from_slice(siblings);
            pending.extend(
                siblings
                    .iter()
                    .map(|&id| self.scope(id).children.as_slice())
                    .filter(|children| !children.is_empty()),
            );
        }
        order
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    /// Insert `name` into `scope` itself, assigning the scope's next slot.
    ///
    /// Names in enclosing scopes are not consulted: shadowing is legal.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: ExpType,
        array: Option<ArrayLen>,
        line: usize,
    ) -> Result<SymbolId, SymbolError> {
        if self.search(scope, name).is_some() {
            return Err(SymbolError::Duplicate {
                name: name.to_string(),
                scope: self.scope(scope).name.clone(),
            });
        }

        let target = &mut self.scopes[scope.0];
        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol {
            name: name.to_string(),
            ty,
            array,
            slot: target.next_slot,
            lines: vec![line],
            signature: None,
        });
        target.next_slot += 1;
        target.buckets[hash(name)].push(id);
        Ok(id)
    }

    /// Search one scope's bucket for `name`
    fn search(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).buckets[hash(name)]
            .iter()
            .copied()
            .find(|&id| self.symbol(id).name == name)
    }

    /// Resolve `name` from the scope named `scope` outward
    pub fn lookup(&self, scope: &str, name: &str) -> Resolution {
        match self.find_scope(scope) {
            Some(id) => self.lookup_from(id, name),
            None => Resolution::ScopeNotFound,
        }
    }

    /// Resolve `name` from `start` outward through the parent chain
    pub fn lookup_from(&self, start: ScopeId, name: &str) -> Resolution {
        let mut current = start;
        loop {
            if let Some(symbol) = self.search(current, name) {
                return Resolution::Found { scope: current, symbol };
            }
            match self.scope(current).parent {
                Some(parent) => current = parent,
                None => return Resolution::NotFound(start),
            }
        }
    }

    /// Resolve `name` in the scope named `scope` only
    pub fn lookup_local(&self, scope: &str, name: &str) -> Resolution {
        match self.find_scope(scope) {
            Some(id) => self.lookup_local_in(id, name),
            None => Resolution::ScopeNotFound,
        }
    }

    pub fn lookup_local_in(&self, scope: ScopeId, name: &str) -> Resolution {
        match self.search(scope, name) {
            Some(symbol) => Resolution::Found { scope, symbol },
            None => Resolution::NotFound(scope),
        }
    }

    /// Record a reference line; the slot is untouched
    pub fn append_use(&mut self, symbol: SymbolId, line: usize) {
        self.symbols[symbol.0].lines.push(line);
    }

    /// Record the parameter list and return type of `func` on `symbol`
    pub fn attach_signature(&mut self, symbol: SymbolId, func: &FunDecl) {
        self.set_signature(symbol, Signature::from_decl(func));
    }

    pub fn set_signature(&mut self, symbol: SymbolId, signature: Signature) {
        self.symbols[symbol.0].signature = Some(signature);
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
