//! Symbol table construction
//!
//! First semantic pass: declares every variable, parameter and function in
//! its scope, creates the scope tree, and records the line of every
//! identifier use. Declaration-time errors are reported and the walk goes on.

use std::collections::HashMap;

use super::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use super::scope::{Resolution, ScopeId, ScopeTree, SymbolError};
use super::symbol::{ArrayLen, SymbolId, MAX_PARAMS};
use super::walk::{ScopeWalk, ScopedPass};
use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;

/// Symbol each identifier or call resolved to when the build pass reached it,
/// keyed by the span of the use. Unresolved uses have no entry.
#[derive(Debug, Default)]
pub struct Bindings {
    uses: HashMap<Span, SymbolId>,
}

impl Bindings {
    pub fn get(&self, use_span: Span) -> Option<SymbolId> {
        self.uses.get(&use_span).copied()
    }

    pub fn len(&self) -> usize {
        self.uses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }
}

/// Build pass over one program
pub struct SymbolTableBuilder<'a> {
    tree: &'a mut ScopeTree,
    diagnostics: &'a mut Diagnostics,
    bindings: Bindings,
}

impl<'a> SymbolTableBuilder<'a> {
    pub fn new(tree: &'a mut ScopeTree, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            tree,
            diagnostics,
            bindings: Bindings::default(),
        }
    }

    /// Populate the tree from `program` and return what each use resolved to
    pub fn build(mut self, program: &Program) -> CompileResult<Bindings> {
        let mut walk = ScopeWalk::new(self.tree.root());
        walk.run(program, &mut self)?;
        Ok(self.bindings)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn scope_name(&self, scope: ScopeId) -> String {
        self.tree.scope(scope).name().to_string()
    }

    fn redeclared_variable(&mut self, name: &str, line: usize, span: Span) {
        self.report(
            Diagnostic::new(
                DiagnosticKind::DuplicateDeclaration,
                format!("redeclared variable '{}'", name),
                line,
                span,
            )
            .with_name(name),
        );
    }

    /// Insert a variable or parameter, reporting a name the scope already has
    fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: ExpType,
        array: Option<ArrayLen>,
        line: usize,
        span: Span,
    ) {
        match self.tree.insert(scope, name, ty, array, line) {
            Ok(_) => {}
            Err(SymbolError::Duplicate { .. }) => self.redeclared_variable(name, line, span),
        }
    }
}

impl ScopedPass for SymbolTableBuilder<'_> {
    fn open_function(
        &mut self,
        walk: &ScopeWalk,
        index: usize,
        func: &FunDecl,
    ) -> CompileResult<Option<ScopeId>> {
        let scope = walk.current();
        let symbol = match self.tree.insert(scope, &func.name, ExpType::Function, None, func.line) {
            Ok(symbol) => symbol,
            Err(SymbolError::Duplicate { .. }) => {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateDeclaration,
                        format!("redeclared function '{}'", func.name),
                        func.line,
                        func.span,
                    )
                    .with_name(&func.name),
                );
                return Ok(None);
            }
        };

        if func.params.len() > MAX_PARAMS {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::TooManyParameters,
                    format!(
                        "function '{}' declares {} parameters; at most {} are supported",
                        func.name,
                        func.params.len(),
                        MAX_PARAMS
                    ),
                    func.line,
                    func.span,
                )
                .with_name(&func.name),
            );
        }
        self.tree.attach_signature(symbol, func);

        let parent = self.scope_name(scope);
        self.tree
            .create_function_scope(&parent, &func.name, index)
            .map(Some)
            .ok_or_else(|| {
                CompileError::internal(format!(
                    "could not create scope for function '{}'",
                    func.name
                ))
            })
    }

    fn open_block(&mut self, walk: &ScopeWalk, name: &str) -> CompileResult<ScopeId> {
        let parent = self.scope_name(walk.current());
        self.tree.create_scope(&parent, name).ok_or_else(|| {
            CompileError::internal(format!("could not create scope '{}' under '{}'", name, parent))
        })
    }

    fn variable(&mut self, walk: &ScopeWalk, var: &VarDecl) {
        if var.ty.is_void() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::VoidVariable,
                    format!("variable '{}' declared void", var.name),
                    var.line,
                    var.span,
                )
                .with_name(&var.name),
            );
            return;
        }

        let scope = walk.current();
        if self.tree.lookup_local_in(scope, &var.name).is_found() {
            self.redeclared_variable(&var.name, var.line, var.span);
            return;
        }

        let array = match var.size {
            None => None,
            Some(size) if size > 0 => Some(ArrayLen::Fixed(size as usize)),
            Some(size) => {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::InvalidArraySize,
                        format!("array '{}' declared with size {}", var.name, size),
                        var.line,
                        var.span,
                    )
                    .with_name(&var.name),
                );
                return;
            }
        };
        self.declare(scope, &var.name, var.ty, array, var.line, var.span);
    }

    fn param(&mut self, walk: &ScopeWalk, param: &Param, _func: &FunDecl) {
        if param.ty.is_void() {
            return;
        }
        let Some(name) = &param.name else {
            return;
        };

        let array = param.array.then_some(ArrayLen::Open);
        self.declare(walk.current(), name, param.ty, array, param.line, param.span);
    }

    fn pre_expr(&mut self, walk: &ScopeWalk, expr: &Expr) {
        let name = match &expr.kind {
            ExprKind::Identifier { name, .. } | ExprKind::Call { name, .. } => name,
            _ => return,
        };

        match self.tree.lookup_from(walk.current(), name) {
            Resolution::Found { symbol, .. } => {
                self.tree.append_use(symbol, expr.line);
                self.bindings.uses.insert(expr.span, symbol);
            }
            Resolution::NotFound(_) | Resolution::ScopeNotFound => self.report(
                Diagnostic::new(
                    DiagnosticKind::UndeclaredReference,
                    format!("undeclared identifier '{}'", name),
                    expr.line,
                    expr.span,
                )
                .with_name(name),
            ),
        }
    }
}
