//! Type checking
//!
//! Second semantic pass. Re-enters the scopes the build pass created, in the
//! same order, and computes the type of every expression bottom-up into its
//! `ty` cell. Expressions whose type cannot be resolved keep `None` and are
//! skipped by the rules above them.

use super::build::Bindings;
use super::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use super::scope::{ScopeId, ScopeOrigin, ScopeTree};
use super::symbol::Symbol;
use super::walk::{ScopeWalk, ScopedPass};
use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::*;

/// Check pass over one program, reading a tree built by
/// [`SymbolTableBuilder`](super::SymbolTableBuilder)
pub struct TypeChecker<'a> {
    tree: &'a ScopeTree,
    /// Uses the build pass resolved; anything else stays untyped
    bindings: &'a Bindings,
    diagnostics: &'a mut Diagnostics,
    /// Return type of a redeclared function, whose scope has no symbol
    recovery_return: Option<ExpType>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        tree: &'a ScopeTree,
        bindings: &'a Bindings,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            tree,
            bindings,
            diagnostics,
            recovery_return: None,
        }
    }

    pub fn check(mut self, program: &Program) -> CompileResult<()> {
        let mut walk = ScopeWalk::new(self.tree.root());
        walk.run(program, &mut self)
    }

    fn mismatch(&mut self, message: String, line: usize, expr: &Expr) {
        self.diagnostics
            .push(Diagnostic::new(DiagnosticKind::TypeMismatch, message, line, expr.span));
    }

    /// Symbol the build pass bound `expr` to
    fn resolve(&self, expr: &Expr) -> Option<&'a Symbol> {
        let tree = self.tree;
        self.bindings.get(expr.span).map(|id| tree.symbol(id))
    }

    fn return_type(&self, walk: &ScopeWalk) -> Option<ExpType> {
        let scope = self.tree.scope(walk.function_scope()?);
        match scope.origin() {
            ScopeOrigin::Function { .. } => {
                let symbol = self
                    .tree
                    .lookup_local_in(self.tree.root(), scope.name())
                    .symbol()?;
                self.tree
                    .symbol(symbol)
                    .signature
                    .as_ref()
                    .map(|sig| sig.return_type)
            }
            ScopeOrigin::Block => self.recovery_return,
            ScopeOrigin::Global => None,
        }
    }

    fn identifier(&mut self, expr: &Expr, name: &str, indexed: bool) -> Option<ExpType> {
        let symbol = self.resolve(expr)?;
        if !indexed {
            return Some(symbol.value_type());
        }
        if !symbol.is_array() {
            self.mismatch(format!("'{}' is not an array", name), expr.line, expr);
        }
        Some(ExpType::Integer)
    }

    fn binary(&mut self, expr: &Expr, op: BinaryOp, left: &Expr, right: &Expr) -> Option<ExpType> {
        let bad = [left.ty(), right.ty()]
            .into_iter()
            .flatten()
            .find(|ty| !ty.is_integer());
        if let Some(ty) = bad {
            self.mismatch(
                format!("operator '{}' requires int operands, found {}", op, ty),
                expr.line,
                expr,
            );
        }
        Some(ExpType::Integer)
    }

    fn assign(&mut self, expr: &Expr, target: &Expr, value: &Expr) -> Option<ExpType> {
        let ExprKind::Identifier { name, .. } = &target.kind else {
            self.invalid_target("left side of assignment is not a variable".to_string(), expr);
            return None;
        };

        let left = target.ty()?;
        match left {
            ExpType::Function => {
                self.invalid_target(format!("cannot assign to function '{}'", name), expr);
                return None;
            }
            ExpType::Array => {
                self.invalid_target(format!("cannot assign to whole array '{}'", name), expr);
                return None;
            }
            _ => {}
        }

        if let Some(right) = value.ty() {
            if right != left {
                self.mismatch(
                    format!("cannot assign {} to '{}' of type {}", right, name, left),
                    expr.line,
                    expr,
                );
            }
        }
        Some(left)
    }

    fn invalid_target(&mut self, message: String, expr: &Expr) {
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::InvalidAssignmentTarget,
            message,
            expr.line,
            expr.span,
        ));
    }

    fn call(&mut self, expr: &Expr, name: &str, args: &[Expr]) -> Option<ExpType> {
        let symbol = self.resolve(expr)?;
        if !symbol.is_function() {
            self.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::TypeMismatch,
                    format!("'{}' is not a function", name),
                    expr.line,
                    expr.span,
                )
                .with_name(name),
            );
            return None;
        }
        let signature = symbol.signature.as_ref()?;

        if args.len() != signature.arity() {
            self.mismatch(
                format!(
                    "function '{}' expects {} argument(s), found {}",
                    name,
                    signature.arity(),
                    args.len()
                ),
                expr.line,
                expr,
            );
        } else {
            let first_bad = args
                .iter()
                .zip(&signature.params)
                .enumerate()
                .find_map(|(i, (arg, param))| match arg.ty() {
                    Some(ty) if ty != param.ty => Some((i, ty, param)),
                    _ => None,
                });
            if let Some((i, ty, param)) = first_bad {
                self.mismatch(
                    format!(
                        "argument {} of '{}' has type {}, parameter '{}' expects {}",
                        i + 1,
                        name,
                        ty,
                        param.name,
                        param.ty
                    ),
                    expr.line,
                    expr,
                );
            }
        }
        Some(signature.return_type)
    }

    fn condition(&mut self, keyword: &str, condition: &Expr) {
        if let Some(ty) = condition.ty() {
            if !ty.is_integer() {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::InvalidCondition,
                    format!("{} condition must be int, found {}", keyword, ty),
                    condition.line,
                    condition.span,
                ));
            }
        }
    }

    fn return_stmt(&mut self, walk: &ScopeWalk, stmt: &Stmt, value: Option<&Expr>) {
        let Some(expected) = self.return_type(walk) else {
            return;
        };

        let message = match value {
            None if !expected.is_void() => "return with no value in non-void function".to_string(),
            Some(_) if expected.is_void() => "return with a value in void function".to_string(),
            Some(value) => match value.ty() {
                Some(ty) if ty != expected => {
                    format!("returning {} from function returning {}", ty, expected)
                }
                _ => return,
            },
            None => return,
        };
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::TypeMismatch,
            message,
            stmt.line,
            stmt.span,
        ));
    }
}

impl ScopedPass for TypeChecker<'_> {
    fn open_function(
        &mut self,
        _walk: &ScopeWalk,
        index: usize,
        func: &FunDecl,
    ) -> CompileResult<Option<ScopeId>> {
        let scope = self.tree.function_scope(index);
        self.recovery_return = match scope {
            Some(_) => None,
            None => Some(func.return_type),
        };
        Ok(scope)
    }

    fn open_block(&mut self, walk: &ScopeWalk, name: &str) -> CompileResult<ScopeId> {
        self.tree
            .find_scope(name)
            .filter(|&id| self.tree.scope(id).parent() == Some(walk.current()))
            .ok_or_else(|| {
                CompileError::internal(format!(
                    "scope '{}' was not created under '{}'",
                    name,
                    self.tree.scope(walk.current()).name()
                ))
            })
    }

    fn param(&mut self, _walk: &ScopeWalk, param: &Param, func: &FunDecl) {
        if !param.ty.is_void() || (param.is_void_marker() && func.params.len() == 1) {
            return;
        }

        let message = match &param.name {
            Some(name) => format!("parameter '{}' declared void", name),
            None => format!("'void' must be the only parameter of '{}'", func.name),
        };
        let mut diagnostic =
            Diagnostic::new(DiagnosticKind::VoidVariable, message, param.line, param.span);
        if let Some(name) = &param.name {
            diagnostic = diagnostic.with_name(name);
        }
        self.diagnostics.push(diagnostic);
    }

    fn post_expr(&mut self, _walk: &ScopeWalk, expr: &Expr) {
        let ty = match &expr.kind {
            ExprKind::Const(_) => Some(ExpType::Integer),
            ExprKind::Index(subscript) => {
                if let Some(ty) = subscript.ty() {
                    if !ty.is_integer() {
                        let message = format!("array index must be int, found {}", ty);
                        self.mismatch(message, expr.line, expr);
                    }
                }
                Some(ExpType::Integer)
            }
            ExprKind::Identifier { name, index } => self.identifier(expr, name, index.is_some()),
            ExprKind::Binary { op, left, right } => self.binary(expr, *op, left, right),
            ExprKind::Assign { target, value } => self.assign(expr, target, value),
            ExprKind::Call { name, args } => self.call(expr, name, args),
        };
        expr.set_ty(ty);
    }

    fn post_stmt(&mut self, walk: &ScopeWalk, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::If { condition, .. } => self.condition("if", condition),
            StmtKind::While { condition, .. } => self.condition("while", condition),
            StmtKind::Return(value) => self.return_stmt(walk, stmt, value.as_ref()),
            StmtKind::Compound(_) | StmtKind::Expr(_) | StmtKind::Empty => {}
        }
    }
}
