//! Scope-tracking tree walk shared by both semantic passes
//!
//! The walk owns the scope-entry/exit policy: a function opens its own scope
//! and its body reuses it, every other compound statement opens a fresh block
//! scope, and each scope is left when its compound statement ends. Passes
//! plug into the walk through [`ScopedPass`] and only decide how a scope is
//! obtained (created or looked up) and what to do at each node.

use super::namer::BlockNamer;
use super::scope::ScopeId;
use crate::common::CompileResult;
use crate::frontend::ast::*;

/// Callbacks invoked by [`ScopeWalk::run`]
pub trait ScopedPass {
    /// Scope for the function at top-level index `index`, or `None` when the
    /// declaration was rejected. A rejected function still gets a block scope
    /// for its parameters and body.
    fn open_function(
        &mut self,
        walk: &ScopeWalk,
        index: usize,
        func: &FunDecl,
    ) -> CompileResult<Option<ScopeId>>;

    /// Block scope `name`, child of `walk.current()`
    fn open_block(&mut self, walk: &ScopeWalk, name: &str) -> CompileResult<ScopeId>;

    fn variable(&mut self, _walk: &ScopeWalk, _var: &VarDecl) {}

    fn param(&mut self, _walk: &ScopeWalk, _param: &Param, _func: &FunDecl) {}

    fn pre_expr(&mut self, _walk: &ScopeWalk, _expr: &Expr) {}

    /// Called after all subexpressions were visited
    fn post_expr(&mut self, _walk: &ScopeWalk, _expr: &Expr) {}

    /// Called after all children of the statement were visited
    fn post_stmt(&mut self, _walk: &ScopeWalk, _stmt: &Stmt) {}
}

/// Traversal context: the active scope stack and block naming state
#[derive(Debug)]
pub struct ScopeWalk {
    root: ScopeId,
    stack: Vec<ScopeId>,
    function_body: bool,
    namer: BlockNamer,
}

impl ScopeWalk {
    pub fn new(root: ScopeId) -> Self {
        Self {
            root,
            stack: vec![root],
            function_body: false,
            namer: BlockNamer::new(),
        }
    }

    /// Innermost active scope
    pub fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(self.root)
    }

    /// Active scope directly below the root; functions only nest there
    pub fn function_scope(&self) -> Option<ScopeId> {
        self.stack.get(1).copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn run<P: ScopedPass>(&mut self, program: &Program, pass: &mut P) -> CompileResult<()> {
        for (index, decl) in program.declarations.iter().enumerate() {
            match &decl.kind {
                DeclKind::Variable(var) => pass.variable(self, var),
                DeclKind::Function(func) => self.function(index, func, pass)?,
            }
        }
        Ok(())
    }

    fn function<P: ScopedPass>(
        &mut self,
        index: usize,
        func: &FunDecl,
        pass: &mut P,
    ) -> CompileResult<()> {
        let scope = match pass.open_function(self, index, func)? {
            Some(scope) => scope,
            None => {
                let name = self.namer.next_name(func.line);
                pass.open_block(self, &name)?
            }
        };
        self.stack.push(scope);
        self.function_body = true;

        for param in &func.params {
            pass.param(self, param, func);
        }
        self.compound(&func.body, pass)
    }

    fn compound<P: ScopedPass>(&mut self, block: &Compound, pass: &mut P) -> CompileResult<()> {
        if self.function_body {
            self.function_body = false;
        } else {
            let name = self.namer.next_name(block.line);
            let scope = pass.open_block(self, &name)?;
            self.stack.push(scope);
        }

        for var in &block.declarations {
            pass.variable(self, var);
        }
        for stmt in &block.statements {
            self.stmt(stmt, pass)?;
        }

        self.stack.pop();
        Ok(())
    }

    fn stmt<P: ScopedPass>(&mut self, stmt: &Stmt, pass: &mut P) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Compound(block) => self.compound(block, pass)?,
            StmtKind::If { condition, then_branch, else_branch } => {
                self.expr(condition, pass);
                self.stmt(then_branch, pass)?;
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch, pass)?;
                }
            }
            StmtKind::While { condition, body } => {
                self.expr(condition, pass);
                self.stmt(body, pass)?;
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value, pass);
                }
            }
            StmtKind::Expr(expr) => self.expr(expr, pass),
            StmtKind::Empty => {}
        }
        pass.post_stmt(self, stmt);
        Ok(())
    }

    fn expr<P: ScopedPass>(&self, expr: &Expr, pass: &mut P) {
        pass.pre_expr(self, expr);
        match &expr.kind {
            ExprKind::Assign { target, value } => {
                self.expr(target, pass);
                self.expr(value, pass);
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr(left, pass);
                self.expr(right, pass);
            }
            ExprKind::Const(_) => {}
            ExprKind::Identifier { index, .. } => {
                if let Some(index) = index {
                    self.expr(index, pass);
                }
            }
            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.expr(arg, pass);
                }
            }
            ExprKind::Index(subscript) => self.expr(subscript, pass),
        }
        pass.post_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::sema::ScopeTree;
    use pretty_assertions::assert_eq;

    /// Records the depth and block names seen, creating scopes on the fly
    struct Recorder {
        tree: ScopeTree,
        opened: Vec<String>,
        depths: Vec<(String, usize)>,
    }

    impl ScopedPass for Recorder {
        fn open_function(
            &mut self,
            walk: &ScopeWalk,
            index: usize,
            func: &FunDecl,
        ) -> CompileResult<Option<ScopeId>> {
            let parent = self.tree.scope(walk.current()).name().to_string();
            self.opened.push(func.name.clone());
            Ok(self.tree.create_function_scope(&parent, &func.name, index))
        }

        fn open_block(&mut self, walk: &ScopeWalk, name: &str) -> CompileResult<ScopeId> {
            let parent = self.tree.scope(walk.current()).name().to_string();
            self.opened.push(name.to_string());
            Ok(self.tree.create_scope(&parent, name).unwrap())
        }

        fn variable(&mut self, walk: &ScopeWalk, var: &VarDecl) {
            self.depths.push((var.name.clone(), walk.depth()));
        }
    }

    #[test]
    fn test_function_body_reuses_function_scope() {
        let source = "int g;\nvoid f(void)\n{\n  int a;\n  { int b; { int c; } }\n  { int d; }\n}";
        let program = Parser::new(source).unwrap().parse().unwrap();
        let mut recorder = Recorder {
            tree: ScopeTree::new(),
            opened: Vec::new(),
            depths: Vec::new(),
        };

        let mut walk = ScopeWalk::new(recorder.tree.root());
        walk.run(&program, &mut recorder).unwrap();

        assert_eq!(
            recorder.opened,
            vec!["f", "{block@5.0}", "{block@5.1}", "{block@6.0}"]
        );
        assert_eq!(
            recorder.depths,
            vec![
                ("g".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 3),
                ("c".to_string(), 4),
                ("d".to_string(), 3),
            ]
        );
        assert_eq!(walk.depth(), 1);
        assert_eq!(walk.current(), recorder.tree.root());
    }
}
