//! Semantic analyzer - runs the build and check passes over one program

use super::build::SymbolTableBuilder;
use super::check::TypeChecker;
use super::diagnostic::Diagnostics;
use super::scope::ScopeTree;
use super::symbol::{Signature, SignatureParam};
use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::{ExpType, Program};

/// Analyzer options
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Seed the global scope with `int input(void)` and `void output(int x)`
    pub builtins: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { builtins: true }
    }
}

/// Result of analyzing one compilation unit
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeTree,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Semantic analyzer for symbol resolution and type checking
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    config: AnalyzerConfig,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze a program.
    ///
    /// User errors end up in [`Analysis::diagnostics`]; `Err` means the
    /// analyzer itself hit an inconsistency.
    pub fn analyze(&self, program: &Program) -> CompileResult<Analysis> {
        let mut scopes = ScopeTree::new();
        let mut diagnostics = Diagnostics::new();

        if self.config.builtins {
            declare_builtins(&mut scopes)?;
        }

        let bindings = SymbolTableBuilder::new(&mut scopes, &mut diagnostics).build(program)?;
        TypeChecker::new(&scopes, &bindings, &mut diagnostics).check(program)?;

        Ok(Analysis { scopes, diagnostics })
    }
}

/// Runtime I/O functions every program can call
fn declare_builtins(scopes: &mut ScopeTree) -> CompileResult<()> {
    let builtins = [
        ("input", Signature::new(ExpType::Integer, Vec::new())),
        (
            "output",
            Signature::new(
                ExpType::Void,
                vec![SignatureParam { ty: ExpType::Integer, name: "x".to_string() }],
            ),
        ),
    ];

    let root = scopes.root();
    for (name, signature) in builtins {
        let symbol = scopes
            .insert(root, name, ExpType::Function, None, 0)
            .map_err(|e| CompileError::internal(e.to_string()))?;
        scopes.set_signature(symbol, signature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::sema::{DiagnosticKind, GLOBAL_SCOPE};
    use pretty_assertions::assert_eq;

    fn analyze_with(source: &str, config: AnalyzerConfig) -> Analysis {
        let program = Parser::new(source).unwrap().parse().unwrap();
        SemanticAnalyzer::with_config(config).analyze(&program).unwrap()
    }

    #[test]
    fn test_builtins_take_first_global_slots() {
        let analysis = analyze_with(
            "int x;\nvoid main(void)\n{\n  x = input();\n  output(x);\n}",
            AnalyzerConfig::default(),
        );

        assert!(!analysis.has_errors());
        let slot = |name: &str| {
            let id = analysis.scopes.lookup_local(GLOBAL_SCOPE, name).symbol().unwrap();
            analysis.scopes.symbol(id).slot
        };
        assert_eq!(slot("input"), 0);
        assert_eq!(slot("output"), 1);
        assert_eq!(slot("x"), 2);
        assert_eq!(slot("main"), 3);

        let output = analysis.scopes.lookup_local(GLOBAL_SCOPE, "output").symbol().unwrap();
        assert_eq!(analysis.scopes.symbol(output).lines, vec![0, 5]);
    }

    #[test]
    fn test_without_builtins_io_is_undeclared() {
        let analysis = analyze_with(
            "void main(void) { output(1); }",
            AnalyzerConfig { builtins: false },
        );

        assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::UndeclaredReference]);
    }

    #[test]
    fn test_redeclaring_a_builtin() {
        let analysis = analyze_with("int input(void) { return 1; }", AnalyzerConfig::default());

        assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::DuplicateDeclaration]);
    }

    #[test]
    fn test_builtin_call_checked_against_signature() {
        let analysis = analyze_with(
            "void main(void)\n{\n  int a[4];\n  output(a);\n  output(input(), 1);\n}",
            AnalyzerConfig::default(),
        );

        let lines: Vec<usize> = analysis.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![4, 5]);
        assert_eq!(analysis.diagnostics.count(DiagnosticKind::TypeMismatch), 2);
    }
}
