//! End-to-end semantic analysis tests: source text in, scopes and
//! diagnostics out.

use cminus_compiler::frontend::ast::{DeclKind, ExpType, Program, StmtKind};
use cminus_compiler::frontend::parser::Parser;
use cminus_compiler::frontend::sema::{
    Analysis, AnalyzerConfig, DiagnosticKind, ScopeTree, SemanticAnalyzer, GLOBAL_SCOPE,
};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Program {
    Parser::new(source)
        .and_then(|mut parser| parser.parse())
        .expect("test source should parse")
}

fn analyze(source: &str) -> (Program, Analysis) {
    let program = parse(source);
    let analysis = SemanticAnalyzer::with_config(AnalyzerConfig { builtins: false })
        .analyze(&program)
        .expect("analysis should not hit an internal error");
    (program, analysis)
}

fn scope_names(tree: &ScopeTree) -> Vec<String> {
    tree.traversal_order()
        .into_iter()
        .map(|id| tree.scope(id).name().to_string())
        .collect()
}

const SORT: &str = "\
int a[10];
int n;

void swap(int v[], int i, int j)
{
  int t;
  t = v[i]; v[i] = v[j]; v[j] = t;
}

int minloc(int v[], int low, int high)
{
  int i; int x; int k;
  k = low;
  x = v[low];
  i = low + 1;
  while (i < high) {
    if (v[i] < x) { x = v[i]; k = i; }
    i = i + 1;
  }
  return k;
}

void sort(int v[], int low, int high)
{
  int i;
  i = low;
  while (i < high - 1) {
    int k;
    k = minloc(v, i, high);
    swap(v, k, i);
    i = i + 1;
  }
}

void main(void)
{
  n = 10;
  sort(a, 0, n);
}
";

#[test]
fn test_well_formed_program_has_no_errors() {
    let (_, analysis) = analyze(SORT);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics);

    let program = parse(SORT);
    let with_builtins = SemanticAnalyzer::new().analyze(&program).unwrap();
    assert!(!with_builtins.has_errors());
}

#[test]
fn test_slots_unique_and_increasing_per_scope() {
    let (_, analysis) = analyze(SORT);
    let tree = &analysis.scopes;

    for scope in tree.traversal_order() {
        let mut symbols: Vec<_> = tree.symbols_in(scope).collect();
        symbols.sort_by_key(|s| s.slot);

        let slots: Vec<usize> = symbols.iter().map(|s| s.slot).collect();
        assert_eq!(slots, (0..symbols.len()).collect::<Vec<_>>());
        assert!(symbols
            .windows(2)
            .all(|w| w[0].declared_line() <= w[1].declared_line()));
        assert_eq!(tree.scope(scope).next_slot(), symbols.len());
    }

    let k = tree.lookup_local("{block@27.0}", "k").symbol().unwrap();
    assert_eq!(tree.symbol(k).slot, 0);
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let source = "int x;\nvoid f(void)\n{\n  {\n    int x;\n    x = 1;\n  }\n  x = 2;\n}";
    let (_, analysis) = analyze(source);
    let tree = &analysis.scopes;

    assert!(!analysis.has_errors());
    let inner = tree.lookup("{block@4.0}", "x").symbol().unwrap();
    let outer = tree.lookup("f", "x").symbol().unwrap();
    assert_ne!(inner, outer);
    assert_eq!(tree.symbol(inner).lines, vec![5, 6]);
    assert_eq!(tree.symbol(outer).lines, vec![1, 8]);
}

#[test]
fn test_closed_block_is_not_visible() {
    let source = "void f(void)\n{\n  { int z; z = 1; }\n  z = 2;\n}";
    let (_, analysis) = analyze(source);

    let undeclared: Vec<_> = analysis
        .diagnostics
        .iter()
        .map(|d| (d.kind, d.name.clone(), d.line))
        .collect();
    assert_eq!(
        undeclared,
        vec![(DiagnosticKind::UndeclaredReference, Some("z".to_string()), 4)]
    );

    // the block is closed but still part of the tree
    assert!(analysis.scopes.lookup_local("{block@3.0}", "z").is_found());
}

#[test]
fn test_block_names_distinct_and_reproducible() {
    let source = "void f(void)\n{\n  { int a; } { int b; { int c; } }\n  { int d; }\n}";
    let (_, first) = analyze(source);
    let (_, second) = analyze(source);

    let names = scope_names(&first.scopes);
    assert_eq!(names, scope_names(&second.scopes));
    assert_eq!(
        names,
        vec![
            GLOBAL_SCOPE,
            "f",
            "{block@3.0}",
            "{block@3.1}",
            "{block@4.0}",
            "{block@3.2}",
        ]
    );
}

#[test]
fn test_call_with_one_bad_argument() {
    let source = "int f(int a, int b[], int c) { return a; }\nvoid g(void)\n{\n  int x; int y[2];\n  x = f(1, y, y);\n}";
    let (program, analysis) = analyze(source);

    assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::TypeMismatch]);
    assert_eq!(analysis.diagnostics.iter().next().unwrap().line, 5);

    let DeclKind::Function(g) = &program.declarations[1].kind else {
        panic!("expected function g");
    };
    let StmtKind::Expr(assign) = &g.body.statements[0].kind else {
        panic!("expected an expression statement");
    };
    assert_eq!(assign.ty(), Some(ExpType::Integer));
}

#[test]
fn test_duplicate_global() {
    let (_, analysis) = analyze("int x;\nint x;\nint z;");
    let tree = &analysis.scopes;

    assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::DuplicateDeclaration]);
    let x = tree.lookup_local(GLOBAL_SCOPE, "x").symbol().unwrap();
    let z = tree.lookup_local(GLOBAL_SCOPE, "z").symbol().unwrap();
    assert_eq!(tree.symbol(x).slot, 0);
    assert_eq!(tree.symbol(x).lines, vec![1]);
    assert_eq!(tree.symbol(z).slot, 1);
}

#[test]
fn test_bare_return_from_int_function() {
    let (_, analysis) = analyze("int f(void)\n{\n  return;\n}");

    assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::TypeMismatch]);
    assert_eq!(analysis.diagnostics.iter().next().unwrap().line, 3);
}

#[test]
fn test_zero_sized_array() {
    let (_, analysis) = analyze("int a[0];");

    assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::InvalidArraySize]);
    assert!(!analysis.scopes.lookup_local(GLOBAL_SCOPE, "a").is_found());
    assert_eq!(analysis.scopes.scope(analysis.scopes.root()).next_slot(), 0);
}

#[test]
fn test_assignment_to_undeclared() {
    let source = "void f(void)\n{\n  int k;\n  y = 3;\n  k = 4;\n}";
    let (program, analysis) = analyze(source);

    assert_eq!(analysis.diagnostics.kinds(), vec![DiagnosticKind::UndeclaredReference]);
    assert_eq!(statement_types(&program, 0), vec![None, Some(ExpType::Integer)]);
}

#[test]
fn test_same_name_in_nested_blocks() {
    let source = "void f(void)\n{\n  { int v;\n    { int v; }\n  }\n}";
    let (_, analysis) = analyze(source);
    let tree = &analysis.scopes;

    assert!(!analysis.has_errors());
    let outer = tree.lookup_local("{block@3.0}", "v");
    let inner = tree.lookup_local("{block@4.0}", "v");
    assert_ne!(outer.symbol().unwrap(), inner.symbol().unwrap());
    assert_ne!(outer, inner);
}

#[test]
fn test_errors_accumulate_across_passes() {
    let source = "\
int g;
int g;
void v;
int f(int a)
{
  int b[0];
  c = 1;
  if (b) a = 1;
  return;
}";
    let (_, analysis) = analyze(source);

    let found: Vec<(DiagnosticKind, usize)> =
        analysis.diagnostics.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(
        found,
        vec![
            (DiagnosticKind::DuplicateDeclaration, 2),
            (DiagnosticKind::VoidVariable, 3),
            (DiagnosticKind::InvalidArraySize, 6),
            (DiagnosticKind::UndeclaredReference, 7),
            (DiagnosticKind::UndeclaredReference, 8),
            (DiagnosticKind::TypeMismatch, 9),
        ]
    );
}

fn statement_types(program: &Program, decl: usize) -> Vec<Option<ExpType>> {
    let DeclKind::Function(func) = &program.declarations[decl].kind else {
        panic!("expected a function at declaration {}", decl);
    };
    func.body
        .statements
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Expr(expr) => expr.ty(),
            other => panic!("unexpected statement {:?}", other),
        })
        .collect()
}

#[test]
fn test_call_to_later_function_is_reported_once() {
    let source = "void f(void)\n{\n  g(1);\n}\nint g(void) { return 0; }";
    let (program, analysis) = analyze(source);

    let found: Vec<(DiagnosticKind, usize)> =
        analysis.diagnostics.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(found, vec![(DiagnosticKind::UndeclaredReference, 3)]);
    assert_eq!(statement_types(&program, 0), vec![None]);

    let g = analysis.scopes.lookup_local(GLOBAL_SCOPE, "g").symbol().unwrap();
    assert_eq!(analysis.scopes.symbol(g).lines, vec![5]);
}

#[test]
fn test_assignment_to_later_array_is_reported_once() {
    let source = "void f(void)\n{\n  x = 1;\n}\nint x[3];";
    let (program, analysis) = analyze(source);

    let found: Vec<(DiagnosticKind, usize)> =
        analysis.diagnostics.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(found, vec![(DiagnosticKind::UndeclaredReference, 3)]);
    assert_eq!(statement_types(&program, 0), vec![None]);

    let x = analysis.scopes.lookup_local(GLOBAL_SCOPE, "x").symbol().unwrap();
    assert_eq!(analysis.scopes.symbol(x).lines, vec![5]);
}

#[test]
fn test_many_sibling_blocks() {
    const BLOCKS: usize = 10_000;
    let source = format!("void f(void)\n{{\n{}}}", "  { }\n".repeat(BLOCKS));
    let (_, analysis) = analyze(&source);
    let tree = &analysis.scopes;

    assert!(!analysis.has_errors());
    assert_eq!(tree.scope_count(), BLOCKS + 2);
    assert!(tree.find_scope("{block@10002.0}").is_some());

    let names = scope_names(tree);
    assert_eq!(names.len(), BLOCKS + 2);
    assert_eq!(names[..3], [GLOBAL_SCOPE, "f", "{block@3.0}"]);
    assert_eq!(names[BLOCKS + 1], "{block@10002.0}");
}

#[test]
fn test_deeply_nested_blocks() {
    const DEPTH: usize = 200;
    let source = format!(
        "int g;\nvoid f(void)\n{{{}g = 1;{}\n}}",
        "{ ".repeat(DEPTH),
        " }".repeat(DEPTH)
    );
    let (_, analysis) = analyze(&source);
    let tree = &analysis.scopes;

    assert!(!analysis.has_errors());
    assert_eq!(tree.scope_count(), DEPTH + 2);

    let names = scope_names(tree);
    let expected: Vec<String> = [GLOBAL_SCOPE.to_string(), "f".to_string()]
        .into_iter()
        .chain((0..DEPTH).map(|ordinal| format!("{{block@3.{}}}", ordinal)))
        .collect();
    assert_eq!(names, expected);

    let innermost = format!("{{block@3.{}}}", DEPTH - 1);
    let g = tree.lookup_local(GLOBAL_SCOPE, "g").symbol().unwrap();
    assert_eq!(tree.lookup(&innermost, "g").symbol(), Some(g));
    assert_eq!(tree.symbol(g).lines, vec![1, 3]);
}
