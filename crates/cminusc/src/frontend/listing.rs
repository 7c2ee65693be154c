//! Text listings of an analyzed scope tree
//!
//! Used by `--trace-analyze`.

use std::fmt::Write;

use crate::frontend::sema::ScopeTree;

/// One row per symbol; scopes in traversal order, symbols in bucket order
pub fn symbol_table_listing(tree: &ScopeTree) -> String {
    let mut out = String::new();
    out.push_str("Variable Name  Variable Type  Scope Name  Location  Line Numbers\n");
    out.push_str("-------------  -------------  ----------  --------  ------------\n");

    for scope_id in tree.traversal_order() {
        let scope = tree.scope(scope_id);
        for symbol in tree.symbols_in(scope_id) {
            let mut row = format!(
                "{:<14} {:<13}  {:<10}  {:<8}  ",
                symbol.name,
                symbol.value_type().to_string(),
                scope.name(),
                symbol.slot
            );
            for line in symbol.sorted_lines() {
                let _ = write!(row, "{:>4} ", line);
            }
            out.push_str(row.trim_end());
            out.push('\n');
        }
    }
    out
}

/// Signatures of the functions declared in the global scope
pub fn function_table_listing(tree: &ScopeTree) -> String {
    let mut out = String::new();
    out.push_str("Function Name  Return Type  Parameters\n");
    out.push_str("-------------  -----------  ----------\n");

    for symbol in tree.symbols_in(tree.root()) {
        let Some(signature) = &symbol.signature else {
            continue;
        };
        let params = if signature.params.is_empty() {
            "void".to_string()
        } else {
            signature
                .params
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let row = format!(
            "{:<14} {:<11}  {}",
            symbol.name,
            signature.return_type.to_string(),
            params
        );
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}
