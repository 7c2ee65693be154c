//! C-Minus frontend
//!
//! The frontend is responsible for:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an AST
//! 3. Building the scoped symbol table
//! 4. Type checking

pub mod ast;
pub mod lexer;
pub mod listing;
pub mod parser;
pub mod sema;

use crate::common::{CompileError, CompileResult, DiagnosticReporter};

pub use ast::Program;
pub use lexer::{Lexer, Token, TokenKind};
pub use listing::{function_table_listing, symbol_table_listing};
pub use parser::Parser;
pub use sema::{Analysis, AnalyzerConfig, SemanticAnalyzer};

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    /// Print the symbol and function tables after analysis
    pub trace_analyze: bool,
    pub verbose: bool,
    pub analyzer: AnalyzerConfig,
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// A parsed program together with its analysis
#[derive(Debug)]
pub struct AnalyzedProgram {
    /// Expression `ty` cells are filled in
    pub program: Program,
    pub analysis: Analysis,
}

/// C-Minus language frontend
#[derive(Debug, Default)]
pub struct CMinusFrontend;

impl CMinusFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Run the pipeline: lex -> parse -> build -> check.
    ///
    /// Every error is reported through `ctx.reporter`. Semantic diagnostics
    /// are all reported before `CompileError::Semantic` is returned.
    pub fn compile(
        &self,
        source: &str,
        ctx: &CompileContext,
        config: &FrontendConfig,
    ) -> CompileResult<AnalyzedProgram> {
        // Phase 1: Lexing (optional token dump)
        if config.dump_tokens {
            match self.dump_tokens(source) {
                Ok(tokens) => {
                    eprintln!("=== C-Minus Tokens ===");
                    eprint!("{}", tokens);
                    eprintln!("=== End Tokens ===\n");
                }
                Err(e) => {
                    ctx.reporter.report_error(ctx.file_id, &e);
                    return Err(e);
                }
            }
        }

        // Phase 2: Parsing
        if config.verbose {
            eprintln!("Parsing {}...", ctx.filename);
        }

        let program = match Parser::new(source).and_then(|mut parser| parser.parse()) {
            Ok(program) => program,
            Err(e) => {
                ctx.reporter.report_error(ctx.file_id, &e);
                return Err(e);
            }
        };

        if config.dump_ast {
            eprintln!("=== C-Minus AST ===");
            eprintln!("{:#?}", program);
            eprintln!("=== End AST ===\n");
        }

        // Phase 3: Semantic analysis
        if config.verbose {
            eprintln!("Building symbol table and type checking...");
        }

        let analyzer = SemanticAnalyzer::with_config(config.analyzer.clone());
        let analysis = match analyzer.analyze(&program) {
            Ok(analysis) => analysis,
            Err(e) => {
                ctx.reporter.report_error(ctx.file_id, &e);
                return Err(e);
            }
        };

        for diagnostic in &analysis.diagnostics {
            ctx.reporter.report_diagnostic(ctx.file_id, diagnostic);
        }
        if analysis.has_errors() {
            let error = CompileError::Semantic { count: analysis.diagnostics.len() };
            ctx.reporter.report_error(ctx.file_id, &error);
            return Err(error);
        }

        if config.trace_analyze {
            eprintln!("=== Symbol Table ===");
            eprint!("{}", symbol_table_listing(&analysis.scopes));
            eprintln!("=== Functions ===");
            eprint!("{}", function_table_listing(&analysis.scopes));
            eprintln!("=== End Symbol Table ===\n");
        }

        if config.verbose {
            eprintln!(
                "Analysis complete: {} scope(s), no errors",
                analysis.scopes.scope_count()
            );
        }

        Ok(AnalyzedProgram { program, analysis })
    }

    pub fn dump_tokens(&self, source: &str) -> CompileResult<String> {
        let lexer = Lexer::new(source);
        let tokens = lexer.tokenize_all()?;
        let mut output = String::new();
        for token in &tokens {
            output.push_str(&format!("{:?}\n", token));
        }
        Ok(output)
    }

    pub fn dump_ast(&self, source: &str) -> CompileResult<String> {
        let mut parser = Parser::new(source)?;
        let ast = parser.parse()?;
        Ok(format!("{:#?}", ast))
    }
}
