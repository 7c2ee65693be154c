//! C-Minus Compiler - semantic analysis driver
//!
//! Usage: cminusc [OPTIONS] <input>

use anyhow::Context;
use clap::Parser as ClapParser;
use cminus_compiler::common::DiagnosticReporter;
use cminus_compiler::frontend::{AnalyzerConfig, CMinusFrontend, CompileContext, FrontendConfig};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "cminusc")]
#[command(author = "C-Minus Toolchain Team")]
#[command(version)]
#[command(about = "Symbol table construction and type checking for C-Minus", long_about = None)]
struct Args {
    /// Input source file (.cm)
    #[arg(required = true)]
    input: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Print the symbol and function tables after analysis
    #[arg(long)]
    trace_analyze: bool,

    /// Do not predeclare the `input` and `output` runtime functions
    #[arg(long)]
    no_builtins: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    // Set up diagnostic reporter
    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    if args.verbose {
        eprintln!("Analyzing {}", filename);
    }

    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        trace_analyze: args.trace_analyze,
        verbose: args.verbose,
        analyzer: AnalyzerConfig { builtins: !args.no_builtins },
    };

    let ctx = CompileContext::new(filename.clone(), file_id, &reporter);
    CMinusFrontend::new().compile(&source, &ctx, &config)?;

    if args.verbose {
        eprintln!("{}: ok", filename);
    }

    Ok(())
}
