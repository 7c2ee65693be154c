//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

use super::Span;
use crate::frontend::sema::Diagnostic as SemanticDiagnostic;

/// Compile error with source location
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("semantic analysis failed with {count} error(s)")]
    Semantic { count: usize },

    #[error("internal compiler error: {message}")]
    Internal { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let diagnostic = match error {
            CompileError::Lexer { message, span } => Diagnostic::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Parser { message, span } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Semantic { .. } => Diagnostic::error().with_message(error.to_string()),

            CompileError::Internal { message } => Diagnostic::bug()
                .with_message(format!("internal compiler error: {}", message)),

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {}", err))
            }
        };

        self.emit(&diagnostic);
    }

    /// Render one analyzer diagnostic, labelled at the offending node
    pub fn report_diagnostic(&self, file_id: usize, diagnostic: &SemanticDiagnostic) {
        let mut rendered = Diagnostic::error()
            .with_code(diagnostic.kind.code())
            .with_message(&diagnostic.message)
            .with_notes(vec![format!("line {}", diagnostic.line)]);

        if !diagnostic.span.is_empty() {
            let label = Label::primary(file_id, diagnostic.span.start..diagnostic.span.end);
            rendered = rendered.with_labels(vec![match &diagnostic.name {
                Some(name) => label.with_message(format!("`{}`", name)),
                None => label,
            }]);
        }

        self.emit(&rendered);
    }

    fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
