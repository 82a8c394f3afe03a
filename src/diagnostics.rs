use crate::language::{
    errors::{SyntaxError, SyntaxErrors},
    typecheck::{Diagnostic, Diagnostics},
};
use miette::{NamedSource, Report, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, miette::Diagnostic)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource, err: SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            label: err.message.clone(),
            message: err.message,
        }
    }
}

#[derive(Debug, Error, miette::Diagnostic)]
#[error("{message}")]
pub struct CheckDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
}

impl CheckDiagnostic {
    pub fn from_diagnostic(src: NamedSource, diagnostic: &Diagnostic) -> Self {
        Self {
            src,
            span: diagnostic.to_source_span(),
            label: diagnostic.message.clone(),
            message: diagnostic.message.clone(),
        }
    }
}

pub fn emit_syntax_errors(path: &str, source: &str, errors: &SyntaxErrors) {
    for err in &errors.errors {
        let src = NamedSource::new(path, source.to_string());
        let diagnostic = SyntaxDiagnostic::from_error(src, err.clone());
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

pub fn emit_check_diagnostics(path: &str, source: &str, diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let src = NamedSource::new(path, source.to_string());
        let report = CheckDiagnostic::from_diagnostic(src, diagnostic);
        eprintln!("{:?}", Report::new(report));
    }
}
