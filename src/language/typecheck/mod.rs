use crate::language::span::Span;
use miette::SourceSpan;

/// One recorded semantic error. Checking never aborts: every violation is
/// appended here and a fallback type stands in, so one pass over the tree
/// collects every diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    pub fn to_source_span(&self) -> SourceSpan {
        (self.span.start, self.span.len()).into()
    }
}

/// Per-compilation diagnostic accumulator, created fresh by each top-level
/// compile and threaded through the binder and checker.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(span, message));
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

mod assign;
mod binder;
mod checker;
mod resolve;
mod scopes;

#[cfg(test)]
mod tests;

pub use assign::is_assignable;
pub use binder::bind;
pub use checker::check_module;
pub use resolve::resolve_type;
pub use scopes::{Scope, ScopeChain, Symbol};
