use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

fn source_span(span: Span) -> SourceSpan {
    (span.start, span.end - span.start).into()
}

/// Dispatch-table lookup miss; carries the offending identifier verbatim.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
#[error("unknown builtin `{name}`")]
pub struct UnknownBuiltin {
    pub name: String,
}

impl UnknownBuiltin {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Errors raised while annotating a builtin call.
#[derive(Debug, Error, Diagnostic)]
pub enum AnnotateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Unknown(#[from] UnknownBuiltin),

    #[error("`{name}` expects {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("`{name}` expects a {expected} as argument {index}")]
    Type {
        name: String,
        index: usize,
        expected: &'static str,
        #[label("wrong argument type")]
        span: SourceSpan,
    },
}

impl AnnotateError {
    pub fn arity(name: &str, expected: &'static str, got: usize, span: Span) -> Self {
        Self::Arity {
            name: name.to_string(),
            expected,
            got,
            span: source_span(span),
        }
    }

    pub fn bad_type(name: &str, index: usize, expected: &'static str, span: Span) -> Self {
        Self::Type {
            name: name.to_string(),
            index,
            expected,
            span: source_span(span),
        }
    }
}
