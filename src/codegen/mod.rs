//! Builtin lowering into eBPF helper calls.
//!
//! The work is split into:
//! - `builtins`: the global builtin catalogue plus the per-builtin annotate
//!   and compile routines.
//! - `marshal`: helper-call argument marshaling against the ABI's
//!   argument-register window.

use thiserror::Error;

use crate::ast::ValueType;
use crate::error::UnknownBuiltin;

mod builtins;
mod marshal;

pub use builtins::{annotate_builtin, compile_builtin, resolve_annotate, resolve_compile};
pub use builtins::{AnnotateFn, CompileFn};
pub use marshal::marshal_arg;

/// Errors raised while marshaling one helper-call argument.
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("cannot pass {ty} value located in {loc} to a helper call")]
    UnsupportedOperand { ty: ValueType, loc: String },
    #[error("helper call arguments exceed the register window")]
    RegisterExhausted,
}

/// Errors raised while compiling a builtin call.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Unknown(#[from] UnknownBuiltin),
    #[error("`{0}` has no code generator yet")]
    NotImplemented(String),
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}
