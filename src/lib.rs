pub mod abi;
pub mod ast;
pub mod codegen;
pub mod ebpf;
pub mod error;

pub use codegen::{
    annotate_builtin, compile_builtin, marshal_arg, resolve_annotate, resolve_compile,
    CompileError, MarshalError,
};
pub use error::{AnnotateError, UnknownBuiltin};
