//! The global builtin catalogue.
//!
//! Each builtin pairs an annotate routine, which fixes the node's type and
//! size before any code exists, with a compile routine, which emits the
//! helper call and records where the result landed. The catalogue is static;
//! new builtins are added here, never registered at runtime.

use crate::abi::{self, Helper, RegWindow};
use crate::ast::{Annot, Expr, ExprKind, Loc, ValueType};
use crate::ebpf::{AluOp, Insn, Prog};
use crate::error::{AnnotateError, UnknownBuiltin};

use super::marshal::marshal_arg;
use super::{CompileError, MarshalError};

pub type AnnotateFn = fn(&mut Expr) -> Result<(), AnnotateError>;
pub type CompileFn = fn(&mut Expr, &mut Prog) -> Result<(), CompileError>;

struct Builtin {
    name: &'static str,
    annotate: AnnotateFn,
    /// `None` marks a builtin that is recognized and annotatable but has no
    /// code generator yet.
    compile: Option<CompileFn>,
}

static GLOBAL_BUILTINS: &[Builtin] = &[
    Builtin {
        name: "gid",
        annotate: annotate_int_noargs,
        compile: Some(compile_gid),
    },
    Builtin {
        name: "uid",
        annotate: annotate_int_noargs,
        compile: Some(compile_uid),
    },
    Builtin {
        name: "tgid",
        annotate: annotate_int_noargs,
        compile: Some(compile_tgid),
    },
    Builtin {
        name: "pid",
        annotate: annotate_int_noargs,
        compile: Some(compile_pid),
    },
    Builtin {
        name: "ns",
        annotate: annotate_int_noargs,
        compile: Some(compile_ns),
    },
    Builtin {
        name: "comm",
        annotate: annotate_comm,
        compile: Some(compile_comm),
    },
    Builtin {
        name: "execname",
        annotate: annotate_comm,
        compile: Some(compile_comm),
    },
    Builtin {
        name: "trace",
        annotate: annotate_trace,
        compile: Some(compile_trace),
    },
    Builtin {
        name: "count",
        annotate: annotate_int_noargs,
        compile: None,
    },
];

fn lookup(name: &str) -> Result<&'static Builtin, UnknownBuiltin> {
    GLOBAL_BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .ok_or_else(|| UnknownBuiltin::new(name))
}

/// Resolve the annotate routine for a builtin name.
pub fn resolve_annotate(name: &str) -> Result<AnnotateFn, UnknownBuiltin> {
    Ok(lookup(name)?.annotate)
}

/// Resolve the compile routine for a builtin name.
///
/// `Ok(None)` means the builtin exists but has no generator; invoking it via
/// [`compile_builtin`] reports `NotImplemented`, distinct from an unknown
/// name.
pub fn resolve_compile(name: &str) -> Result<Option<CompileFn>, UnknownBuiltin> {
    Ok(lookup(name)?.compile)
}

fn call_name(node: &Expr) -> &str {
    match &node.kind {
        ExprKind::Call { name, .. } => name,
        _ => unreachable!("builtin dispatch on a literal node"),
    }
}

/// Annotate a builtin call: validate arity and argument types, then fix the
/// node's result type and size.
pub fn annotate_builtin(node: &mut Expr) -> Result<(), AnnotateError> {
    let annotate = resolve_annotate(call_name(node))?;
    annotate(node)
}

/// Compile an annotated builtin call: emit its helper-call sequence and set
/// the node's result location.
pub fn compile_builtin(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    let name = call_name(node);
    let Some(compile) = lookup(name)?.compile else {
        return Err(CompileError::NotImplemented(name.to_string()));
    };
    compile(node, prog)
}

fn annotate_int_noargs(node: &mut Expr) -> Result<(), AnnotateError> {
    let ExprKind::Call { name, args } = &node.kind else {
        unreachable!("builtin annotate on a literal node")
    };
    if !args.is_empty() {
        return Err(AnnotateError::arity(name, "no", args.len(), node.span));
    }
    node.annot = Some(Annot::new(ValueType::Int, abi::WORD));
    Ok(())
}

fn annotate_comm(node: &mut Expr) -> Result<(), AnnotateError> {
    let ExprKind::Call { name, args } = &node.kind else {
        unreachable!("builtin annotate on a literal node")
    };
    if !args.is_empty() {
        return Err(AnnotateError::arity(name, "no", args.len(), node.span));
    }
    node.annot = Some(Annot::new(ValueType::Str, abi::COMM_LEN));
    Ok(())
}

fn annotate_trace(node: &mut Expr) -> Result<(), AnnotateError> {
    let ExprKind::Call { name, args } = &node.kind else {
        unreachable!("builtin annotate on a literal node")
    };
    let Some(fmt) = args.first() else {
        return Err(AnnotateError::arity(name, "at least one", 0, node.span));
    };
    // The format string must be string-typed; the remaining arguments are
    // checked against the calling convention at marshal time.
    let is_str = matches!(fmt.kind, ExprKind::Str(_))
        || fmt.annot.as_ref().is_some_and(|a| a.ty == ValueType::Str);
    if !is_str {
        return Err(AnnotateError::bad_type(name, 0, "string", fmt.span));
    }
    Ok(())
}

/// Which half of a packed 64-bit helper result to keep.
enum Extract {
    None,
    /// Low 31 bits.
    Mask,
    /// High 32 bits.
    Shift,
}

/// Shared lowering for the no-argument helpers that leave a word in `r0`.
///
/// `get_current_uid_gid` and `get_current_pid_tgid` pack two ids into one
/// 64-bit value; the caller picks a half via `extract`.
fn compile_word_helper(
    node: &mut Expr,
    prog: &mut Prog,
    helper: Helper,
    extract: Extract,
) -> Result<(), CompileError> {
    prog.emit(Insn::Call(helper));
    match extract {
        // 32-bit immediates are sign-extended, so 0xffffffff would smear
        // into the upper half; the ids fit in 31 bits.
        Extract::Mask => prog.emit(Insn::AluImm {
            op: AluOp::And,
            dst: abi::RET,
            imm: 0x7fffffff,
        }),
        Extract::Shift => prog.emit(Insn::AluImm {
            op: AluOp::Rsh,
            dst: abi::RET,
            imm: 32,
        }),
        Extract::None => {}
    }
    node.annot_mut().loc = Some(Loc::Reg(abi::RET));
    Ok(())
}

fn compile_gid(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    compile_word_helper(node, prog, Helper::GetCurrentUidGid, Extract::Shift)
}

fn compile_uid(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    compile_word_helper(node, prog, Helper::GetCurrentUidGid, Extract::Mask)
}

fn compile_tgid(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    compile_word_helper(node, prog, Helper::GetCurrentPidTgid, Extract::Shift)
}

fn compile_pid(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    compile_word_helper(node, prog, Helper::GetCurrentPidTgid, Extract::Mask)
}

fn compile_ns(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    compile_word_helper(node, prog, Helper::KtimeGetNs, Extract::None)
}

/// `comm`/`execname`: the helper writes the name into a stack region we
/// reserve here; the result location is that region, not a register.
fn compile_comm(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    let size = node.annot().size;
    let off = prog.alloc_stack(size);

    let mut regs = RegWindow::args();
    let dst = regs.take().ok_or(MarshalError::RegisterExhausted)?;
    let len = regs.take().ok_or(MarshalError::RegisterExhausted)?;

    prog.emit(Insn::Mov {
        dst,
        src: abi::FRAME,
    });
    prog.emit(Insn::AluImm {
        op: AluOp::Add,
        dst,
        imm: off.into(),
    });
    prog.emit(Insn::MovImm {
        dst: len,
        imm: size.into(),
    });
    prog.emit(Insn::Call(Helper::GetCurrentComm));
    node.annot_mut().loc = Some(Loc::Stack(off));
    Ok(())
}

/// `trace`: marshal every argument left to right, then call the print
/// helper. Marshaled instructions are staged and appended only once all
/// arguments succeeded, so a failed call emits nothing.
fn compile_trace(node: &mut Expr, prog: &mut Prog) -> Result<(), CompileError> {
    let ExprKind::Call { args, .. } = &node.kind else {
        unreachable!("builtin compile on a literal node")
    };

    let mut regs = RegWindow::args();
    let mut staged = Vec::new();
    for arg in args {
        marshal_arg(arg, &mut regs, &mut staged)?;
    }

    prog.append(&staged);
    prog.emit(Insn::Call(Helper::TracePrintk));
    Ok(())
}
