//! Helper-call argument marshaling.
//!
//! Scalars travel in a single argument register; strings travel as an
//! address/length register pair, since the calling convention cannot pass
//! variable-length data by value. Instructions are staged into a scratch
//! buffer owned by the calling generator, so a call that fails part-way
//! leaves nothing behind in the program.

use crate::abi::{self, RegWindow};
use crate::ast::{Expr, ExprKind, Loc, ValueType};
use crate::ebpf::{AluOp, Insn};

use super::MarshalError;

fn loc_desc(loc: Option<Loc>) -> String {
    loc.map_or_else(|| "no location".to_string(), |loc| loc.to_string())
}

/// Stage the instructions that place `arg` into the next register(s) of the
/// call window.
///
/// The argument must already be annotated and have a value location; trace
/// arguments are compiled by sibling passes before the call itself is.
pub fn marshal_arg(
    arg: &Expr,
    regs: &mut RegWindow,
    out: &mut Vec<Insn>,
) -> Result<(), MarshalError> {
    let annot = arg.annot();
    match annot.ty {
        ValueType::Int => {
            let dst = regs.take().ok_or(MarshalError::RegisterExhausted)?;
            match annot.loc {
                Some(Loc::Reg(src)) => {
                    if src != dst {
                        out.push(Insn::Mov { dst, src });
                    }
                    Ok(())
                }
                Some(Loc::Stack(off)) => {
                    out.push(Insn::LdxDw {
                        dst,
                        base: abi::FRAME,
                        off,
                    });
                    Ok(())
                }
                None => Err(MarshalError::UnsupportedOperand {
                    ty: annot.ty,
                    loc: loc_desc(annot.loc),
                }),
            }
        }
        ValueType::Str => match annot.loc {
            Some(Loc::Stack(off)) => {
                let ptr = regs.take().ok_or(MarshalError::RegisterExhausted)?;
                out.push(Insn::Mov {
                    dst: ptr,
                    src: abi::FRAME,
                });
                out.push(Insn::AluImm {
                    op: AluOp::Add,
                    dst: ptr,
                    imm: off.into(),
                });

                let len = regs.take().ok_or(MarshalError::RegisterExhausted)?;
                // Literal strings pass their exact length including the
                // terminating NUL; anything else passes the declared capacity.
                let imm = match &arg.kind {
                    ExprKind::Str(s) => s.len() as i32 + 1,
                    _ => annot.size.into(),
                };
                out.push(Insn::MovImm { dst: len, imm });
                Ok(())
            }
            _ => Err(MarshalError::UnsupportedOperand {
                ty: annot.ty,
                loc: loc_desc(annot.loc),
            }),
        },
    }
}
