//! Instruction forms and the program under construction.
//!
//! The builtin compiler only ever appends instructions; nothing edits or
//! removes what has been emitted. Stack reservations are word aligned and
//! grow downward from the frame base register.

use crate::abi::{self, Helper, Reg};

/// Arithmetic/logic ops usable with an immediate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    And,
    Rsh,
}

/// The instruction forms this backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insn {
    /// Call a kernel helper by ID; result lands in `r0`.
    Call(Helper),
    /// `dst = src`
    Mov { dst: Reg, src: Reg },
    /// `dst = imm`
    MovImm { dst: Reg, imm: i32 },
    /// `dst = dst <op> imm`
    AluImm { op: AluOp, dst: Reg, imm: i32 },
    /// `dst = *(u64 *)(base + off)`
    LdxDw { dst: Reg, base: Reg, off: i16 },
}

/// An eBPF program being assembled, plus its frame layout.
#[derive(Debug, Default)]
pub struct Prog {
    insns: Vec<Insn>,
    stack_top: i16,
}

impl Prog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instruction.
    pub fn emit(&mut self, insn: Insn) {
        self.insns.push(insn);
    }

    /// Append a staged instruction sequence.
    pub fn append(&mut self, seq: &[Insn]) {
        self.insns.extend_from_slice(seq);
    }

    pub fn insns(&self) -> &[Insn] {
        &self.insns
    }

    /// Reserve a stack slot and return its offset from the frame base.
    ///
    /// Reservations are rounded up to the native word so later dword loads
    /// stay aligned.
    pub fn alloc_stack(&mut self, size: u16) -> i16 {
        let word = abi::WORD as i16;
        let size = (size as i16 + word - 1) & !(word - 1);
        self.stack_top -= size;
        self.stack_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_reservations_are_word_aligned() {
        let mut prog = Prog::new();
        assert_eq!(prog.alloc_stack(16), -16);
        assert_eq!(prog.alloc_stack(3), -24);
        assert_eq!(prog.alloc_stack(8), -32);
    }

    #[test]
    fn append_preserves_order() {
        let mut prog = Prog::new();
        prog.emit(Insn::Call(Helper::KtimeGetNs));
        prog.append(&[
            Insn::MovImm {
                dst: Reg::R1,
                imm: 1,
            },
            Insn::Mov {
                dst: Reg::R2,
                src: Reg::R0,
            },
        ]);
        assert_eq!(prog.insns().len(), 3);
        assert_eq!(prog.insns()[0], Insn::Call(Helper::KtimeGetNs));
    }
}
