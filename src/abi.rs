//! eBPF calling-convention constants shared between annotation and codegen.
//!
//! Everything environment-defined lives here: register numbering, the
//! argument-register window, the native word size, and the kernel helper IDs.

use std::fmt;

/// Numbered eBPF register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reg(u8);

impl Reg {
    pub const R0: Reg = Reg(0);
    pub const R1: Reg = Reg(1);
    pub const R2: Reg = Reg(2);
    pub const R3: Reg = Reg(3);
    pub const R4: Reg = Reg(4);
    pub const R5: Reg = Reg(5);
    pub const R10: Reg = Reg(10);

    pub fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Return-value register for helper calls.
pub const RET: Reg = Reg::R0;
/// First register usable for helper-call arguments.
pub const ARG_FIRST: Reg = Reg::R1;
/// Last register usable for helper-call arguments.
pub const ARG_LAST: Reg = Reg::R5;
/// Frame base; stack slots sit at negative offsets from it.
pub const FRAME: Reg = Reg::R10;

/// Native word size in bytes.
pub const WORD: u16 = 8;
/// Capacity the kernel imposes on task comm strings (TASK_COMM_LEN).
pub const COMM_LEN: u16 = 16;

/// Kernel helper IDs, as understood by the call instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Helper {
    KtimeGetNs = 5,
    TracePrintk = 6,
    GetCurrentPidTgid = 14,
    GetCurrentUidGid = 15,
    GetCurrentComm = 16,
}

/// Argument-register window for a single helper call.
///
/// A cursor over `first..=last`; [`RegWindow::take`] is the only way to claim
/// a register, so the ABI ceiling is enforced in exactly one place.
#[derive(Debug, Clone)]
pub struct RegWindow {
    next: u8,
    last: u8,
}

impl RegWindow {
    pub fn new(first: Reg, last: Reg) -> Self {
        Self {
            next: first.index(),
            last: last.index(),
        }
    }

    /// Window over the full argument-register range of the ABI.
    pub fn args() -> Self {
        Self::new(ARG_FIRST, ARG_LAST)
    }

    /// Claim the next argument register, or `None` once the window is spent.
    pub fn take(&mut self) -> Option<Reg> {
        if self.next > self.last {
            return None;
        }
        let reg = Reg(self.next);
        self.next += 1;
        Some(reg)
    }
}
