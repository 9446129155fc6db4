use tracec::abi::{Reg, RegWindow};
use tracec::ast::{Annot, Expr, Loc, Span, ValueType};
use tracec::ebpf::{AluOp, Insn};
use tracec::{marshal_arg, MarshalError};

fn span() -> Span {
    Span::new(0, 4)
}

fn int_at(loc: Loc) -> Expr {
    let mut node = Expr::int_lit(0, span());
    let mut annot = Annot::new(ValueType::Int, 8);
    annot.loc = Some(loc);
    node.annot = Some(annot);
    node
}

fn str_at(value: &str, loc: Loc) -> Expr {
    let mut node = Expr::str_lit(value, span());
    let mut annot = Annot::new(ValueType::Str, 16);
    annot.loc = Some(loc);
    node.annot = Some(annot);
    node
}

#[test]
fn int_in_target_register_is_a_noop() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    marshal_arg(&int_at(Loc::Reg(Reg::R1)), &mut regs, &mut out).expect("marshal");
    assert!(out.is_empty());
}

#[test]
fn int_in_other_register_moves_once() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    marshal_arg(&int_at(Loc::Reg(Reg::R0)), &mut regs, &mut out).expect("marshal");
    assert_eq!(
        out,
        vec![Insn::Mov {
            dst: Reg::R1,
            src: Reg::R0,
        }]
    );
}

#[test]
fn int_on_stack_loads_once() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    marshal_arg(&int_at(Loc::Stack(-8)), &mut regs, &mut out).expect("marshal");
    assert_eq!(
        out,
        vec![Insn::LdxDw {
            dst: Reg::R1,
            base: Reg::R10,
            off: -8,
        }]
    );
}

#[test]
fn buffer_emits_address_and_length_pair() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    marshal_arg(&str_at("hi", Loc::Stack(-16)), &mut regs, &mut out).expect("marshal");
    assert_eq!(
        out,
        vec![
            Insn::Mov {
                dst: Reg::R1,
                src: Reg::R10,
            },
            Insn::AluImm {
                op: AluOp::Add,
                dst: Reg::R1,
                imm: -16,
            },
            Insn::MovImm {
                dst: Reg::R2,
                imm: 3,
            },
        ]
    );
    // The pair consumed r1 and r2; the cursor sits at r3.
    assert_eq!(regs.take(), Some(Reg::R3));
}

#[test]
fn non_literal_buffer_passes_declared_capacity() {
    let mut fmt = Expr::call("comm", vec![], span());
    let mut annot = Annot::new(ValueType::Str, 16);
    annot.loc = Some(Loc::Stack(-16));
    fmt.annot = Some(annot);

    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    marshal_arg(&fmt, &mut regs, &mut out).expect("marshal");
    assert_eq!(
        out.last(),
        Some(&Insn::MovImm {
            dst: Reg::R2,
            imm: 16,
        })
    );
}

#[test]
fn buffer_in_register_is_unsupported() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    let err = marshal_arg(&str_at("hi", Loc::Reg(Reg::R0)), &mut regs, &mut out)
        .expect_err("expected unsupported operand");
    assert!(matches!(err, MarshalError::UnsupportedOperand { .. }));
}

#[test]
fn unlocated_int_is_unsupported() {
    let mut node = Expr::int_lit(0, span());
    node.annot = Some(Annot::new(ValueType::Int, 8));

    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    let err =
        marshal_arg(&node, &mut regs, &mut out).expect_err("expected unsupported operand");
    assert!(matches!(err, MarshalError::UnsupportedOperand { .. }));
}

#[test]
fn last_legal_register_succeeds_and_the_next_fails() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    for _ in 0..5 {
        marshal_arg(&int_at(Loc::Reg(Reg::R0)), &mut regs, &mut out).expect("marshal");
    }
    let err = marshal_arg(&int_at(Loc::Reg(Reg::R0)), &mut regs, &mut out)
        .expect_err("expected exhaustion");
    assert!(matches!(err, MarshalError::RegisterExhausted));
}

#[test]
fn buffer_pair_cannot_straddle_the_window_end() {
    let mut regs = RegWindow::args();
    let mut out = Vec::new();
    // Four scalars leave only r5; a buffer needs two registers.
    for _ in 0..4 {
        marshal_arg(&int_at(Loc::Reg(Reg::R0)), &mut regs, &mut out).expect("marshal");
    }
    let err = marshal_arg(&str_at("hi", Loc::Stack(-8)), &mut regs, &mut out)
        .expect_err("expected exhaustion");
    assert!(matches!(err, MarshalError::RegisterExhausted));
}
