//! LR/SC and AMOs across harts sharing one memory.

use hammer_core::{StepOutcome, Trap};
use pretty_assertions::assert_eq;

use crate::common::builder::instruction::{amoadd_w, lr_w, sc_w, sw, words};
use crate::common::harness::{DATA_BASE, RAM_BASE, TestContext, TestProgram};

const A0: usize = 10;
const A1: usize = 11;
const A2: usize = 12;
const A3: usize = 13;

/// Hart 0 runs LR then SC; hart 1 sits on a plain store at offset 8.
fn two_harts() -> TestContext {
    let program = words(&[
        lr_w(A0 as u32, A1 as u32),
        sc_w(A2 as u32, A3 as u32, A1 as u32),
        sw(A3 as u32, A1 as u32, 0),
    ]);
    let mut ctx = TestProgram::new("RV64IA", program)
        .harts(&[0, 1])
        .data(DATA_BASE, &7u32.to_le_bytes())
        .build();
    ctx.sim.set_pc(1, RAM_BASE + 8).unwrap();
    for hart in [0, 1] {
        ctx.set_reg(hart, A1, DATA_BASE);
    }
    ctx.set_reg(0, A3, 100);
    ctx.set_reg(1, A3, 200);
    ctx
}

#[test]
fn store_from_another_hart_breaks_the_reservation() {
    let mut ctx = two_harts();

    let _ = ctx.step(0);
    assert_eq!(ctx.reg(0, A0), 7);
    assert!(ctx.sim.hart(0).unwrap().has_reservation());

    let _ = ctx.step(1);
    assert!(!ctx.sim.hart(0).unwrap().has_reservation());

    let _ = ctx.step(0);
    assert_eq!(ctx.reg(0, A2), 1);
    assert_eq!(ctx.read_u32(DATA_BASE), Some(200));
}

#[test]
fn store_elsewhere_keeps_the_reservation() {
    let mut ctx = two_harts();
    ctx.set_reg(1, A1, DATA_BASE + 64);

    let _ = ctx.step(0);
    let _ = ctx.step(1);
    let _ = ctx.step(0);

    assert_eq!(ctx.reg(0, A2), 0);
    assert_eq!(ctx.read_u32(DATA_BASE), Some(100));
    assert!(!ctx.sim.hart(0).unwrap().has_reservation());
}

#[test]
fn store_conditional_without_reservation_fails_and_writes_nothing() {
    let mut ctx = two_harts();
    ctx.sim.set_pc(0, RAM_BASE + 4).unwrap();

    assert_eq!(ctx.step(0), StepOutcome::Retired);
    assert_eq!(ctx.reg(0, A2), 1);
    assert_eq!(ctx.read_u32(DATA_BASE), Some(7));
    assert!(ctx.sim.get_log_mem_writes(0).unwrap().is_empty());
}

#[test]
fn amoadd_from_both_harts_accumulates() {
    let program = words(&[amoadd_w(A0 as u32, A3 as u32, A1 as u32)]);
    let mut ctx = TestProgram::new("RV64IA", program)
        .harts(&[0, 1])
        .data(DATA_BASE, &1u32.to_le_bytes())
        .build();
    for (hart, inc) in [(0, 10), (1, 20)] {
        ctx.set_reg(hart, A1, DATA_BASE);
        ctx.set_reg(hart, A3, inc);
    }

    let _ = ctx.step(0);
    let _ = ctx.step(1);

    assert_eq!(ctx.reg(0, A0), 1);
    assert_eq!(ctx.reg(1, A0), 11);
    assert_eq!(ctx.read_u32(DATA_BASE), Some(31));
}

#[test]
fn atomics_need_the_a_extension() {
    let insn = lr_w(A0 as u32, A1 as u32);
    let mut ctx = TestProgram::new("RV64I", words(&[insn])).build();
    ctx.set_reg(0, A1, DATA_BASE);
    assert_eq!(ctx.step(0), StepOutcome::TrapTaken(Trap::IllegalInstruction(insn)));
}

#[test]
fn misaligned_lr_is_an_access_fault() {
    let mut ctx = TestProgram::new("RV64IA", words(&[lr_w(A0 as u32, A1 as u32)])).build();
    ctx.set_reg(0, A1, DATA_BASE + 2);
    assert_eq!(
        ctx.step(0),
        StepOutcome::TrapTaken(Trap::LoadAccessFault(DATA_BASE + 2))
    );
}
