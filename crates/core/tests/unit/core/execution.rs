//! Arithmetic, control flow and compressed execution.

use hammer_core::{StepOutcome, Trap};
use pretty_assertions::assert_eq;

use crate::common::builder::instruction::{
    add, addi, addw, bne, c_addi, c_li, c_nop, div, jal, lui, lw, mul, sw, words, Code,
};
use crate::common::harness::{DATA_BASE, RAM_BASE, TestProgram};

#[test]
fn counting_loop_sums_to_fifty_five() {
    let program = words(&[
        addi(10, 0, 0),
        addi(11, 0, 10),
        add(10, 10, 11),
        addi(11, 11, -1),
        bne(11, 0, -8),
    ]);
    let mut ctx = TestProgram::new("RV64I", program).build();

    let _ = ctx.run(0, 2 + 3 * 10);

    assert_eq!(ctx.reg(0, 10), 55);
    assert_eq!(ctx.reg(0, 11), 0);
    assert_eq!(ctx.pc(0), RAM_BASE + 20);
}

#[test]
fn rv32_registers_wrap_at_32_bits() {
    let program = words(&[lui(10, 0x80000), addi(10, 10, -1), addi(10, 10, 1)]);
    let mut ctx = TestProgram::new("RV32I", program).build();

    let _ = ctx.run(0, 2);
    assert_eq!(ctx.reg(0, 10), 0x7FFF_FFFF);
    let _ = ctx.step(0);
    assert_eq!(ctx.reg(0, 10), 0x8000_0000);
}

#[test]
fn rv64_lui_sign_extends() {
    let mut ctx = TestProgram::new("RV64I", words(&[lui(10, 0x80000)])).build();
    let _ = ctx.step(0);
    assert_eq!(ctx.reg(0, 10), 0xFFFF_FFFF_8000_0000);
}

#[test]
fn addw_sign_extends_the_low_word() {
    let mut ctx = TestProgram::new("RV64I", words(&[addw(10, 11, 12)])).build();
    ctx.set_reg(0, 11, 0x7FFF_FFFF);
    ctx.set_reg(0, 12, 1);
    let _ = ctx.step(0);
    assert_eq!(ctx.reg(0, 10), 0xFFFF_FFFF_8000_0000);
}

#[test]
fn division_by_zero_yields_all_ones() {
    let mut ctx = TestProgram::new("RV64IM", words(&[div(10, 11, 0), mul(12, 11, 11)])).build();
    ctx.set_reg(0, 11, 7);
    let _ = ctx.run(0, 2);
    assert_eq!(ctx.reg(0, 10), u64::MAX);
    assert_eq!(ctx.reg(0, 12), 49);
}

#[test]
fn multiply_without_m_is_illegal() {
    let insn = mul(10, 11, 11);
    let mut ctx = TestProgram::new("RV64I", words(&[insn])).build();
    assert_eq!(ctx.step(0), StepOutcome::TrapTaken(Trap::IllegalInstruction(insn)));
}

#[test]
fn jal_links_and_jumps() {
    let mut ctx = TestProgram::new("RV64I", words(&[jal(1, 8)])).build();
    assert_eq!(ctx.step(0), StepOutcome::Retired);
    assert_eq!(ctx.reg(0, 1), RAM_BASE + 4);
    assert_eq!(ctx.pc(0), RAM_BASE + 8);
}

#[test]
fn writes_to_x0_are_discarded() {
    let mut ctx = TestProgram::new("RV64I", words(&[addi(0, 0, 5)])).build();
    let _ = ctx.step(0);
    assert_eq!(ctx.reg(0, 0), 0);
    assert!(ctx.sim.get_log_reg_writes(0).unwrap().is_empty());
}

#[test]
fn compressed_and_full_width_instructions_mix() {
    let code = Code::new()
        .c(c_li(10, 5))
        .c(c_addi(10, 1))
        .op(addi(11, 10, 100))
        .c(c_nop())
        .into_bytes();
    let mut ctx = TestProgram::new("RV32IMC", code).build();

    let _ = ctx.step(0);
    assert_eq!(ctx.pc(0), RAM_BASE + 2);
    let _ = ctx.step(0);
    assert_eq!(ctx.pc(0), RAM_BASE + 4);
    let _ = ctx.step(0);
    assert_eq!(ctx.pc(0), RAM_BASE + 8);
    let _ = ctx.step(0);
    assert_eq!(ctx.pc(0), RAM_BASE + 10);

    assert_eq!(ctx.reg(0, 10), 6);
    assert_eq!(ctx.reg(0, 11), 106);
}

#[test]
fn compressed_code_without_c_is_illegal() {
    let code = Code::new().c(c_li(10, 5)).c(c_nop()).into_bytes();
    let mut ctx = TestProgram::new("RV64I", code).build();
    assert!(matches!(
        ctx.step(0),
        StepOutcome::TrapTaken(Trap::IllegalInstruction(_))
    ));
    assert_eq!(ctx.reg(0, 10), 0);
}

#[test]
fn stores_are_visible_to_later_loads() {
    let program = words(&[sw(11, 12, 0), lw(10, 12, 0)]);
    let mut ctx = TestProgram::new("RV64I", program).build();
    ctx.set_reg(0, 11, 0xFFFF_FFFF_DEAD_BEEF);
    ctx.set_reg(0, 12, DATA_BASE);

    let _ = ctx.run(0, 2);

    assert_eq!(ctx.read_u32(DATA_BASE), Some(0xDEAD_BEEF));
    assert_eq!(ctx.reg(0, 10), 0xFFFF_FFFF_DEAD_BEEF);
}

#[test]
fn misaligned_load_is_performed_when_enabled() {
    let mut ctx = TestProgram::new("RV64I", words(&[lw(10, 11, 1)]))
        .data(DATA_BASE, &[0x00, 0x11, 0x22, 0x33, 0x44])
        .build();
    ctx.set_reg(0, 11, DATA_BASE);

    assert_eq!(ctx.step(0), StepOutcome::Retired);
    assert_eq!(ctx.reg(0, 10), 0x4433_2211);
}

#[test]
fn misaligned_load_traps_when_disabled() {
    let mut ctx = TestProgram::new("RV64I", words(&[lw(10, 11, 1)]))
        .misaligned(false)
        .build();
    ctx.set_reg(0, 11, DATA_BASE);

    assert_eq!(
        ctx.step(0),
        StepOutcome::TrapTaken(Trap::LoadAddressMisaligned(DATA_BASE + 1))
    );
}
