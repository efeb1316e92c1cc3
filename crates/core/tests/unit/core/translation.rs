//! Sv32/Sv39 translation and PMP enforcement.
//!
//! Each program starts in M-mode, installs `satp` (or PMP entries), then
//! `mret`s into S-mode code at offset `0x100` of RAM.

use hammer_core::common::PhysAddr;
use hammer_core::core::arch::csr;
use hammer_core::{MemoryRead, PrivilegeMode, StepOutcome, Trap};
use pretty_assertions::assert_eq;

use crate::common::builder::instruction::{csrrs, csrrw, ld, lw, mret, nop, sd, sw, words};
use crate::common::harness::{DATA_BASE, RAM_BASE, TestContext, TestProgram};

const ROOT: u64 = RAM_BASE + 0x1_0000;
const S_ENTRY: u64 = 0x100;
const T0: usize = 5;
const T1: usize = 6;
const T2: usize = 7;

const PTE_V: u64 = 1 << 0;
const PTE_RWX: u64 = 0b1110;
const PTE_A: u64 = 1 << 6;
const PTE_D: u64 = 1 << 7;

/// Leaf mapping onto the start of RAM.
const fn ram_leaf(flags: u64) -> u64 {
    ((RAM_BASE >> 12) << 10) | flags
}

fn enter_supervisor(
    isa: &str,
    first: u32,
    s_entry: u64,
    s_code: &[u32],
    tables: &[u8],
    t0: u64,
) -> TestContext {
    let mut program = vec![
        first,
        csrrw(0, csr::MEPC, T1 as u32),
        csrrs(0, csr::MSTATUS, T2 as u32),
        mret(),
    ];
    program.resize(S_ENTRY as usize / 4, nop());
    program.extend_from_slice(s_code);

    let mut ctx = TestProgram::new(isa, words(&program))
        .data(DATA_BASE, &0x1122_3344_5566_7788u64.to_le_bytes())
        .data(ROOT, tables)
        .build();
    ctx.set_reg(0, T0, t0);
    ctx.set_reg(0, T1, s_entry);
    ctx.set_reg(0, T2, PrivilegeMode::Supervisor.bits() << csr::MSTATUS_MPP_SHIFT);

    let _ = ctx.run(0, 4);
    assert_eq!(ctx.sim.privilege_mode(0).unwrap(), PrivilegeMode::Supervisor);
    ctx
}

fn sv39(s_code: &[u32]) -> TestContext {
    let tables: Vec<u8> = [
        ram_leaf(PTE_V | PTE_RWX | PTE_A | PTE_D),
        ram_leaf(PTE_V | PTE_RWX),
    ]
    .iter()
    .flat_map(|pte| pte.to_le_bytes())
    .collect();
    let satp = (csr::SATP_MODE_SV39 << csr::SATP64_MODE_SHIFT) | (ROOT >> 12);
    enter_supervisor(
        "RV64I",
        csrrw(0, csr::SATP, T0 as u32),
        S_ENTRY,
        s_code,
        &tables,
        satp,
    )
}

fn pte(ctx: &TestContext, index: u64) -> u64 {
    ctx.sim
        .memory()
        .read_uint(PhysAddr(ROOT + 8 * index), 8)
        .unwrap()
}

/// VA of `DATA_BASE` through the second gigapage.
const DATA_VA: u64 = (1 << 30) + (DATA_BASE - RAM_BASE);

#[test]
fn sv39_gigapage_fetch_and_load() {
    let mut ctx = sv39(&[ld(10, 11, 0)]);
    ctx.set_reg(0, 11, DATA_BASE - RAM_BASE);

    assert_eq!(ctx.pc(0), S_ENTRY);
    assert_eq!(ctx.sim.get_insn_hex(0, S_ENTRY).unwrap(), ld(10, 11, 0));
    assert_eq!(ctx.step(0), StepOutcome::Retired);
    assert_eq!(ctx.reg(0, 10), 0x1122_3344_5566_7788);
}

#[test]
fn peek_does_not_set_accessed_but_a_load_does() {
    let mut ctx = sv39(&[ld(10, 11, 0), sd(12, 11, 8)]);
    ctx.set_reg(0, 11, DATA_VA);

    let peek = ctx.sim.get_memory_at_va(0, DATA_VA, 1, 8).unwrap();
    assert_eq!(peek.to_u64_le(), Some(0x1122_3344_5566_7788));
    assert_eq!(pte(&ctx, 1) & (PTE_A | PTE_D), 0);

    let _ = ctx.step(0);
    assert_eq!(pte(&ctx, 1) & (PTE_A | PTE_D), PTE_A);

    let _ = ctx.step(0);
    assert_eq!(pte(&ctx, 1) & (PTE_A | PTE_D), PTE_A | PTE_D);
}

#[test]
fn unmapped_virtual_address_page_faults() {
    let va = 2 << 30;
    let mut ctx = sv39(&[ld(10, 11, 0)]);
    ctx.set_reg(0, 11, va);

    assert_eq!(ctx.sim.get_memory_at_va(0, va, 1, 8).unwrap(), MemoryRead::Unmapped);
    assert_eq!(ctx.step(0), StepOutcome::TrapTaken(Trap::LoadPageFault(va)));
    assert_eq!(ctx.csr(0, csr::MTVAL), Some(va));
    assert_eq!(ctx.csr(0, csr::MCAUSE), Some(13));
}

#[test]
fn physical_addresses_are_not_identity_mapped() {
    let ctx = sv39(&[]);
    assert_eq!(
        ctx.sim.get_memory_at_va(0, DATA_BASE, 1, 1).unwrap(),
        MemoryRead::Unmapped
    );
    assert!(ctx.sim.get_insn_hex(0, RAM_BASE).is_err());
}

#[test]
fn sv32_megapage_on_rv32() {
    let tables = (ram_leaf(PTE_V | PTE_RWX | PTE_A | PTE_D) as u32).to_le_bytes();
    let satp = csr::SATP32_MODE | (ROOT >> 12);
    let mut ctx = enter_supervisor(
        "RV32I",
        csrrw(0, csr::SATP, T0 as u32),
        S_ENTRY,
        &[lw(10, 11, 0), sw(10, 11, 4)],
        &tables,
        satp,
    );
    ctx.set_reg(0, 11, DATA_BASE - RAM_BASE);

    let _ = ctx.run(0, 2);
    assert_eq!(ctx.reg(0, 10), 0x5566_7788);
    assert_eq!(ctx.read_u32(DATA_BASE - RAM_BASE + 4), Some(0x5566_7788));
}

#[test]
fn clearing_the_reset_pmp_entry_denies_supervisor_fetch() {
    let entry = RAM_BASE + S_ENTRY;
    let mut ctx = enter_supervisor(
        "RV64I",
        csrrw(0, csr::PMPCFG0, 0),
        entry,
        &[nop()],
        &[0; 8],
        0,
    );

    assert_eq!(
        ctx.step(0),
        StepOutcome::TrapTaken(Trap::InstructionAccessFault(entry))
    );
    assert_eq!(ctx.sim.privilege_mode(0).unwrap(), PrivilegeMode::Machine);
}

#[test]
fn tor_entry_bounds_supervisor_loads() {
    // pmpaddr0 = top >> 2, pmpcfg0 entry 0 = TOR | R | X.
    let top = RAM_BASE + 0x1000;
    let mut program = vec![
        csrrw(0, csr::PMPADDR0, T0 as u32),
        csrrw(0, csr::PMPCFG0, 10),
        csrrw(0, csr::MEPC, T1 as u32),
        csrrs(0, csr::MSTATUS, T2 as u32),
        mret(),
    ];
    program.resize(0x100 / 4, nop());
    program.extend_from_slice(&[ld(12, 11, 0)]);
    let mut ctx = TestProgram::new("RV64I", words(&program)).build();
    ctx.set_reg(0, T0, top >> 2);
    ctx.set_reg(0, 10, 0x08 | 0x4 | 0x1);
    ctx.set_reg(0, T1, RAM_BASE + 0x100);
    ctx.set_reg(0, T2, PrivilegeMode::Supervisor.bits() << csr::MSTATUS_MPP_SHIFT);
    ctx.set_reg(0, 11, DATA_BASE);

    let _ = ctx.run(0, 5);
    assert_eq!(ctx.sim.privilege_mode(0).unwrap(), PrivilegeMode::Supervisor);
    assert!(ctx.sim.get_memory_at_va(0, RAM_BASE, 1, 4).unwrap().is_mapped());
    assert_eq!(
        ctx.step(0),
        StepOutcome::TrapTaken(Trap::LoadAccessFault(DATA_BASE))
    );
}

#[test]
fn locked_entry_binds_machine_mode() {
    // NAPOT over everything, R | X only, locked.
    let program = words(&[
        csrrw(0, csr::PMPCFG0, 10),
        csrrw(0, csr::PMPCFG0, 0),
        sd(11, 12, 0),
    ]);
    let mut ctx = TestProgram::new("RV64I", program).build();
    ctx.set_reg(0, 10, 0x80 | 0x18 | 0x4 | 0x1);
    ctx.set_reg(0, 12, DATA_BASE);

    let _ = ctx.run(0, 2);
    assert_eq!(ctx.csr(0, csr::PMPCFG0), Some(0x9D));
    assert_eq!(
        ctx.step(0),
        StepOutcome::TrapTaken(Trap::StoreAccessFault(DATA_BASE))
    );
}
