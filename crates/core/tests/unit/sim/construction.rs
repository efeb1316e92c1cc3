//! Construction failures and reset state.

use hammer_core::core::arch::csr;
use hammer_core::{HammerError, MemoryRegionConfig, PrivilegeMode, Simulator, SimulatorConfig, Xlen};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::elf::ElfWriter;
use crate::common::builder::instruction::{addi, nop, words};
use crate::common::harness::{RAM_BASE, RAM_SIZE, TestProgram, init_tracing};

fn build(program: &TestProgram) -> hammer_core::Result<Simulator> {
    init_tracing();
    let binary = program.write_elf();
    Simulator::new(&program.config(&binary))
}

#[rstest]
#[case::floating_point("RV64IMAFDC")]
#[case::unknown_base("RV128I")]
#[case::missing_i("RV64MAC")]
#[case::unknown_multi_letter("RV64I_Zba")]
fn unsupported_isa_strings_fail(#[case] isa: &str) {
    let program = TestProgram::new("RV64I", words(&[nop()]));
    let binary = program.write_elf();
    let config = SimulatorConfig::builder(binary.path())
        .isa(isa)
        .build()
        .unwrap();
    assert!(matches!(
        Simulator::new(&config),
        Err(HammerError::UnsupportedIsa(s)) if s.contains(isa)
    ));
}

#[test]
fn vector_architecture_is_rejected() {
    let program = TestProgram::new("RV64I", words(&[nop()]));
    let binary = program.write_elf();
    let config = SimulatorConfig::builder(binary.path())
        .isa("RV64I")
        .vector_arch("vlen:128,elen:64")
        .build()
        .unwrap();
    assert!(matches!(
        Simulator::new(&config),
        Err(HammerError::UnsupportedIsa(_))
    ));
}

#[rstest]
#[case::no_machine("su")]
#[case::supervisor_without_user("ms")]
#[case::unknown_letter("mh")]
#[case::repeated("mmu")]
fn unsupported_privilege_levels_fail(#[case] levels: &str) {
    let program = TestProgram::new("RV64I", words(&[nop()])).privilege_levels(levels);
    assert!(matches!(
        build(&program),
        Err(HammerError::UnsupportedPrivilegeMode(_))
    ));
}

#[test]
fn elf_class_must_match_xlen() {
    let elf64 = ElfWriter::elf64(RAM_BASE).segment(RAM_BASE, &words(&[nop()]));
    let binary = elf64.write_temp();
    let config = SimulatorConfig::builder(binary.path())
        .isa("RV32I")
        .memory_layout(vec![MemoryRegionConfig::new(RAM_BASE, RAM_SIZE)])
        .build()
        .unwrap();
    assert!(matches!(
        Simulator::new(&config),
        Err(HammerError::InvalidBinary(_))
    ));
}

#[test]
fn foreign_machine_is_invalid() {
    // EM_X86_64
    let elf = ElfWriter::elf64(RAM_BASE)
        .machine(62)
        .segment(RAM_BASE, &words(&[nop()]));
    let binary = elf.write_temp();
    let config = SimulatorConfig::builder(binary.path())
        .memory_layout(vec![MemoryRegionConfig::new(RAM_BASE, RAM_SIZE)])
        .build()
        .unwrap();
    assert!(matches!(
        Simulator::new(&config),
        Err(HammerError::InvalidBinary(msg)) if msg.contains("RISC-V")
    ));
}

#[test]
fn segment_outside_memory_is_unmapped() {
    let program = TestProgram::new("RV64I", words(&[nop()])).data(0x1000, &[1, 2, 3, 4]);
    match build(&program) {
        Err(HammerError::UnmappedLoadSegment { start, end }) => {
            assert_eq!((start, end), (0x1000, 0x1004));
        }
        other => panic!("expected UnmappedLoadSegment, got {other:?}"),
    }
}

#[test]
fn segment_straddling_the_end_of_memory_is_unmapped() {
    let program =
        TestProgram::new("RV64I", words(&[nop()])).data(RAM_BASE + RAM_SIZE - 2, &[0; 4]);
    assert!(matches!(
        build(&program),
        Err(HammerError::UnmappedLoadSegment { .. })
    ));
}

#[test]
fn binary_removed_after_validation_is_io() {
    let program = TestProgram::new("RV64I", words(&[nop()]));
    let binary = program.write_elf();
    let config = program.config(&binary);
    drop(binary);
    assert!(matches!(Simulator::new(&config), Err(HammerError::Io { .. })));
}

#[test]
fn reset_state_follows_the_elf_entry() {
    let ctx = TestProgram::new("RV64IMAC", words(&[addi(10, 0, 1)]))
        .harts(&[3, 7])
        .build();

    assert_eq!(ctx.sim.hart_ids(), vec![3, 7]);
    assert_eq!(ctx.sim.xlen(), Xlen::Rv64);
    assert_eq!(ctx.sim.entry_point(), RAM_BASE);
    for hart in [3, 7] {
        assert_eq!(ctx.pc(hart), RAM_BASE);
        assert_eq!(ctx.sim.privilege_mode(hart).unwrap(), PrivilegeMode::Machine);
        assert_eq!(ctx.csr(hart, csr::MHARTID), Some(hart as u64));
        assert!((1..32).all(|r| ctx.reg(hart, r) == 0));
        assert_eq!(ctx.sim.last_trap(hart).unwrap(), None);
    }
}

#[test]
fn misa_reflects_isa_and_privilege_levels() {
    let ctx = TestProgram::new("RV32IMC", words(&[nop()]))
        .privilege_levels("mu")
        .build();
    let expected = csr::MISA_MXL_32
        | csr::MISA_EXT_I
        | csr::MISA_EXT_M
        | csr::MISA_EXT_C
        | csr::MISA_EXT_U;
    assert_eq!(ctx.csr(0, csr::MISA), Some(expected));
}

#[test]
fn supervisor_csrs_are_absent_without_s_mode() {
    let ctx = TestProgram::new("RV64I", words(&[nop()]))
        .privilege_levels("m")
        .build();
    assert_eq!(ctx.csr(0, csr::SATP), None);
    assert_eq!(ctx.csr(0, csr::STVEC), None);
    assert!(ctx.csr(0, csr::MSTATUS).is_some());
}

#[test]
fn start_pc_overrides_the_entry_point() {
    let ctx = TestProgram::new("RV64I", words(&[nop(), nop()]))
        .start_pc(RAM_BASE + 4)
        .build();
    assert_eq!(ctx.pc(0), RAM_BASE + 4);
    assert_eq!(ctx.sim.entry_point(), RAM_BASE);
}

#[test]
fn simulators_do_not_share_state() {
    let program = TestProgram::new("RV64I", words(&[addi(10, 10, 1)]));
    let mut a = program.clone().build();
    let b = program.build();

    let _ = a.step(0);

    assert_eq!(a.reg(0, 10), 1);
    assert_eq!(b.reg(0, 10), 0);
    assert_eq!(b.pc(0), RAM_BASE);
}
