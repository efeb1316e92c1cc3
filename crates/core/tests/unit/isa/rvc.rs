//! Compressed instruction expansion.

use hammer_core::Xlen;
use hammer_core::isa::rvc::expand;
use rstest::rstest;

use crate::common::builder::instruction::{addi, c_addi, c_li, c_nop, jal};

#[rstest]
#[case::c_nop(c_nop(), addi(0, 0, 0))]
#[case::c_li_positive(c_li(10, 5), addi(10, 0, 5))]
#[case::c_li_negative(c_li(10, -1), addi(10, 0, -1))]
#[case::c_addi(c_addi(11, -32), addi(11, 11, -32))]
// c.mv a0, a1
#[case::c_mv(0x852E, 0x00B0_0533)]
// c.jr ra
#[case::c_jr(0x8082, 0x0000_8067)]
// c.ebreak
#[case::c_ebreak(0x9002, 0x0010_0073)]
// c.lw a0, 0(a1)
#[case::c_lw(0x4188, 0x0005_A503)]
fn expands_on_both_widths(#[case] parcel: u16, #[case] expected: u32) {
    assert_eq!(expand(parcel, Xlen::Rv32), Some(expected));
    assert_eq!(expand(parcel, Xlen::Rv64), Some(expected));
}

#[test]
fn all_zero_parcel_is_illegal() {
    assert_eq!(expand(0x0000, Xlen::Rv64), None);
    assert_eq!(expand(0x0000, Xlen::Rv32), None);
}

#[test]
fn quadrant_one_jal_exists_only_on_rv32() {
    // c.jal 0 on RV32 is c.addiw zero, 0 on RV64 (reserved).
    let parcel = 0x2001;
    assert_eq!(expand(parcel, Xlen::Rv32), Some(jal(1, 0)));
    assert_eq!(expand(parcel, Xlen::Rv64), None);
}

#[test]
fn c_ld_is_rv64_only() {
    // c.ld a0, 0(a1)
    let parcel = 0x6188;
    assert_eq!(expand(parcel, Xlen::Rv64), Some(0x0005_B503));
    assert_eq!(expand(parcel, Xlen::Rv32), None);
}

#[test]
fn c_slli_shift_above_31_needs_rv64() {
    // c.slli a0, 32
    let parcel = 0x1502;
    assert!(expand(parcel, Xlen::Rv64).is_some());
    assert_eq!(expand(parcel, Xlen::Rv32), None);
}

#[test]
fn c_addi4spn_with_zero_immediate_is_reserved() {
    assert_eq!(expand(0x0004, Xlen::Rv64), None);
}
