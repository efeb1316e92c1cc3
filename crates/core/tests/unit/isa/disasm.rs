//! Disassembler output.

use hammer_core::Xlen;
use hammer_core::isa::disasm::disassemble_any;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::instruction::{
    add, addi, amoadd_w, beq, c_li, csrrw, csrrwi, ecall, jal, lr_w, lw, mret, mul, sc_w,
    sfence_vma, slli, sw,
};

#[rstest]
#[case(addi(10, 0, 1), "addi a0, zero, 1")]
#[case(addi(2, 2, -16), "addi sp, sp, -16")]
#[case(add(5, 6, 7), "add t0, t1, t2")]
#[case(mul(10, 11, 12), "mul a0, a1, a2")]
#[case(slli(10, 10, 3), "slli a0, a0, 3")]
#[case(lw(10, 2, 8), "lw a0, 8(sp)")]
#[case(sw(11, 2, -4), "sw a1, -4(sp)")]
#[case(beq(10, 0, -8), "beq a0, zero, -8")]
#[case(jal(1, 2048), "jal ra, 2048")]
#[case(lr_w(10, 11), "lr.w a0, (a1)")]
#[case(sc_w(12, 13, 11), "sc.w a2, a3, (a1)")]
#[case(amoadd_w(10, 12, 11), "amoadd.w a0, a2, (a1)")]
#[case(csrrw(0, 0x340, 10), "csrrw zero, 0x340, a0")]
#[case(csrrwi(10, 0x300, 8), "csrrwi a0, 0x300, 8")]
#[case(ecall(), "ecall")]
#[case(mret(), "mret")]
#[case(sfence_vma(), "sfence.vma zero, zero")]
fn renders_base_instructions(#[case] bits: u32, #[case] text: &str) {
    assert_eq!(disassemble_any(bits, Xlen::Rv64), text);
}

#[test]
fn compressed_parcels_use_their_expansion() {
    assert_eq!(
        disassemble_any(u32::from(c_li(10, 1)), Xlen::Rv32),
        "c.addi a0, zero, 1"
    );
}

#[test]
fn only_the_low_parcel_of_a_compressed_instruction_matters() {
    let bits = 0xDEAD_0000 | u32::from(c_li(10, 1));
    assert_eq!(disassemble_any(bits, Xlen::Rv64), "c.addi a0, zero, 1");
}

#[test]
fn unknown_encodings_are_labelled() {
    assert!(disassemble_any(0xFFFF_FFFF, Xlen::Rv64).starts_with("unknown"));
    assert!(disassemble_any(0x0000, Xlen::Rv64).starts_with("c.unknown"));
}
