//! Field extraction properties.

use hammer_core::InsnFields;
use hammer_core::isa::decode::decode;
use hammer_core::isa::instruction::instruction_length;
use proptest::prelude::*;

use crate::common::builder::instruction::{Format, InstructionBuilder};

proptest! {
    #[test]
    fn register_fields_round_trip(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32) {
        let bits = InstructionBuilder::new(Format::R, 0b011_0011)
            .rd(rd)
            .rs1(rs1)
            .rs2(rs2)
            .build();
        let d = decode(bits);
        prop_assert_eq!(d.rd, rd as usize);
        prop_assert_eq!(d.rs1, rs1 as usize);
        prop_assert_eq!(d.rs2, rs2 as usize);
    }

    #[test]
    fn i_type_immediate_is_sign_extended(imm in -2048i32..2048) {
        let bits = InstructionBuilder::new(Format::I, 0b001_0011).imm(imm).build();
        prop_assert_eq!(decode(bits).imm, i64::from(imm));
    }

    #[test]
    fn s_type_immediate_is_sign_extended(imm in -2048i32..2048) {
        let bits = InstructionBuilder::new(Format::S, 0b010_0011).imm(imm).build();
        prop_assert_eq!(decode(bits).imm, i64::from(imm));
    }

    #[test]
    fn b_type_immediate_is_even_and_sign_extended(half in -2048i32..2048) {
        let offset = half * 2;
        let bits = InstructionBuilder::new(Format::B, 0b110_0011).imm(offset).build();
        prop_assert_eq!(decode(bits).imm, i64::from(offset));
    }

    #[test]
    fn j_type_immediate_is_even_and_sign_extended(half in -(1i32 << 19)..(1i32 << 19)) {
        let offset = half * 2;
        let bits = InstructionBuilder::new(Format::J, 0b110_1111).imm(offset).build();
        prop_assert_eq!(decode(bits).imm, i64::from(offset));
    }

    #[test]
    fn length_depends_only_on_low_bits(bits in any::<u32>()) {
        let expected = if bits & 0b11 == 0b11 { 4 } else { 2 };
        prop_assert_eq!(instruction_length(bits as u16), expected);
        prop_assert_eq!(InsnFields::from_bits(bits).length, expected);
    }

    #[test]
    fn insn_fields_slice_raw_bits(bits in any::<u32>()) {
        let f = InsnFields::from_bits(bits);
        prop_assert_eq!(f.opcode, bits & 0x7F);
        prop_assert_eq!(f.rd, ((bits >> 7) & 0x1F) as usize);
        prop_assert_eq!(f.rs3, (bits >> 27) as usize);
        prop_assert_eq!(f.csr, bits >> 20);
        prop_assert_eq!(f.rvc_rs2, ((bits >> 2) & 0x1F) as usize);
        prop_assert_eq!(f.rvc_rd, f.rvc_rs1);
    }
}
