//! Instruction field extraction.
//!
//! Provides the `InstructionBits` accessor trait over raw encodings, the
//! `Decoded` form consumed by the executor, and `InsnFields`, the flat field
//! view reported to hosts that inspect an instruction without executing it.

use serde::{Deserialize, Serialize};

use crate::common::constants::{
    COMPRESSED_INSTRUCTION_MASK, INSTRUCTION_SIZE_16, INSTRUCTION_SIZE_32,
    UNCOMPRESSED_INSTRUCTION_VALUE,
};

/// Bit mask for the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for a 5-bit register field.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;
/// Bit mask for the CSR address field (bits 20-31).
pub const CSR_MASK: u32 = 0xFFF;

/// Field accessors for a 32-bit instruction encoding.
pub trait InstructionBits {
    /// Major opcode (bits 6:0).
    fn opcode(&self) -> u32;
    /// Destination register (bits 11:7).
    fn rd(&self) -> usize;
    /// First source register (bits 19:15).
    fn rs1(&self) -> usize;
    /// Second source register (bits 24:20).
    fn rs2(&self) -> usize;
    /// Third source register of R4-type encodings (bits 31:27).
    fn rs3(&self) -> usize;
    /// Minor opcode (bits 14:12).
    fn funct3(&self) -> u32;
    /// Minor opcode of R-type encodings (bits 31:25).
    fn funct7(&self) -> u32;
    /// CSR address (bits 31:20).
    fn csr(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs3(&self) -> usize {
        ((self >> 27) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn csr(&self) -> u32 {
        (self >> 20) & CSR_MASK
    }
}

/// Length in bytes of the instruction whose first 16-bit parcel is `low`.
///
/// Encodings longer than 32 bits are not implemented and report 4; they
/// decode as illegal instructions.
pub const fn instruction_length(low: u16) -> u64 {
    if low & COMPRESSED_INSTRUCTION_MASK == UNCOMPRESSED_INSTRUCTION_VALUE {
        INSTRUCTION_SIZE_32
    } else {
        INSTRUCTION_SIZE_16
    }
}

/// Decoded instruction with its sign-extended immediate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit instruction encoding (the expansion, for compressed forms).
    pub raw: u32,
    /// Extracted opcode field.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Function code field 3.
    pub funct3: u32,
    /// Function code field 7.
    pub funct7: u32,
    /// Sign-extended immediate value.
    pub imm: i64,
}

/// Raw field view of an instruction, as reported to hosts.
///
/// All fields are sliced from the fetched bits exactly as they appear in
/// memory, so for a compressed instruction the base-format fields are not
/// meaningful and the `rvc_*` fields are. This mirrors what a debugger
/// would show for the raw parcel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsnFields {
    /// Raw instruction bits (16 significant bits for compressed forms).
    pub bits: u32,
    /// Instruction length in bytes.
    pub length: u64,
    /// Bits 6:0.
    pub opcode: u32,
    /// Bits 11:7.
    pub rd: usize,
    /// Bits 19:15.
    pub rs1: usize,
    /// Bits 24:20.
    pub rs2: usize,
    /// Bits 31:27.
    pub rs3: usize,
    /// Bits 31:20.
    pub csr: u32,
    /// Quadrant in bits 1:0 plus funct3 (bits 15:13) shifted to bits 4:2.
    pub rvc_opcode: u32,
    /// Bits 11:7 of a compressed parcel (`rd`/`rs1`).
    pub rvc_rd: usize,
    /// Same field as `rvc_rd`; compressed formats share it between `rd` and `rs1`.
    pub rvc_rs1: usize,
    /// Bits 6:2 of a compressed parcel.
    pub rvc_rs2: usize,
}

impl InsnFields {
    /// Slices every field out of `bits`.
    pub fn from_bits(bits: u32) -> Self {
        let length = instruction_length(bits as u16);
        Self {
            bits,
            length,
            opcode: bits.opcode(),
            rd: bits.rd(),
            rs1: bits.rs1(),
            rs2: bits.rs2(),
            rs3: bits.rs3(),
            csr: bits.csr(),
            rvc_opcode: (bits & 0x3) | (((bits >> 13) & 0x7) << 2),
            rvc_rd: ((bits >> 7) & REG_MASK) as usize,
            rvc_rs1: ((bits >> 7) & REG_MASK) as usize,
            rvc_rs2: ((bits >> 2) & REG_MASK) as usize,
        }
    }

    /// True for 16-bit encodings.
    pub const fn is_compressed(&self) -> bool {
        self.length == INSTRUCTION_SIZE_16
    }
}
