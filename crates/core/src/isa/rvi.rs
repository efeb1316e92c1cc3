//! Base integer encodings (RV32I / RV64I).
//!
//! Major opcodes live in bits 6:0; `funct3` (bits 14:12) and `funct7`
//! (bits 31:25) select the operation within a major opcode. The `*_32`
//! opcodes are the RV64-only word forms (`ADDIW`, `ADDW`, ...).

/// Major opcodes.
pub mod opcodes {
    /// Loads (`LB` .. `LD`, `LWU`).
    pub const OP_LOAD: u32 = 0b000_0011;
    /// `FENCE` and `FENCE.I`.
    pub const OP_MISC_MEM: u32 = 0b000_1111;
    /// Register-immediate arithmetic.
    pub const OP_IMM: u32 = 0b001_0011;
    /// `AUIPC`.
    pub const OP_AUIPC: u32 = 0b001_0111;
    /// Word register-immediate arithmetic (RV64 only).
    pub const OP_IMM_32: u32 = 0b001_1011;
    /// Stores.
    pub const OP_STORE: u32 = 0b010_0011;
    /// Register-register arithmetic, shared with the M extension.
    pub const OP_REG: u32 = 0b011_0011;
    /// `LUI`.
    pub const OP_LUI: u32 = 0b011_0111;
    /// Word register-register arithmetic (RV64 only).
    pub const OP_REG_32: u32 = 0b011_1011;
    /// Conditional branches.
    pub const OP_BRANCH: u32 = 0b110_0011;
    /// `JALR`.
    pub const OP_JALR: u32 = 0b110_0111;
    /// `JAL`.
    pub const OP_JAL: u32 = 0b110_1111;
}

/// `funct3` selectors. Loads, stores, branches and ALU ops reuse the same values.
pub mod funct3 {
    /// Load byte, sign-extended.
    pub const LB: u32 = 0b000;
    /// Load halfword, sign-extended.
    pub const LH: u32 = 0b001;
    /// Load word, sign-extended.
    pub const LW: u32 = 0b010;
    /// Load doubleword (RV64).
    pub const LD: u32 = 0b011;
    /// Load byte, zero-extended.
    pub const LBU: u32 = 0b100;
    /// Load halfword, zero-extended.
    pub const LHU: u32 = 0b101;
    /// Load word, zero-extended (RV64).
    pub const LWU: u32 = 0b110;

    /// Store byte.
    pub const SB: u32 = 0b000;
    /// Store halfword.
    pub const SH: u32 = 0b001;
    /// Store word.
    pub const SW: u32 = 0b010;
    /// Store doubleword (RV64).
    pub const SD: u32 = 0b011;

    /// Branch if equal.
    pub const BEQ: u32 = 0b000;
    /// Branch if not equal.
    pub const BNE: u32 = 0b001;
    /// Branch if less than, signed.
    pub const BLT: u32 = 0b100;
    /// Branch if greater or equal, signed.
    pub const BGE: u32 = 0b101;
    /// Branch if less than, unsigned.
    pub const BLTU: u32 = 0b110;
    /// Branch if greater or equal, unsigned.
    pub const BGEU: u32 = 0b111;

    /// `ADD`/`SUB`/`ADDI`.
    pub const ADD_SUB: u32 = 0b000;
    /// Shift left logical.
    pub const SLL: u32 = 0b001;
    /// Set if less than, signed.
    pub const SLT: u32 = 0b010;
    /// Set if less than, unsigned.
    pub const SLTU: u32 = 0b011;
    /// Exclusive or.
    pub const XOR: u32 = 0b100;
    /// Shift right, logical or arithmetic.
    pub const SRL_SRA: u32 = 0b101;
    /// Inclusive or.
    pub const OR: u32 = 0b110;
    /// And.
    pub const AND: u32 = 0b111;

    /// `FENCE`.
    pub const FENCE: u32 = 0b000;
    /// `FENCE.I` (Zifencei).
    pub const FENCE_I: u32 = 0b001;
}

/// `funct7` selectors for register-register forms.
pub mod funct7 {
    /// `ADD`, `SRL` and the other default encodings.
    pub const DEFAULT: u32 = 0b000_0000;
    /// `SUB`.
    pub const SUB: u32 = 0b010_0000;
    /// `SRA`, shares its encoding with `SUB`.
    pub const SRA: u32 = 0b010_0000;
}
