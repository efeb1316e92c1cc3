//! Compressed Instruction Expansion.
//!
//! Maps each 16-bit parcel to the 32-bit instruction it stands for. Reserved
//! encodings, floating-point forms and forms that do not exist at the current
//! XLEN expand to `None`, which the executor reports as an illegal instruction.

use super::{QUADRANT_0, QUADRANT_1, QUADRANT_2, q0, q1, q2};
use crate::isa::privileged::opcodes as sys_ops;
use crate::isa::profile::Xlen;
use crate::isa::rvi::{funct3, funct7, opcodes};

/// Stack pointer.
const SP: u32 = 2;
/// Return address.
const RA: u32 = 1;

/// Expands a 16-bit RVC instruction into its 32-bit equivalent.
///
/// # Arguments
///
/// * `inst` - The compressed parcel (bits 1:0 must not be `11`).
/// * `xlen` - Register width; selects between the RV32 and RV64 meanings of
///   the overloaded encodings.
///
/// # Returns
///
/// The 32-bit encoding, or `None` for reserved or unsupported encodings.
pub fn expand(inst: u16, xlen: Xlen) -> Option<u32> {
    let rv64 = xlen == Xlen::Rv64;
    let op = inst & 0x3;
    let sel = (inst >> 13) & 0x7;
    let bits = u32::from(inst);

    // Full 5-bit register fields and the 3-bit "popular register" fields (x8-x15).
    let rd_full = (bits >> 7) & 0x1F;
    let rs2_full = (bits >> 2) & 0x1F;
    let rd_prime = 8 + ((bits >> 2) & 0x7);
    let rs1_prime = 8 + ((bits >> 7) & 0x7);

    let expanded = match op {
        QUADRANT_0 => match sel {
            q0::C_ADDI4SPN => {
                let imm = field(bits, 6, 1) << 2
                    | field(bits, 5, 1) << 3
                    | field(bits, 11, 2) << 4
                    | field(bits, 7, 4) << 6;
                if imm == 0 {
                    return None;
                }
                i_type(imm as i32, SP, funct3::ADD_SUB, rd_prime, opcodes::OP_IMM)
            }
            q0::C_LW => {
                let imm = field(bits, 6, 1) << 2 | field(bits, 10, 3) << 3 | field(bits, 5, 1) << 6;
                i_type(imm as i32, rs1_prime, funct3::LW, rd_prime, opcodes::OP_LOAD)
            }
            q0::C_LD_FLW if rv64 => {
                let imm = field(bits, 10, 3) << 3 | field(bits, 5, 2) << 6;
                i_type(imm as i32, rs1_prime, funct3::LD, rd_prime, opcodes::OP_LOAD)
            }
            q0::C_SW => {
                let imm = field(bits, 6, 1) << 2 | field(bits, 10, 3) << 3 | field(bits, 5, 1) << 6;
                s_type(imm as i32, rd_prime, rs1_prime, funct3::SW)
            }
            q0::C_SD_FSW if rv64 => {
                let imm = field(bits, 10, 3) << 3 | field(bits, 5, 2) << 6;
                s_type(imm as i32, rd_prime, rs1_prime, funct3::SD)
            }
            _ => return None,
        },

        QUADRANT_1 => match sel {
            q1::C_ADDI => i_type(ci_imm(bits), rd_full, funct3::ADD_SUB, rd_full, opcodes::OP_IMM),
            q1::C_ADDIW_JAL if rv64 => {
                if rd_full == 0 {
                    return None;
                }
                i_type(
                    ci_imm(bits),
                    rd_full,
                    funct3::ADD_SUB,
                    rd_full,
                    opcodes::OP_IMM_32,
                )
            }
            q1::C_ADDIW_JAL => j_type(cj_imm(bits), RA),
            q1::C_LI => i_type(ci_imm(bits), 0, funct3::ADD_SUB, rd_full, opcodes::OP_IMM),
            q1::C_LUI_ADDI16SP if rd_full == SP => {
                let imm = sign_extend(
                    field(bits, 6, 1) << 4
                        | field(bits, 2, 1) << 5
                        | field(bits, 5, 1) << 6
                        | field(bits, 3, 2) << 7
                        | field(bits, 12, 1) << 9,
                    10,
                );
                if imm == 0 {
                    return None;
                }
                i_type(imm, SP, funct3::ADD_SUB, SP, opcodes::OP_IMM)
            }
            q1::C_LUI_ADDI16SP => {
                let imm = ci_imm(bits);
                if imm == 0 {
                    return None;
                }
                ((imm as u32) << 12) | (rd_full << 7) | opcodes::OP_LUI
            }
            q1::C_MISC_ALU => expand_misc_alu(bits, rs1_prime, rd_prime, rv64)?,
            q1::C_J => j_type(cj_imm(bits), 0),
            q1::C_BEQZ => b_type(cb_imm(bits), 0, rs1_prime, funct3::BEQ),
            q1::C_BNEZ => b_type(cb_imm(bits), 0, rs1_prime, funct3::BNE),
            _ => return None,
        },

        QUADRANT_2 => match sel {
            q2::C_SLLI => {
                let shamt = shamt(bits, rv64)?;
                i_type(shamt as i32, rd_full, funct3::SLL, rd_full, opcodes::OP_IMM)
            }
            q2::C_LWSP => {
                if rd_full == 0 {
                    return None;
                }
                let imm = field(bits, 4, 3) << 2 | field(bits, 12, 1) << 5 | field(bits, 2, 2) << 6;
                i_type(imm as i32, SP, funct3::LW, rd_full, opcodes::OP_LOAD)
            }
            q2::C_LDSP_FLWSP if rv64 => {
                if rd_full == 0 {
                    return None;
                }
                let imm = field(bits, 5, 2) << 3 | field(bits, 12, 1) << 5 | field(bits, 2, 3) << 6;
                i_type(imm as i32, SP, funct3::LD, rd_full, opcodes::OP_LOAD)
            }
            q2::C_MISC_ALU => {
                let bit12 = field(bits, 12, 1) != 0;
                match (bit12, rd_full, rs2_full) {
                    (false, 0, 0) => return None,
                    // C.JR
                    (false, rs1, 0) => i_type(0, rs1, 0, 0, opcodes::OP_JALR),
                    // C.MV
                    (false, rd, rs2) => r_type(funct7::DEFAULT, rs2, 0, funct3::ADD_SUB, rd),
                    (true, 0, 0) => sys_ops::EBREAK,
                    // C.JALR
                    (true, rs1, 0) => i_type(0, rs1, 0, RA, opcodes::OP_JALR),
                    // C.ADD
                    (true, rd, rs2) => r_type(funct7::DEFAULT, rs2, rd, funct3::ADD_SUB, rd),
                }
            }
            q2::C_SWSP => {
                let imm = field(bits, 9, 4) << 2 | field(bits, 7, 2) << 6;
                s_type(imm as i32, rs2_full, SP, funct3::SW)
            }
            q2::C_SDSP_FSWSP if rv64 => {
                let imm = field(bits, 10, 3) << 3 | field(bits, 7, 3) << 6;
                s_type(imm as i32, rs2_full, SP, funct3::SD)
            }
            _ => return None,
        },

        _ => return None,
    };

    Some(expanded)
}

/// Quadrant 1, funct3 `100`: shifts, `C.ANDI` and the register-register ops.
fn expand_misc_alu(bits: u32, rd: u32, rs2: u32, rv64: bool) -> Option<u32> {
    let encoded = match field(bits, 10, 2) {
        0b00 => {
            let shamt = shamt(bits, rv64)?;
            i_type(shamt as i32, rd, funct3::SRL_SRA, rd, opcodes::OP_IMM)
        }
        0b01 => {
            let shamt = shamt(bits, rv64)?;
            i_type(
                (shamt | (funct7::SRA << 5)) as i32,
                rd,
                funct3::SRL_SRA,
                rd,
                opcodes::OP_IMM,
            )
        }
        0b10 => i_type(ci_imm(bits), rd, funct3::AND, rd, opcodes::OP_IMM),
        _ => {
            let word = field(bits, 12, 1) != 0;
            let (f7, f3, opcode) = match (word, field(bits, 5, 2)) {
                (false, 0b00) => (funct7::SUB, funct3::ADD_SUB, opcodes::OP_REG),
                (false, 0b01) => (funct7::DEFAULT, funct3::XOR, opcodes::OP_REG),
                (false, 0b10) => (funct7::DEFAULT, funct3::OR, opcodes::OP_REG),
                (false, _) => (funct7::DEFAULT, funct3::AND, opcodes::OP_REG),
                (true, 0b00) if rv64 => (funct7::SUB, funct3::ADD_SUB, opcodes::OP_REG_32),
                (true, 0b01) if rv64 => (funct7::DEFAULT, funct3::ADD_SUB, opcodes::OP_REG_32),
                _ => return None,
            };
            (f7 << 25) | (rs2 << 20) | (rd << 15) | (f3 << 12) | (rd << 7) | opcode
        }
    };
    Some(encoded)
}

/// Extracts `len` bits of `bits` starting at `lsb`.
#[inline(always)]
const fn field(bits: u32, lsb: u32, len: u32) -> u32 {
    (bits >> lsb) & ((1 << len) - 1)
}

/// Sign-extends the low `width` bits of `val`.
const fn sign_extend(val: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((val << shift) as i32) >> shift
}

/// CI-format 6-bit signed immediate: `imm[5]` in bit 12, `imm[4:0]` in bits 6:2.
const fn ci_imm(bits: u32) -> i32 {
    sign_extend(field(bits, 2, 5) | field(bits, 12, 1) << 5, 6)
}

/// Shift amount for `C.SLLI`/`C.SRLI`/`C.SRAI`; `shamt[5]` is reserved on RV32.
const fn shamt(bits: u32, rv64: bool) -> Option<u32> {
    let shamt = field(bits, 2, 5) | field(bits, 12, 1) << 5;
    if !rv64 && shamt >= 32 {
        None
    } else {
        Some(shamt)
    }
}

/// CJ-format jump offset: `offset[11|4|9:8|10|6|7|3:1|5]` in bits 12:2.
const fn cj_imm(bits: u32) -> i32 {
    sign_extend(
        field(bits, 3, 3) << 1
            | field(bits, 11, 1) << 4
            | field(bits, 2, 1) << 5
            | field(bits, 7, 1) << 6
            | field(bits, 6, 1) << 7
            | field(bits, 9, 2) << 8
            | field(bits, 8, 1) << 10
            | field(bits, 12, 1) << 11,
        12,
    )
}

/// CB-format branch offset: `offset[8|4:3]` in bits 12:10, `offset[7:6|2:1|5]` in bits 6:2.
const fn cb_imm(bits: u32) -> i32 {
    sign_extend(
        field(bits, 3, 2) << 1
            | field(bits, 10, 2) << 3
            | field(bits, 2, 1) << 5
            | field(bits, 5, 2) << 6
            | field(bits, 12, 1) << 8,
        9,
    )
}

const fn i_type(imm: i32, rs1: u32, f3: u32, rd: u32, opcode: u32) -> u32 {
    ((imm as u32 & 0xFFF) << 20) | (rs1 << 15) | (f3 << 12) | (rd << 7) | opcode
}

const fn s_type(imm: i32, rs2: u32, rs1: u32, f3: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (f3 << 12)
        | ((imm & 0x1F) << 7)
        | opcodes::OP_STORE
}

const fn b_type(imm: i32, rs2: u32, rs1: u32, f3: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (f3 << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 1) << 7)
        | opcodes::OP_BRANCH
}

const fn j_type(imm: i32, rd: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | (rd << 7)
        | opcodes::OP_JAL
}

const fn r_type(f7: u32, rs2: u32, rs1: u32, f3: u32, rd: u32) -> u32 {
    (f7 << 25) | (rs2 << 20) | (rs1 << 15) | (f3 << 12) | (rd << 7) | opcodes::OP_REG
}
