//! Instruction Disassembler.
//!
//! Converts an instruction encoding into the mnemonic text reported by
//! `get_insn_string` and printed by the CLI trace.
//!
//! # Supported Extensions
//!
//! - RV32I / RV64I (base integer)
//! - M (multiply/divide)
//! - A (atomic)
//! - C (disassembled through its 32-bit expansion, prefixed `c.`)
//! - Privileged (ECALL, EBREAK, xRET, CSR, FENCE, WFI, SFENCE.VMA)

use crate::isa::abi::reg_name as xreg;
use crate::isa::decode::{b_type_imm, i_type_imm, j_type_imm, s_type_imm};
use crate::isa::instruction::{InstructionBits, instruction_length};
use crate::isa::privileged::opcodes as sys_op;
use crate::isa::profile::Xlen;
use crate::isa::rva::{OP_AMO, funct5 as a_f5, width};
use crate::isa::rvc;
use crate::isa::rvi::{funct3 as i_f3, funct7 as i_f7, opcodes as i_op};
use crate::isa::rvm::{M_EXTENSION, funct3 as m_f3};

/// Disassembles the instruction whose encoding starts in the low bits of `bits`.
///
/// Compressed parcels (low two bits not `11`) use only the low 16 bits and are
/// rendered as their expansion with a `c.` prefix. Reserved compressed
/// encodings render as `"c.unknown"`.
pub fn disassemble_any(bits: u32, xlen: Xlen) -> String {
    if instruction_length(bits as u16) == 2 {
        match rvc::expand(bits as u16, xlen) {
            Some(expanded) => format!("c.{}", disassemble(expanded, xlen)),
            None => format!("c.unknown ({:#06x})", bits & 0xFFFF),
        }
    } else {
        disassemble(bits, xlen)
    }
}

/// Disassembles a 32-bit RISC-V instruction into a human-readable string.
///
/// Returns a mnemonic like `"add a0, a1, a2"` or `"unknown (0x...)"` for
/// unrecognised encodings.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction encoding.
/// * `xlen` - Register width, which bounds immediate shift amounts.
pub fn disassemble(inst: u32, xlen: Xlen) -> String {
    let rd = inst.rd();
    let rs1 = inst.rs1();
    let rs2 = inst.rs2();
    let f3 = inst.funct3();
    let f7 = inst.funct7();
    let imm_i = i_type_imm(inst);

    match inst.opcode() {
        i_op::OP_REG => disasm_op_reg(rd, rs1, rs2, f3, f7, false),
        i_op::OP_REG_32 => disasm_op_reg(rd, rs1, rs2, f3, f7, true),
        i_op::OP_IMM => disasm_op_imm(rd, rs1, f3, imm_i, xlen.shamt_mask(), false),
        i_op::OP_IMM_32 => disasm_op_imm(rd, rs1, f3, imm_i, 0x1F, true),

        i_op::OP_LOAD => {
            let mn = match f3 {
                i_f3::LB => "lb",
                i_f3::LH => "lh",
                i_f3::LW => "lw",
                i_f3::LD => "ld",
                i_f3::LBU => "lbu",
                i_f3::LHU => "lhu",
                i_f3::LWU => "lwu",
                _ => "l??",
            };
            format!("{mn} {}, {imm_i}({})", xreg(rd), xreg(rs1))
        }

        i_op::OP_STORE => {
            let mn = match f3 {
                i_f3::SB => "sb",
                i_f3::SH => "sh",
                i_f3::SW => "sw",
                i_f3::SD => "sd",
                _ => "s??",
            };
            format!("{mn} {}, {}({})", xreg(rs2), s_type_imm(inst), xreg(rs1))
        }

        i_op::OP_BRANCH => {
            let mn = match f3 {
                i_f3::BEQ => "beq",
                i_f3::BNE => "bne",
                i_f3::BLT => "blt",
                i_f3::BGE => "bge",
                i_f3::BLTU => "bltu",
                i_f3::BGEU => "bgeu",
                _ => "b??",
            };
            format!("{mn} {}, {}, {}", xreg(rs1), xreg(rs2), b_type_imm(inst))
        }

        i_op::OP_LUI => format!("lui {}, {:#x}", xreg(rd), inst >> 12),
        i_op::OP_AUIPC => format!("auipc {}, {:#x}", xreg(rd), inst >> 12),
        i_op::OP_JAL => format!("jal {}, {}", xreg(rd), j_type_imm(inst)),
        i_op::OP_JALR => format!("jalr {}, {imm_i}({})", xreg(rd), xreg(rs1)),

        OP_AMO => disasm_amo(rd, rs1, rs2, f3, f7),

        i_op::OP_MISC_MEM => match f3 {
            i_f3::FENCE_I => "fence.i".to_string(),
            i_f3::FENCE => "fence".to_string(),
            _ => format!("unknown ({inst:#010x})"),
        },

        sys_op::OP_SYSTEM => disasm_system(inst, rd, rs1, f3),

        _ => format!("unknown ({inst:#010x})"),
    }
}

/// Disassemble OP_REG / OP_REG_32 (R-type register-register).
fn disasm_op_reg(rd: usize, rs1: usize, rs2: usize, f3: u32, f7: u32, is_w: bool) -> String {
    let suffix = if is_w { "w" } else { "" };

    if f7 == M_EXTENSION {
        let mn = match f3 {
            m_f3::MUL => "mul",
            m_f3::MULH => "mulh",
            m_f3::MULHSU => "mulhsu",
            m_f3::MULHU => "mulhu",
            m_f3::DIV => "div",
            m_f3::DIVU => "divu",
            m_f3::REM => "rem",
            _ => "remu",
        };
        return format!("{mn}{suffix} {}, {}, {}", xreg(rd), xreg(rs1), xreg(rs2));
    }

    let mn = match (f3, f7) {
        (i_f3::ADD_SUB, i_f7::DEFAULT) => "add",
        (i_f3::ADD_SUB, i_f7::SUB) => "sub",
        (i_f3::SLL, i_f7::DEFAULT) => "sll",
        (i_f3::SLT, i_f7::DEFAULT) => "slt",
        (i_f3::SLTU, i_f7::DEFAULT) => "sltu",
        (i_f3::XOR, i_f7::DEFAULT) => "xor",
        (i_f3::SRL_SRA, i_f7::DEFAULT) => "srl",
        (i_f3::SRL_SRA, i_f7::SRA) => "sra",
        (i_f3::OR, i_f7::DEFAULT) => "or",
        (i_f3::AND, i_f7::DEFAULT) => "and",
        _ => "r??",
    };
    format!("{mn}{suffix} {}, {}, {}", xreg(rd), xreg(rs1), xreg(rs2))
}

/// Disassemble OP_IMM / OP_IMM_32 (I-type immediate arithmetic).
fn disasm_op_imm(rd: usize, rs1: usize, f3: u32, imm: i64, shamt_mask: u32, is_w: bool) -> String {
    let suffix = if is_w { "w" } else { "" };
    let shamt = imm & i64::from(shamt_mask);
    let mn = match f3 {
        i_f3::ADD_SUB => "addi",
        i_f3::SLT => "slti",
        i_f3::SLTU => "sltiu",
        i_f3::XOR => "xori",
        i_f3::OR => "ori",
        i_f3::AND => "andi",
        i_f3::SLL => return format!("slli{suffix} {}, {}, {shamt}", xreg(rd), xreg(rs1)),
        _ => {
            let mn = if (imm >> 10) & 1 != 0 { "srai" } else { "srli" };
            return format!("{mn}{suffix} {}, {}, {shamt}", xreg(rd), xreg(rs1));
        }
    };
    format!("{mn}{suffix} {}, {}, {imm}", xreg(rd), xreg(rs1))
}

/// Disassemble LR/SC and the AMOs.
fn disasm_amo(rd: usize, rs1: usize, rs2: usize, f3: u32, f7: u32) -> String {
    let suffix = if f3 == width::DOUBLE { ".d" } else { ".w" };
    let ordering = match ((f7 >> 1) & 1 != 0, f7 & 1 != 0) {
        (true, true) => ".aqrl",
        (true, false) => ".aq",
        (false, true) => ".rl",
        (false, false) => "",
    };
    let mn = match f7 >> 2 {
        a_f5::LR => return format!("lr{suffix}{ordering} {}, ({})", xreg(rd), xreg(rs1)),
        a_f5::SC => "sc",
        a_f5::AMOSWAP => "amoswap",
        a_f5::AMOADD => "amoadd",
        a_f5::AMOXOR => "amoxor",
        a_f5::AMOAND => "amoand",
        a_f5::AMOOR => "amoor",
        a_f5::AMOMIN => "amomin",
        a_f5::AMOMAX => "amomax",
        a_f5::AMOMINU => "amominu",
        a_f5::AMOMAXU => "amomaxu",
        _ => "amo??",
    };
    format!(
        "{mn}{suffix}{ordering} {}, {}, ({})",
        xreg(rd),
        xreg(rs2),
        xreg(rs1)
    )
}

/// Disassemble system instructions.
fn disasm_system(inst: u32, rd: usize, rs1: usize, f3: u32) -> String {
    match inst {
        sys_op::ECALL => return "ecall".to_string(),
        sys_op::EBREAK => return "ebreak".to_string(),
        sys_op::MRET => return "mret".to_string(),
        sys_op::SRET => return "sret".to_string(),
        sys_op::WFI => return "wfi".to_string(),
        _ => {}
    }

    if inst & sys_op::SFENCE_VMA_MASK == sys_op::SFENCE_VMA {
        return format!("sfence.vma {}, {}", xreg(rs1), xreg(inst.rs2()));
    }

    let csr = inst.csr();
    let mn = match f3 {
        sys_op::CSRRW => "csrrw",
        sys_op::CSRRS => "csrrs",
        sys_op::CSRRC => "csrrc",
        sys_op::CSRRWI => return format!("csrrwi {}, {csr:#05x}, {rs1}", xreg(rd)),
        sys_op::CSRRSI => return format!("csrrsi {}, {csr:#05x}, {rs1}", xreg(rd)),
        sys_op::CSRRCI => return format!("csrrci {}, {csr:#05x}, {rs1}", xreg(rd)),
        _ => return format!("system?? ({inst:#010x})"),
    };
    format!("{mn} {}, {csr:#05x}, {}", xreg(rd), xreg(rs1))
}
