//! Instruction encoders.
//!
//! `InstructionBuilder` assembles any base-format encoding field by field;
//! the free functions below cover the instructions the tests actually use.
//! Register arguments are plain indices (`10` is `a0`).

#![allow(dead_code)]

use hammer_core::isa::privileged::opcodes as sys;
use hammer_core::isa::rva::{self, funct5, width};
use hammer_core::isa::rvi::{funct3, funct7, opcodes};
use hammer_core::isa::rvm;

/// Base instruction formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    S,
    B,
    U,
    J,
}

/// Fluent builder for a 32-bit instruction.
#[derive(Clone, Copy, Debug)]
pub struct InstructionBuilder {
    format: Format,
    opcode: u32,
    rd: u32,
    funct3: u32,
    rs1: u32,
    rs2: u32,
    funct7: u32,
    imm: i32,
}

impl InstructionBuilder {
    pub const fn new(format: Format, opcode: u32) -> Self {
        Self {
            format,
            opcode,
            rd: 0,
            funct3: 0,
            rs1: 0,
            rs2: 0,
            funct7: 0,
            imm: 0,
        }
    }

    pub const fn rd(mut self, rd: u32) -> Self {
        self.rd = rd;
        self
    }

    pub const fn rs1(mut self, rs1: u32) -> Self {
        self.rs1 = rs1;
        self
    }

    pub const fn rs2(mut self, rs2: u32) -> Self {
        self.rs2 = rs2;
        self
    }

    pub const fn funct3(mut self, funct3: u32) -> Self {
        self.funct3 = funct3;
        self
    }

    pub const fn funct7(mut self, funct7: u32) -> Self {
        self.funct7 = funct7;
        self
    }

    pub const fn imm(mut self, imm: i32) -> Self {
        self.imm = imm;
        self
    }

    pub const fn build(self) -> u32 {
        let base = (self.rd & 0x1F) << 7 | (self.funct3 & 0x7) << 12 | (self.opcode & 0x7F);
        let regs = (self.rs1 & 0x1F) << 15 | (self.rs2 & 0x1F) << 20;
        let v = self.imm as u32;
        match self.format {
            Format::R => base | regs | (self.funct7 & 0x7F) << 25,
            Format::I => base | (self.rs1 & 0x1F) << 15 | (v & 0xFFF) << 20,
            Format::S => {
                (self.funct3 & 0x7) << 12
                    | (self.opcode & 0x7F)
                    | regs
                    | (v & 0x1F) << 7
                    | ((v >> 5) & 0x7F) << 25
            }
            Format::B => {
                (self.funct3 & 0x7) << 12
                    | (self.opcode & 0x7F)
                    | regs
                    | ((v >> 11) & 1) << 7
                    | ((v >> 1) & 0xF) << 8
                    | ((v >> 5) & 0x3F) << 25
                    | ((v >> 12) & 1) << 31
            }
            Format::U => (self.rd & 0x1F) << 7 | (self.opcode & 0x7F) | (v & 0xFFFF_F000),
            Format::J => {
                (self.rd & 0x1F) << 7
                    | (self.opcode & 0x7F)
                    | ((v >> 12) & 0xFF) << 12
                    | ((v >> 11) & 1) << 20
                    | ((v >> 1) & 0x3FF) << 21
                    | ((v >> 20) & 1) << 31
            }
        }
    }
}

fn r(opcode: u32, f3: u32, f7: u32, rd: u32, rs1: u32, rs2: u32) -> u32 {
    InstructionBuilder::new(Format::R, opcode)
        .funct3(f3)
        .funct7(f7)
        .rd(rd)
        .rs1(rs1)
        .rs2(rs2)
        .build()
}

fn i(opcode: u32, f3: u32, rd: u32, rs1: u32, imm: i32) -> u32 {
    InstructionBuilder::new(Format::I, opcode)
        .funct3(f3)
        .rd(rd)
        .rs1(rs1)
        .imm(imm)
        .build()
}

fn s(f3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    InstructionBuilder::new(Format::S, opcodes::OP_STORE)
        .funct3(f3)
        .rs1(rs1)
        .rs2(rs2)
        .imm(imm)
        .build()
}

fn b(f3: u32, rs1: u32, rs2: u32, offset: i32) -> u32 {
    InstructionBuilder::new(Format::B, opcodes::OP_BRANCH)
        .funct3(f3)
        .rs1(rs1)
        .rs2(rs2)
        .imm(offset)
        .build()
}

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    i(opcodes::OP_IMM, funct3::ADD_SUB, rd, rs1, imm)
}

pub fn nop() -> u32 {
    addi(0, 0, 0)
}

pub fn add(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r(opcodes::OP_REG, funct3::ADD_SUB, funct7::DEFAULT, rd, rs1, rs2)
}

pub fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r(opcodes::OP_REG, funct3::ADD_SUB, funct7::SUB, rd, rs1, rs2)
}

pub fn mul(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r(opcodes::OP_REG, rvm::funct3::MUL, rvm::M_EXTENSION, rd, rs1, rs2)
}

pub fn div(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r(opcodes::OP_REG, rvm::funct3::DIV, rvm::M_EXTENSION, rd, rs1, rs2)
}

pub fn addw(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r(opcodes::OP_REG_32, funct3::ADD_SUB, funct7::DEFAULT, rd, rs1, rs2)
}

pub fn slli(rd: u32, rs1: u32, shamt: u32) -> u32 {
    i(opcodes::OP_IMM, funct3::SLL, rd, rs1, shamt as i32)
}

pub fn lui(rd: u32, imm20: u32) -> u32 {
    InstructionBuilder::new(Format::U, opcodes::OP_LUI)
        .rd(rd)
        .imm((imm20 << 12) as i32)
        .build()
}

pub fn auipc(rd: u32, imm20: u32) -> u32 {
    InstructionBuilder::new(Format::U, opcodes::OP_AUIPC)
        .rd(rd)
        .imm((imm20 << 12) as i32)
        .build()
}

pub fn jal(rd: u32, offset: i32) -> u32 {
    InstructionBuilder::new(Format::J, opcodes::OP_JAL)
        .rd(rd)
        .imm(offset)
        .build()
}

pub fn jalr(rd: u32, rs1: u32, imm: i32) -> u32 {
    i(opcodes::OP_JALR, 0, rd, rs1, imm)
}

pub fn beq(rs1: u32, rs2: u32, offset: i32) -> u32 {
    b(funct3::BEQ, rs1, rs2, offset)
}

pub fn bne(rs1: u32, rs2: u32, offset: i32) -> u32 {
    b(funct3::BNE, rs1, rs2, offset)
}

pub fn blt(rs1: u32, rs2: u32, offset: i32) -> u32 {
    b(funct3::BLT, rs1, rs2, offset)
}

pub fn lb(rd: u32, rs1: u32, imm: i32) -> u32 {
    i(opcodes::OP_LOAD, funct3::LB, rd, rs1, imm)
}

pub fn lw(rd: u32, rs1: u32, imm: i32) -> u32 {
    i(opcodes::OP_LOAD, funct3::LW, rd, rs1, imm)
}

pub fn ld(rd: u32, rs1: u32, imm: i32) -> u32 {
    i(opcodes::OP_LOAD, funct3::LD, rd, rs1, imm)
}

pub fn sb(rs2: u32, rs1: u32, imm: i32) -> u32 {
    s(funct3::SB, rs1, rs2, imm)
}

pub fn sw(rs2: u32, rs1: u32, imm: i32) -> u32 {
    s(funct3::SW, rs1, rs2, imm)
}

pub fn sd(rs2: u32, rs1: u32, imm: i32) -> u32 {
    s(funct3::SD, rs1, rs2, imm)
}

fn atomic(f5: u32, w: u32, rd: u32, rs1: u32, rs2: u32) -> u32 {
    r(rva::OP_AMO, w, f5 << 2, rd, rs1, rs2)
}

pub fn lr_w(rd: u32, rs1: u32) -> u32 {
    atomic(funct5::LR, width::WORD, rd, rs1, 0)
}

pub fn sc_w(rd: u32, rs2: u32, rs1: u32) -> u32 {
    atomic(funct5::SC, width::WORD, rd, rs1, rs2)
}

pub fn amoadd_w(rd: u32, rs2: u32, rs1: u32) -> u32 {
    atomic(funct5::AMOADD, width::WORD, rd, rs1, rs2)
}

pub fn csrrw(rd: u32, csr: u32, rs1: u32) -> u32 {
    i(sys::OP_SYSTEM, sys::CSRRW, rd, rs1, csr as i32)
}

pub fn csrrs(rd: u32, csr: u32, rs1: u32) -> u32 {
    i(sys::OP_SYSTEM, sys::CSRRS, rd, rs1, csr as i32)
}

pub fn csrrwi(rd: u32, csr: u32, uimm: u32) -> u32 {
    i(sys::OP_SYSTEM, sys::CSRRWI, rd, uimm, csr as i32)
}

pub const fn ecall() -> u32 {
    sys::ECALL
}

pub const fn ebreak() -> u32 {
    sys::EBREAK
}

pub const fn mret() -> u32 {
    sys::MRET
}

pub const fn sret() -> u32 {
    sys::SRET
}

pub fn sfence_vma() -> u32 {
    sys::SFENCE_VMA
}

/// `C.LI rd, imm` (imm in -32..32).
pub fn c_li(rd: u16, imm: i16) -> u16 {
    let v = imm as u16;
    0b010 << 13 | ((v >> 5) & 1) << 12 | (rd & 0x1F) << 7 | (v & 0x1F) << 2 | 0b01
}

/// `C.ADDI rd, imm` (imm in -32..32, nonzero).
pub fn c_addi(rd: u16, imm: i16) -> u16 {
    let v = imm as u16;
    ((v >> 5) & 1) << 12 | (rd & 0x1F) << 7 | (v & 0x1F) << 2 | 0b01
}

/// `C.NOP`.
pub const fn c_nop() -> u16 {
    0x0001
}

/// Little-endian bytes of a sequence of 32-bit instructions.
pub fn words(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Code that mixes 16- and 32-bit instructions.
#[derive(Clone, Debug, Default)]
pub struct Code {
    bytes: Vec<u8>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, insn: u32) -> Self {
        self.bytes.extend_from_slice(&insn.to_le_bytes());
        self
    }

    pub fn c(mut self, parcel: u16) -> Self {
        self.bytes.extend_from_slice(&parcel.to_le_bytes());
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
