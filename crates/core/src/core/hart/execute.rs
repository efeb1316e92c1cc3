//! Instruction semantics.
//!
//! `execute` runs one decoded instruction against the hart. On success the PC
//! has moved to the successor or the branch target; on error nothing has been
//! committed except loads already logged, and the caller takes the trap.
//!
//! Register values are kept zero-extended to XLEN. RV32 arithmetic runs the
//! ALU in word mode and truncates; RV64 `*W` forms run in word mode and keep
//! the sign extension.

use super::Hart;
use crate::common::Trap;
use crate::core::arch::csr::{MSTATUS_TSR, MSTATUS_TVM, MSTATUS_TW};
use crate::core::arch::mode::PrivilegeMode;
use crate::core::units::alu::{self, AluOp, AmoOp};
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::privileged::opcodes as sys;
use crate::isa::profile::Xlen;
use crate::isa::rva::{self, funct5, width};
use crate::isa::rvi::{funct3, funct7, opcodes};
use crate::isa::rvm::{self, funct3 as m_funct3};
use crate::soc::PhysMemory;

impl Hart {
    /// Executes `d`. `fetched` holds the bits as fetched, for illegal-instruction `tval`.
    pub(super) fn execute(
        &mut self,
        d: &Decoded,
        fetched: u32,
        len: u64,
        mem: &mut PhysMemory,
    ) -> Result<(), Trap> {
        let illegal = Trap::IllegalInstruction(fetched);
        let xlen = self.profile.xlen;
        let pc = self.pc;
        let next_pc = xlen.truncate(pc.wrapping_add(len));

        let target = match d.opcode {
            opcodes::OP_LUI => {
                self.write_rd(d.rd, d.imm as u64);
                next_pc
            }
            opcodes::OP_AUIPC => {
                self.write_rd(d.rd, pc.wrapping_add(d.imm as u64));
                next_pc
            }
            opcodes::OP_JAL => {
                let target = self.jump_target(pc.wrapping_add(d.imm as u64))?;
                self.write_rd(d.rd, next_pc);
                target
            }
            opcodes::OP_JALR => {
                if d.funct3 != 0 {
                    return Err(illegal);
                }
                let base = self.gpr.read(d.rs1);
                let target = self.jump_target(base.wrapping_add(d.imm as u64) & !1)?;
                self.write_rd(d.rd, next_pc);
                target
            }
            opcodes::OP_BRANCH => {
                if self.branch_taken(d).ok_or(illegal)? {
                    self.jump_target(pc.wrapping_add(d.imm as u64))?
                } else {
                    next_pc
                }
            }
            opcodes::OP_LOAD => {
                self.execute_load(d, mem).ok_or(illegal)??;
                next_pc
            }
            opcodes::OP_STORE => {
                self.execute_store(d, mem).ok_or(illegal)??;
                next_pc
            }
            opcodes::OP_IMM => {
                let (op, b) = self.op_imm(d).ok_or(illegal)?;
                let a = self.gpr.read(d.rs1);
                self.write_rd(d.rd, alu::execute(op, a, b, xlen == Xlen::Rv32));
                next_pc
            }
            opcodes::OP_IMM_32 if xlen == Xlen::Rv64 => {
                let (op, b) = op_imm_32(d).ok_or(illegal)?;
                let a = self.gpr.read(d.rs1);
                self.write_rd(d.rd, alu::execute(op, a, b, true));
                next_pc
            }
            opcodes::OP_REG => {
                let op = self.op_reg(d.funct7, d.funct3).ok_or(illegal)?;
                let (a, b) = (self.gpr.read(d.rs1), self.gpr.read(d.rs2));
                self.write_rd(d.rd, alu::execute(op, a, b, xlen == Xlen::Rv32));
                next_pc
            }
            opcodes::OP_REG_32 if xlen == Xlen::Rv64 => {
                let op = self.op_reg_32(d.funct7, d.funct3).ok_or(illegal)?;
                let (a, b) = (self.gpr.read(d.rs1), self.gpr.read(d.rs2));
                self.write_rd(d.rd, alu::execute(op, a, b, true));
                next_pc
            }
            opcodes::OP_MISC_MEM => match d.funct3 {
                funct3::FENCE | funct3::FENCE_I => next_pc,
                _ => return Err(illegal),
            },
            rva::OP_AMO if self.profile.a => {
                self.execute_atomic(d, mem).ok_or(illegal)??;
                next_pc
            }
            sys::OP_SYSTEM => match self.execute_system(d, illegal)? {
                Some(target) => target,
                None => next_pc,
            },
            _ => return Err(illegal),
        };

        self.pc = target;
        Ok(())
    }

    /// Writes `rd`, truncated to XLEN, and logs it.
    fn write_rd(&mut self, rd: usize, val: u64) {
        let val = self.profile.xlen.truncate(val);
        self.gpr.write(rd, val);
        self.log.record_gpr(rd, val);
    }

    /// Validates a jump or taken-branch target.
    fn jump_target(&self, target: u64) -> Result<u64, Trap> {
        let target = self.profile.xlen.truncate(target);
        if target % self.profile.instruction_alignment() == 0 {
            Ok(target)
        } else {
            Err(Trap::InstructionAddressMisaligned(target))
        }
    }

    /// `None` for the two reserved branch encodings.
    fn branch_taken(&self, d: &Decoded) -> Option<bool> {
        let xlen = self.profile.xlen;
        let (a, b) = (self.gpr.read(d.rs1), self.gpr.read(d.rs2));
        let taken = match d.funct3 {
            funct3::BEQ => a == b,
            funct3::BNE => a != b,
            funct3::BLT => xlen.signed(a) < xlen.signed(b),
            funct3::BGE => xlen.signed(a) >= xlen.signed(b),
            funct3::BLTU => a < b,
            funct3::BGEU => a >= b,
            _ => return None,
        };
        Some(taken)
    }

    /// Outer `None` for an illegal width; inner result for traps.
    fn execute_load(&mut self, d: &Decoded, mem: &mut PhysMemory) -> Option<Result<(), Trap>> {
        let rv64 = self.profile.xlen == Xlen::Rv64;
        let (size, signed) = match d.funct3 {
            funct3::LB => (1, true),
            funct3::LH => (2, true),
            funct3::LW => (4, true),
            funct3::LD if rv64 => (8, true),
            funct3::LBU => (1, false),
            funct3::LHU => (2, false),
            funct3::LWU if rv64 => (4, false),
            _ => return None,
        };

        let addr = self.gpr.read(d.rs1).wrapping_add(d.imm as u64);
        Some(self.load(addr, size, mem).map(|raw| {
            let val = if signed { sign_extend(raw, size) } else { raw };
            self.write_rd(d.rd, val);
        }))
    }

    fn execute_store(&mut self, d: &Decoded, mem: &mut PhysMemory) -> Option<Result<(), Trap>> {
        let size = match d.funct3 {
            funct3::SB => 1,
            funct3::SH => 2,
            funct3::SW => 4,
            funct3::SD if self.profile.xlen == Xlen::Rv64 => 8,
            _ => return None,
        };
        let addr = self.gpr.read(d.rs1).wrapping_add(d.imm as u64);
        let val = self.gpr.read(d.rs2);
        Some(self.store(addr, size, val, mem))
    }

    /// Operation and second operand of an `OP-IMM` instruction.
    const fn op_imm(&self, d: &Decoded) -> Option<(AluOp, u64)> {
        let imm = d.imm as u64;
        let op = match d.funct3 {
            funct3::ADD_SUB => AluOp::Add,
            funct3::SLT => AluOp::Slt,
            funct3::SLTU => AluOp::Sltu,
            funct3::XOR => AluOp::Xor,
            funct3::OR => AluOp::Or,
            funct3::AND => AluOp::And,
            funct3::SLL | funct3::SRL_SRA => {
                // RV64 shamt is 6 bits, leaving imm[11:6] as the selector; RV32 uses imm[11:5].
                let (shamt_bits, selector) = match self.profile.xlen {
                    Xlen::Rv32 => (5, d.raw >> 25),
                    Xlen::Rv64 => (6, d.raw >> 26),
                };
                let arith = funct7::SRA >> (shamt_bits - 5);
                let op = match (d.funct3, selector) {
                    (funct3::SLL, 0) => AluOp::Sll,
                    (funct3::SRL_SRA, 0) => AluOp::Srl,
                    (funct3::SRL_SRA, s) if s == arith => AluOp::Sra,
                    _ => return None,
                };
                let shamt = (d.raw >> 20) & ((1 << shamt_bits) - 1);
                return Some((op, shamt as u64));
            }
            _ => return None,
        };
        Some((op, imm))
    }

    const fn op_reg(&self, f7: u32, f3: u32) -> Option<AluOp> {
        if f7 == rvm::M_EXTENSION {
            return self.m_op(f3);
        }
        let op = match (f7, f3) {
            (funct7::DEFAULT, funct3::ADD_SUB) => AluOp::Add,
            (funct7::SUB, funct3::ADD_SUB) => AluOp::Sub,
            (funct7::DEFAULT, funct3::SLL) => AluOp::Sll,
            (funct7::DEFAULT, funct3::SLT) => AluOp::Slt,
            (funct7::DEFAULT, funct3::SLTU) => AluOp::Sltu,
            (funct7::DEFAULT, funct3::XOR) => AluOp::Xor,
            (funct7::DEFAULT, funct3::SRL_SRA) => AluOp::Srl,
            (funct7::SRA, funct3::SRL_SRA) => AluOp::Sra,
            (funct7::DEFAULT, funct3::OR) => AluOp::Or,
            (funct7::DEFAULT, funct3::AND) => AluOp::And,
            _ => return None,
        };
        Some(op)
    }

    const fn op_reg_32(&self, f7: u32, f3: u32) -> Option<AluOp> {
        if f7 == rvm::M_EXTENSION {
            return match f3 {
                m_funct3::MUL | m_funct3::DIV | m_funct3::DIVU | m_funct3::REM | m_funct3::REMU => {
                    self.m_op(f3)
                }
                _ => None,
            };
        }
        let op = match (f7, f3) {
            (funct7::DEFAULT, funct3::ADD_SUB) => AluOp::Add,
            (funct7::SUB, funct3::ADD_SUB) => AluOp::Sub,
            (funct7::DEFAULT, funct3::SLL) => AluOp::Sll,
            (funct7::DEFAULT, funct3::SRL_SRA) => AluOp::Srl,
            (funct7::SRA, funct3::SRL_SRA) => AluOp::Sra,
            _ => return None,
        };
        Some(op)
    }

    const fn m_op(&self, f3: u32) -> Option<AluOp> {
        if !self.profile.m {
            return None;
        }
        let op = match f3 {
            m_funct3::MUL => AluOp::Mul,
            m_funct3::MULH => AluOp::Mulh,
            m_funct3::MULHSU => AluOp::Mulhsu,
            m_funct3::MULHU => AluOp::Mulhu,
            m_funct3::DIV => AluOp::Div,
            m_funct3::DIVU => AluOp::Divu,
            m_funct3::REM => AluOp::Rem,
            _ => AluOp::Remu,
        };
        Some(op)
    }

    fn execute_atomic(&mut self, d: &Decoded, mem: &mut PhysMemory) -> Option<Result<(), Trap>> {
        let (size, word) = match d.funct3 {
            width::WORD => (4, true),
            width::DOUBLE if self.profile.xlen == Xlen::Rv64 => (8, false),
            _ => return None,
        };
        let f5 = d.raw >> 27;
        let addr = self.gpr.read(d.rs1);
        let src = self.gpr.read(d.rs2);
        let extend = |val: u64| if word { sign_extend(val, 4) } else { val };

        let result = match f5 {
            funct5::LR => {
                if d.rs2 != 0 {
                    return None;
                }
                self.reserve_address(addr, size, mem).and_then(|paddr| {
                    let val = self.read_physical(addr, paddr, size, mem)?;
                    self.reservation = Some((paddr.val(), size));
                    self.write_rd(d.rd, extend(val));
                    Ok(())
                })
            }
            funct5::SC => self.atomic_address(addr, size, mem).and_then(|paddr| {
                let held = self.reservation == Some((paddr.val(), size));
                self.reservation = None;
                if held {
                    self.write_physical(addr, paddr, size, src, mem)?;
                }
                self.write_rd(d.rd, u64::from(!held));
                Ok(())
            }),
            _ => {
                let op = amo_op(f5)?;
                self.atomic_address(addr, size, mem).and_then(|paddr| {
                    let old = self.read_physical(addr, paddr, size, mem)?;
                    let new = alu::amo(op, old, src, word);
                    self.write_physical(addr, paddr, size, new, mem)?;
                    self.write_rd(d.rd, extend(old));
                    Ok(())
                })
            }
        };
        Some(result)
    }

    /// Runs a `SYSTEM` instruction. Returns a new PC for trap returns.
    fn execute_system(&mut self, d: &Decoded, illegal: Trap) -> Result<Option<u64>, Trap> {
        if d.funct3 != sys::PRIV {
            if d.funct3 == 0b100 {
                return Err(illegal);
            }
            self.execute_csr(d, illegal)?;
            return Ok(None);
        }

        let mode = self.privilege;
        let mstatus = self.csrs.mstatus;
        match d.raw {
            sys::ECALL => Err(match mode {
                PrivilegeMode::User => Trap::EnvironmentCallFromUMode,
                PrivilegeMode::Supervisor => Trap::EnvironmentCallFromSMode,
                PrivilegeMode::Machine => Trap::EnvironmentCallFromMMode,
            }),
            sys::EBREAK => Err(Trap::Breakpoint(self.pc)),
            sys::MRET => {
                if mode != PrivilegeMode::Machine {
                    return Err(illegal);
                }
                self.do_mret();
                Ok(Some(self.pc))
            }
            sys::SRET => {
                let allowed = self.levels.supervisor
                    && match mode {
                        PrivilegeMode::Machine => true,
                        PrivilegeMode::Supervisor => mstatus & MSTATUS_TSR == 0,
                        PrivilegeMode::User => false,
                    };
                if !allowed {
                    return Err(illegal);
                }
                self.do_sret();
                Ok(Some(self.pc))
            }
            sys::WFI => {
                let trapped = mode != PrivilegeMode::Machine
                    && (mode == PrivilegeMode::User || mstatus & MSTATUS_TW != 0);
                if trapped { Err(illegal) } else { Ok(None) }
            }
            raw if raw & sys::SFENCE_VMA_MASK == sys::SFENCE_VMA => {
                let allowed = self.levels.supervisor
                    && match mode {
                        PrivilegeMode::Machine => true,
                        PrivilegeMode::Supervisor => mstatus & MSTATUS_TVM == 0,
                        PrivilegeMode::User => false,
                    };
                if allowed { Ok(None) } else { Err(illegal) }
            }
            _ => Err(illegal),
        }
    }

    /// `CSRRW`, `CSRRS`, `CSRRC` and their immediate forms.
    ///
    /// `CSRRW` always writes; the set and clear forms write only when the
    /// source register index (or immediate) is nonzero.
    fn execute_csr(&mut self, d: &Decoded, illegal: Trap) -> Result<(), Trap> {
        let addr = d.raw.csr();
        let src = if d.funct3 & 0b100 != 0 {
            d.rs1 as u64
        } else {
            self.gpr.read(d.rs1)
        };
        let writes = match d.funct3 {
            sys::CSRRW | sys::CSRRWI => true,
            _ => d.rs1 != 0,
        };

        let old = self.csr_read(addr).ok_or(illegal)?;
        if !self.csr_accessible(addr, writes) {
            return Err(illegal);
        }

        if writes {
            let new = match d.funct3 {
                sys::CSRRW | sys::CSRRWI => src,
                sys::CSRRS | sys::CSRRSI => old | src,
                _ => old & !src,
            };
            self.csr_write_logged(addr, new);
        }
        self.write_rd(d.rd, old);
        Ok(())
    }
}

const fn amo_op(f5: u32) -> Option<AmoOp> {
    let op = match f5 {
        funct5::AMOSWAP => AmoOp::Swap,
        funct5::AMOADD => AmoOp::Add,
        funct5::AMOXOR => AmoOp::Xor,
        funct5::AMOAND => AmoOp::And,
        funct5::AMOOR => AmoOp::Or,
        funct5::AMOMIN => AmoOp::Min,
        funct5::AMOMAX => AmoOp::Max,
        funct5::AMOMINU => AmoOp::Minu,
        funct5::AMOMAXU => AmoOp::Maxu,
        _ => return None,
    };
    Some(op)
}

/// Operation and operand of an RV64 `OP-IMM-32` instruction.
const fn op_imm_32(d: &Decoded) -> Option<(AluOp, u64)> {
    let shamt = ((d.raw >> 20) & 0x1F) as u64;
    match (d.funct3, d.funct7) {
        (funct3::ADD_SUB, _) => Some((AluOp::Add, d.imm as u64)),
        (funct3::SLL, funct7::DEFAULT) => Some((AluOp::Sll, shamt)),
        (funct3::SRL_SRA, funct7::DEFAULT) => Some((AluOp::Srl, shamt)),
        (funct3::SRL_SRA, funct7::SRA) => Some((AluOp::Sra, shamt)),
        _ => None,
    }
}

/// Sign-extends the low `size` bytes of `val`.
const fn sign_extend(val: u64, size: u64) -> u64 {
    let shift = 64 - size * 8;
    (((val << shift) as i64) >> shift) as u64
}
