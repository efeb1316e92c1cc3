//! CSR access for a hart.
//!
//! This module performs the following:
//! 1. **Existence:** Which CSRs are present depends on XLEN and the implemented privilege modes.
//! 2. **Access Control:** Privilege from address bits 9:8, read-only from bits 11:10,
//!    `mstatus.TVM` for `satp`, and the counter-enable registers.
//! 3. **Legalisation:** WARL masks, views (`sstatus`, `sie`, `sip`) and the split
//!    RV32 counter halves.

use std::ops::Range;

use super::Hart;
use crate::core::arch::csr::{
    self, ALL_INTERRUPTS, MIP_SSIP, MSTATUS_MIE, MSTATUS_MPIE, MSTATUS_MPP, MSTATUS_MPP_SHIFT,
    MSTATUS_MPRV, MSTATUS_MXR, MSTATUS_SIE, MSTATUS_SPIE, MSTATUS_SPP, MSTATUS_SUM, MSTATUS_TSR,
    MSTATUS_TVM, MSTATUS_TW, SATP_MODE_BARE, SATP_MODE_SV39, SATP_MODE_SV48, SATP32_MODE,
    SATP32_PPN_MASK, SATP64_MODE_SHIFT, SATP64_PPN_MASK, SSTATUS_MASK, SUPERVISOR_INTERRUPTS,
};
use crate::core::arch::mode::PrivilegeMode;
use crate::isa::privileged::cause::exception;
use crate::isa::profile::Xlen;

/// Exceptions that `medeleg` can delegate.
const MEDELEG_WRITABLE: u64 = (1 << exception::INSTRUCTION_ADDRESS_MISALIGNED)
    | (1 << exception::INSTRUCTION_ACCESS_FAULT)
    | (1 << exception::ILLEGAL_INSTRUCTION)
    | (1 << exception::BREAKPOINT)
    | (1 << exception::LOAD_ADDRESS_MISALIGNED)
    | (1 << exception::LOAD_ACCESS_FAULT)
    | (1 << exception::STORE_ADDRESS_MISALIGNED)
    | (1 << exception::STORE_ACCESS_FAULT)
    | (1 << exception::ENVIRONMENT_CALL_FROM_U_MODE)
    | (1 << exception::INSTRUCTION_PAGE_FAULT)
    | (1 << exception::LOAD_PAGE_FAULT)
    | (1 << exception::STORE_PAGE_FAULT);

const LOW_WORD: u64 = 0xFFFF_FFFF;

impl Hart {
    /// Reads a CSR without any access check. `None` if it does not exist.
    pub(super) fn csr_read(&self, addr: u32) -> Option<u64> {
        let xlen = self.profile.xlen;
        let rv32 = xlen == Xlen::Rv32;
        let s = self.levels.supervisor;
        let c = &self.csrs;

        let val = match addr {
            csr::MVENDORID | csr::MARCHID | csr::MIMPID => 0,
            csr::MHARTID => self.id as u64,
            csr::MSTATUS => c.mstatus,
            csr::MSTATUSH if rv32 => 0,
            csr::MISA => c.misa,
            csr::MEDELEG if s => c.medeleg,
            csr::MIDELEG if s => c.mideleg,
            csr::MIE => c.mie,
            csr::MIP => c.mip,
            csr::MTVEC => c.mtvec,
            csr::MCOUNTEREN if self.levels.user => c.mcounteren,
            csr::MSCRATCH => c.mscratch,
            csr::MEPC => c.mepc,
            csr::MCAUSE => c.mcause,
            csr::MTVAL => c.mtval,
            csr::PMPCFG0..=csr::PMPCFG3 => {
                let entries = self.pmpcfg_entries(addr)?;
                entries
                    .enumerate()
                    .fold(0, |acc, (i, idx)| acc | (u64::from(self.pmp.cfg(idx)) << (8 * i)))
            }
            csr::PMPADDR0..=csr::PMPADDR15 => self.pmp.addr((addr - csr::PMPADDR0) as usize),
            csr::SSTATUS if s => c.mstatus & SSTATUS_MASK,
            csr::SIE if s => c.mie & c.mideleg,
            csr::SIP if s => c.mip & c.mideleg,
            csr::STVEC if s => c.stvec,
            csr::SCOUNTEREN if s => c.scounteren,
            csr::SSCRATCH if s => c.sscratch,
            csr::SEPC if s => c.sepc,
            csr::SCAUSE if s => c.scause,
            csr::STVAL if s => c.stval,
            csr::SATP if s => c.satp,
            csr::CYCLE | csr::MCYCLE => c.mcycle,
            csr::INSTRET | csr::MINSTRET => c.minstret,
            csr::CYCLEH | csr::MCYCLEH if rv32 => c.mcycle >> 32,
            csr::INSTRETH | csr::MINSTRETH if rv32 => c.minstret >> 32,
            _ => return None,
        };
        Some(xlen.truncate(val))
    }

    /// Whether the current privilege may perform this access. Existence is checked separately.
    pub(super) fn csr_accessible(&self, addr: u32, write: bool) -> bool {
        let required = u64::from((addr >> 8) & 0x3);
        if self.privilege.bits() < required {
            return false;
        }
        if write && (addr >> 10) & 0x3 == 0x3 {
            return false;
        }
        match addr {
            csr::SATP => {
                !(self.privilege == PrivilegeMode::Supervisor
                    && self.csrs.mstatus & MSTATUS_TVM != 0)
            }
            csr::CYCLE | csr::INSTRET | csr::CYCLEH | csr::INSTRETH => {
                self.counter_enabled(addr & 0x1F)
            }
            _ => true,
        }
    }

    fn counter_enabled(&self, bit: u32) -> bool {
        let enabled = |reg: u64| (reg >> bit) & 1 != 0;
        match self.privilege {
            PrivilegeMode::Machine => true,
            PrivilegeMode::Supervisor => enabled(self.csrs.mcounteren),
            PrivilegeMode::User => {
                enabled(self.csrs.mcounteren)
                    && (!self.levels.supervisor || enabled(self.csrs.scounteren))
            }
        }
    }

    /// Writes a CSR, applying its WARL rules. Writes to read-only or absent CSRs are ignored.
    pub(super) fn csr_write(&mut self, addr: u32, val: u64) {
        let xlen = self.profile.xlen;
        let val = xlen.truncate(val);

        match addr {
            csr::MSTATUS => self.write_mstatus(val, self.mstatus_writable()),
            csr::SSTATUS => self.write_mstatus(val, self.mstatus_writable() & SSTATUS_MASK),
            csr::MEDELEG => self.csrs.medeleg = val & MEDELEG_WRITABLE,
            csr::MIDELEG => self.csrs.mideleg = val & SUPERVISOR_INTERRUPTS,
            csr::MIE => self.csrs.mie = val & self.implemented_interrupts(),
            csr::SIE => {
                let mask = self.csrs.mideleg;
                self.csrs.mie = (self.csrs.mie & !mask) | (val & mask);
            }
            csr::MIP => {
                let mask = self.implemented_interrupts() & SUPERVISOR_INTERRUPTS;
                self.csrs.mip = (self.csrs.mip & !mask) | (val & mask);
            }
            csr::SIP => {
                let mask = MIP_SSIP & self.csrs.mideleg;
                self.csrs.mip = (self.csrs.mip & !mask) | (val & mask);
            }
            csr::MTVEC => self.csrs.mtvec = legal_tvec(val),
            csr::STVEC => self.csrs.stvec = legal_tvec(val),
            csr::MCOUNTEREN => self.csrs.mcounteren = val & LOW_WORD,
            csr::SCOUNTEREN => self.csrs.scounteren = val & LOW_WORD,
            csr::MSCRATCH => self.csrs.mscratch = val,
            csr::SSCRATCH => self.csrs.sscratch = val,
            csr::MEPC => self.csrs.mepc = val & self.epc_mask(),
            csr::SEPC => self.csrs.sepc = val & self.epc_mask(),
            csr::MCAUSE => self.csrs.mcause = val,
            csr::SCAUSE => self.csrs.scause = val,
            csr::MTVAL => self.csrs.mtval = val,
            csr::STVAL => self.csrs.stval = val,
            csr::SATP => self.write_satp(val),
            csr::MCYCLE => {
                self.csrs.mcycle = set_low(self.csrs.mcycle, val, xlen);
                self.counter_writes.cycle = true;
            }
            csr::MCYCLEH => {
                self.csrs.mcycle = set_high(self.csrs.mcycle, val);
                self.counter_writes.cycle = true;
            }
            csr::MINSTRET => {
                self.csrs.minstret = set_low(self.csrs.minstret, val, xlen);
                self.counter_writes.instret = true;
            }
            csr::MINSTRETH => {
                self.csrs.minstret = set_high(self.csrs.minstret, val);
                self.counter_writes.instret = true;
            }
            csr::PMPCFG0..=csr::PMPCFG3 => {
                if let Some(entries) = self.pmpcfg_entries(addr) {
                    for (i, idx) in entries.enumerate() {
                        self.pmp.set_cfg(idx, (val >> (8 * i)) as u8);
                    }
                }
            }
            csr::PMPADDR0..=csr::PMPADDR15 => {
                self.pmp.set_addr((addr - csr::PMPADDR0) as usize, val, xlen);
            }
            _ => {}
        }
    }

    /// PMP entries packed into `pmpcfg<n>`; odd registers do not exist on RV64.
    fn pmpcfg_entries(&self, addr: u32) -> Option<Range<usize>> {
        let reg = (addr - csr::PMPCFG0) as usize;
        match self.profile.xlen {
            Xlen::Rv32 => Some(reg * 4..reg * 4 + 4),
            Xlen::Rv64 if reg % 2 == 0 => Some(reg * 4..reg * 4 + 8),
            Xlen::Rv64 => None,
        }
    }

    fn mstatus_writable(&self) -> u64 {
        let mut mask = MSTATUS_MIE | MSTATUS_MPIE | MSTATUS_MPP | MSTATUS_TW;
        if self.levels.user {
            mask |= MSTATUS_MPRV;
        }
        if self.levels.supervisor {
            mask |= MSTATUS_SIE
                | MSTATUS_SPIE
                | MSTATUS_SPP
                | MSTATUS_SUM
                | MSTATUS_MXR
                | MSTATUS_TVM
                | MSTATUS_TSR;
        }
        mask
    }

    /// Updates the `mask` bits of `mstatus`. An unimplemented MPP keeps its old value.
    pub(super) fn write_mstatus(&mut self, val: u64, mask: u64) {
        let old = self.csrs.mstatus;
        let mut new = (old & !mask) | (val & mask);
        let mpp = PrivilegeMode::from_bits(new >> MSTATUS_MPP_SHIFT);
        if !mpp.is_some_and(|mode| self.levels.supports(mode)) {
            new = (new & !MSTATUS_MPP) | (old & MSTATUS_MPP);
        }
        self.csrs.mstatus = new;
    }

    fn implemented_interrupts(&self) -> u64 {
        if self.levels.supervisor {
            ALL_INTERRUPTS
        } else {
            ALL_INTERRUPTS & !SUPERVISOR_INTERRUPTS
        }
    }

    /// `xepc` bit 0 is always clear; bit 1 too without C.
    pub(super) const fn epc_mask(&self) -> u64 {
        if self.profile.c { !1 } else { !3 }
    }

    /// Writes `satp`. A write selecting an unimplemented mode is ignored. ASID is not implemented.
    fn write_satp(&mut self, val: u64) {
        self.csrs.satp = match self.profile.xlen {
            Xlen::Rv32 => val & (SATP32_MODE | SATP32_PPN_MASK),
            Xlen::Rv64 => {
                let mode = val >> SATP64_MODE_SHIFT;
                if !matches!(mode, SATP_MODE_BARE | SATP_MODE_SV39 | SATP_MODE_SV48) {
                    return;
                }
                (mode << SATP64_MODE_SHIFT) | (val & SATP64_PPN_MASK)
            }
        };
    }

    /// Writes a CSR and records the value it reads back in the commit log.
    pub(super) fn csr_write_logged(&mut self, addr: u32, val: u64) {
        self.csr_write(addr, val);
        if let Some(read_back) = self.csr_read(addr) {
            self.log.record_csr(addr, read_back);
        }
    }
}

/// Vectored mode (1) and direct mode (0) are kept; bit 1 is cleared.
const fn legal_tvec(val: u64) -> u64 {
    val & !2
}

/// Replaces the low XLEN bits of a 64-bit counter.
const fn set_low(counter: u64, val: u64, xlen: Xlen) -> u64 {
    match xlen {
        Xlen::Rv32 => (counter & !LOW_WORD) | (val & LOW_WORD),
        Xlen::Rv64 => val,
    }
}

/// Replaces the high word of a 64-bit counter (RV32 `*h` CSRs).
const fn set_high(counter: u64, val: u64) -> u64 {
    (counter & LOW_WORD) | ((val & LOW_WORD) << 32)
}
