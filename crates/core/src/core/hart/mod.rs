//! Hart state and the single-step engine.
//!
//! A `Hart` owns everything architectural about one hardware thread: PC,
//! integer registers, CSRs, PMP and the current privilege mode. Physical
//! memory is shared between harts and passed in by the simulator for each
//! step. The step logic is split across submodules:
//! 1. **`csr`:** CSR existence, access checks and WARL legalisation.
//! 2. **`trap`:** Interrupt selection, trap entry with delegation, `MRET`/`SRET`.
//! 3. **`memory`:** Fetch, loads and stores through the MMU, plus side-effect-free peeks.
//! 4. **`execute`:** The instruction semantics.
//!
//! A step either retires one instruction or takes one trap. A trapping
//! instruction does not retire, so `minstret` only advances on retirement
//! while `mcycle` advances on every step.

/// Per-step record of register and memory effects.
pub mod commit_log;

mod csr;
mod execute;
mod memory;
mod trap;

use tracing::trace;

use crate::common::{PhysAddr, Trap};
use crate::common::constants::INSTRUCTION_SIZE_16;
use crate::core::arch::csr::{
    Csrs, MISA_MXL_32, MISA_MXL_64, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_SXL, MSTATUS_UXL,
};
use crate::core::arch::gpr::Gpr;
use crate::core::arch::mode::{PrivilegeLevels, PrivilegeMode};
use crate::core::units::mmu::pmp::Pmp;
use crate::isa::decode::decode;
use crate::isa::profile::{IsaProfile, Xlen};
use crate::isa::rvc;
use crate::soc::PhysMemory;

pub use self::commit_log::{CommitLog, MemAccess};

/// Result of stepping one hart by one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction completed and the PC moved to its successor or branch target.
    Retired,
    /// The instruction (or a pending interrupt) trapped; the PC is now the handler.
    TrapTaken(Trap),
}

/// Counters written by the current instruction; their automatic increment is skipped.
#[derive(Clone, Copy, Debug, Default)]
struct CounterWrites {
    cycle: bool,
    instret: bool,
}

/// Architectural state of one hart.
#[derive(Clone, Debug)]
pub struct Hart {
    id: usize,
    pc: u64,
    gpr: Gpr,
    csrs: Csrs,
    pmp: Pmp,
    privilege: PrivilegeMode,
    profile: IsaProfile,
    levels: PrivilegeLevels,
    misaligned: bool,
    /// Physical address and size of the active LR reservation.
    reservation: Option<(u64, u64)>,
    log: CommitLog,
    last_trap: Option<Trap>,
    /// Physical ranges stored to by the last step.
    stores: Vec<(u64, u64)>,
    counter_writes: CounterWrites,
}

impl Hart {
    /// Creates a hart in its reset state.
    ///
    /// # Arguments
    ///
    /// * `id` - Value of `mhartid`.
    /// * `profile` - Parsed ISA string.
    /// * `levels` - Implemented privilege modes.
    /// * `misaligned` - Whether misaligned loads and stores are performed instead of trapping.
    /// * `reset_pc` - Initial program counter.
    pub fn new(
        id: usize,
        profile: IsaProfile,
        levels: PrivilegeLevels,
        misaligned: bool,
        reset_pc: u64,
    ) -> Self {
        let xlen = profile.xlen;
        let mxl = match xlen {
            Xlen::Rv32 => MISA_MXL_32,
            Xlen::Rv64 => MISA_MXL_64,
        };

        let mut mstatus = 0;
        if xlen == Xlen::Rv64 {
            if levels.user {
                mstatus |= 2 << MSTATUS_UXL.trailing_zeros();
            }
            if levels.supervisor {
                mstatus |= 2 << MSTATUS_SXL.trailing_zeros();
            }
        }
        if !levels.user {
            mstatus |= MSTATUS_MPP & (PrivilegeMode::Machine.bits() << MSTATUS_MPP_SHIFT);
        }

        let csrs = Csrs {
            mstatus,
            misa: mxl | profile.misa_extensions() | levels.misa_extensions(),
            ..Csrs::default()
        };

        Self {
            id,
            pc: xlen.truncate(reset_pc),
            gpr: Gpr::new(),
            csrs,
            pmp: Pmp::new(),
            privilege: PrivilegeMode::Machine,
            profile,
            levels,
            misaligned,
            reservation: None,
            log: CommitLog::new(),
            last_trap: None,
            stores: Vec::new(),
            counter_writes: CounterWrites::default(),
        }
    }

    /// The hart id (`mhartid`).
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Register width.
    pub const fn xlen(&self) -> Xlen {
        self.profile.xlen
    }

    /// ISA profile the hart was built with.
    pub const fn profile(&self) -> IsaProfile {
        self.profile
    }

    /// Current program counter.
    pub const fn pc(&self) -> u64 {
        self.pc
    }

    /// Moves the program counter. The value is truncated to XLEN.
    pub const fn set_pc(&mut self, pc: u64) {
        self.pc = self.profile.xlen.truncate(pc);
    }

    /// Reads integer register `idx` (0..32). `x0` reads as zero.
    pub fn read_gpr(&self, idx: usize) -> u64 {
        self.gpr.read(idx)
    }

    /// Writes integer register `idx` (0..32), truncated to XLEN. Writes to `x0` are dropped.
    pub fn write_gpr(&mut self, idx: usize, val: u64) {
        self.gpr.write(idx, self.profile.xlen.truncate(val));
    }

    /// Current privilege mode.
    pub const fn privilege(&self) -> PrivilegeMode {
        self.privilege
    }

    /// Trap taken by the most recent step, if any.
    pub const fn last_trap(&self) -> Option<Trap> {
        self.last_trap
    }

    /// Effects of the most recent step.
    pub const fn commit_log(&self) -> &CommitLog {
        &self.log
    }

    /// Physical `(address, size)` ranges stored to by the most recent step.
    pub fn store_footprint(&self) -> &[(u64, u64)] {
        &self.stores
    }

    /// Whether an LR reservation is currently held.
    pub const fn has_reservation(&self) -> bool {
        self.reservation.is_some()
    }

    /// Drops the reservation if it overlaps `[addr, addr + len)`.
    ///
    /// Called for stores made by other harts.
    pub fn invalidate_reservation(&mut self, addr: u64, len: u64) {
        if let Some((base, size)) = self.reservation {
            let overlaps = u128::from(addr) < u128::from(base) + u128::from(size)
                && u128::from(base) < u128::from(addr) + u128::from(len);
            if overlaps {
                self.reservation = None;
            }
        }
    }

    /// Reads a CSR the way a debugger would: no privilege check, no side effects.
    ///
    /// Returns `None` if the CSR does not exist in this configuration.
    pub fn peek_csr(&self, addr: u32) -> Option<u64> {
        self.csr_read(addr)
    }

    /// Advances the hart by one instruction.
    ///
    /// A pending and enabled interrupt is taken instead of fetching. Any
    /// exception raised by fetch, decode or execute is delivered to the trap
    /// handler and reported as `StepOutcome::TrapTaken`.
    pub fn step(&mut self, mem: &mut PhysMemory) -> StepOutcome {
        self.log.clear();
        self.stores.clear();
        self.last_trap = None;
        self.counter_writes = CounterWrites::default();

        let pc = self.pc;
        let result = match self.pending_interrupt() {
            Some(interrupt) => Err(interrupt),
            None => self.execute_one(mem),
        };

        let outcome = match result {
            Ok(()) => {
                if !self.counter_writes.instret {
                    self.csrs.minstret = self.csrs.minstret.wrapping_add(1);
                }
                StepOutcome::Retired
            }
            Err(trap) => {
                self.take_trap(trap, pc);
                self.last_trap = Some(trap);
                StepOutcome::TrapTaken(trap)
            }
        };

        if !self.counter_writes.cycle {
            self.csrs.mcycle = self.csrs.mcycle.wrapping_add(1);
        }
        outcome
    }

    fn execute_one(&mut self, mem: &mut PhysMemory) -> Result<(), Trap> {
        let (fetched, len) = self.fetch(mem)?;
        let inst = if len == INSTRUCTION_SIZE_16 {
            rvc::expand(fetched as u16, self.profile.xlen)
                .ok_or(Trap::IllegalInstruction(fetched))?
        } else {
            fetched
        };

        let decoded = decode(inst);
        trace!(
            hart = self.id,
            pc = format_args!("{:#x}", self.pc),
            insn = format_args!("{fetched:#x}"),
            "execute"
        );
        self.execute(&decoded, fetched, len, mem)
    }

    /// Raw bits of the instruction at `vaddr`, fetched without side effects.
    ///
    /// Returns `None` if either parcel is unmapped, not executable, or denied
    /// by PMP, or if `vaddr` is odd.
    pub fn peek_insn(&self, vaddr: u64, mem: &PhysMemory) -> Option<u32> {
        self.peek_fetch(vaddr, mem)
    }

    /// Reads `len` bytes at virtual address `vaddr` without side effects.
    ///
    /// Translation and PMP use the hart's current state with load
    /// permission. Returns `None` if any byte is not observable.
    pub fn peek_bytes(&self, vaddr: u64, len: u64, mem: &PhysMemory) -> Option<Vec<u8>> {
        self.peek_data(vaddr, len, mem)
    }

    /// Translates `vaddr` for a load without side effects.
    pub fn peek_translate(&self, vaddr: u64, mem: &PhysMemory) -> Option<PhysAddr> {
        self.peek_translate_range(vaddr, 1, crate::common::AccessType::Read, mem)
    }
}
