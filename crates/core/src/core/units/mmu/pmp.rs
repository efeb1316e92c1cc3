//! Physical Memory Protection (PMP).
//!
//! This module implements RISC-V Physical Memory Protection, which restricts
//! physical memory access based on the effective privilege mode and the
//! `pmpcfg`/`pmpaddr` registers. Sixteen entries are implemented.
//!
//! PMP supports three address-matching modes:
//! - **TOR** (Top of Range): region is `[pmpaddr[i-1], pmpaddr[i])`.
//! - **NA4**: Naturally aligned 4-byte region.
//! - **NAPOT**: Naturally aligned power-of-two region.
//!
//! Entries are searched in order; the first entry that overlaps the access
//! decides. An entry that covers only part of the access denies it.

use crate::common::AccessType;
use crate::core::arch::mode::PrivilegeMode;
use crate::isa::profile::Xlen;

/// Number of implemented PMP entries.
pub const PMP_COUNT: usize = 16;

/// PMP address-matching mode field (bits 4:3 of pmpcfg).
const A_SHIFT: u8 = 3;
const A_MASK: u8 = 0x3;

/// PMP configuration permission bits.
const PMP_R: u8 = 1 << 0;
const PMP_W: u8 = 1 << 1;
const PMP_X: u8 = 1 << 2;
const PMP_L: u8 = 1 << 7;

/// Bits of a pmpcfg byte that hold state; bits 6:5 are reserved and read as zero.
const CFG_WRITABLE: u8 = PMP_R | PMP_W | PMP_X | (A_MASK << A_SHIFT) | PMP_L;

/// Address matching mode extracted from pmpcfg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PmpAddrMatch {
    /// Entry is disabled.
    Off = 0,
    /// Top of Range: region is `[pmpaddr[i-1], pmpaddr[i])`.
    Tor = 1,
    /// Naturally aligned 4-byte region.
    Na4 = 2,
    /// Naturally aligned power-of-two region.
    Napot = 3,
}

impl PmpAddrMatch {
    /// Decode from the 2-bit A field in a pmpcfg byte.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & A_MASK {
            0 => Self::Off,
            1 => Self::Tor,
            2 => Self::Na4,
            _ => Self::Napot,
        }
    }
}

/// One PMP entry: configuration byte plus address register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PmpEntry {
    /// Raw configuration byte from pmpcfg.
    pub cfg: u8,
    /// Raw pmpaddr register value (physical address >> 2).
    pub addr: u64,
}

impl PmpEntry {
    /// Returns the address-matching mode.
    pub const fn match_mode(&self) -> PmpAddrMatch {
        PmpAddrMatch::from_bits(self.cfg >> A_SHIFT)
    }

    /// Returns true if the L (lock) bit is set.
    pub const fn is_locked(&self) -> bool {
        self.cfg & PMP_L != 0
    }

    /// Whether this entry grants `access`.
    const fn permits(&self, access: AccessType) -> bool {
        let bit = match access {
            AccessType::Fetch => PMP_X,
            AccessType::Read => PMP_R,
            AccessType::Write => PMP_W,
        };
        self.cfg & bit != 0
    }
}

/// Physical Memory Protection unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pmp {
    entries: [PmpEntry; PMP_COUNT],
}

impl Default for Pmp {
    fn default() -> Self {
        Self::new()
    }
}

impl Pmp {
    /// Creates a PMP unit in its reset state.
    ///
    /// Entry 0 is a NAPOT region covering the whole physical address space
    /// with RWX permission, so S and U mode can run before firmware programs
    /// PMP. All other entries are off.
    pub const fn new() -> Self {
        let mut entries = [PmpEntry { cfg: 0, addr: 0 }; PMP_COUNT];
        entries[0] = PmpEntry {
            cfg: PMP_R | PMP_W | PMP_X | ((PmpAddrMatch::Napot as u8) << A_SHIFT),
            addr: u64::MAX >> 10,
        };
        Self { entries }
    }

    /// Returns the entries for inspection.
    pub const fn entries(&self) -> &[PmpEntry; PMP_COUNT] {
        &self.entries
    }

    /// Reads the configuration byte for entry `idx` (0 when out of range).
    pub fn cfg(&self, idx: usize) -> u8 {
        self.entries.get(idx).map_or(0, |e| e.cfg)
    }

    /// Reads the address register for entry `idx` (0 when out of range).
    pub fn addr(&self, idx: usize) -> u64 {
        self.entries.get(idx).map_or(0, |e| e.addr)
    }

    /// Sets the configuration byte for entry `idx`. Locked entries ignore writes.
    ///
    /// The reserved combination W=1, R=0 is stored as W=0.
    pub fn set_cfg(&mut self, idx: usize, cfg: u8) {
        let Some(entry) = self.entries.get_mut(idx) else {
            return;
        };
        if entry.is_locked() {
            return;
        }
        let mut cfg = cfg & CFG_WRITABLE;
        if cfg & PMP_R == 0 {
            cfg &= !PMP_W;
        }
        entry.cfg = cfg;
    }

    /// Sets the address register for entry `idx`.
    ///
    /// Ignored when the entry is locked, or when the next entry is a locked
    /// TOR entry that uses this register as its lower bound.
    pub fn set_addr(&mut self, idx: usize, addr: u64, xlen: Xlen) {
        let next_locks = self
            .entries
            .get(idx + 1)
            .is_some_and(|n| n.is_locked() && n.match_mode() == PmpAddrMatch::Tor);
        let Some(entry) = self.entries.get_mut(idx) else {
            return;
        };
        if entry.is_locked() || next_locks {
            return;
        }
        entry.addr = match xlen {
            Xlen::Rv32 => addr & 0xFFFF_FFFF,
            Xlen::Rv64 => addr & ((1 << 54) - 1),
        };
    }

    /// Byte-address range `[lo, hi)` of entry `idx`, or `None` when off.
    fn range(&self, idx: usize) -> Option<(u64, u128)> {
        let entry = self.entries.get(idx)?;
        match entry.match_mode() {
            PmpAddrMatch::Off => None,
            PmpAddrMatch::Tor => {
                let lo = if idx == 0 {
                    0
                } else {
                    self.entries[idx - 1].addr << 2
                };
                Some((lo, u128::from(entry.addr) << 2))
            }
            PmpAddrMatch::Na4 => {
                let base = entry.addr << 2;
                Some((base, u128::from(base) + 4))
            }
            PmpAddrMatch::Napot => {
                // Trailing ones encode the size: 2^(ones + 3) bytes.
                let ones = entry.addr.trailing_ones();
                let size = 1u128 << (ones + 3);
                let base = (u128::from(entry.addr) << 2) & !(size - 1);
                Some((base as u64, base + size))
            }
        }
    }

    /// Checks whether an access of `len` bytes at physical `addr` is permitted.
    ///
    /// M-mode ignores unlocked entries and is allowed when nothing matches;
    /// S and U mode are denied when nothing matches.
    pub fn check(&self, addr: u64, len: u64, access: AccessType, mode: PrivilegeMode) -> bool {
        let lo = u128::from(addr);
        let hi = lo + u128::from(len.max(1));

        for (idx, entry) in self.entries.iter().enumerate() {
            let Some((start, end)) = self.range(idx) else {
                continue;
            };
            let start = u128::from(start);
            if hi <= start || lo >= end {
                continue;
            }
            if lo < start || hi > end {
                return false;
            }
            if mode == PrivilegeMode::Machine && !entry.is_locked() {
                return true;
            }
            return entry.permits(access);
        }

        mode == PrivilegeMode::Machine
    }
}
