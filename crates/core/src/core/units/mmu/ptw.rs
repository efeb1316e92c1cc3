//! Hardware Page Table Walker (PTW).
//!
//! This module implements the page table walk for Sv32, Sv39 and Sv48. It
//! traverses the radix tree rooted at `satp.PPN`, validates each entry, checks
//! leaf permissions against the effective privilege and `mstatus.SUM`/`MXR`,
//! and maintains the Accessed and Dirty bits.
//!
//! PTE reads are subject to PMP as supervisor-mode loads. There is no TLB, so
//! every translation walks the tree.

use crate::common::{AccessType, PAGE_SHIFT, PhysAddr, TranslationResult, VirtAddr};
use crate::core::arch::csr::{
    MSTATUS_MXR, MSTATUS_SUM, SATP_MODE_BARE, SATP_MODE_SV32, SATP_MODE_SV39, SATP_MODE_SV48,
    SATP32_MODE, SATP32_PPN_MASK, SATP64_MODE_SHIFT, SATP64_PPN_MASK,
};
use crate::core::arch::mode::PrivilegeMode;
use crate::isa::profile::Xlen;
use crate::soc::PhysMemory;

use super::MmuState;
use super::pmp::Pmp;

/// Page Table Entry valid bit (bit 0).
const PTE_VALID_BIT: u64 = 1;

/// Page Table Entry read permission bit (bit 1).
const PTE_READ_BIT: u64 = 1 << 1;

/// Page Table Entry write permission bit (bit 2).
const PTE_WRITE_BIT: u64 = 1 << 2;

/// Page Table Entry execute permission bit (bit 3).
const PTE_EXEC_BIT: u64 = 1 << 3;

/// Page Table Entry user mode access bit (bit 4).
const PTE_USER_BIT: u64 = 1 << 4;

/// Page Table Entry accessed bit (bit 6).
const PTE_ACCESSED_BIT: u64 = 1 << 6;

/// Page Table Entry dirty bit (bit 7).
const PTE_DIRTY_BIT: u64 = 1 << 7;

/// Bit shift to extract Physical Page Number from PTE.
const PTE_PPN_SHIFT: u64 = 10;

/// Bits 63:54 of an Sv39/Sv48 PTE (N, PBMT and reserved); must be zero.
const PTE64_RESERVED: u64 = 0x3FF << 54;

/// Address translation scheme selected by `satp.MODE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagingMode {
    /// No translation.
    Bare,
    /// Two-level, 32-bit virtual addresses (RV32).
    Sv32,
    /// Three-level, 39-bit virtual addresses (RV64).
    Sv39,
    /// Four-level, 48-bit virtual addresses (RV64).
    Sv48,
}

impl PagingMode {
    /// Decodes `satp.MODE`. Returns `None` for modes this hart does not implement.
    pub const fn from_satp(satp: u64, xlen: Xlen) -> Option<Self> {
        match xlen {
            Xlen::Rv32 => {
                if satp & SATP32_MODE == 0 {
                    Some(Self::Bare)
                } else {
                    Some(Self::Sv32)
                }
            }
            Xlen::Rv64 => match satp >> SATP64_MODE_SHIFT {
                SATP_MODE_BARE => Some(Self::Bare),
                SATP_MODE_SV39 => Some(Self::Sv39),
                SATP_MODE_SV48 => Some(Self::Sv48),
                _ => None,
            },
        }
    }

    /// The `satp.MODE` encoding.
    pub const fn satp_mode(self) -> u64 {
        match self {
            Self::Bare => SATP_MODE_BARE,
            Self::Sv32 => SATP_MODE_SV32,
            Self::Sv39 => SATP_MODE_SV39,
            Self::Sv48 => SATP_MODE_SV48,
        }
    }

    const fn levels(self) -> u32 {
        match self {
            Self::Bare => 0,
            Self::Sv32 => 2,
            Self::Sv39 => 3,
            Self::Sv48 => 4,
        }
    }

    const fn vpn_bits(self) -> u32 {
        if matches!(self, Self::Sv32) { 10 } else { 9 }
    }

    const fn pte_size(self) -> usize {
        if matches!(self, Self::Sv32) { 4 } else { 8 }
    }

    /// Width of a virtual address; upper bits must sign-extend bit `va_bits - 1`.
    const fn va_bits(self) -> u32 {
        match self {
            Self::Bare | Self::Sv32 => 64,
            Self::Sv39 => 39,
            Self::Sv48 => 48,
        }
    }

    const fn ppn_mask(self) -> u64 {
        if matches!(self, Self::Sv32) {
            SATP32_PPN_MASK
        } else {
            SATP64_PPN_MASK
        }
    }
}

/// Root page-table PPN held in `satp`.
pub const fn root_ppn(satp: u64, xlen: Xlen) -> u64 {
    match xlen {
        Xlen::Rv32 => satp & SATP32_PPN_MASK,
        Xlen::Rv64 => satp & SATP64_PPN_MASK,
    }
}

/// Backing store the walker reads page tables from.
pub trait PteStore {
    /// Reads a little-endian PTE of `size` bytes.
    fn load_pte(&self, addr: PhysAddr, size: usize) -> Option<u64>;

    /// Writes back a PTE whose A/D bits changed. Returns `false` if the write
    /// could not be performed.
    fn store_pte(&mut self, addr: PhysAddr, size: usize, val: u64) -> bool;
}

impl PteStore for PhysMemory {
    fn load_pte(&self, addr: PhysAddr, size: usize) -> Option<u64> {
        self.read_uint(addr, size)
    }

    fn store_pte(&mut self, addr: PhysAddr, size: usize, val: u64) -> bool {
        self.write_uint(addr, size, val)
    }
}

/// Read-only view used by debugger-style peeks.
///
/// The walk proceeds as if A/D updates succeeded, but memory is never written.
#[derive(Clone, Copy, Debug)]
pub struct PeekView<'a>(pub &'a PhysMemory);

impl PteStore for PeekView<'_> {
    fn load_pte(&self, addr: PhysAddr, size: usize) -> Option<u64> {
        self.0.read_uint(addr, size)
    }

    fn store_pte(&mut self, _addr: PhysAddr, _size: usize, _val: u64) -> bool {
        true
    }
}

/// A strongly-typed wrapper around a raw Page Table Entry.
#[derive(Clone, Copy, Debug)]
struct PageTableEntry(u64);

impl PageTableEntry {
    const fn is_valid(self) -> bool {
        self.0 & PTE_VALID_BIT != 0
    }

    const fn can_read(self) -> bool {
        self.0 & PTE_READ_BIT != 0
    }

    const fn can_write(self) -> bool {
        self.0 & PTE_WRITE_BIT != 0
    }

    const fn can_exec(self) -> bool {
        self.0 & PTE_EXEC_BIT != 0
    }

    const fn is_user(self) -> bool {
        self.0 & PTE_USER_BIT != 0
    }

    const fn is_accessed(self) -> bool {
        self.0 & PTE_ACCESSED_BIT != 0
    }

    const fn is_dirty(self) -> bool {
        self.0 & PTE_DIRTY_BIT != 0
    }

    /// A valid entry with R=X=0 points to the next level.
    const fn is_pointer(self) -> bool {
        !self.can_read() && !self.can_exec()
    }

    fn ppn(self, mode: PagingMode) -> u64 {
        (self.0 >> PTE_PPN_SHIFT) & mode.ppn_mask()
    }
}

/// Walks the page table for `vaddr`.
///
/// # Arguments
///
/// * `vaddr` - The virtual address to translate (already truncated to XLEN).
/// * `access` - The type of memory access (Fetch, Read, Write).
/// * `mode` - Paging scheme from `satp`; must not be `Bare`.
/// * `state` - `satp`, `mstatus` and the effective privilege of the access.
/// * `pmp` - Checks each PTE read and A/D write-back.
/// * `mem` - Page table storage; A/D updates go through `store_pte`.
///
/// # Returns
///
/// The physical address on success. Malformed or insufficient entries give the
/// page fault for `access`; PTE accesses PMP rejects or that hit no memory give
/// the access fault.
pub fn page_table_walk<M: PteStore>(
    vaddr: VirtAddr,
    access: AccessType,
    mode: PagingMode,
    state: &MmuState,
    pmp: &Pmp,
    mem: &mut M,
) -> TranslationResult {
    let va = vaddr.val();
    let page_fault = TranslationResult::fault(access.page_fault(va));
    let access_fault = TranslationResult::fault(access.access_fault(va));

    let va_bits = mode.va_bits();
    if va_bits < 64 {
        let shift = 64 - va_bits;
        if (((va << shift) as i64) >> shift) as u64 != va {
            return page_fault;
        }
    }

    let vpn_bits = mode.vpn_bits();
    let vpn_mask = (1u64 << vpn_bits) - 1;
    let pte_size = mode.pte_size();
    let mut ppn = root_ppn(state.satp, state.xlen);

    for level in (0..mode.levels()).rev() {
        let vpn_shift = PAGE_SHIFT as u32 + level * vpn_bits;
        let vpn_i = (va >> vpn_shift) & vpn_mask;
        let pte_addr = PhysAddr::new((ppn << PAGE_SHIFT) + vpn_i * pte_size as u64);

        if !pmp.check(
            pte_addr.val(),
            pte_size as u64,
            AccessType::Read,
            PrivilegeMode::Supervisor,
        ) {
            return access_fault;
        }
        let Some(raw) = mem.load_pte(pte_addr, pte_size) else {
            return access_fault;
        };
        let pte = PageTableEntry(raw);

        if pte_size == 8 && raw & PTE64_RESERVED != 0 {
            return page_fault;
        }
        if !pte.is_valid() || (!pte.can_read() && pte.can_write()) {
            return page_fault;
        }

        if pte.is_pointer() {
            if level == 0 || raw & (PTE_ACCESSED_BIT | PTE_DIRTY_BIT | PTE_USER_BIT) != 0 {
                return page_fault;
            }
            ppn = pte.ppn(mode);
            continue;
        }

        if !check_permissions(pte, access, state) {
            return page_fault;
        }

        let leaf_ppn = pte.ppn(mode);
        let superpage_bits = level * vpn_bits;
        if leaf_ppn & ((1u64 << superpage_bits) - 1) != 0 {
            return page_fault;
        }

        if let Some(updated) = update_access_bits(pte, access) {
            if !pmp.check(
                pte_addr.val(),
                pte_size as u64,
                AccessType::Write,
                PrivilegeMode::Supervisor,
            ) || !mem.store_pte(pte_addr, pte_size, updated)
            {
                return access_fault;
            }
        }

        let offset_mask = (1u64 << vpn_shift) - 1;
        let paddr = (leaf_ppn << PAGE_SHIFT) & !offset_mask | (va & offset_mask);
        return TranslationResult::success(PhysAddr::new(paddr));
    }

    page_fault
}

/// Validates access permissions for a leaf PTE.
///
/// Checks R/W/X bits, the User bit, and the status register flags (MXR, SUM).
fn check_permissions(pte: PageTableEntry, access: AccessType, state: &MmuState) -> bool {
    let mxr = state.mstatus & MSTATUS_MXR != 0;
    let sum = state.mstatus & MSTATUS_SUM != 0;

    let privilege_ok = match state.privilege {
        PrivilegeMode::User => pte.is_user(),
        PrivilegeMode::Supervisor => !pte.is_user() || (sum && access != AccessType::Fetch),
        PrivilegeMode::Machine => true,
    };

    privilege_ok
        && match access {
            AccessType::Fetch => pte.can_exec(),
            AccessType::Read => pte.can_read() || (mxr && pte.can_exec()),
            AccessType::Write => pte.can_write(),
        }
}

/// The PTE with A (and D for stores) set, or `None` if no update is needed.
const fn update_access_bits(pte: PageTableEntry, access: AccessType) -> Option<u64> {
    let needs_dirty = matches!(access, AccessType::Write) && !pte.is_dirty();
    if pte.is_accessed() && !needs_dirty {
        return None;
    }
    let mut raw = pte.0 | PTE_ACCESSED_BIT;
    if needs_dirty {
        raw |= PTE_DIRTY_BIT;
    }
    Some(raw)
}
