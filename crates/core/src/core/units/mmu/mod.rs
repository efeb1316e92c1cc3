//! Memory Management Unit (MMU).
//!
//! This module implements virtual-to-physical address translation. It performs
//! the following:
//! 1. **Privilege Selection:** Applies `mstatus.MPRV` to data accesses.
//! 2. **Translation:** Bare mode or a page-table walk (Sv32, Sv39, Sv48).
//! 3. **Protection:** PMP check of the final physical range.
//!
//! The stepping path walks against `PhysMemory` and writes A/D bits back;
//! peeks walk against a `PeekView` and never modify memory.

/// Physical Memory Protection (PMP).
pub mod pmp;

/// Page table walker for Sv32, Sv39 and Sv48.
pub mod ptw;

use crate::common::{AccessType, PhysAddr, TranslationResult, VirtAddr};
use crate::core::arch::csr::{MSTATUS_MPP_SHIFT, MSTATUS_MPRV};
use crate::core::arch::mode::PrivilegeMode;
use crate::isa::profile::Xlen;

use self::pmp::Pmp;
use self::ptw::{PagingMode, PteStore};

/// Translation-relevant hart state captured for one access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MmuState {
    /// Current `satp`.
    pub satp: u64,
    /// Current `mstatus` (SUM, MXR).
    pub mstatus: u64,
    /// Register width; selects Sv32 or Sv39/Sv48.
    pub xlen: Xlen,
    /// Effective privilege of the access, after MPRV.
    pub privilege: PrivilegeMode,
}

/// Privilege used to translate and protect an access.
///
/// Loads and stores from M-mode with `mstatus.MPRV` set use `mstatus.MPP`;
/// fetches always use the current privilege.
pub const fn effective_privilege(
    access: AccessType,
    privilege: PrivilegeMode,
    mstatus: u64,
) -> PrivilegeMode {
    if matches!(access, AccessType::Fetch)
        || !matches!(privilege, PrivilegeMode::Machine)
        || mstatus & MSTATUS_MPRV == 0
    {
        return privilege;
    }
    match PrivilegeMode::from_bits(mstatus >> MSTATUS_MPP_SHIFT) {
        Some(mode) => mode,
        None => privilege,
    }
}

/// Translates `len` bytes at `vaddr` and applies PMP to the result.
///
/// The range must not cross a page boundary; callers split misaligned
/// accesses before translating.
///
/// # Arguments
///
/// * `vaddr` - Virtual address, already truncated to XLEN.
/// * `len` - Access size in bytes, for the PMP range check.
/// * `access` - Type of access (Fetch, Read, Write).
/// * `state` - Translation state, with `privilege` already made effective.
/// * `pmp` - The hart's PMP unit.
/// * `mem` - Page table storage.
///
/// # Returns
///
/// A `TranslationResult` holding the physical address or the trap to raise.
pub fn translate<M: PteStore>(
    vaddr: VirtAddr,
    len: u64,
    access: AccessType,
    state: &MmuState,
    pmp: &Pmp,
    mem: &mut M,
) -> TranslationResult {
    let mode = if state.privilege == PrivilegeMode::Machine {
        PagingMode::Bare
    } else {
        PagingMode::from_satp(state.satp, state.xlen).unwrap_or(PagingMode::Bare)
    };

    let result = match mode {
        PagingMode::Bare => TranslationResult::success(PhysAddr::new(vaddr.val())),
        _ => ptw::page_table_walk(vaddr, access, mode, state, pmp, mem),
    };

    match result.into_result() {
        Ok(paddr) if pmp.check(paddr.val(), len, access, state.privilege) => result,
        Ok(_) => TranslationResult::fault(access.access_fault(vaddr.val())),
        Err(_) => result,
    }
}
