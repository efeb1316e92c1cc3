//! Memory Access Types.
//!
//! Every guest memory access is classified before it reaches the MMU. The
//! classification drives:
//! 1. **Permission Validation:** Which PTE and PMP permission bit (R, W or X) is required.
//! 2. **Fault Generation:** Whether a failure is reported as an instruction, load or store fault.

use super::error::Trap;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch. Requires Execute (X) permission.
    Fetch,

    /// Data load, including the read half of an AMO. Requires Read (R) permission.
    Read,

    /// Data store, including the write half of an AMO. Requires Write (W) permission.
    Write,
}

impl AccessType {
    /// The page fault raised when translation of this access fails.
    pub const fn page_fault(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionPageFault(addr),
            Self::Read => Trap::LoadPageFault(addr),
            Self::Write => Trap::StorePageFault(addr),
        }
    }

    /// The access fault raised when PMP denies this access or no memory backs it.
    pub const fn access_fault(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionAccessFault(addr),
            Self::Read => Trap::LoadAccessFault(addr),
            Self::Write => Trap::StoreAccessFault(addr),
        }
    }

    /// The misaligned-address exception for this access.
    pub const fn misaligned(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionAddressMisaligned(addr),
            Self::Read => Trap::LoadAddressMisaligned(addr),
            Self::Write => Trap::StoreAddressMisaligned(addr),
        }
    }
}
