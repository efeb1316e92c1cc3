//! Errors, traps and translation results.
//!
//! This module defines the two failure channels of the simulator. It provides:
//! 1. **Facade Errors:** `HammerError`, returned to the host for bad configuration or bad queries.
//! 2. **Trap Representation:** Synchronous exceptions and interrupts raised by guest code.
//! 3. **Translation Results:** The outcome of a virtual-to-physical walk.
//!
//! A `Trap` is an architectural event, not a host error. It is delivered to the
//! guest's trap handler and reported through `StepOutcome`, never through `Err`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::addr::PhysAddr;
use crate::isa::privileged::cause::{exception, interrupt};

/// Convenience alias used across the public API.
pub type Result<T, E = HammerError> = std::result::Result<T, E>;

/// Errors reported to the host program.
///
/// Construction-time variants (`InvalidConfig`, `UnsupportedIsa`,
/// `UnsupportedPrivilegeMode`, `UnmappedLoadSegment`, `InvalidBinary`, `Io`) abort
/// construction entirely. Per-call variants leave the simulator untouched.
#[derive(Error, Debug)]
pub enum HammerError {
    /// The configuration violates a structural rule (empty harts, overlapping regions, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The ISA string names a base or extension combination that cannot be simulated.
    #[error("unsupported ISA string '{0}'")]
    UnsupportedIsa(String),

    /// The privilege string names a mode combination that cannot be realised.
    #[error("unsupported privilege levels '{0}'")]
    UnsupportedPrivilegeMode(String),

    /// A loadable segment of the target binary falls outside every memory region.
    #[error("loadable segment [{start:#x}, {end:#x}) is not covered by any memory region")]
    UnmappedLoadSegment {
        /// First byte of the segment.
        start: u64,
        /// One past the last byte of the segment.
        end: u64,
    },

    /// The target binary is not a loadable RISC-V executable for the configured XLEN.
    #[error("invalid target binary: {0}")]
    InvalidBinary(String),

    /// The hart id is not part of the configuration.
    #[error("unknown hart {0}")]
    UnknownHart(usize),

    /// The register index is outside the integer register file.
    #[error("register index {0} is out of range (0..32)")]
    InvalidRegisterIndex(usize),

    /// The address does not resolve to configured memory for this hart.
    #[error("address {0:#x} is not mapped")]
    UnmappedAddress(u64),

    /// A memory read asked for an element size other than 1, 2, 4 or 8 bytes.
    #[error("granularity {0} is not one of 1, 2, 4 or 8")]
    InvalidGranularity(usize),

    /// A file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// RISC-V trap types representing exceptions and interrupts.
///
/// Address-carrying variants hold the value written to `xtval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trap {
    /// Instruction address misaligned exception (target address).
    InstructionAddressMisaligned(u64),

    /// Instruction access fault exception (faulting address).
    InstructionAccessFault(u64),

    /// Illegal instruction exception (raw instruction bits).
    IllegalInstruction(u32),

    /// Breakpoint exception (PC of the `EBREAK`).
    Breakpoint(u64),

    /// Load address misaligned exception.
    LoadAddressMisaligned(u64),

    /// Load access fault exception.
    LoadAccessFault(u64),

    /// Store/AMO address misaligned exception.
    StoreAddressMisaligned(u64),

    /// Store/AMO access fault exception.
    StoreAccessFault(u64),

    /// Environment call from user mode.
    EnvironmentCallFromUMode,

    /// Environment call from supervisor mode.
    EnvironmentCallFromSMode,

    /// Environment call from machine mode.
    EnvironmentCallFromMMode,

    /// Instruction page fault (faulting virtual address).
    InstructionPageFault(u64),

    /// Load page fault (faulting virtual address).
    LoadPageFault(u64),

    /// Store/AMO page fault (faulting virtual address).
    StorePageFault(u64),

    /// Supervisor software interrupt.
    SupervisorSoftwareInterrupt,

    /// Machine software interrupt.
    MachineSoftwareInterrupt,

    /// Supervisor timer interrupt.
    SupervisorTimerInterrupt,

    /// Machine timer interrupt.
    MachineTimerInterrupt,

    /// Supervisor external interrupt.
    SupervisorExternalInterrupt,

    /// Machine external interrupt.
    MachineExternalInterrupt,
}

impl Trap {
    /// Returns true for asynchronous interrupts.
    pub const fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::SupervisorSoftwareInterrupt
                | Self::MachineSoftwareInterrupt
                | Self::SupervisorTimerInterrupt
                | Self::MachineTimerInterrupt
                | Self::SupervisorExternalInterrupt
                | Self::MachineExternalInterrupt
        )
    }

    /// Exception or interrupt code, without the interrupt flag.
    pub const fn cause_code(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(_) => exception::INSTRUCTION_ADDRESS_MISALIGNED,
            Self::InstructionAccessFault(_) => exception::INSTRUCTION_ACCESS_FAULT,
            Self::IllegalInstruction(_) => exception::ILLEGAL_INSTRUCTION,
            Self::Breakpoint(_) => exception::BREAKPOINT,
            Self::LoadAddressMisaligned(_) => exception::LOAD_ADDRESS_MISALIGNED,
            Self::LoadAccessFault(_) => exception::LOAD_ACCESS_FAULT,
            Self::StoreAddressMisaligned(_) => exception::STORE_ADDRESS_MISALIGNED,
            Self::StoreAccessFault(_) => exception::STORE_ACCESS_FAULT,
            Self::EnvironmentCallFromUMode => exception::ENVIRONMENT_CALL_FROM_U_MODE,
            Self::EnvironmentCallFromSMode => exception::ENVIRONMENT_CALL_FROM_S_MODE,
            Self::EnvironmentCallFromMMode => exception::ENVIRONMENT_CALL_FROM_M_MODE,
            Self::InstructionPageFault(_) => exception::INSTRUCTION_PAGE_FAULT,
            Self::LoadPageFault(_) => exception::LOAD_PAGE_FAULT,
            Self::StorePageFault(_) => exception::STORE_PAGE_FAULT,
            Self::SupervisorSoftwareInterrupt => interrupt::SUPERVISOR_SOFTWARE,
            Self::MachineSoftwareInterrupt => interrupt::MACHINE_SOFTWARE,
            Self::SupervisorTimerInterrupt => interrupt::SUPERVISOR_TIMER,
            Self::MachineTimerInterrupt => interrupt::MACHINE_TIMER,
            Self::SupervisorExternalInterrupt => interrupt::SUPERVISOR_EXTERNAL,
            Self::MachineExternalInterrupt => interrupt::MACHINE_EXTERNAL,
        }
    }

    /// Value written to `mtval`/`stval` when this trap is taken.
    pub const fn tval(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(a)
            | Self::InstructionAccessFault(a)
            | Self::Breakpoint(a)
            | Self::LoadAddressMisaligned(a)
            | Self::LoadAccessFault(a)
            | Self::StoreAddressMisaligned(a)
            | Self::StoreAccessFault(a)
            | Self::InstructionPageFault(a)
            | Self::LoadPageFault(a)
            | Self::StorePageFault(a) => *a,
            Self::IllegalInstruction(bits) => *bits as u64,
            _ => 0,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#x})")
            }
            Self::InstructionAccessFault(addr) => write!(f, "InstructionAccessFault({addr:#x})"),
            Self::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#x})"),
            Self::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Self::LoadAddressMisaligned(addr) => write!(f, "LoadAddressMisaligned({addr:#x})"),
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAddressMisaligned(addr) => write!(f, "StoreAddressMisaligned({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Self::EnvironmentCallFromUMode => write!(f, "EnvironmentCallFromUMode"),
            Self::EnvironmentCallFromSMode => write!(f, "EnvironmentCallFromSMode"),
            Self::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Self::InstructionPageFault(addr) => write!(f, "InstructionPageFault({addr:#x})"),
            Self::LoadPageFault(addr) => write!(f, "LoadPageFault({addr:#x})"),
            Self::StorePageFault(addr) => write!(f, "StorePageFault({addr:#x})"),
            Self::SupervisorSoftwareInterrupt => write!(f, "SupervisorSoftwareInterrupt"),
            Self::MachineSoftwareInterrupt => write!(f, "MachineSoftwareInterrupt"),
            Self::SupervisorTimerInterrupt => write!(f, "SupervisorTimerInterrupt"),
            Self::MachineTimerInterrupt => write!(f, "MachineTimerInterrupt"),
            Self::SupervisorExternalInterrupt => write!(f, "SupervisorExternalInterrupt"),
            Self::MachineExternalInterrupt => write!(f, "MachineExternalInterrupt"),
        }
    }
}

impl std::error::Error for Trap {}

/// Result of a virtual-to-physical address translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranslationResult {
    /// The translated physical address, or zero if translation failed.
    pub paddr: PhysAddr,
    /// Trap raised by the walk, if any.
    pub trap: Option<Trap>,
}

impl TranslationResult {
    /// Creates a successful translation result.
    #[inline]
    pub const fn success(paddr: PhysAddr) -> Self {
        Self { paddr, trap: None }
    }

    /// Creates a translation result carrying the fault that stopped the walk.
    #[inline]
    pub const fn fault(trap: Trap) -> Self {
        Self {
            paddr: PhysAddr(0),
            trap: Some(trap),
        }
    }

    /// Converts into a `Result`, for use with `?` on the stepping path.
    #[inline]
    pub const fn into_result(self) -> std::result::Result<PhysAddr, Trap> {
        match self.trap {
            Some(trap) => Err(trap),
            None => Ok(self.paddr),
        }
    }
}
