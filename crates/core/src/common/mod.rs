//! Shared building blocks for the Hammer simulator.
//!
//! This module holds the small types every other layer depends on. It provides:
//! 1. **Address Types:** Distinct wrappers for virtual and physical addresses.
//! 2. **Constants:** Page geometry, DRAM defaults, and instruction-length encodings.
//! 3. **Memory Access:** The fetch/load/store classification used by the MMU and PMP.
//! 4. **Errors:** The public `HammerError` taxonomy, architectural `Trap`s, and translation results.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types and trap definitions.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_SHIFT, PAGE_SIZE};
pub use data::AccessType;
pub use error::{HammerError, Result, TranslationResult, Trap};
