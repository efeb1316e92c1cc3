//! Hart execution units.
//!
//! The integer ALU and the MMU. Both are stateless apart from the PMP
//! registers, which the hart owns and passes in.

/// Integer ALU, M-extension arithmetic and AMO combine step.
pub mod alu;

/// Address translation and physical memory protection.
pub mod mmu;
