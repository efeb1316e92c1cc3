//! Hart implementation.
//!
//! This module contains the architectural model of a RISC-V hart: register
//! and CSR state, the single-step engine, and the functional units it uses
//! (integer ALU, MMU with PMP).

/// Architecture-specific components (CSRs, register files, privilege modes).
pub mod arch;

/// Hart state, stepping, traps and commit log.
pub mod hart;

/// Functional units (ALU, MMU).
pub mod units;

pub use self::hart::{Hart, StepOutcome};
