//! Hart behaviour observed through stepping.

/// LR/SC and AMOs, including cross-hart reservation loss.
pub mod atomics;

/// Arithmetic, control flow and compressed execution.
pub mod execution;

/// Sv32/Sv39 translation and PMP enforcement.
pub mod translation;
