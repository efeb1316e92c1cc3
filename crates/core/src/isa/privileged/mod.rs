//! Privileged architecture encodings: trap causes and system instructions.

/// Exception and interrupt cause codes.
pub mod cause;

/// System instruction encodings.
pub mod opcodes;
