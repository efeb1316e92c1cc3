//! Instruction set tests.

/// Field extraction and immediates, checked with `proptest`.
pub mod decode_properties;

/// Disassembler output.
pub mod disasm;

/// Compressed instruction expansion.
pub mod rvc;
