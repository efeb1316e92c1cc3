//! Builders for test inputs.

/// Minimal ELF32/ELF64 executable writer.
pub mod elf;

/// RISC-V instruction encoders.
pub mod instruction;
