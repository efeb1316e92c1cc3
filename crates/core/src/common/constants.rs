//! Global Constants.
//!
//! This module defines constants shared across the simulator. It includes:
//! 1. **Memory Constants:** Page geometry and the conventional DRAM window.
//! 2. **Instruction Constants:** Length encodings for compressed and base instructions.
//! 3. **Trap Constants:** The interrupt flag in `xcause` for each register width.

/// Page size in bytes (4 KiB).
pub const PAGE_SIZE: u64 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u64 = 12;

/// Conventional base of RISC-V DRAM, used by the default memory layout.
pub const DRAM_BASE: u64 = 0x8000_0000;

/// Size of the default DRAM region (256 MiB).
pub const DEFAULT_DRAM_SIZE: u64 = 256 * 1024 * 1024;

/// Size of a compressed (16-bit) RISC-V instruction in bytes.
pub const INSTRUCTION_SIZE_16: u64 = 2;

/// Size of a standard (32-bit) RISC-V instruction in bytes.
pub const INSTRUCTION_SIZE_32: u64 = 4;

/// Mask over the two low bits of an instruction parcel.
pub const COMPRESSED_INSTRUCTION_MASK: u16 = 0x3;

/// Low bits of a parcel that starts a 32-bit (non-compressed) instruction.
pub const UNCOMPRESSED_INSTRUCTION_VALUE: u16 = 0x3;

/// Interrupt flag in `mcause`/`scause` on RV64.
pub const CAUSE_INTERRUPT_BIT_RV64: u64 = 1 << 63;

/// Interrupt flag in `mcause`/`scause` on RV32.
pub const CAUSE_INTERRUPT_BIT_RV32: u64 = 1 << 31;

/// Number of architectural integer registers.
pub const GPR_COUNT: usize = 32;
