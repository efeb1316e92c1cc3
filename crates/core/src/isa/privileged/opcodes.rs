//! System instruction encodings.
//!
//! Everything under `OP_SYSTEM`: CSR access, environment calls, trap returns,
//! `WFI` and `SFENCE.VMA`. The fixed encodings are full 32-bit words and are
//! compared against the raw instruction.

/// `SYSTEM` major opcode.
pub const OP_SYSTEM: u32 = 0b111_0011;

/// `ECALL`.
pub const ECALL: u32 = 0x0000_0073;
/// `EBREAK`.
pub const EBREAK: u32 = 0x0010_0073;
/// `MRET`.
pub const MRET: u32 = 0x3020_0073;
/// `SRET`.
pub const SRET: u32 = 0x1020_0073;
/// `WFI`.
pub const WFI: u32 = 0x1050_0073;

/// `SFENCE.VMA` with `rs1`/`rs2` cleared.
pub const SFENCE_VMA: u32 = 0x1200_0073;
/// Mask that clears the `rs1`/`rs2` operands of `SFENCE.VMA`.
pub const SFENCE_VMA_MASK: u32 = 0xFE00_7FFF;

/// Privileged (non-CSR) instructions use `funct3 == 0`.
pub const PRIV: u32 = 0b000;
/// `CSRRW`.
pub const CSRRW: u32 = 0b001;
/// `CSRRS`.
pub const CSRRS: u32 = 0b010;
/// `CSRRC`.
pub const CSRRC: u32 = 0b011;
/// `CSRRWI`.
pub const CSRRWI: u32 = 0b101;
/// `CSRRSI`.
pub const CSRRSI: u32 = 0b110;
/// `CSRRCI`.
pub const CSRRCI: u32 = 0b111;
