//! Integer multiply/divide encodings (M extension).
//!
//! M instructions share `OP_REG`/`OP_REG_32` with the base set and are told
//! apart by `funct7 == 1`.

/// `funct7` value selecting the M extension.
pub const M_EXTENSION: u32 = 0b000_0001;

/// `funct3` selectors.
pub mod funct3 {
    /// Low XLEN bits of the product.
    pub const MUL: u32 = 0b000;
    /// High bits of signed x signed.
    pub const MULH: u32 = 0b001;
    /// High bits of signed x unsigned.
    pub const MULHSU: u32 = 0b010;
    /// High bits of unsigned x unsigned.
    pub const MULHU: u32 = 0b011;
    /// Signed division.
    pub const DIV: u32 = 0b100;
    /// Unsigned division.
    pub const DIVU: u32 = 0b101;
    /// Signed remainder.
    pub const REM: u32 = 0b110;
    /// Unsigned remainder.
    pub const REMU: u32 = 0b111;
}
