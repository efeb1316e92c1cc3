//! Compressed instruction extension (C).
//!
//! 16-bit parcels are never executed directly: `expand` rewrites each one into
//! the 32-bit instruction it abbreviates, and the executor runs that with an
//! instruction length of 2. Quadrant and funct3 selectors live here.

/// Expansion of 16-bit parcels into 32-bit encodings.
pub mod expand;

pub use expand::expand;

/// Quadrant 0 (bits 1:0 = 00).
pub const QUADRANT_0: u16 = 0b00;
/// Quadrant 1 (bits 1:0 = 01).
pub const QUADRANT_1: u16 = 0b01;
/// Quadrant 2 (bits 1:0 = 10).
pub const QUADRANT_2: u16 = 0b10;

/// Quadrant 0 selectors (bits 15:13).
pub mod q0 {
    /// `C.ADDI4SPN`.
    pub const C_ADDI4SPN: u16 = 0b000;
    /// `C.FLD` (needs D).
    pub const C_FLD: u16 = 0b001;
    /// `C.LW`.
    pub const C_LW: u16 = 0b010;
    /// `C.LD` on RV64, `C.FLW` on RV32.
    pub const C_LD_FLW: u16 = 0b011;
    /// `C.FSD` (needs D).
    pub const C_FSD: u16 = 0b101;
    /// `C.SW`.
    pub const C_SW: u16 = 0b110;
    /// `C.SD` on RV64, `C.FSW` on RV32.
    pub const C_SD_FSW: u16 = 0b111;
}

/// Quadrant 1 selectors (bits 15:13).
pub mod q1 {
    /// `C.ADDI` / `C.NOP`.
    pub const C_ADDI: u16 = 0b000;
    /// `C.ADDIW` on RV64, `C.JAL` on RV32.
    pub const C_ADDIW_JAL: u16 = 0b001;
    /// `C.LI`.
    pub const C_LI: u16 = 0b010;
    /// `C.LUI`, or `C.ADDI16SP` when `rd == sp`.
    pub const C_LUI_ADDI16SP: u16 = 0b011;
    /// `C.SRLI`, `C.SRAI`, `C.ANDI` and the register-register group.
    pub const C_MISC_ALU: u16 = 0b100;
    /// `C.J`.
    pub const C_J: u16 = 0b101;
    /// `C.BEQZ`.
    pub const C_BEQZ: u16 = 0b110;
    /// `C.BNEZ`.
    pub const C_BNEZ: u16 = 0b111;
}

/// Quadrant 2 selectors (bits 15:13).
pub mod q2 {
    /// `C.SLLI`.
    pub const C_SLLI: u16 = 0b000;
    /// `C.FLDSP` (needs D).
    pub const C_FLDSP: u16 = 0b001;
    /// `C.LWSP`.
    pub const C_LWSP: u16 = 0b010;
    /// `C.LDSP` on RV64, `C.FLWSP` on RV32.
    pub const C_LDSP_FLWSP: u16 = 0b011;
    /// `C.JR`, `C.MV`, `C.EBREAK`, `C.JALR`, `C.ADD`.
    pub const C_MISC_ALU: u16 = 0b100;
    /// `C.FSDSP` (needs D).
    pub const C_FSDSP: u16 = 0b101;
    /// `C.SWSP`.
    pub const C_SWSP: u16 = 0b110;
    /// `C.SDSP` on RV64, `C.FSWSP` on RV32.
    pub const C_SDSP_FSWSP: u16 = 0b111;
}
