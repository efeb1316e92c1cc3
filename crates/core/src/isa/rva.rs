//! Atomic memory operation encodings (A extension).

/// Major opcode shared by `LR`, `SC` and every AMO.
pub const OP_AMO: u32 = 0b010_1111;

/// Operation width in `funct3`.
pub mod width {
    /// 32-bit (`.W`).
    pub const WORD: u32 = 0b010;
    /// 64-bit (`.D`, RV64 only).
    pub const DOUBLE: u32 = 0b011;
}

/// Operation selector in bits 31:27.
pub mod funct5 {
    /// Load-reserved.
    pub const LR: u32 = 0b00010;
    /// Store-conditional.
    pub const SC: u32 = 0b00011;
    /// Swap.
    pub const AMOSWAP: u32 = 0b00001;
    /// Add.
    pub const AMOADD: u32 = 0b00000;
    /// Exclusive or.
    pub const AMOXOR: u32 = 0b00100;
    /// And.
    pub const AMOAND: u32 = 0b01100;
    /// Inclusive or.
    pub const AMOOR: u32 = 0b01000;
    /// Signed minimum.
    pub const AMOMIN: u32 = 0b10000;
    /// Signed maximum.
    pub const AMOMAX: u32 = 0b10100;
    /// Unsigned minimum.
    pub const AMOMINU: u32 = 0b11000;
    /// Unsigned maximum.
    pub const AMOMAXU: u32 = 0b11100;
}
