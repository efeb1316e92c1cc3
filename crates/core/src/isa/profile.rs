//! ISA string parsing.
//!
//! Turns strings such as `"RV32IMC"` or `"rv64imac_zicsr_zifencei"` into an
//! `IsaProfile`. The profile decides register width, which extensions decode,
//! and the value of `misa`.
//!
//! Accepted: base `I` on `RV32`/`RV64`, single-letter `M`, `A`, `C`, and the
//! multi-letter `Zicsr`, `Zifencei` and `Zicntr` (always present, accepted for
//! compatibility). Floating point, vector, `E` and unknown names are rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{HammerError, Result};
use crate::core::arch::csr;

/// Integer register width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Xlen {
    /// 32-bit registers and addresses.
    Rv32,
    /// 64-bit registers and addresses.
    Rv64,
}

impl Xlen {
    /// Register width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }

    /// Mask covering one register.
    pub const fn mask(self) -> u64 {
        match self {
            Self::Rv32 => 0xFFFF_FFFF,
            Self::Rv64 => u64::MAX,
        }
    }

    /// Truncates `val` to register width.
    #[inline(always)]
    pub const fn truncate(self, val: u64) -> u64 {
        val & self.mask()
    }

    /// Interprets the low XLEN bits of `val` as a signed integer.
    #[inline(always)]
    pub const fn signed(self, val: u64) -> i64 {
        match self {
            Self::Rv32 => val as u32 as i32 as i64,
            Self::Rv64 => val as i64,
        }
    }

    /// Largest shift amount for XLEN-wide shifts.
    pub const fn shamt_mask(self) -> u32 {
        self.bits() - 1
    }

    /// The interrupt flag position in `xcause`.
    pub const fn cause_interrupt_bit(self) -> u64 {
        1 << (self.bits() - 1)
    }
}

impl fmt::Display for Xlen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RV{}", self.bits())
    }
}

/// Parsed ISA string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IsaProfile {
    /// Register width.
    pub xlen: Xlen,
    /// Integer multiply/divide.
    pub m: bool,
    /// Atomics.
    pub a: bool,
    /// Compressed instructions.
    pub c: bool,
}

impl IsaProfile {
    /// Parses an ISA string. Case is ignored.
    ///
    /// # Errors
    ///
    /// `UnsupportedIsa` if the base is not `RV32I`/`RV64I` or an extension is
    /// not implemented.
    pub fn parse(isa: &str) -> Result<Self> {
        let unsupported = || HammerError::UnsupportedIsa(isa.to_string());
        let lower = isa.trim().to_ascii_lowercase();

        let rest = lower.strip_prefix("rv").ok_or_else(unsupported)?;
        let (xlen, rest) = if let Some(r) = rest.strip_prefix("32") {
            (Xlen::Rv32, r)
        } else if let Some(r) = rest.strip_prefix("64") {
            (Xlen::Rv64, r)
        } else {
            return Err(unsupported());
        };

        let mut chars = rest.chars();
        if chars.next() != Some('i') {
            return Err(unsupported());
        }

        let mut profile = Self {
            xlen,
            m: false,
            a: false,
            c: false,
        };

        let tail = chars.as_str();
        let split = tail.find(['z', 's', 'x', '_']).unwrap_or(tail.len());
        let (single, multi) = tail.split_at(split);

        for letter in single.chars() {
            match letter {
                'm' => profile.m = true,
                'a' => profile.a = true,
                'c' => profile.c = true,
                _ => return Err(unsupported()),
            }
        }

        for name in multi.split('_').filter(|s| !s.is_empty()) {
            match name {
                "zicsr" | "zifencei" | "zicntr" => {}
                _ => return Err(unsupported()),
            }
        }

        Ok(profile)
    }

    /// Extension bits of `misa`, without the MXL field or privilege-mode letters.
    pub const fn misa_extensions(&self) -> u64 {
        let mut bits = csr::MISA_EXT_I;
        if self.m {
            bits |= csr::MISA_EXT_M;
        }
        if self.a {
            bits |= csr::MISA_EXT_A;
        }
        if self.c {
            bits |= csr::MISA_EXT_C;
        }
        bits
    }

    /// Required instruction alignment in bytes.
    pub const fn instruction_alignment(&self) -> u64 {
        if self.c { 2 } else { 4 }
    }
}

impl fmt::Display for IsaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}I", self.xlen)?;
        for (enabled, letter) in [(self.m, 'M'), (self.a, 'A'), (self.c, 'C')] {
            if enabled {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}
