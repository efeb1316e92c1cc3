//! RISC-V Privilege Modes.
//!
//! This module defines the privilege levels a hart can run at. It implements the following:
//! 1. **Mode Classification:** Definitions for User (U), Supervisor (S), and Machine (M) modes.
//! 2. **Encoding:** Conversion between the 2-bit `xPP` encoding and enum variants.
//! 3. **Configuration:** Parsing of the privilege-level string (`"msu"`, `"mu"`, `"m"`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::{HammerError, Result};
use crate::core::arch::csr;

/// RISC-V privilege mode levels.
///
/// Machine mode is the highest privilege level; ordering follows privilege.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrivilegeMode {
    /// User mode (U-mode).
    User = 0,

    /// Supervisor mode (S-mode).
    Supervisor = 1,

    /// Machine mode (M-mode).
    Machine = 3,
}

impl PrivilegeMode {
    /// Decodes a 2-bit `xPP` field. The reserved value `2` yields `None`.
    pub const fn from_bits(val: u64) -> Option<Self> {
        match val & 3 {
            0 => Some(Self::User),
            1 => Some(Self::Supervisor),
            3 => Some(Self::Machine),
            _ => None,
        }
    }

    /// The 2-bit encoding used in `mstatus.MPP` and CSR addresses.
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Returns the human-readable name of the privilege mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        }
    }
}

impl fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of privilege modes a hart implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrivilegeLevels {
    /// Supervisor mode is implemented.
    pub supervisor: bool,
    /// User mode is implemented.
    pub user: bool,
}

impl PrivilegeLevels {
    /// Parses a privilege string such as `"msu"`. Case and order are ignored.
    ///
    /// # Errors
    ///
    /// `UnsupportedPrivilegeMode` when a letter other than `m`, `s` or `u` appears,
    /// a letter repeats, `m` is missing, or `s` is given without `u`.
    pub fn parse(levels: &str) -> Result<Self> {
        let unsupported = || HammerError::UnsupportedPrivilegeMode(levels.to_string());

        let (mut machine, mut supervisor, mut user) = (false, false, false);
        for letter in levels.trim().chars().map(|c| c.to_ascii_lowercase()) {
            let slot = match letter {
                'm' => &mut machine,
                's' => &mut supervisor,
                'u' => &mut user,
                _ => return Err(unsupported()),
            };
            if *slot {
                return Err(unsupported());
            }
            *slot = true;
        }

        if !machine || (supervisor && !user) {
            return Err(unsupported());
        }
        Ok(Self { supervisor, user })
    }

    /// Whether `mode` is implemented.
    pub const fn supports(self, mode: PrivilegeMode) -> bool {
        match mode {
            PrivilegeMode::Machine => true,
            PrivilegeMode::Supervisor => self.supervisor,
            PrivilegeMode::User => self.user,
        }
    }

    /// `misa` letters contributed by the privilege modes.
    pub const fn misa_extensions(self) -> u64 {
        let mut bits = 0;
        if self.supervisor {
            bits |= csr::MISA_EXT_S;
        }
        if self.user {
            bits |= csr::MISA_EXT_U;
        }
        bits
    }
}

impl fmt::Display for PrivilegeLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        if self.supervisor {
            f.write_str("s")?;
        }
        if self.user {
            f.write_str("u")?;
        }
        Ok(())
    }
}
