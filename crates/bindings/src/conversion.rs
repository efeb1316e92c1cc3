//! Python↔Rust conversion.
//!
//! Maps `HammerError` onto Python exception types and accepts memory layouts
//! either as `mem_cfg_t` objects or as plain `(base, size)` tuples, so both
//! calling conventions of the original scripts work.

use hammer_core::{HammerError, MemoryRegionConfig};
use pyo3::exceptions::{PyIndexError, PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::simulator::PyMemCfg;

/// Converts a core error into the closest Python exception.
///
/// Bad hart or register indices raise `IndexError`; configuration, ISA,
/// privilege and granularity problems raise `ValueError`; unreadable files
/// raise `OSError`; everything else raises `RuntimeError`.
#[allow(clippy::needless_pass_by_value)]
pub fn to_py_err(err: HammerError) -> PyErr {
    let msg = err.to_string();
    match err {
        HammerError::UnknownHart(_) | HammerError::InvalidRegisterIndex(_) => {
            PyIndexError::new_err(msg)
        }
        HammerError::InvalidConfig(_)
        | HammerError::UnsupportedIsa(_)
        | HammerError::UnsupportedPrivilegeMode(_)
        | HammerError::InvalidGranularity(_) => PyValueError::new_err(msg),
        HammerError::Io { .. } => PyOSError::new_err(msg),
        HammerError::UnmappedLoadSegment { .. }
        | HammerError::InvalidBinary(_)
        | HammerError::UnmappedAddress(_) => PyRuntimeError::new_err(msg),
    }
}

/// One entry of the `memory_layout` argument.
#[derive(Debug, FromPyObject)]
pub enum MemoryLayoutEntry {
    /// A `mem_cfg_t` instance.
    Config(PyMemCfg),
    /// A `(base, size)` tuple.
    Tuple((u64, u64)),
}

impl From<MemoryLayoutEntry> for MemoryRegionConfig {
    fn from(entry: MemoryLayoutEntry) -> Self {
        match entry {
            MemoryLayoutEntry::Config(cfg) => cfg.inner,
            MemoryLayoutEntry::Tuple((base, size)) => Self::new(base, size),
        }
    }
}
