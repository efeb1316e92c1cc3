//! Python bindings for the Hammer stepping simulator.
//!
//! This crate exposes the simulator to Python via PyO3 as the `hammer` module. It provides:
//! 1. **Simulator:** `Hammer`, constructed from an ISA string, privilege levels, hart ids,
//!    a memory layout and an ELF path, and driven one instruction at a time.
//! 2. **Memory layout:** `mem_cfg_t`, a `(base, size)` region descriptor.
//! 3. **Utilities:** Version string and a standalone disassembler.
//!
//! Importing the module installs a `tracing` subscriber filtered by `RUST_LOG`
//! (default `warn`) unless the host process already installed one.

use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

/// Python↔Rust argument and error conversion.
pub mod conversion;
/// Simulator binding (`Hammer`, `mem_cfg_t`).
pub mod simulator;
/// Utility functions (version, disassembly).
pub mod utils;

/// Registers all simulator classes and functions onto the given Python module.
///
/// # Arguments
///
/// * `m` - The Python module to register types and functions on.
///
/// # Errors
///
/// Returns a `PyErr` if registration fails.
pub fn register_hammer_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<simulator::PyHammer>()?;
    m.add_class::<simulator::PyMemCfg>()?;

    m.add_function(wrap_pyfunction!(utils::version, m)?)?;
    m.add_function(wrap_pyfunction!(utils::disassemble, m)?)?;

    Ok(())
}

/// Installs the `fmt` subscriber once per process.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A host that already owns the global subscriber keeps it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[pymodule]
fn hammer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    init_logging();
    register_hammer_module(m)
}
