//! Utility functions exposed to Python.

use hammer_core::Xlen;
use hammer_core::isa::disasm::disassemble_any;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Returns the simulator version string (e.g., for scripting or diagnostics).
#[pyfunction]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Disassemble an instruction encoding into a mnemonic string.
///
/// Compressed parcels are recognised from their low two bits and rendered
/// with a `c.` prefix; only the low 16 bits are used for them.
///
/// # Arguments
///
/// * `inst` - Raw instruction bits.
/// * `xlen` - Register width, 32 or 64 (default 64).
///
/// # Errors
///
/// `ValueError` if `xlen` is neither 32 nor 64.
#[pyfunction]
#[pyo3(signature = (inst, xlen=64))]
pub fn disassemble(inst: u32, xlen: u32) -> PyResult<String> {
    let xlen = match xlen {
        32 => Xlen::Rv32,
        64 => Xlen::Rv64,
        other => return Err(PyValueError::new_err(format!("xlen must be 32 or 64, not {other}"))),
    };
    Ok(disassemble_any(inst, xlen))
}
