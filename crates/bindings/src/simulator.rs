//! Simulator Python binding.
//!
//! Exposes `Hammer` with the flat, hart-indexed method names of the original
//! Spike wrapper (`get_PC`, `get_memory_at_VA`, ...). Each instance owns an
//! independent simulation; nothing is shared between instances.

use std::path::PathBuf;

use hammer_core::{
    InsnFields, MemoryRegionConfig, Simulator, SimulatorConfig, StepOutcome, Xlen,
};
use pyo3::prelude::*;

use crate::conversion::{MemoryLayoutEntry, to_py_err};

/// Python-exposed memory region: `mem_cfg_t(base, size)`.
#[pyclass(name = "mem_cfg_t", module = "hammer", frozen)]
#[derive(Clone, Debug)]
pub struct PyMemCfg {
    /// The wrapped region.
    pub inner: MemoryRegionConfig,
}

#[pymethods]
#[allow(clippy::missing_const_for_fn)]
impl PyMemCfg {
    #[new]
    fn new(base: u64, size: u64) -> Self {
        Self {
            inner: MemoryRegionConfig::new(base, size),
        }
    }

    /// First physical address.
    fn get_base(&self) -> u64 {
        self.inner.base()
    }

    /// Size in bytes.
    fn get_size(&self) -> u64 {
        self.inner.size()
    }

    fn __repr__(&self) -> String {
        format!(
            "mem_cfg_t({:#x}, {:#x})",
            self.inner.base(),
            self.inner.size()
        )
    }
}

/// Python-exposed simulator: wraps the core `Simulator`.
#[pyclass(name = "Hammer", module = "hammer")]
#[derive(Debug)]
pub struct PyHammer {
    /// The wrapped simulation.
    pub inner: Simulator,
}

impl PyHammer {
    fn build(config: &SimulatorConfig) -> PyResult<Self> {
        let inner = Simulator::new(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn fields(&self, hart_id: usize, pc: u64) -> PyResult<InsnFields> {
        self.inner.get_insn_fields(hart_id, pc).map_err(to_py_err)
    }

    const fn xlen_bits(&self) -> u32 {
        match self.inner.xlen() {
            Xlen::Rv32 => 32,
            Xlen::Rv64 => 64,
        }
    }
}

#[pymethods]
impl PyHammer {
    /// Creates a simulation and loads `target_binary`.
    ///
    /// # Arguments
    ///
    /// * `isa` - ISA string such as `"RV32IMC"`.
    /// * `privilege_levels` - Mode letters such as `"msu"`.
    /// * `vector_arch` - Must be empty.
    /// * `hart_ids` - Hart identifiers, in stepping order.
    /// * `memory_layout` - `mem_cfg_t` objects or `(base, size)` tuples.
    /// * `target_binary` - Path of the ELF to load.
    /// * `start_pc` - Optional reset PC; the ELF entry point otherwise.
    ///
    /// # Errors
    ///
    /// `ValueError` for a bad configuration, ISA or privilege string,
    /// `OSError` if the binary cannot be read, `RuntimeError` if it cannot
    /// be loaded.
    #[new]
    #[pyo3(signature = (isa, privilege_levels, vector_arch, hart_ids, memory_layout, target_binary, start_pc=None))]
    fn new(
        isa: String,
        privilege_levels: String,
        vector_arch: String,
        hart_ids: Vec<usize>,
        memory_layout: Vec<MemoryLayoutEntry>,
        target_binary: PathBuf,
        start_pc: Option<u64>,
    ) -> PyResult<Self> {
        let layout = memory_layout.into_iter().map(Into::into).collect();
        let config = SimulatorConfig::new(
            isa,
            privilege_levels,
            vector_arch,
            hart_ids,
            layout,
            target_binary,
            start_pc,
        )
        .map_err(to_py_err)?;
        Self::build(&config)
    }

    /// Creates a simulation from a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As the constructor.
    #[staticmethod]
    fn from_json(path: PathBuf) -> PyResult<Self> {
        let config = SimulatorConfig::from_json_file(path).map_err(to_py_err)?;
        Self::build(&config)
    }

    /// Executes one instruction on `hart_id`.
    ///
    /// Returns `None` if the instruction retired, or a description of the
    /// trap that was taken instead.
    fn single_step(&mut self, hart_id: usize) -> PyResult<Option<String>> {
        let outcome = self.inner.single_step(hart_id).map_err(to_py_err)?;
        Ok(match outcome {
            StepOutcome::Retired => None,
            StepOutcome::TrapTaken(trap) => Some(trap.to_string()),
        })
    }

    #[pyo3(name = "get_PC")]
    fn get_pc(&self, hart_id: usize) -> PyResult<u64> {
        self.inner.get_pc(hart_id).map_err(to_py_err)
    }

    #[pyo3(name = "set_PC")]
    fn set_pc(&mut self, hart_id: usize, new_pc_value: u64) -> PyResult<()> {
        self.inner.set_pc(hart_id, new_pc_value).map_err(to_py_err)
    }

    fn get_gpr(&self, hart_id: usize, gpr_id: usize) -> PyResult<u64> {
        self.inner.get_gpr(hart_id, gpr_id).map_err(to_py_err)
    }

    /// Writes an integer register; writes to x0 are ignored.
    fn set_gpr(&mut self, hart_id: usize, gpr_id: usize, new_gpr_value: u64) -> PyResult<()> {
        self.inner
            .set_gpr(hart_id, gpr_id, new_gpr_value)
            .map_err(to_py_err)
    }

    /// Reads a CSR by address, or `None` if the hart does not implement it.
    fn get_csr(&self, hart_id: usize, csr_id: u32) -> PyResult<Option<u64>> {
        self.inner.get_csr(hart_id, csr_id).map_err(to_py_err)
    }

    /// Current privilege mode as `"U"`, `"S"` or `"M"`.
    fn get_privilege(&self, hart_id: usize) -> PyResult<String> {
        let mode = self.inner.privilege_mode(hart_id).map_err(to_py_err)?;
        Ok(mode.to_string())
    }

    /// Trap taken by the most recent step, if any.
    fn get_last_trap(&self, hart_id: usize) -> PyResult<Option<String>> {
        let trap = self.inner.last_trap(hart_id).map_err(to_py_err)?;
        Ok(trap.map(|t| t.to_string()))
    }

    fn get_hart_ids(&self) -> Vec<usize> {
        self.inner.hart_ids()
    }

    fn get_xlen(&self) -> u32 {
        self.xlen_bits()
    }

    fn get_insn_hex(&self, hart_id: usize, pc: u64) -> PyResult<u32> {
        self.inner.get_insn_hex(hart_id, pc).map_err(to_py_err)
    }

    fn get_insn_string(&self, hart_id: usize, pc: u64) -> PyResult<String> {
        self.inner.get_insn_string(hart_id, pc).map_err(to_py_err)
    }

    fn get_insn_length(&self, hart_id: usize, pc: u64) -> PyResult<u64> {
        self.inner.get_insn_length(hart_id, pc).map_err(to_py_err)
    }

    fn get_opcode(&self, hart_id: usize, pc: u64) -> PyResult<u32> {
        Ok(self.fields(hart_id, pc)?.opcode)
    }

    fn get_rd_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rd)
    }

    fn get_rs1_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rs1)
    }

    fn get_rs2_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rs2)
    }

    fn get_rs3_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rs3)
    }

    fn get_csr_addr(&self, hart_id: usize, pc: u64) -> PyResult<u32> {
        Ok(self.fields(hart_id, pc)?.csr)
    }

    fn get_rvc_opcode(&self, hart_id: usize, pc: u64) -> PyResult<u32> {
        Ok(self.fields(hart_id, pc)?.rvc_opcode)
    }

    fn get_rvc_rd_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rvc_rd)
    }

    fn get_rvc_rs1_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rvc_rs1)
    }

    fn get_rvc_rs2_addr(&self, hart_id: usize, pc: u64) -> PyResult<usize> {
        Ok(self.fields(hart_id, pc)?.rvc_rs2)
    }

    /// The commit log is always recorded.
    fn get_log_commits_enabled(&self, hart_id: usize) -> PyResult<bool> {
        self.inner.hart(hart_id).map(|_| true).map_err(to_py_err)
    }

    /// Register and CSR writes of the last step as `("x<n>" | "c<addr>", value)`.
    fn get_log_reg_writes(&self, hart_id: usize) -> PyResult<Vec<(String, u64)>> {
        self.inner.get_log_reg_writes(hart_id).map_err(to_py_err)
    }

    /// Memory reads of the last step as `(address, value, size)`.
    fn get_log_mem_reads(&self, hart_id: usize) -> PyResult<Vec<(u64, u64, u8)>> {
        self.inner.get_log_mem_reads(hart_id).map_err(to_py_err)
    }

    /// Memory writes of the last step as `(address, value, size)`.
    fn get_log_mem_writes(&self, hart_id: usize) -> PyResult<Vec<(u64, u64, u8)>> {
        self.inner.get_log_mem_writes(hart_id).map_err(to_py_err)
    }

    /// Reads `size` elements of `granularity` bytes through the hart's MMU.
    ///
    /// Returns a list of little-endian element values, or `None` when any
    /// byte is unmapped. The read has no side effects.
    ///
    /// # Errors
    ///
    /// `IndexError` for an unknown hart, `ValueError` unless `granularity`
    /// is 1, 2, 4 or 8.
    #[pyo3(name = "get_memory_at_VA", signature = (hart_id, va, size, granularity=1))]
    fn get_memory_at_va(
        &self,
        hart_id: usize,
        va: u64,
        size: usize,
        granularity: usize,
    ) -> PyResult<Option<Vec<u64>>> {
        let read = self
            .inner
            .get_memory_at_va(hart_id, va, size, granularity)
            .map_err(to_py_err)?;
        Ok(read.elements())
    }

    fn __repr__(&self) -> String {
        format!(
            "Hammer(xlen={}, harts={:?}, entry={:#x})",
            self.xlen_bits(),
            self.inner.hart_ids(),
            self.inner.entry_point()
        )
    }
}
