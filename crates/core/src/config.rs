//! Configuration for a Hammer simulation.
//!
//! This module defines the value types a host builds before constructing a
//! simulator. It provides:
//! 1. **Regions:** `MemoryRegionConfig`, one window of physical RAM.
//! 2. **Simulation:** `SimulatorConfig`, ISA, privilege levels, harts, memory layout and binary.
//! 3. **Loading:** Builder, JSON string and JSON file constructors.
//!
//! Every path into a `SimulatorConfig` runs the same validation, including
//! deserialization, so an unvalidated configuration cannot be observed. ISA
//! and privilege strings are only parsed when the simulator is built.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::constants::{DEFAULT_DRAM_SIZE, DRAM_BASE};
use crate::common::error::{HammerError, Result};

/// One window of physical memory.
///
/// ```
/// use hammer_core::config::MemoryRegionConfig;
///
/// let region = MemoryRegionConfig::new(0x8000_0000, 0x1000);
/// assert_eq!(region.end(), Some(0x8000_1000));
/// assert!(region.contains(0x8000_0fff));
/// assert!(!region.overlaps(&MemoryRegionConfig::new(0x8000_1000, 0x10)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRegionConfig {
    base: u64,
    size: u64,
}

impl MemoryRegionConfig {
    /// Describes `size` bytes of RAM starting at physical address `base`.
    pub const fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }

    /// First physical address.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Size in bytes.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// One past the last address, or `None` if that overflows 64 bits.
    pub const fn end(&self) -> Option<u64> {
        self.base.checked_add(self.size)
    }

    /// Whether `addr` falls inside the region.
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base && (addr - self.base) < self.size
    }

    /// Whether the two regions share at least one byte.
    pub fn overlaps(&self, other: &Self) -> bool {
        let end = |r: &Self| u128::from(r.base) + u128::from(r.size);
        u128::from(self.base) < end(other) && u128::from(other.base) < end(self)
    }
}

impl From<(u64, u64)> for MemoryRegionConfig {
    fn from((base, size): (u64, u64)) -> Self {
        Self::new(base, size)
    }
}

/// Everything needed to construct a simulator.
///
/// Fields are read-only once validated. Absent JSON fields take the
/// defaults shown below; `target_binary` is required.
///
/// ```no_run
/// use hammer_core::SimulatorConfig;
///
/// let json = r#"{
///     "isa": "RV32IMC",
///     "privilege_levels": "msu",
///     "hart_ids": [0],
///     "memory_layout": [{ "base": 2147483648, "size": 268435456 }],
///     "target_binary": "hello.elf"
/// }"#;
///
/// let config = SimulatorConfig::from_json_str(json).unwrap();
/// assert_eq!(config.isa(), "RV32IMC");
/// assert_eq!(config.start_pc(), None);
/// assert!(config.misaligned());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulatorConfig")]
pub struct SimulatorConfig {
    isa: String,
    privilege_levels: String,
    vector_arch: String,
    hart_ids: Vec<usize>,
    memory_layout: Vec<MemoryRegionConfig>,
    target_binary: PathBuf,
    start_pc: Option<u64>,
    misaligned: bool,
}

/// Unvalidated form read from JSON.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSimulatorConfig {
    #[serde(default = "SimulatorConfig::default_isa")]
    isa: String,
    #[serde(default = "SimulatorConfig::default_privilege_levels")]
    privilege_levels: String,
    #[serde(default)]
    vector_arch: String,
    #[serde(default = "SimulatorConfig::default_hart_ids")]
    hart_ids: Vec<usize>,
    #[serde(default = "SimulatorConfig::default_memory_layout")]
    memory_layout: Vec<MemoryRegionConfig>,
    target_binary: PathBuf,
    #[serde(default)]
    start_pc: Option<u64>,
    #[serde(default = "SimulatorConfig::default_misaligned")]
    misaligned: bool,
}

impl TryFrom<RawSimulatorConfig> for SimulatorConfig {
    type Error = HammerError;

    fn try_from(raw: RawSimulatorConfig) -> Result<Self> {
        Self {
            isa: raw.isa,
            privilege_levels: raw.privilege_levels,
            vector_arch: raw.vector_arch,
            hart_ids: raw.hart_ids,
            memory_layout: raw.memory_layout,
            target_binary: raw.target_binary,
            start_pc: raw.start_pc,
            misaligned: raw.misaligned,
        }
        .validated()
    }
}

impl SimulatorConfig {
    fn default_isa() -> String {
        "RV64IMAC".to_string()
    }

    fn default_privilege_levels() -> String {
        "msu".to_string()
    }

    fn default_hart_ids() -> Vec<usize> {
        vec![0]
    }

    fn default_memory_layout() -> Vec<MemoryRegionConfig> {
        vec![MemoryRegionConfig::new(DRAM_BASE, DEFAULT_DRAM_SIZE)]
    }

    const fn default_misaligned() -> bool {
        true
    }

    /// Builds and validates a configuration.
    ///
    /// Misaligned loads and stores are enabled; use [`SimulatorConfig::builder`]
    /// to change that.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `hart_ids` is empty or repeats an id, a region is
    /// empty, overflows or overlaps another, or `target_binary` cannot be opened.
    pub fn new(
        isa: impl Into<String>,
        privilege_levels: impl Into<String>,
        vector_arch: impl Into<String>,
        hart_ids: Vec<usize>,
        memory_layout: Vec<MemoryRegionConfig>,
        target_binary: impl Into<PathBuf>,
        start_pc: Option<u64>,
    ) -> Result<Self> {
        Self {
            isa: isa.into(),
            privilege_levels: privilege_levels.into(),
            vector_arch: vector_arch.into(),
            hart_ids,
            memory_layout,
            target_binary: target_binary.into(),
            start_pc,
            misaligned: Self::default_misaligned(),
        }
        .validated()
    }

    /// Starts a builder with every field at its default.
    pub fn builder(target_binary: impl Into<PathBuf>) -> SimulatorConfigBuilder {
        SimulatorConfigBuilder {
            isa: Self::default_isa(),
            privilege_levels: Self::default_privilege_levels(),
            vector_arch: String::new(),
            hart_ids: Self::default_hart_ids(),
            memory_layout: Self::default_memory_layout(),
            target_binary: target_binary.into(),
            start_pc: None,
            misaligned: Self::default_misaligned(),
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for malformed JSON or any validation failure.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HammerError::InvalidConfig(e.to_string()))
    }

    /// Reads a JSON configuration from disk.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`SimulatorConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| HammerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn validated(self) -> Result<Self> {
        let invalid = |msg: String| -> Result<Self> { Err(HammerError::InvalidConfig(msg)) };

        if self.hart_ids.is_empty() {
            return invalid("hart_ids must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.hart_ids.iter().find(|id| !seen.insert(**id)) {
            return invalid(format!("hart id {dup} is listed twice"));
        }

        for (i, region) in self.memory_layout.iter().enumerate() {
            if region.size == 0 {
                return invalid(format!("memory region {i} has zero size"));
            }
            if region.end().is_none() {
                return invalid(format!(
                    "memory region {i} at {:#x} extends past the 64-bit address space",
                    region.base
                ));
            }
            if let Some(j) = self.memory_layout[..i].iter().position(|r| r.overlaps(region)) {
                return invalid(format!("memory regions {j} and {i} overlap"));
            }
        }

        if let Err(e) = File::open(&self.target_binary) {
            return invalid(format!(
                "cannot open target binary '{}': {e}",
                self.target_binary.display()
            ));
        }

        Ok(self)
    }

    /// ISA string, e.g. `RV32IMC`.
    pub fn isa(&self) -> &str {
        &self.isa
    }

    /// Privilege-level letters, e.g. `msu`.
    pub fn privilege_levels(&self) -> &str {
        &self.privilege_levels
    }

    /// Vector architecture string; empty when vectors are disabled.
    pub fn vector_arch(&self) -> &str {
        &self.vector_arch
    }

    /// Hart ids in configuration order.
    pub fn hart_ids(&self) -> &[usize] {
        &self.hart_ids
    }

    /// Physical memory regions.
    pub fn memory_layout(&self) -> &[MemoryRegionConfig] {
        &self.memory_layout
    }

    /// ELF image to load.
    pub fn target_binary(&self) -> &Path {
        &self.target_binary
    }

    /// Initial PC override; the ELF entry point is used when `None`.
    pub const fn start_pc(&self) -> Option<u64> {
        self.start_pc
    }

    /// Whether misaligned loads and stores are performed instead of trapping.
    pub const fn misaligned(&self) -> bool {
        self.misaligned
    }
}

/// Chained construction of a [`SimulatorConfig`].
#[derive(Clone, Debug)]
pub struct SimulatorConfigBuilder {
    isa: String,
    privilege_levels: String,
    vector_arch: String,
    hart_ids: Vec<usize>,
    memory_layout: Vec<MemoryRegionConfig>,
    target_binary: PathBuf,
    start_pc: Option<u64>,
    misaligned: bool,
}

impl SimulatorConfigBuilder {
    /// Sets the ISA string.
    #[must_use]
    pub fn isa(mut self, isa: impl Into<String>) -> Self {
        self.isa = isa.into();
        self
    }

    /// Sets the privilege-level letters.
    #[must_use]
    pub fn privilege_levels(mut self, levels: impl Into<String>) -> Self {
        self.privilege_levels = levels.into();
        self
    }

    /// Sets the vector architecture string.
    #[must_use]
    pub fn vector_arch(mut self, varch: impl Into<String>) -> Self {
        self.vector_arch = varch.into();
        self
    }

    /// Replaces the hart id list.
    #[must_use]
    pub fn hart_ids(mut self, ids: impl Into<Vec<usize>>) -> Self {
        self.hart_ids = ids.into();
        self
    }

    /// Replaces the memory layout.
    #[must_use]
    pub fn memory_layout(mut self, layout: impl Into<Vec<MemoryRegionConfig>>) -> Self {
        self.memory_layout = layout.into();
        self
    }

    /// Overrides the initial PC.
    #[must_use]
    pub const fn start_pc(mut self, pc: u64) -> Self {
        self.start_pc = Some(pc);
        self
    }

    /// Enables or disables misaligned load/store support.
    #[must_use]
    pub const fn misaligned(mut self, enabled: bool) -> Self {
        self.misaligned = enabled;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// As [`SimulatorConfig::new`].
    pub fn build(self) -> Result<SimulatorConfig> {
        SimulatorConfig {
            isa: self.isa,
            privilege_levels: self.privilege_levels,
            vector_arch: self.vector_arch,
            hart_ids: self.hart_ids,
            memory_layout: self.memory_layout,
            target_binary: self.target_binary,
            start_pc: self.start_pc,
            misaligned: self.misaligned,
        }
        .validated()
    }
}
