//! Simulator: the stepping and introspection facade.
//!
//! A `Simulator` owns every hart and the physical memory they share. Each
//! call affects exactly the named hart; stores made by one step are visible
//! to the next step of any hart. Nothing runs in the background.

use tracing::debug;

use crate::common::error::{HammerError, Result};
use crate::common::Trap;
use crate::common::constants::GPR_COUNT;
use crate::config::SimulatorConfig;
use crate::core::arch::mode::{PrivilegeLevels, PrivilegeMode};
use crate::core::hart::{CommitLog, Hart, MemAccess, StepOutcome};
use crate::isa::disasm::disassemble_any;
use crate::isa::instruction::{InsnFields, instruction_length};
use crate::isa::profile::{IsaProfile, Xlen};
use crate::sim::loader::ElfImage;
use crate::sim::memory_view::MemoryRead;
use crate::soc::PhysMemory;

/// Element sizes accepted by [`Simulator::get_memory_at_va`].
const GRANULARITIES: [usize; 4] = [1, 2, 4, 8];

/// An independent simulation: harts, memory and the loaded program.
#[derive(Debug)]
pub struct Simulator {
    /// Harts in configuration order.
    harts: Vec<Hart>,
    memory: PhysMemory,
    profile: IsaProfile,
    entry_point: u64,
}

impl Simulator {
    /// Builds a simulation from a validated configuration.
    ///
    /// Parses the ISA and privilege strings, allocates every memory region,
    /// loads the target ELF and resets each hart at `start_pc` (or the ELF
    /// entry point). Nothing is returned on failure.
    ///
    /// # Errors
    ///
    /// `UnsupportedIsa`, `UnsupportedPrivilegeMode`, `InvalidBinary`,
    /// `UnmappedLoadSegment`, `Io`, or `InvalidConfig` if memory cannot be
    /// allocated.
    pub fn new(config: &SimulatorConfig) -> Result<Self> {
        let profile = IsaProfile::parse(config.isa())?;
        if !config.vector_arch().is_empty() {
            return Err(HammerError::UnsupportedIsa(format!(
                "{} with vector architecture '{}'",
                config.isa(),
                config.vector_arch()
            )));
        }
        let levels = PrivilegeLevels::parse(config.privilege_levels())?;

        let mut memory = PhysMemory::new(config.memory_layout())?;
        let image = ElfImage::from_file(config.target_binary(), profile.xlen)?;
        image.load_into(&mut memory)?;

        let reset_pc = config.start_pc().unwrap_or(image.entry);
        let harts = config
            .hart_ids()
            .iter()
            .map(|&id| Hart::new(id, profile, levels, config.misaligned(), reset_pc))
            .collect();

        debug!(
            isa = %profile,
            harts = ?config.hart_ids(),
            entry = format_args!("{:#x}", image.entry),
            reset_pc = format_args!("{reset_pc:#x}"),
            segments = image.segments.len(),
            "simulator ready"
        );

        Ok(Self {
            harts,
            memory,
            profile,
            entry_point: image.entry,
        })
    }

    fn index(&self, hart_id: usize) -> Result<usize> {
        self.harts
            .iter()
            .position(|h| h.id() == hart_id)
            .ok_or(HammerError::UnknownHart(hart_id))
    }

    /// Borrows a hart by id.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn hart(&self, hart_id: usize) -> Result<&Hart> {
        self.index(hart_id).map(|i| &self.harts[i])
    }

    fn hart_mut(&mut self, hart_id: usize) -> Result<&mut Hart> {
        let i = self.index(hart_id)?;
        Ok(&mut self.harts[i])
    }

    /// Configured hart ids, in configuration order.
    pub fn hart_ids(&self) -> Vec<usize> {
        self.harts.iter().map(Hart::id).collect()
    }

    /// Register width of every hart.
    pub const fn xlen(&self) -> Xlen {
        self.profile.xlen
    }

    /// Entry point declared by the loaded ELF.
    pub const fn entry_point(&self) -> u64 {
        self.entry_point
    }

    /// Read-only view of physical memory.
    pub const fn memory(&self) -> &PhysMemory {
        &self.memory
    }

    /// Executes one instruction on `hart_id`, or takes one trap.
    ///
    /// Stores made by the step drop any overlapping LR reservation held by
    /// the other harts.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn single_step(&mut self, hart_id: usize) -> Result<StepOutcome> {
        let idx = self.index(hart_id)?;
        let outcome = self.harts[idx].step(&mut self.memory);

        let (before, rest) = self.harts.split_at_mut(idx);
        if let Some((stepped, after)) = rest.split_first_mut() {
            for &(addr, len) in stepped.store_footprint() {
                for other in before.iter_mut().chain(after.iter_mut()) {
                    other.invalidate_reservation(addr, len);
                }
            }
        }
        Ok(outcome)
    }

    /// Current program counter.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn get_pc(&self, hart_id: usize) -> Result<u64> {
        self.hart(hart_id).map(Hart::pc)
    }

    /// Moves the program counter.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn set_pc(&mut self, hart_id: usize, pc: u64) -> Result<()> {
        self.hart_mut(hart_id)?.set_pc(pc);
        Ok(())
    }

    /// Reads integer register `index`, zero-extended from XLEN.
    ///
    /// # Errors
    ///
    /// `UnknownHart`, or `InvalidRegisterIndex` if `index >= 32`.
    pub fn get_gpr(&self, hart_id: usize, index: usize) -> Result<u64> {
        let hart = self.hart(hart_id)?;
        check_register(index)?;
        Ok(hart.read_gpr(index))
    }

    /// Writes integer register `index`. Writes to `x0` are ignored.
    ///
    /// # Errors
    ///
    /// `UnknownHart`, or `InvalidRegisterIndex` if `index >= 32`.
    pub fn set_gpr(&mut self, hart_id: usize, index: usize, value: u64) -> Result<()> {
        let hart = self.hart_mut(hart_id)?;
        check_register(index)?;
        hart.write_gpr(index, value);
        Ok(())
    }

    /// Reads a CSR without privilege checks or side effects.
    ///
    /// Returns `None` for a CSR that does not exist in this configuration.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn get_csr(&self, hart_id: usize, csr: u32) -> Result<Option<u64>> {
        self.hart(hart_id).map(|h| h.peek_csr(csr))
    }

    /// Current privilege mode.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn privilege_mode(&self, hart_id: usize) -> Result<PrivilegeMode> {
        self.hart(hart_id).map(Hart::privilege)
    }

    /// Trap taken by the hart's most recent step.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn last_trap(&self, hart_id: usize) -> Result<Option<Trap>> {
        self.hart(hart_id).map(Hart::last_trap)
    }

    /// Raw bits of the instruction at virtual address `addr`.
    ///
    /// Uses the hart's current translation with execute permission and
    /// changes nothing. Compressed instructions return their 16 bits.
    ///
    /// # Errors
    ///
    /// `UnknownHart`, or `UnmappedAddress` if the instruction cannot be fetched.
    pub fn get_insn_hex(&self, hart_id: usize, addr: u64) -> Result<u32> {
        self.hart(hart_id)?
            .peek_insn(addr, &self.memory)
            .ok_or(HammerError::UnmappedAddress(addr))
    }

    /// Length in bytes (2 or 4) of the instruction at `addr`.
    ///
    /// # Errors
    ///
    /// As [`Simulator::get_insn_hex`].
    pub fn get_insn_length(&self, hart_id: usize, addr: u64) -> Result<u64> {
        self.get_insn_hex(hart_id, addr)
            .map(|bits| instruction_length(bits as u16))
    }

    /// Disassembly of the instruction at `addr`.
    ///
    /// # Errors
    ///
    /// As [`Simulator::get_insn_hex`].
    pub fn get_insn_string(&self, hart_id: usize, addr: u64) -> Result<String> {
        let xlen = self.xlen();
        self.get_insn_hex(hart_id, addr)
            .map(|bits| disassemble_any(bits, xlen))
    }

    /// Raw encoding fields of the instruction at `addr`.
    ///
    /// # Errors
    ///
    /// As [`Simulator::get_insn_hex`].
    pub fn get_insn_fields(&self, hart_id: usize, addr: u64) -> Result<InsnFields> {
        self.get_insn_hex(hart_id, addr).map(InsnFields::from_bits)
    }

    /// Reads `size` elements of `granularity` bytes at virtual address `addr`.
    ///
    /// Translation, permissions and PMP follow the hart's current state as
    /// for a load. Returns `MemoryRead::Unmapped` if any byte is not
    /// observable. Nothing is modified.
    ///
    /// # Errors
    ///
    /// `UnknownHart`, or `InvalidGranularity` unless `granularity` is 1, 2, 4 or 8.
    pub fn get_memory_at_va(
        &self,
        hart_id: usize,
        addr: u64,
        size: usize,
        granularity: usize,
    ) -> Result<MemoryRead> {
        let hart = self.hart(hart_id)?;
        if !GRANULARITIES.contains(&granularity) {
            return Err(HammerError::InvalidGranularity(granularity));
        }

        let read = size
            .checked_mul(granularity)
            .and_then(|len| hart.peek_bytes(addr, len as u64, &self.memory))
            .map_or(MemoryRead::Unmapped, |bytes| MemoryRead::Mapped {
                bytes,
                granularity,
            });
        Ok(read)
    }

    /// Effects recorded by the hart's most recent step.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn commit_log(&self, hart_id: usize) -> Result<&CommitLog> {
        self.hart(hart_id).map(Hart::commit_log)
    }

    /// Register and CSR writes of the last step as `("x<n>" | "c<addr>", value)`.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn get_log_reg_writes(&self, hart_id: usize) -> Result<Vec<(String, u64)>> {
        self.commit_log(hart_id).map(|log| log.reg_writes().to_vec())
    }

    /// Memory reads of the last step as `(address, value, size)`.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn get_log_mem_reads(&self, hart_id: usize) -> Result<Vec<MemAccess>> {
        self.commit_log(hart_id).map(|log| log.mem_reads().to_vec())
    }

    /// Memory writes of the last step as `(address, value, size)`.
    ///
    /// # Errors
    ///
    /// `UnknownHart` if `hart_id` is not configured.
    pub fn get_log_mem_writes(&self, hart_id: usize) -> Result<Vec<MemAccess>> {
        self.commit_log(hart_id).map(|log| log.mem_writes().to_vec())
    }
}

const fn check_register(index: usize) -> Result<()> {
    if index < GPR_COUNT {
        Ok(())
    } else {
        Err(HammerError::InvalidRegisterIndex(index))
    }
}
