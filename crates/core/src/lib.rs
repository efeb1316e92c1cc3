//! Hammer: a stepping RISC-V simulator library.
//!
//! This crate implements a functional RV32/RV64 simulator driven one
//! instruction at a time by a host program. It provides:
//! 1. **Configuration:** ISA and privilege strings, hart ids, memory layout and target ELF.
//! 2. **Core:** Per-hart registers, CSRs, traps, Sv32/Sv39/Sv48 translation and PMP.
//! 3. **ISA:** Decoding, compressed expansion and disassembly for I, M, A, C, Zicsr and Zifencei.
//! 4. **Memory:** Physical RAM regions shared by every hart.
//! 5. **Simulation:** The `Simulator` facade with stepping, peeks and a per-step commit log.
//!
//! The library emits `tracing` events but installs no subscriber.
//!
//! ```no_run
//! use hammer_core::{MemoryRegionConfig, Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::builder("hello.elf")
//!     .isa("RV32IMC")
//!     .memory_layout(vec![MemoryRegionConfig::new(0x8000_0000, 256 << 20)])
//!     .build()?;
//! let mut sim = Simulator::new(&config)?;
//! for _ in 0..100 {
//!     sim.single_step(0)?;
//! }
//! println!("pc = {:#x}", sim.get_pc(0)?);
//! # Ok::<(), hammer_core::HammerError>(())
//! ```

/// Common types and constants (addresses, traps, errors, access types).
pub mod common;
/// Simulator configuration (memory regions, ISA, harts, binary).
pub mod config;
/// Hart model (architectural state, stepping, functional units).
pub mod core;
/// Instruction set (decode, expansion, disassembly, ISA strings).
pub mod isa;
/// Simulation facade and ELF loading.
pub mod sim;
/// Physical memory.
pub mod soc;

pub use crate::common::{HammerError, Result, Trap};
pub use crate::config::{MemoryRegionConfig, SimulatorConfig, SimulatorConfigBuilder};
pub use crate::core::arch::mode::PrivilegeMode;
pub use crate::core::{Hart, StepOutcome};
pub use crate::isa::instruction::InsnFields;
pub use crate::isa::profile::Xlen;
pub use crate::sim::{MemoryRead, Simulator};
