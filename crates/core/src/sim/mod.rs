//! Simulation facade and program loading.
//!
//! Provides the `Simulator` a host drives step by step, the ELF loader it
//! uses at construction, and the `MemoryRead` result of memory peeks.

/// ELF parsing and segment placement.
pub mod loader;

/// Result type for virtual-memory reads.
pub mod memory_view;

/// The stepping and introspection facade.
pub mod simulator;

pub use memory_view::MemoryRead;
pub use simulator::Simulator;
