//! System-on-Chip (SoC) Components.
//!
//! Hammer models no devices: the platform is the configured RAM regions only.

/// Physical memory regions and their backing storage.
pub mod memory;

pub use memory::PhysMemory;
