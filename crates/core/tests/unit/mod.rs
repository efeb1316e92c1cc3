//! # Unit Components
//!
//! Tests grouped by layer, from configuration values up to the facade.

/// Configuration validation and JSON loading.
pub mod config;

/// Hart behaviour: execution, traps, translation, PMP and atomics.
pub mod core;

/// Decoding, compressed expansion and disassembly.
pub mod isa;

/// The `Simulator` facade: construction, stepping and introspection.
pub mod sim;
