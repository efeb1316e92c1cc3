//! Facade tests.

/// Construction failures and reset state.
pub mod construction;


/// ELF parsing.
pub mod loader;
