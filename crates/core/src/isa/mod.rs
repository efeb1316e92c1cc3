//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains definitions for opcodes, function codes, and decoding logic, organized
//! by RISC-V extension.
//!
//! # Extensions
//!
//! * `rvi`: Base Integer Instruction Set (RV32I / RV64I).
//! * `rvm`: Integer Multiplication and Division.
//! * `rva`: Atomic Instructions.
//! * `rvc`: Compressed Instructions.
//! * `privileged`: Privileged Architecture (system instructions, trap causes).

/// Application Binary Interface (ABI) register names.
pub mod abi;

/// Instruction decoding logic for the base instruction formats.
pub mod decode;

/// Instruction disassembler for traces and `get_insn_string`.
pub mod disasm;

/// Instruction encoding structures and bit extraction utilities.
pub mod instruction;

/// Privileged architecture definitions (traps, system instructions).
pub mod privileged;

/// ISA string parsing and register width.
pub mod profile;

/// Atomic memory operations extension (AMO instructions).
pub mod rva;

/// Compressed instruction extension (16-bit instruction encoding).
pub mod rvc;

/// Base integer instruction set.
pub mod rvi;

/// Integer multiply/divide extension (MUL, DIV, REM instructions).
pub mod rvm;
