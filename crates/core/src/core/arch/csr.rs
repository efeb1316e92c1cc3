//! Control and Status Register (CSR) definitions.
//!
//! This module defines the CSR address map and field layout. It provides:
//! 1. **Address Definitions:** Constants for every machine, supervisor and counter CSR the hart implements.
//! 2. **Field Masks:** Bit positions in `mstatus`, `mip`/`mie`, `satp` and `misa`.
//! 3. **Register Storage:** The `Csrs` struct holding raw architectural state.
//!
//! Access rules (privilege, read-only ranges, WARL legalisation, views such as
//! `sstatus`) are applied by the hart, not here.

/// Machine vendor ID CSR address.
pub const MVENDORID: u32 = 0xF11;

/// Machine architecture ID CSR address.
pub const MARCHID: u32 = 0xF12;

/// Machine implementation ID CSR address.
pub const MIMPID: u32 = 0xF13;

/// Machine hardware thread ID CSR address.
pub const MHARTID: u32 = 0xF14;

/// Machine status register CSR address.
pub const MSTATUS: u32 = 0x300;

/// Machine ISA register CSR address.
pub const MISA: u32 = 0x301;

/// Machine exception delegation register CSR address.
pub const MEDELEG: u32 = 0x302;

/// Machine interrupt delegation register CSR address.
pub const MIDELEG: u32 = 0x303;

/// Machine interrupt enable register CSR address.
pub const MIE: u32 = 0x304;

/// Machine trap vector base address register CSR address.
pub const MTVEC: u32 = 0x305;

/// Machine counter enable register CSR address.
pub const MCOUNTEREN: u32 = 0x306;

/// Upper half of `mstatus` (RV32 only).
pub const MSTATUSH: u32 = 0x310;

/// Machine scratch register CSR address.
pub const MSCRATCH: u32 = 0x340;

/// Machine exception program counter CSR address.
pub const MEPC: u32 = 0x341;

/// Machine cause register CSR address.
pub const MCAUSE: u32 = 0x342;

/// Machine trap value register CSR address.
pub const MTVAL: u32 = 0x343;

/// Machine interrupt pending register CSR address.
pub const MIP: u32 = 0x344;

/// First PMP configuration register.
pub const PMPCFG0: u32 = 0x3A0;

/// Last PMP configuration register (`pmpcfg3`).
pub const PMPCFG3: u32 = 0x3A3;

/// First PMP address register.
pub const PMPADDR0: u32 = 0x3B0;

/// Last PMP address register (`pmpaddr15`).
pub const PMPADDR15: u32 = 0x3BF;

/// Supervisor status register CSR address.
pub const SSTATUS: u32 = 0x100;

/// Supervisor interrupt enable register CSR address.
pub const SIE: u32 = 0x104;

/// Supervisor trap vector base address register CSR address.
pub const STVEC: u32 = 0x105;

/// Supervisor counter enable register CSR address.
pub const SCOUNTEREN: u32 = 0x106;

/// Supervisor scratch register CSR address.
pub const SSCRATCH: u32 = 0x140;

/// Supervisor exception program counter CSR address.
pub const SEPC: u32 = 0x141;

/// Supervisor cause register CSR address.
pub const SCAUSE: u32 = 0x142;

/// Supervisor trap value register CSR address.
pub const STVAL: u32 = 0x143;

/// Supervisor interrupt pending register CSR address.
pub const SIP: u32 = 0x144;

/// Supervisor address translation and protection register CSR address.
pub const SATP: u32 = 0x180;

/// Cycle counter CSR address (read-only, user mode accessible).
pub const CYCLE: u32 = 0xC00;

/// Instructions retired counter CSR address (read-only, user mode accessible).
pub const INSTRET: u32 = 0xC02;

/// Upper half of `cycle` (RV32 only).
pub const CYCLEH: u32 = 0xC80;

/// Upper half of `instret` (RV32 only).
pub const INSTRETH: u32 = 0xC82;

/// Machine cycle counter CSR address.
pub const MCYCLE: u32 = 0xB00;

/// Machine instructions retired counter CSR address.
pub const MINSTRET: u32 = 0xB02;

/// Upper half of `mcycle` (RV32 only).
pub const MCYCLEH: u32 = 0xB80;

/// Upper half of `minstret` (RV32 only).
pub const MINSTRETH: u32 = 0xB82;

/// Supervisor interrupt enable bit in `mstatus`.
pub const MSTATUS_SIE: u64 = 1 << 1;

/// Machine interrupt enable bit in `mstatus`.
pub const MSTATUS_MIE: u64 = 1 << 3;

/// Supervisor previous interrupt enable bit in `mstatus`.
pub const MSTATUS_SPIE: u64 = 1 << 5;

/// Machine previous interrupt enable bit in `mstatus`.
pub const MSTATUS_MPIE: u64 = 1 << 7;

/// Supervisor previous privilege bit in `mstatus`.
pub const MSTATUS_SPP: u64 = 1 << 8;

/// Machine previous privilege field in `mstatus`.
pub const MSTATUS_MPP: u64 = 3 << 11;

/// Bit shift of the MPP field.
pub const MSTATUS_MPP_SHIFT: u64 = 11;

/// Modify-privilege bit: M-mode loads and stores use MPP's translation.
pub const MSTATUS_MPRV: u64 = 1 << 17;

/// Permit supervisor access to user pages.
pub const MSTATUS_SUM: u64 = 1 << 18;

/// Make executable pages readable.
pub const MSTATUS_MXR: u64 = 1 << 19;

/// Trap virtual memory: `satp` and `SFENCE.VMA` are illegal in S-mode.
pub const MSTATUS_TVM: u64 = 1 << 20;

/// Timeout wait: `WFI` is illegal below M-mode.
pub const MSTATUS_TW: u64 = 1 << 21;

/// Trap `SRET` in S-mode.
pub const MSTATUS_TSR: u64 = 1 << 22;

/// User XLEN field (RV64 only, read-only 2).
pub const MSTATUS_UXL: u64 = 3 << 32;

/// Supervisor XLEN field (RV64 only, read-only 2).
pub const MSTATUS_SXL: u64 = 3 << 34;

/// `mstatus` fields visible through `sstatus`.
pub const SSTATUS_MASK: u64 =
    MSTATUS_SIE | MSTATUS_SPIE | MSTATUS_SPP | MSTATUS_SUM | MSTATUS_MXR | MSTATUS_UXL;

/// Supervisor software interrupt pending bit in `mip`.
pub const MIP_SSIP: u64 = 1 << 1;

/// Machine software interrupt pending bit in `mip`.
pub const MIP_MSIP: u64 = 1 << 3;

/// Supervisor timer interrupt pending bit in `mip`.
pub const MIP_STIP: u64 = 1 << 5;

/// Machine timer interrupt pending bit in `mip`.
pub const MIP_MTIP: u64 = 1 << 7;

/// Supervisor external interrupt pending bit in `mip`.
pub const MIP_SEIP: u64 = 1 << 9;

/// Machine external interrupt pending bit in `mip`.
pub const MIP_MEIP: u64 = 1 << 11;

/// Supervisor-level interrupt bits; the only ones `mideleg` can delegate.
pub const SUPERVISOR_INTERRUPTS: u64 = MIP_SSIP | MIP_STIP | MIP_SEIP;

/// Every interrupt bit the hart implements.
pub const ALL_INTERRUPTS: u64 = SUPERVISOR_INTERRUPTS | MIP_MSIP | MIP_MTIP | MIP_MEIP;

/// `satp` mode field shift on RV64.
pub const SATP64_MODE_SHIFT: u64 = 60;

/// `satp` PPN field on RV64.
pub const SATP64_PPN_MASK: u64 = 0xFFF_FFFF_FFFF;

/// `satp` mode bit on RV32.
pub const SATP32_MODE: u64 = 1 << 31;

/// `satp` PPN field on RV32.
pub const SATP32_PPN_MASK: u64 = 0x3F_FFFF;

/// No translation.
pub const SATP_MODE_BARE: u64 = 0;

/// Sv32 mode value on RV32.
pub const SATP_MODE_SV32: u64 = 1;

/// Sv39 mode value on RV64.
pub const SATP_MODE_SV39: u64 = 8;

/// Sv48 mode value on RV64.
pub const SATP_MODE_SV48: u64 = 9;

/// MISA extension bit for atomic operations (A extension).
pub const MISA_EXT_A: u64 = 1 << 0;

/// MISA extension bit for compressed instructions (C extension).
pub const MISA_EXT_C: u64 = 1 << 2;

/// MISA extension bit for base integer instructions (I extension).
pub const MISA_EXT_I: u64 = 1 << 8;

/// MISA extension bit for integer multiply/divide (M extension).
pub const MISA_EXT_M: u64 = 1 << 12;

/// MISA extension bit for supervisor mode (S extension).
pub const MISA_EXT_S: u64 = 1 << 18;

/// MISA extension bit for user mode (U extension).
pub const MISA_EXT_U: u64 = 1 << 20;

/// MISA MXL field for RV32 (bits 31:30).
pub const MISA_MXL_32: u64 = 1 << 30;

/// MISA MXL field for RV64 (bits 63:62).
pub const MISA_MXL_64: u64 = 2 << 62;

/// Control and Status Register storage.
///
/// Holds the raw state behind every implemented CSR. Registers that are views
/// (`sstatus`, `sie`, `sip`) or constants (`mvendorid`, `mhartid`) have no
/// field of their own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Csrs {
    /// Machine status register.
    pub mstatus: u64,
    /// Machine ISA register.
    pub misa: u64,
    /// Machine exception delegation.
    pub medeleg: u64,
    /// Machine interrupt delegation.
    pub mideleg: u64,
    /// Machine interrupt enable.
    pub mie: u64,
    /// Machine interrupt pending.
    pub mip: u64,
    /// Machine trap vector base address.
    pub mtvec: u64,
    /// Machine counter enable.
    pub mcounteren: u64,
    /// Machine scratch register.
    pub mscratch: u64,
    /// Machine exception program counter.
    pub mepc: u64,
    /// Machine trap cause.
    pub mcause: u64,
    /// Machine trap value.
    pub mtval: u64,
    /// Supervisor trap vector base address.
    pub stvec: u64,
    /// Supervisor counter enable.
    pub scounteren: u64,
    /// Supervisor scratch register.
    pub sscratch: u64,
    /// Supervisor exception program counter.
    pub sepc: u64,
    /// Supervisor trap cause.
    pub scause: u64,
    /// Supervisor trap value.
    pub stval: u64,
    /// Supervisor address translation and protection.
    pub satp: u64,
    /// Machine cycle counter.
    pub mcycle: u64,
    /// Machine instructions retired counter.
    pub minstret: u64,
}
