//! Trap Handling Logic.
//!
//! This module implements trap entry and return for a hart. It performs the following:
//! 1. **Interrupt Selection:** Picks the highest-priority pending and enabled interrupt.
//! 2. **Delegation:** Routes a trap to S-mode when `medeleg`/`mideleg` allow it.
//! 3. **Context Saving:** Writes `xepc`, `xcause`, `xtval` and pushes the status stack.
//! 4. **Return Handling:** `MRET` and `SRET`.
//!
//! CSR updates made here are recorded in the commit log like any other CSR write.

use tracing::debug;

use super::Hart;
use crate::common::Trap;
use crate::core::arch::csr::{
    self, MIP_MEIP, MIP_MSIP, MIP_MTIP, MIP_SEIP, MIP_SSIP, MIP_STIP, MSTATUS_MIE, MSTATUS_MPIE,
    MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_MPRV, MSTATUS_SIE, MSTATUS_SPIE, MSTATUS_SPP,
};
use crate::core::arch::mode::PrivilegeMode;

/// Interrupts in descending priority.
const INTERRUPT_PRIORITY: [(u64, Trap); 6] = [
    (MIP_MEIP, Trap::MachineExternalInterrupt),
    (MIP_MSIP, Trap::MachineSoftwareInterrupt),
    (MIP_MTIP, Trap::MachineTimerInterrupt),
    (MIP_SEIP, Trap::SupervisorExternalInterrupt),
    (MIP_SSIP, Trap::SupervisorSoftwareInterrupt),
    (MIP_STIP, Trap::SupervisorTimerInterrupt),
];

impl Hart {
    /// The interrupt to take before the next fetch, if any.
    ///
    /// Interrupts handled in M-mode are enabled below M-mode, or in M-mode
    /// with `mstatus.MIE`. Delegated interrupts are enabled below S-mode, or
    /// in S-mode with `mstatus.SIE`, and never in M-mode.
    pub(super) fn pending_interrupt(&self) -> Option<Trap> {
        let pending = self.csrs.mip & self.csrs.mie;
        if pending == 0 {
            return None;
        }

        let mstatus = self.csrs.mstatus;
        let machine_enabled = self.privilege < PrivilegeMode::Machine || mstatus & MSTATUS_MIE != 0;
        let supervisor_enabled = self.privilege < PrivilegeMode::Supervisor
            || (self.privilege == PrivilegeMode::Supervisor && mstatus & MSTATUS_SIE != 0);

        let mut enabled = 0;
        if machine_enabled {
            enabled |= pending & !self.csrs.mideleg;
        }
        if supervisor_enabled {
            enabled |= pending & self.csrs.mideleg;
        }

        INTERRUPT_PRIORITY
            .iter()
            .find(|(bit, _)| enabled & bit != 0)
            .map(|&(_, trap)| trap)
    }

    /// Enters the trap handler for `trap`, raised by the instruction at `epc`.
    pub(super) fn take_trap(&mut self, trap: Trap, epc: u64) {
        self.reservation = None;

        let is_interrupt = trap.is_interrupt();
        let code = trap.cause_code();
        let cause = if is_interrupt {
            self.profile.xlen.cause_interrupt_bit() | code
        } else {
            code
        };
        let deleg = if is_interrupt {
            self.csrs.mideleg
        } else {
            self.csrs.medeleg
        };
        let to_supervisor = self.levels.supervisor
            && self.privilege <= PrivilegeMode::Supervisor
            && (deleg >> code) & 1 != 0;

        let previous = self.privilege;
        let mstatus = self.csrs.mstatus;
        if to_supervisor {
            self.csr_write_logged(csr::SEPC, epc);
            self.csr_write_logged(csr::SCAUSE, cause);
            self.csr_write_logged(csr::STVAL, trap.tval());

            let mut status = mstatus & !(MSTATUS_SPIE | MSTATUS_SPP | MSTATUS_SIE);
            if mstatus & MSTATUS_SIE != 0 {
                status |= MSTATUS_SPIE;
            }
            if previous == PrivilegeMode::Supervisor {
                status |= MSTATUS_SPP;
            }
            self.csrs.mstatus = status;
            self.log_csr(csr::SSTATUS);

            self.privilege = PrivilegeMode::Supervisor;
            self.pc = trap_vector(self.csrs.stvec, is_interrupt, code);
        } else {
            self.csr_write_logged(csr::MEPC, epc);
            self.csr_write_logged(csr::MCAUSE, cause);
            self.csr_write_logged(csr::MTVAL, trap.tval());

            let mut status = mstatus & !(MSTATUS_MPIE | MSTATUS_MPP | MSTATUS_MIE);
            if mstatus & MSTATUS_MIE != 0 {
                status |= MSTATUS_MPIE;
            }
            status |= previous.bits() << MSTATUS_MPP_SHIFT;
            self.csrs.mstatus = status;
            self.log_csr(csr::MSTATUS);

            self.privilege = PrivilegeMode::Machine;
            self.pc = trap_vector(self.csrs.mtvec, is_interrupt, code);
        }

        debug!(
            hart = self.id,
            %trap,
            epc = format_args!("{epc:#x}"),
            handler = format_args!("{:#x}", self.pc),
            from = %previous,
            to = %self.privilege,
            "trap taken"
        );
    }

    /// `MRET`: pops the M-mode status stack and jumps to `mepc`.
    pub(super) fn do_mret(&mut self) {
        let mstatus = self.csrs.mstatus;
        let target = PrivilegeMode::from_bits(mstatus >> MSTATUS_MPP_SHIFT)
            .unwrap_or(PrivilegeMode::Machine);
        let lowest = if self.levels.user {
            PrivilegeMode::User
        } else {
            PrivilegeMode::Machine
        };

        let mut status = mstatus & !(MSTATUS_MIE | MSTATUS_MPP);
        if mstatus & MSTATUS_MPIE != 0 {
            status |= MSTATUS_MIE;
        }
        status |= MSTATUS_MPIE | (lowest.bits() << MSTATUS_MPP_SHIFT);
        if target != PrivilegeMode::Machine {
            status &= !MSTATUS_MPRV;
        }
        self.csrs.mstatus = status;
        self.log_csr(csr::MSTATUS);

        self.privilege = target;
        self.pc = self.profile.xlen.truncate(self.csrs.mepc & self.epc_mask());
    }

    /// `SRET`: pops the S-mode status stack and jumps to `sepc`.
    pub(super) fn do_sret(&mut self) {
        let mstatus = self.csrs.mstatus;
        let target = if mstatus & MSTATUS_SPP != 0 {
            PrivilegeMode::Supervisor
        } else {
            PrivilegeMode::User
        };

        let mut status = mstatus & !(MSTATUS_SIE | MSTATUS_SPP | MSTATUS_MPRV);
        if mstatus & MSTATUS_SPIE != 0 {
            status |= MSTATUS_SIE;
        }
        status |= MSTATUS_SPIE;
        self.csrs.mstatus = status;
        self.log_csr(csr::SSTATUS);

        self.privilege = target;
        self.pc = self.profile.xlen.truncate(self.csrs.sepc & self.epc_mask());
    }

    fn log_csr(&mut self, addr: u32) {
        if let Some(val) = self.csr_read(addr) {
            self.log.record_csr(addr, val);
        }
    }
}

/// Handler address: `base`, or `base + 4 * code` for interrupts in vectored mode.
const fn trap_vector(tvec: u64, is_interrupt: bool, code: u64) -> u64 {
    let base = tvec & !3;
    if is_interrupt && tvec & 1 != 0 {
        base.wrapping_add(4 * code)
    } else {
        base
    }
}
