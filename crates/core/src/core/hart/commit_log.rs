//! Per-step commit log.
//!
//! Records the architectural effects of the most recent step of one hart so a
//! host can diff its own model against the simulator. The log is cleared at
//! the start of every step, including steps that trap.
//!
//! Register writes are keyed by name: `x<n>` for integer registers and
//! `c<addr>` (decimal CSR number) for CSRs. A register written twice in one
//! step appears once, with the final value. Memory accesses are recorded in
//! program order as `(virtual address, value, size in bytes)`.

/// One memory access: virtual address, value, size in bytes.
pub type MemAccess = (u64, u64, u8);

/// Effects of the last step of a hart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitLog {
    reg_writes: Vec<(String, u64)>,
    mem_reads: Vec<MemAccess>,
    mem_writes: Vec<MemAccess>,
}

impl CommitLog {
    /// Creates an empty log.
    pub const fn new() -> Self {
        Self {
            reg_writes: Vec::new(),
            mem_reads: Vec::new(),
            mem_writes: Vec::new(),
        }
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.reg_writes.clear();
        self.mem_reads.clear();
        self.mem_writes.clear();
    }

    /// Records an integer register write. Writes to `x0` are not recorded.
    pub fn record_gpr(&mut self, idx: usize, val: u64) {
        if idx != 0 {
            self.record_reg(format!("x{idx}"), val);
        }
    }

    /// Records a CSR write with the value the CSR reads back afterwards.
    pub fn record_csr(&mut self, addr: u32, val: u64) {
        self.record_reg(format!("c{addr}"), val);
    }

    fn record_reg(&mut self, name: String, val: u64) {
        match self.reg_writes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = val,
            None => self.reg_writes.push((name, val)),
        }
    }

    /// Records a load.
    pub fn record_read(&mut self, vaddr: u64, val: u64, size: u8) {
        self.mem_reads.push((vaddr, val, size));
    }

    /// Records a store.
    pub fn record_write(&mut self, vaddr: u64, val: u64, size: u8) {
        self.mem_writes.push((vaddr, val, size));
    }

    /// Register writes in the order they were first made.
    pub fn reg_writes(&self) -> &[(String, u64)] {
        &self.reg_writes
    }

    /// Loads in program order.
    pub fn mem_reads(&self) -> &[MemAccess] {
        &self.mem_reads
    }

    /// Stores in program order.
    pub fn mem_writes(&self) -> &[MemAccess] {
        &self.mem_writes
    }
}
