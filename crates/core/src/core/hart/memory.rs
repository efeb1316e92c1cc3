//! Memory access for a hart.
//!
//! This module implements the hart side of memory access. It provides:
//! 1. **Fetch:** Instruction parcels, translated one 16-bit parcel at a time.
//! 2. **Loads and Stores:** Translation, PMP, misaligned splitting and commit logging.
//! 3. **Atomics:** Address checks for `LR`, `SC` and AMOs.
//! 4. **Peeks:** The same translation against a read-only view, for hosts.
//!
//! A misaligned access is split at the page boundary. Both halves are
//! translated before either is performed, so a faulting access has no effect.

use super::Hart;
use crate::common::constants::INSTRUCTION_SIZE_16;
use crate::common::{AccessType, PAGE_SIZE, PhysAddr, Trap, VirtAddr};
use crate::core::units::mmu::ptw::{PeekView, PteStore};
use crate::core::units::mmu::{self, MmuState, effective_privilege};
use crate::isa::instruction::instruction_length;
use crate::soc::PhysMemory;

/// Physical pieces of one data access; the second is empty unless it crosses a page.
type Pieces = [(PhysAddr, u64); 2];

impl Hart {
    fn mmu_state(&self, access: AccessType) -> MmuState {
        MmuState {
            satp: self.csrs.satp,
            mstatus: self.csrs.mstatus,
            xlen: self.profile.xlen,
            privilege: effective_privilege(access, self.privilege, self.csrs.mstatus),
        }
    }

    /// Translates and protection-checks `len` bytes at `vaddr`, which must not cross a page.
    fn translate_in<M: PteStore>(
        &self,
        vaddr: u64,
        len: u64,
        access: AccessType,
        store: &mut M,
    ) -> Result<PhysAddr, Trap> {
        let state = self.mmu_state(access);
        mmu::translate(VirtAddr::new(vaddr), len, access, &state, &self.pmp, store).into_result()
    }

    /// Stepping-path translation: A/D bits are written and the target must be backed by RAM.
    fn translate(
        &self,
        vaddr: u64,
        len: u64,
        access: AccessType,
        mem: &mut PhysMemory,
    ) -> Result<PhysAddr, Trap> {
        let paddr = self.translate_in(vaddr, len, access, mem)?;
        if mem.contains(paddr, len) {
            Ok(paddr)
        } else {
            Err(access.access_fault(vaddr))
        }
    }

    /// Translates a data access, splitting it at the page boundary when misaligned.
    fn translate_data(
        &self,
        vaddr: u64,
        size: u64,
        access: AccessType,
        mem: &mut PhysMemory,
    ) -> Result<Pieces, Trap> {
        let vaddr = self.profile.xlen.truncate(vaddr);
        if vaddr % size != 0 && !self.misaligned {
            return Err(access.misaligned(vaddr));
        }

        let first = size.min(PAGE_SIZE - vaddr % PAGE_SIZE);
        let lo = self.translate(vaddr, first, access, mem)?;
        if first == size {
            return Ok([(lo, first), (PhysAddr::new(0), 0)]);
        }
        let hi_vaddr = self.profile.xlen.truncate(vaddr.wrapping_add(first));
        let hi = self.translate(hi_vaddr, size - first, access, mem)?;
        Ok([(lo, first), (hi, size - first)])
    }

    /// Fetches the instruction at the current PC.
    ///
    /// Returns the raw bits (16 significant bits for a compressed parcel)
    /// and the instruction length.
    pub(super) fn fetch(&self, mem: &mut PhysMemory) -> Result<(u32, u64), Trap> {
        let pc = self.pc;
        if pc % self.profile.instruction_alignment() != 0 {
            return Err(Trap::InstructionAddressMisaligned(pc));
        }

        let low = self.fetch_parcel(pc, mem)?;
        let len = instruction_length(low);
        if len == INSTRUCTION_SIZE_16 {
            if !self.profile.c {
                return Err(Trap::IllegalInstruction(u32::from(low)));
            }
            return Ok((u32::from(low), len));
        }

        let high = self.fetch_parcel(self.profile.xlen.truncate(pc.wrapping_add(2)), mem)?;
        Ok((u32::from(low) | (u32::from(high) << 16), len))
    }

    fn fetch_parcel(&self, vaddr: u64, mem: &mut PhysMemory) -> Result<u16, Trap> {
        let paddr = self.translate(vaddr, 2, AccessType::Fetch, mem)?;
        mem.read_uint(paddr, 2)
            .map(|v| v as u16)
            .ok_or(Trap::InstructionAccessFault(vaddr))
    }

    /// Loads `size` bytes (1, 2, 4 or 8), zero-extended, and logs the access.
    pub(super) fn load(&mut self, vaddr: u64, size: u64, mem: &mut PhysMemory) -> Result<u64, Trap> {
        let vaddr = self.profile.xlen.truncate(vaddr);
        let pieces = self.translate_data(vaddr, size, AccessType::Read, mem)?;

        let mut buf = [0u8; 8];
        let mut offset = 0;
        for (paddr, len) in pieces {
            if len == 0 {
                continue;
            }
            let bytes = mem
                .read_bytes(paddr, len as usize)
                .ok_or(Trap::LoadAccessFault(vaddr))?;
            buf[offset..offset + bytes.len()].copy_from_slice(bytes);
            offset += bytes.len();
        }

        let value = u64::from_le_bytes(buf);
        self.log.record_read(vaddr, value, size as u8);
        Ok(value)
    }

    /// Stores the low `size` bytes of `val` and logs the access.
    pub(super) fn store(
        &mut self,
        vaddr: u64,
        size: u64,
        val: u64,
        mem: &mut PhysMemory,
    ) -> Result<(), Trap> {
        let vaddr = self.profile.xlen.truncate(vaddr);
        let pieces = self.translate_data(vaddr, size, AccessType::Write, mem)?;

        let bytes = val.to_le_bytes();
        let mut offset = 0;
        for (paddr, len) in pieces {
            if len == 0 {
                continue;
            }
            let len = len as usize;
            if !mem.write_bytes(paddr, &bytes[offset..offset + len]) {
                return Err(Trap::StoreAccessFault(vaddr));
            }
            self.stores.push((paddr.val(), len as u64));
            offset += len;
        }

        self.log.record_write(vaddr, val & size_mask(size), size as u8);
        Ok(())
    }

    /// Translates the address of an `LR`. Must be naturally aligned.
    pub(super) fn reserve_address(
        &self,
        vaddr: u64,
        size: u64,
        mem: &mut PhysMemory,
    ) -> Result<PhysAddr, Trap> {
        let vaddr = self.profile.xlen.truncate(vaddr);
        if vaddr % size != 0 {
            return Err(if self.misaligned {
                Trap::LoadAccessFault(vaddr)
            } else {
                Trap::LoadAddressMisaligned(vaddr)
            });
        }
        self.translate(vaddr, size, AccessType::Read, mem)
    }

    /// Translates the address of an `SC` or AMO. Must be naturally aligned.
    pub(super) fn atomic_address(
        &self,
        vaddr: u64,
        size: u64,
        mem: &mut PhysMemory,
    ) -> Result<PhysAddr, Trap> {
        let vaddr = self.profile.xlen.truncate(vaddr);
        if vaddr % size != 0 {
            return Err(if self.misaligned {
                Trap::StoreAccessFault(vaddr)
            } else {
                Trap::StoreAddressMisaligned(vaddr)
            });
        }
        self.translate(vaddr, size, AccessType::Write, mem)
    }

    /// Reads an already translated, naturally aligned location and logs it.
    pub(super) fn read_physical(
        &mut self,
        vaddr: u64,
        paddr: PhysAddr,
        size: u64,
        mem: &PhysMemory,
    ) -> Result<u64, Trap> {
        let value = mem
            .read_uint(paddr, size as usize)
            .ok_or(Trap::LoadAccessFault(vaddr))?;
        self.log
            .record_read(self.profile.xlen.truncate(vaddr), value, size as u8);
        Ok(value)
    }

    /// Writes an already translated, naturally aligned location and logs it.
    pub(super) fn write_physical(
        &mut self,
        vaddr: u64,
        paddr: PhysAddr,
        size: u64,
        val: u64,
        mem: &mut PhysMemory,
    ) -> Result<(), Trap> {
        if !mem.write_uint(paddr, size as usize, val) {
            return Err(Trap::StoreAccessFault(vaddr));
        }
        self.stores.push((paddr.val(), size));
        self.log.record_write(
            self.profile.xlen.truncate(vaddr),
            val & size_mask(size),
            size as u8,
        );
        Ok(())
    }

    pub(super) fn peek_translate_range(
        &self,
        vaddr: u64,
        len: u64,
        access: AccessType,
        mem: &PhysMemory,
    ) -> Option<PhysAddr> {
        let vaddr = self.profile.xlen.truncate(vaddr);
        let paddr = self.translate_in(vaddr, len, access, &mut PeekView(mem)).ok()?;
        mem.contains(paddr, len).then_some(paddr)
    }

    pub(super) fn peek_fetch(&self, vaddr: u64, mem: &PhysMemory) -> Option<u32> {
        if vaddr % 2 != 0 {
            return None;
        }
        let parcel = |addr: u64| {
            let paddr = self.peek_translate_range(addr, 2, AccessType::Fetch, mem)?;
            mem.read_uint(paddr, 2).map(|v| v as u16)
        };

        let low = parcel(vaddr)?;
        if instruction_length(low) == INSTRUCTION_SIZE_16 {
            return Some(u32::from(low));
        }
        let high = parcel(vaddr.wrapping_add(2))?;
        Some(u32::from(low) | (u32::from(high) << 16))
    }

    /// Every page chunk is translated and bounds-checked before the output
    /// buffer is allocated, so its size is bounded by backed memory.
    pub(super) fn peek_data(&self, vaddr: u64, len: u64, mem: &PhysMemory) -> Option<Vec<u8>> {
        // Longer ranges wrap around the address space.
        if len > self.profile.xlen.mask() {
            return None;
        }

        let mut chunks = Vec::new();
        let mut addr = self.profile.xlen.truncate(vaddr);
        let mut remaining = len;
        while remaining > 0 {
            let chunk = remaining.min(PAGE_SIZE - addr % PAGE_SIZE);
            let paddr = self.peek_translate_range(addr, chunk, AccessType::Read, mem)?;
            chunks.push((paddr, usize::try_from(chunk).ok()?));
            remaining -= chunk;
            addr = self.profile.xlen.truncate(addr.wrapping_add(chunk));
        }

        let mut out = Vec::with_capacity(usize::try_from(len).ok()?);
        for (paddr, chunk) in chunks {
            out.extend_from_slice(mem.read_bytes(paddr, chunk)?);
        }
        Some(out)
    }
}

const fn size_mask(size: u64) -> u64 {
    if size >= 8 {
        u64::MAX
    } else {
        (1 << (size * 8)) - 1
    }
}
