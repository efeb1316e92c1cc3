//! Physical System Memory.
//!
//! This module implements the guest's physical address space. It provides:
//! 1. **Buffer:** Backing storage (`DramBuffer`) for each configured region.
//! 2. **Routing:** Lookup of the region that backs a physical address range.
//! 3. **Access:** Little-endian scalar and byte-slice reads and writes.
//!
//! Every access must fall entirely inside one region; an access straddling two
//! adjacent regions is treated as unmapped.

/// DRAM buffer implementation (mmap or boxed slice) for raw byte storage.
pub mod buffer;

use self::buffer::DramBuffer;
use crate::common::PhysAddr;
use crate::common::error::{HammerError, Result};
use crate::config::MemoryRegionConfig;

/// One region of guest RAM mapped at a physical base address.
#[derive(Debug)]
pub struct RamRegion {
    base: u64,
    buffer: DramBuffer,
}

impl RamRegion {
    /// First physical address of the region.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Size in bytes.
    pub const fn size(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Byte offset of `[addr, addr + len)` within this region, if fully inside.
    fn offset_of(&self, addr: u64, len: u64) -> Option<usize> {
        let offset = addr.checked_sub(self.base)?;
        let end = offset.checked_add(len)?;
        (end <= self.size()).then_some(offset as usize)
    }
}

/// The physical address space shared by all harts.
#[derive(Debug)]
pub struct PhysMemory {
    /// Regions sorted by base address; never overlapping.
    regions: Vec<RamRegion>,
}

impl PhysMemory {
    /// Allocates one zero-filled buffer per configured region.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a region does not fit the host address space or
    /// cannot be allocated.
    pub fn new(layout: &[MemoryRegionConfig]) -> Result<Self> {
        let mut regions = layout
            .iter()
            .map(|region| {
                let size = usize::try_from(region.size()).map_err(|_| {
                    HammerError::InvalidConfig(format!(
                        "memory region at {:#x} is too large for this host",
                        region.base()
                    ))
                })?;
                Ok(RamRegion {
                    base: region.base(),
                    buffer: DramBuffer::new(size)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        regions.sort_by_key(RamRegion::base);
        Ok(Self { regions })
    }

    /// Configured regions in address order.
    pub fn regions(&self) -> &[RamRegion] {
        &self.regions
    }

    fn locate(&self, addr: u64, len: u64) -> Option<(usize, usize)> {
        let idx = self
            .regions
            .partition_point(|r| r.base <= addr)
            .checked_sub(1)?;
        let offset = self.regions[idx].offset_of(addr, len)?;
        Some((idx, offset))
    }

    /// True if `[addr, addr + len)` lies inside a single region.
    pub fn contains(&self, addr: PhysAddr, len: u64) -> bool {
        self.locate(addr.val(), len).is_some()
    }

    /// Borrows `len` bytes starting at `addr`.
    pub fn read_bytes(&self, addr: PhysAddr, len: usize) -> Option<&[u8]> {
        let (idx, offset) = self.locate(addr.val(), len as u64)?;
        self.regions[idx].buffer.read_slice(offset, len)
    }

    /// Writes `data` at `addr`. Returns `false` without writing if unmapped.
    pub fn write_bytes(&mut self, addr: PhysAddr, data: &[u8]) -> bool {
        match self.locate(addr.val(), data.len() as u64) {
            Some((idx, offset)) => self.regions[idx].buffer.write_slice(offset, data),
            None => false,
        }
    }

    /// Reads a little-endian value of `size` bytes (1, 2, 4 or 8), zero-extended.
    pub fn read_uint(&self, addr: PhysAddr, size: usize) -> Option<u64> {
        let bytes = self.read_bytes(addr, size)?;
        let mut buf = [0u8; 8];
        buf.get_mut(..size)?.copy_from_slice(bytes);
        Some(u64::from_le_bytes(buf))
    }

    /// Writes the low `size` bytes of `val` little-endian.
    pub fn write_uint(&mut self, addr: PhysAddr, size: usize, val: u64) -> bool {
        match val.to_le_bytes().get(..size) {
            Some(bytes) => self.write_bytes(addr, bytes),
            None => false,
        }
    }

    /// Copies a loadable image to `addr`.
    ///
    /// # Errors
    ///
    /// `UnmappedLoadSegment` if any byte of the range is outside every region.
    pub fn load(&mut self, addr: u64, data: &[u8]) -> Result<()> {
        let unmapped = || HammerError::UnmappedLoadSegment {
            start: addr,
            end: addr.saturating_add(data.len() as u64),
        };
        let (idx, offset) = self.locate(addr, data.len() as u64).ok_or_else(unmapped)?;
        if self.regions[idx].buffer.write_slice(offset, data) {
            Ok(())
        } else {
            Err(unmapped())
        }
    }
}
