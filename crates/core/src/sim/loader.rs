//! ELF Loading.
//!
//! This module turns a target binary into an image ready to copy into guest
//! memory. It performs:
//! 1. **Identification:** ELF magic, class matching the configured XLEN, and `EM_RISCV`.
//! 2. **Segment Extraction:** Every non-empty `PT_LOAD` segment, placed at its physical address.
//! 3. **Placement:** Copying file bytes into RAM and zero-filling the `p_memsz - p_filesz` tail.
//!
//! Section headers, symbols and debug information are ignored.

use std::fs;
use std::path::Path;

use object::elf::{ELFCLASS32, ELFCLASS64, EM_RISCV, FileHeader32, FileHeader64, PT_LOAD};
use object::read::elf::{FileHeader, ProgramHeader};
use object::Endianness;
use tracing::debug;

use crate::common::PhysAddr;
use crate::common::error::{HammerError, Result};
use crate::isa::profile::Xlen;
use crate::soc::PhysMemory;

/// One loadable segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Physical load address (`p_paddr`).
    pub addr: u64,
    /// Bytes present in the file (`p_filesz`).
    pub data: Vec<u8>,
    /// Size in memory (`p_memsz`); at least `data.len()`.
    pub mem_size: u64,
}

impl Segment {
    /// One past the last byte occupied in memory.
    pub const fn end(&self) -> u64 {
        self.addr.saturating_add(self.mem_size)
    }
}

/// Loadable contents of an ELF executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElfImage {
    /// Entry point (`e_entry`).
    pub entry: u64,
    /// `PT_LOAD` segments in file order.
    pub segments: Vec<Segment>,
}

impl ElfImage {
    /// Reads and parses the ELF file at `path`.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidBinary` if it is not a RISC-V
    /// executable of the given width.
    pub fn from_file(path: &Path, xlen: Xlen) -> Result<Self> {
        let data = fs::read(path).map_err(|source| HammerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data, xlen)
    }

    /// Parses an in-memory ELF file.
    ///
    /// # Errors
    ///
    /// `InvalidBinary` if `data` is not an ELF, its class does not match
    /// `xlen`, its machine is not RISC-V, or a segment lies outside the file.
    pub fn parse(data: &[u8], xlen: Xlen) -> Result<Self> {
        if data.get(..4) != Some(&b"\x7fELF"[..]) {
            return Err(invalid("missing ELF magic"));
        }
        let class = data.get(4).copied();
        match (xlen, class) {
            (Xlen::Rv32, Some(ELFCLASS32)) => parse_elf::<FileHeader32<Endianness>>(data),
            (Xlen::Rv64, Some(ELFCLASS64)) => parse_elf::<FileHeader64<Endianness>>(data),
            (_, Some(ELFCLASS32)) => Err(invalid(format!("32-bit ELF cannot run on {xlen}"))),
            (_, Some(ELFCLASS64)) => Err(invalid(format!("64-bit ELF cannot run on {xlen}"))),
            _ => Err(invalid("unknown ELF class")),
        }
    }

    /// Copies every segment into `memory`.
    ///
    /// # Errors
    ///
    /// `UnmappedLoadSegment` if any byte of a segment's `[p_paddr, p_paddr + p_memsz)`
    /// range lies outside the configured regions.
    pub fn load_into(&self, memory: &mut PhysMemory) -> Result<()> {
        for segment in &self.segments {
            let unmapped = HammerError::UnmappedLoadSegment {
                start: segment.addr,
                end: segment.end(),
            };
            if segment.addr.checked_add(segment.mem_size).is_none()
                || !memory.contains(PhysAddr(segment.addr), segment.mem_size)
            {
                return Err(unmapped);
            }
            memory.load(segment.addr, &segment.data)?;
            let file_size = segment.data.len() as u64;
            if segment.mem_size > file_size {
                let tail = usize::try_from(segment.mem_size - file_size).map_err(|_| unmapped)?;
                memory.load(segment.addr + file_size, &vec![0; tail])?;
            }
            debug!(
                addr = format_args!("{:#x}", segment.addr),
                file_size = segment.data.len(),
                mem_size = segment.mem_size,
                "loaded segment"
            );
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> HammerError {
    HammerError::InvalidBinary(msg.into())
}

fn parse_elf<Elf: FileHeader<Endian = Endianness>>(data: &[u8]) -> Result<ElfImage> {
    let header = Elf::parse(data).map_err(|e| invalid(e.to_string()))?;
    let endian = header.endian().map_err(|e| invalid(e.to_string()))?;
    if header.e_machine(endian) != EM_RISCV {
        return Err(invalid(format!(
            "machine {} is not RISC-V",
            header.e_machine(endian)
        )));
    }

    let mut segments = Vec::new();
    for phdr in header
        .program_headers(endian, data)
        .map_err(|e| invalid(e.to_string()))?
    {
        let mem_size: u64 = phdr.p_memsz(endian).into();
        if phdr.p_type(endian) != PT_LOAD || mem_size == 0 {
            continue;
        }
        let offset: u64 = phdr.p_offset(endian).into();
        let file_size: u64 = phdr.p_filesz(endian).into();
        if file_size > mem_size {
            return Err(invalid("segment file size exceeds its memory size"));
        }
        let bytes = usize::try_from(offset)
            .ok()
            .zip(usize::try_from(file_size).ok())
            .and_then(|(start, len)| data.get(start..start.checked_add(len)?))
            .ok_or_else(|| invalid("segment extends past the end of the file"))?;

        segments.push(Segment {
            addr: phdr.p_paddr(endian).into(),
            data: bytes.to_vec(),
            mem_size,
        });
    }

    Ok(ElfImage {
        entry: header.e_entry(endian).into(),
        segments,
    })
}
