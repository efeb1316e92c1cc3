//! Minimal ELF executable writer.
//!
//! Produces just enough of an ELF file for the loader: a file header, one
//! program header per segment and the segment bytes. No sections.

#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

const EM_RISCV: u16 = 243;
const PT_LOAD: u32 = 1;
const PF_RWX: u32 = 0b111;

#[derive(Clone, Debug)]
struct Segment {
    addr: u64,
    data: Vec<u8>,
    mem_size: u64,
}

/// Builder for a little-endian RISC-V ELF executable.
#[derive(Clone, Debug)]
pub struct ElfWriter {
    is64: bool,
    machine: u16,
    entry: u64,
    segments: Vec<Segment>,
}

impl ElfWriter {
    pub const fn new(is64: bool, entry: u64) -> Self {
        Self {
            is64,
            machine: EM_RISCV,
            entry,
            segments: Vec::new(),
        }
    }

    pub const fn elf32(entry: u64) -> Self {
        Self::new(false, entry)
    }

    pub const fn elf64(entry: u64) -> Self {
        Self::new(true, entry)
    }

    /// Overrides `e_machine`.
    pub const fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    /// Adds a `PT_LOAD` segment whose memory size equals its file size.
    pub fn segment(self, addr: u64, data: &[u8]) -> Self {
        let len = data.len() as u64;
        self.segment_with_bss(addr, data, len)
    }

    /// Adds a `PT_LOAD` segment with a zero-filled tail.
    pub fn segment_with_bss(mut self, addr: u64, data: &[u8], mem_size: u64) -> Self {
        self.segments.push(Segment {
            addr,
            data: data.to_vec(),
            mem_size,
        });
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let (ehsize, phentsize) = if self.is64 { (64, 56) } else { (52, 32) };
        let data_start = ehsize + phentsize * self.segments.len();

        let mut out = Vec::new();
        out.extend_from_slice(b"\x7fELF");
        out.push(if self.is64 { 2 } else { 1 });
        out.extend_from_slice(&[1, 1, 0]);
        out.resize(16, 0);
        push16(&mut out, 2);
        push16(&mut out, self.machine);
        push32(&mut out, 1);
        self.push_word(&mut out, self.entry);
        self.push_word(&mut out, ehsize as u64);
        self.push_word(&mut out, 0);
        push32(&mut out, 0);
        push16(&mut out, ehsize as u16);
        push16(&mut out, phentsize as u16);
        push16(&mut out, self.segments.len() as u16);
        push16(&mut out, 0);
        push16(&mut out, 0);
        push16(&mut out, 0);
        assert_eq!(out.len(), ehsize);

        let mut offset = data_start as u64;
        for seg in &self.segments {
            let filesz = seg.data.len() as u64;
            push32(&mut out, PT_LOAD);
            if self.is64 {
                push32(&mut out, PF_RWX);
            }
            self.push_word(&mut out, offset);
            self.push_word(&mut out, seg.addr);
            self.push_word(&mut out, seg.addr);
            self.push_word(&mut out, filesz);
            self.push_word(&mut out, seg.mem_size);
            if !self.is64 {
                push32(&mut out, PF_RWX);
            }
            self.push_word(&mut out, 4);
            offset += filesz;
        }

        for seg in &self.segments {
            out.extend_from_slice(&seg.data);
        }
        out
    }

    /// Writes the image to a temporary file that lives as long as the handle.
    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.to_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn push_word(&self, out: &mut Vec<u8>, val: u64) {
        if self.is64 {
            out.extend_from_slice(&val.to_le_bytes());
        } else {
            push32(out, val as u32);
        }
    }
}

fn push16(out: &mut Vec<u8>, val: u16) {
    out.extend_from_slice(&val.to_le_bytes());
}

fn push32(out: &mut Vec<u8>, val: u32) {
    out.extend_from_slice(&val.to_le_bytes());
}
