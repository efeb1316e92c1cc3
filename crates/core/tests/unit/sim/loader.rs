//! ELF parsing and placement.

use hammer_core::common::PhysAddr;
use hammer_core::sim::loader::ElfImage;
use hammer_core::soc::PhysMemory;
use hammer_core::{HammerError, MemoryRegionConfig, Xlen};
use pretty_assertions::assert_eq;

use crate::common::builder::elf::ElfWriter;
use crate::common::harness::{RAM_BASE, RAM_SIZE};

fn memory() -> PhysMemory {
    PhysMemory::new(&[MemoryRegionConfig::new(RAM_BASE, RAM_SIZE)]).unwrap()
}

#[test]
fn elf32_segments_with_bss_tail() {
    let bytes = ElfWriter::elf32(RAM_BASE + 0x40)
        .segment(RAM_BASE, &[0x13, 0, 0, 0])
        .segment_with_bss(RAM_BASE + 0x1000, &[0xAA, 0xBB], 0x100)
        .to_bytes();
    let image = ElfImage::parse(&bytes, Xlen::Rv32).unwrap();

    assert_eq!(image.entry, RAM_BASE + 0x40);
    assert_eq!(image.segments.len(), 2);
    assert_eq!(image.segments[1].data, vec![0xAA, 0xBB]);
    assert_eq!(image.segments[1].end(), RAM_BASE + 0x1100);

    let mut mem = memory();
    assert!(mem.write_uint(PhysAddr(RAM_BASE + 0x1002), 1, 0xFF));
    image.load_into(&mut mem).unwrap();

    assert_eq!(mem.read_uint(PhysAddr(RAM_BASE), 4), Some(0x13));
    assert_eq!(mem.read_uint(PhysAddr(RAM_BASE + 0x1000), 2), Some(0xBBAA));
    assert_eq!(mem.read_uint(PhysAddr(RAM_BASE + 0x1002), 1), Some(0));
    assert_eq!(mem.read_uint(PhysAddr(RAM_BASE + 0x10FF), 1), Some(0));
}

#[test]
fn empty_segments_are_skipped() {
    let bytes = ElfWriter::elf64(RAM_BASE)
        .segment(RAM_BASE, &[0x13, 0, 0, 0])
        .segment_with_bss(0x10, &[], 0)
        .to_bytes();
    let image = ElfImage::parse(&bytes, Xlen::Rv64).unwrap();
    assert_eq!(image.segments.len(), 1);
    assert!(image.load_into(&mut memory()).is_ok());
}

#[test]
fn bss_past_the_end_of_memory_is_unmapped() {
    let bytes = ElfWriter::elf64(RAM_BASE)
        .segment_with_bss(RAM_BASE + RAM_SIZE - 4, &[0; 4], 8)
        .to_bytes();
    let image = ElfImage::parse(&bytes, Xlen::Rv64).unwrap();
    assert!(matches!(
        image.load_into(&mut memory()),
        Err(HammerError::UnmappedLoadSegment { end, .. }) if end == RAM_BASE + RAM_SIZE + 4
    ));
}

#[test]
fn truncated_and_foreign_files_are_invalid() {
    let full = ElfWriter::elf64(RAM_BASE)
        .segment(RAM_BASE, &[0; 16])
        .to_bytes();

    for bad in [&full[..full.len() - 8], &full[..20], &b"#!/bin/sh\n"[..]] {
        assert!(matches!(
            ElfImage::parse(bad, Xlen::Rv64),
            Err(HammerError::InvalidBinary(_))
        ));
    }
}

#[test]
fn file_size_larger_than_memory_size_is_invalid() {
    let bytes = ElfWriter::elf64(RAM_BASE)
        .segment_with_bss(RAM_BASE, &[0; 8], 4)
        .to_bytes();
    assert!(matches!(
        ElfImage::parse(&bytes, Xlen::Rv64),
        Err(HammerError::InvalidBinary(_))
    ));
}
