//! Configuration validation and JSON loading.

use std::io::Write;

use hammer_core::{HammerError, MemoryRegionConfig, SimulatorConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

fn binary() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"\x7fELF").unwrap();
    file
}

fn regions(pairs: &[(u64, u64)]) -> Vec<MemoryRegionConfig> {
    pairs.iter().copied().map(MemoryRegionConfig::from).collect()
}

#[rstest]
#[case::no_harts(vec![], regions(&[(0x8000_0000, 0x1000)]))]
#[case::duplicate_hart(vec![0, 1, 0], regions(&[(0x8000_0000, 0x1000)]))]
#[case::empty_region(vec![0], regions(&[(0x8000_0000, 0)]))]
#[case::wrapping_region(vec![0], regions(&[(u64::MAX - 0xFF, 0x1000)]))]
#[case::overlapping(vec![0], regions(&[(0x8000_0000, 0x2000), (0x8000_1000, 0x1000)]))]
#[case::contained(vec![0], regions(&[(0x1000, 0x10_0000), (0x2000, 0x10)]))]
fn structurally_invalid_configs_are_rejected(
    #[case] harts: Vec<usize>,
    #[case] layout: Vec<MemoryRegionConfig>,
) {
    let elf = binary();
    let result = SimulatorConfig::new("RV64I", "msu", "", harts, layout, elf.path(), None);
    assert!(matches!(result, Err(HammerError::InvalidConfig(_))));
}

#[test]
fn adjacent_regions_are_accepted() {
    let elf = binary();
    let config = SimulatorConfig::builder(elf.path())
        .memory_layout(regions(&[(0x1000, 0x1000), (0x2000, 0x1000)]))
        .build()
        .unwrap();
    assert_eq!(config.memory_layout().len(), 2);
}

#[test]
fn missing_binary_is_a_config_error() {
    let result = SimulatorConfig::builder("/nonexistent/hammer/target.elf").build();
    assert!(matches!(result, Err(HammerError::InvalidConfig(msg)) if msg.contains("target.elf")));
}

#[test]
fn json_defaults_fill_absent_fields() {
    let elf = binary();
    let json = format!(
        r#"{{ "target_binary": {} }}"#,
        serde_json::to_string(elf.path()).unwrap()
    );
    let config = SimulatorConfig::from_json_str(&json).unwrap();

    assert_eq!(config.isa(), "RV64IMAC");
    assert_eq!(config.privilege_levels(), "msu");
    assert_eq!(config.vector_arch(), "");
    assert_eq!(config.hart_ids(), &[0]);
    assert_eq!(config.memory_layout().len(), 1);
    assert_eq!(config.start_pc(), None);
    assert!(config.misaligned());
}

#[test]
fn json_validation_runs_on_deserialize() {
    let elf = binary();
    let json = format!(
        r#"{{ "hart_ids": [], "target_binary": {} }}"#,
        serde_json::to_string(elf.path()).unwrap()
    );
    assert!(matches!(
        SimulatorConfig::from_json_str(&json),
        Err(HammerError::InvalidConfig(_))
    ));
}

#[test]
fn json_rejects_unknown_fields() {
    let elf = binary();
    let json = format!(
        r#"{{ "target_binary": {}, "harts": 4 }}"#,
        serde_json::to_string(elf.path()).unwrap()
    );
    assert!(SimulatorConfig::from_json_str(&json).is_err());
}

#[test]
fn json_file_round_trips_through_serialize() {
    let elf = binary();
    let config = SimulatorConfig::builder(elf.path())
        .isa("RV32IMC")
        .privilege_levels("mu")
        .hart_ids(vec![2, 3])
        .memory_layout(regions(&[(0x8000_0000, 0x4000)]))
        .start_pc(0x8000_0100)
        .misaligned(false)
        .build()
        .unwrap();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
        .unwrap();

    assert_eq!(SimulatorConfig::from_json_file(file.path()).unwrap(), config);
}

#[test]
fn unreadable_json_file_is_io() {
    assert!(matches!(
        SimulatorConfig::from_json_file("/nonexistent/hammer/config.json"),
        Err(HammerError::Io { .. })
    ));
}
