//! # Configuration Tests
//!
//! Tests for configuration defaults, JSON deserialization and validation.

use std::io::Write;

use pretty_assertions::assert_eq;
use smtsim_core::common::error::ConfigError;
use smtsim_core::config::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.general.num_cores, 1);
    assert_eq!(config.core.max_contexts, 2);
    assert_eq!(config.core.rename_registers, 64);
    assert_eq!(config.core.issue_queue_size, 32);
    assert!(!config.core.inorder_issue);
    assert_eq!(config.core.mispredict_penalty, 3);
    assert!(config.slots.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_slot_config_defaults() {
    let slot = SlotConfig::default();
    assert_eq!(slot.rob_size, 32);
    assert_eq!(slot.lsq_size, 16);
    assert_eq!(slot.ifq_size, 8);
    assert_eq!(slot.ras_size, 16);
}

#[test]
fn test_memory_config_defaults() {
    let memory = MemoryConfig::default();
    assert_eq!(memory.base, 0);
    assert_eq!(memory.size, 64 * 1024);
    assert_eq!(memory.hit_latency, 2);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = Config::from_json(r#"{ "core": { "issue_width": 2 }, "slot": { "rob_size": 8 } }"#)
        .unwrap();
    assert_eq!(config.core.issue_width, 2);
    assert_eq!(config.core.fetch_width, 4);
    assert_eq!(config.slot.rob_size, 8);
    assert_eq!(config.slot.lsq_size, 16);
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{
            "general": {{ "num_cores": 2, "max_cycles": 5000 }},
            "core": {{ "max_contexts": 3, "inorder_issue": true }},
            "slots": [ {{ "rob_size": 64 }} ],
            "fu": {{ "int_div": {{ "count": 2, "latency": 10 }} }}
        }}"#
    )
    .unwrap();

    let json = std::fs::read_to_string(file.path()).unwrap();
    let config = Config::from_json(&json).unwrap();
    assert_eq!(config.general.num_cores, 2);
    assert_eq!(config.general.max_cycles, 5000);
    assert!(config.core.inorder_issue);
    assert_eq!(config.fu.int_div, FuUnitConfig { count: 2, latency: 10 });
    assert_eq!(config.fu.int_alu.count, 4);
}

#[test]
fn test_slot_template_falls_back_to_default() {
    let config =
        Config::from_json(r#"{ "core": { "max_contexts": 3 }, "slots": [ { "rob_size": 64 } ] }"#)
            .unwrap();
    assert_eq!(config.slot_template(0).rob_size, 64);
    assert_eq!(config.slot_template(0).lsq_size, 16);
    assert_eq!(config.slot_template(1), &config.slot);
    assert_eq!(config.slot_template(2), &config.slot);
}

#[test]
fn test_zero_sizes_rejected() {
    let err = Config::from_json(r#"{ "slot": { "rob_size": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Zero("slot.rob_size")));

    let err = Config::from_json(r#"{ "core": { "commit_width": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Zero("core.commit_width")));

    let mut config = Config::default();
    config.fu.mem_port.count = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Zero(_))));
}

#[test]
fn test_zero_rename_registers_rejected() {
    let err = Config::from_json(r#"{ "core": { "rename_registers": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Zero("core.rename_registers")));
}

#[test]
fn test_register_bank_size_bounded() {
    let mut config = Config::default();
    config.core.max_contexts = 2047;
    config.core.rename_registers = 32;
    assert!(config.validate().is_ok());

    config.core.rename_registers = 33;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::RegisterFile {
            max_contexts: 2047,
            rename_registers: 33
        })
    ));

    config.core.max_contexts = usize::MAX;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::RegisterFile { .. })
    ));
}

#[test]
fn test_too_many_slot_overrides() {
    let err = Config::from_json(r#"{ "core": { "max_contexts": 1 }, "slots": [ {}, {} ] }"#)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::TooManySlots {
            overrides: 2,
            max_contexts: 1
        }
    ));
}

#[test]
fn test_memory_region_overflow() {
    let mut config = Config::default();
    config.memory.base = u64::MAX - 16;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MemoryRegion { .. })
    ));
}

#[test]
fn test_malformed_json() {
    let err = Config::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("failed to parse configuration"));
}
