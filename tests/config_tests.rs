// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the configuration model and store

use barcodetoweb::storage::{self, ConfigStore, FileConfigStore};
use barcodetoweb::{Configuration, LaunchTarget};

const PAYLOAD: &str = r#"{"t":"_bc2w-conf","a":[
    {"n":"Parcels","u":"https://parcels.example/track?lang=en","p":"id","r":"^pkg-[a-z0-9]+$","rf":"i","t":"wv"},
    {"n":"Anything","u":"https://any.example/","t":"n"}
]}"#;

#[test]
fn test_defaults_resolved_at_load() {
    let config = Configuration::from_json(PAYLOAD).expect("valid json");
    let anything = &config.activities()[1];

    assert_eq!(anything.param_name, "data");
    assert_eq!(anything.pattern.source(), "^.*$");
    assert_eq!(anything.pattern.flags(), "g");
    assert_eq!(anything.target, LaunchTarget::External);
}

#[test]
fn test_flags_apply_to_matching() {
    let config = Configuration::from_json(PAYLOAD).expect("valid json");
    let parcels = &config.activities()[0];

    assert_eq!(parcels.pattern.test("PKG-42AB"), Some(true));
    assert_eq!(parcels.pattern.test("box-1"), Some(false));
}

#[test]
fn test_only_tagged_payloads_are_configurations() {
    assert!(Configuration::from_scan(PAYLOAD).is_some());
    assert!(Configuration::from_scan(r#"{"a":[]}"#).is_none());
    assert!(Configuration::from_scan("pkg-1").is_none());
}

#[test]
fn test_stored_configuration_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Configuration::from_json(PAYLOAD).expect("valid json");

    {
        let store = FileConfigStore::new(dir.path());
        storage::save_configuration(&store, &config).expect("save");
    }

    let reopened = FileConfigStore::new(dir.path());
    assert_eq!(storage::load_configuration(&reopened), Some(config));
}

#[test]
fn test_scanned_json_is_stored_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileConfigStore::new(dir.path());
    let scanned = r#"{"t":"_bc2w-conf","v":3,"a":[{"n":"A","u":"https://a.example","extra":{"k":[1,2]}}]}"#;
    let config = Configuration::from_scan(scanned).expect("tagged payload");

    storage::save_configuration(&store, &config).expect("save");
    let raw = store.read("config").expect("read").expect("slot written");

    let stored: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    let original: serde_json::Value = serde_json::from_str(scanned).expect("valid json");
    assert_eq!(stored, original);
}

#[test]
fn test_corrupt_store_degrades_to_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileConfigStore::new(dir.path());
    store.write("config", "{ not json").expect("write");

    assert_eq!(storage::load_configuration(&store), None);
}
