//! `SerializerDriver` end to end: load from a source file into a segment,
//! reattach without re-serializing, force a reload, and release on error
//! (spec §4.8, §6.4).

use std::collections::HashMap;
use std::io::Write;
use wisent::{validate, LoadOptions, PipelineSpec, SerializerDriver};

fn write_temp_json(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn load_builds_a_valid_image_and_registers_the_segment() {
    let file = write_temp_json(r#"{"a": [1, 2, 3]}"#);
    let mut driver = SerializerDriver::in_memory();
    let csv_root = wisent::driver::default_csv_root(file.path());
    let opts = LoadOptions::default();
    let pipelines: PipelineSpec = HashMap::new();

    let handle = driver.load(file.path(), "doc-a", &csv_root, &opts, &pipelines).unwrap();
    assert!(validate(&handle.image).unwrap().is_empty());
    assert!(driver.registry().is_loaded("doc-a"));
    assert!(handle.warnings.is_empty());
}

#[test]
fn a_second_load_without_force_reload_reattaches_the_existing_segment() {
    let file = write_temp_json("[1, 2, 3, 4, 5]");
    let mut driver = SerializerDriver::in_memory();
    let csv_root = wisent::driver::default_csv_root(file.path());
    let opts = LoadOptions::default();
    let pipelines: PipelineSpec = HashMap::new();

    let first = driver.load(file.path(), "doc-b", &csv_root, &opts, &pipelines).unwrap();
    let second = driver.load(file.path(), "doc-b", &csv_root, &opts, &pipelines).unwrap();
    assert_eq!(first.image.as_bytes(), second.image.as_bytes());
}

#[test]
fn force_reload_rebuilds_even_though_the_segment_is_already_loaded() {
    let file = write_temp_json("[1, 2, 3, 4, 5]");
    let mut driver = SerializerDriver::in_memory();
    let csv_root = wisent::driver::default_csv_root(file.path());
    let pipelines: PipelineSpec = HashMap::new();

    driver.load(file.path(), "doc-c", &csv_root, &LoadOptions::default(), &pipelines).unwrap();
    let reload_opts = LoadOptions { force_reload: true, ..LoadOptions::default() };
    let reloaded = driver.load(file.path(), "doc-c", &csv_root, &reload_opts, &pipelines).unwrap();
    assert!(validate(&reloaded.image).unwrap().is_empty());
}

#[test]
fn free_drops_the_segment_entirely() {
    let file = write_temp_json("[1, 2, 3]");
    let mut driver = SerializerDriver::in_memory();
    let csv_root = wisent::driver::default_csv_root(file.path());
    let pipelines: PipelineSpec = HashMap::new();
    driver.load(file.path(), "doc-d", &csv_root, &LoadOptions::default(), &pipelines).unwrap();
    driver.free("doc-d");
    assert!(!driver.registry().exists("doc-d"));
}

#[test]
fn a_malformed_source_document_releases_the_segment_and_returns_an_error() {
    let file = write_temp_json("{not valid json");
    let mut driver = SerializerDriver::in_memory();
    let csv_root = wisent::driver::default_csv_root(file.path());
    let pipelines: PipelineSpec = HashMap::new();
    let err = driver.load(file.path(), "doc-e", &csv_root, &LoadOptions::default(), &pipelines).unwrap_err();
    assert!(matches!(err, wisent::WisentError::Parse(_)) || matches!(err, wisent::WisentError::Io(_)));
    assert!(!driver.registry().exists("doc-e"));
}
