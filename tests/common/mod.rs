//! Shared test fixtures: build a document tree and flatten it in one call
//! so individual test files can focus on what they're asserting.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use wisent::codec::pipeline::CompressionPipeline;
use wisent::{build_document, BuildOptions, Counter, CounterOptions, Flattener, Image};

pub fn flatten_json(text: &str, opts: &CounterOptions) -> Image {
    flatten_json_with_csv_root(text, opts, Path::new("."), true, &HashMap::new())
}

pub fn flatten_json_with_csv_root(
    text: &str,
    opts: &CounterOptions,
    csv_root: &Path,
    disable_csv: bool,
    pipeline_map: &HashMap<String, CompressionPipeline>,
) -> Image {
    let events = wisent::source::json_source::parse_str(text).unwrap();
    let build_opts = BuildOptions { disable_csv, csv_root, pipeline_map };
    let node = build_document(&events, &build_opts).unwrap();
    let counted = Counter::count(&node, opts);
    Flattener::flatten(&node, counted.sizes, opts).unwrap()
}
