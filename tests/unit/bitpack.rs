//! Argument-slot bit-packing math (spec §4.6 steps 2-4): how many 8-byte
//! slots a run of values occupies once its width and dict-encoding are
//! decided.

use wisent::codec::pipeline::CompressionPipeline;
use wisent::value::TypeTag;
use wisent::{BuildOptions, Counter, CounterOptions};
use std::collections::HashMap;
use std::path::Path;

fn count(text: &str, opts: &CounterOptions) -> wisent::CounterOutput {
    let events = wisent::source::json_source::parse_str(text).unwrap();
    let map: HashMap<String, CompressionPipeline> = HashMap::new();
    let root = Path::new(".");
    let build_opts = BuildOptions { disable_csv: true, csv_root: root, pipeline_map: &map };
    let node = wisent::build_document(&events, &build_opts).unwrap();
    Counter::count(&node, opts)
}

#[test]
fn element_widths_match_how_many_values_fit_in_an_eight_byte_slot() {
    assert_eq!(TypeTag::Short.element_width(), 2);
    assert_eq!(TypeTag::Int.element_width(), 4);
    assert_eq!(TypeTag::Long.element_width(), 8);
    assert_eq!(8 / TypeTag::Short.element_width(), 4);
    assert_eq!(8 / TypeTag::Int.element_width(), 2);
    assert_eq!(8 / TypeTag::Long.element_width(), 1);
}

#[test]
fn longs_pack_one_per_slot_with_no_dictionary() {
    let opts = CounterOptions::default();
    let out = count("[1,2,3,4,5,6,7,8,9,10,11]", &opts);
    // 11 distinct Long leaves, one 8-byte slot each, no dict entries.
    assert_eq!(out.sizes.argument_count, 11);
    assert_eq!(out.sizes.argument_bytes, 11 * 8);
    assert_eq!(out.sizes.dictionary_bytes, 0);
}

#[test]
fn a_long_run_past_the_rle_threshold_still_reserves_one_slot_per_value() {
    // RLE collapses the type-byte run-length, not the argument payload:
    // the span still stores one argument slot per element.
    let values: Vec<String> = (0..20).map(|i| (i % 3).to_string()).collect();
    let text = format!("[{}]", values.join(","));
    let opts = CounterOptions::default();
    let out = count(&text, &opts);
    assert_eq!(out.sizes.argument_count, 20);
    assert_eq!(out.sizes.argument_bytes, 20 * 8);
}

#[test]
fn dict_encoding_numeric_values_adds_a_base_slot_and_packed_offsets() {
    // 20 values drawn from only 2 distinct numbers: well under the
    // half-cardinality threshold, so dict-encoding kicks in. Offsets are
    // 1 byte wide (Offset8, since the dictionary has far fewer than 256
    // entries), giving 8 offsets per slot plus one base-index slot.
    let values: Vec<String> = (0..20).map(|i| (i % 2).to_string()).collect();
    let text = format!("[{}]", values.join(","));
    let opts = CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() };
    let out = count(&text, &opts);
    assert_eq!(out.sizes.dictionary_bytes, 2 * 8);
    let offset_slots = (20u64 + 7) / 8;
    assert_eq!(out.sizes.argument_bytes, (offset_slots + 1) * 8);
}
