//! Dictionary encoding (spec §4.6 step 3, scenario S6): a numeric span with
//! few distinct values reads back identically whether or not dict-encoding
//! was on, and actually shrinks the argument region when it kicks in.

use crate::common;
use wisent::{validate, Cursor, CounterOptions, Value};

#[test]
fn s6_low_cardinality_numeric_span_dict_encodes_and_decodes_correctly() {
    let values: Vec<i64> = (0..40).map(|i| (i % 3) as i64).collect();
    let text = format!("[{}]", values.iter().map(i64::to_string).collect::<Vec<_>>().join(","));

    let plain = common::flatten_json(&text, &CounterOptions::default());
    let dict_opts = CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() };
    let dict = common::flatten_json(&text, &dict_opts);

    assert!(
        dict.header().dictionary_bytes > 0,
        "three distinct values across 40 elements should meet the dictionary threshold"
    );
    assert_eq!(plain.header().dictionary_bytes, 0);

    let plain_root = Cursor::root(&plain);
    let dict_root = Cursor::root(&dict);
    for i in 0..values.len() as u64 {
        assert_eq!(plain_root.child(i).unwrap(), Value::Long(values[i as usize]));
        assert_eq!(dict_root.child(i).unwrap(), Value::Long(values[i as usize]));
    }
}

#[test]
fn high_cardinality_numeric_span_does_not_dict_encode() {
    let values: Vec<i64> = (0..40).collect();
    let text = format!("[{}]", values.iter().map(i64::to_string).collect::<Vec<_>>().join(","));
    let dict_opts = CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() };
    let image = common::flatten_json(&text, &dict_opts);
    assert_eq!(image.header().dictionary_bytes, 0, "40 distinct values should not dict-encode");
}

#[test]
fn a_run_past_the_rle_threshold_with_few_distinct_values_sets_both_bits_and_round_trips() {
    // 20 elements clears RLE_MIN (13); only 2 distinct values clears the
    // dict-encoding cardinality threshold, so this run sets RLE_BIT and
    // DICT_BIT on the same control byte (spec §3.1/§6.3).
    let values: Vec<i64> = (0..20).map(|i| if i % 2 == 0 { 9 } else { 4 }).collect();
    let text = format!("[{}]", values.iter().map(i64::to_string).collect::<Vec<_>>().join(","));
    let opts = CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() };
    let image = common::flatten_json(&text, &opts);

    assert!(image.header().dictionary_bytes > 0, "2 distinct values should dict-encode");
    assert!(validate(&image).unwrap().is_empty());

    let root = Cursor::root(&image);
    for (i, want) in values.iter().enumerate() {
        assert_eq!(root.child(i as u64).unwrap(), Value::Long(*want));
    }
}

#[test]
fn dict_encoding_shrinks_the_argument_region_for_a_long_low_cardinality_run() {
    let values: Vec<i64> = (0..200).map(|i| (i % 4) as i64).collect();
    let text = format!("[{}]", values.iter().map(i64::to_string).collect::<Vec<_>>().join(","));
    let plain = common::flatten_json(&text, &CounterOptions::default());
    let dict_opts = CounterOptions { dict_encode_numeric: true, ..CounterOptions::default() };
    let dict = common::flatten_json(&text, &dict_opts);
    assert!(dict.header().argument_bytes < plain.header().argument_bytes);
}
