//! `ColumnEncoder` paging and statistics, beyond what's already covered by
//! the crate's own inline unit tests.

use wisent::column::{ColumnEncoder, ColumnValue, PhysicalType};
use wisent::WisentError;

#[test]
fn mixed_physical_types_are_rejected() {
    let values = vec![ColumnValue::Int64(1), ColumnValue::Boolean(true)];
    let err = ColumnEncoder::encode("mixed", &values).unwrap_err();
    assert!(matches!(err, WisentError::UnsupportedPhysicalType));
}

#[test]
fn boolean_statistics_track_both_extremes_when_present() {
    let values = vec![ColumnValue::Boolean(false), ColumnValue::Boolean(true), ColumnValue::Boolean(false)];
    let (_, meta) = ColumnEncoder::encode("flags", &values).unwrap();
    let stats = &meta.pages[0].stats;
    assert_eq!(stats.min, Some(vec![0u8]));
    assert_eq!(stats.max, Some(vec![1u8]));
    assert_eq!(stats.distinct_count, 2);
}

#[test]
fn a_large_byte_array_column_splits_across_multiple_pages() {
    let chunk = vec![0xABu8; 1024];
    let values: Vec<ColumnValue> = (0..2048).map(|_| ColumnValue::ByteArray(chunk.clone())).collect();
    let (pages, meta) = ColumnEncoder::encode("blobs", &values).unwrap();
    assert_eq!(meta.physical_type, PhysicalType::ByteArray);
    assert!(pages.len() > 1, "2MB of ByteArray content should not fit in one 1MB page");
    let total_values: u64 = meta.pages.iter().map(|p| p.num_values).sum();
    assert_eq!(total_values, 2048);
}

#[test]
fn an_empty_column_has_no_type_to_infer() {
    let err = ColumnEncoder::encode("empty", &[]).unwrap_err();
    assert!(matches!(err, WisentError::UnsupportedPhysicalType));
}
