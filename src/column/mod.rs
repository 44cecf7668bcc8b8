// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Columnar paging for a typed column (spec §3.4, §4.4).
//!
//! `ColumnEncoder::encode` turns a slice of `ColumnValue`s into page byte
//! buffers plus a `ColumnMetaData` describing them; the caller (usually
//! `Flattener`, via `SerializerDriver`) then runs each page's bytes through
//! a `CompressionPipeline` and fills in `PageHeader::compressed_size` and
//! `byte_array`. Keeping paging and compression as separate steps mirrors
//! the way the format documents them as two stages of one pipeline rather
//! than one monolithic "compress this column" call.

use crate::error::{Result, WisentError};
use std::collections::HashSet;

pub const DEFAULT_PAGE_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    Int64,
    Double,
    ByteArray,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingType {
    Plain,
    Rle,
    BitPacked,
    Dictionary,
    Delta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Data,
    Dictionary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int64(i64),
    Double(f64),
    ByteArray(Vec<u8>),
    Boolean(bool),
    Null,
}

impl ColumnValue {
    fn physical_type(&self) -> Option<PhysicalType> {
        match self {
            ColumnValue::Int64(_) => Some(PhysicalType::Int64),
            ColumnValue::Double(_) => Some(PhysicalType::Double),
            ColumnValue::ByteArray(_) => Some(PhysicalType::ByteArray),
            ColumnValue::Boolean(_) => Some(PhysicalType::Boolean),
            ColumnValue::Null => None,
        }
    }
}

/// Ordering and equality over the subset of `ColumnValue` a page can hold,
/// used only to compute per-page min/max/distinct statistics.
#[derive(Debug, Clone, PartialEq)]
enum StatValue {
    Int64(i64),
    Double(f64),
    ByteArray(Vec<u8>),
    Boolean(bool),
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub null_count: u64,
    pub distinct_count: u64,
    pub min: Option<Vec<u8>>,
    pub max: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct PageHeader {
    pub page_type: PageType,
    pub num_values: u64,
    pub first_row_index: u64,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    pub stats: Statistics,
    pub is_dict_page: bool,
    pub byte_array: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ColumnMetaData {
    pub column_name: String,
    pub total_values: u64,
    pub total_uncompressed: u64,
    pub total_compressed: u64,
    pub physical_type: PhysicalType,
    pub encoding_type: EncodingType,
    pub compression_pipeline: Vec<String>,
    pub pages: Vec<PageHeader>,
}

pub struct ColumnEncoder;

impl ColumnEncoder {
    /// Pages `values` using the non-null values' common physical type.
    /// Returns raw (uncompressed) page byte buffers alongside the metadata
    /// describing them; compression is applied by the caller.
    pub fn encode(column_name: &str, values: &[ColumnValue]) -> Result<(Vec<Vec<u8>>, ColumnMetaData)> {
        let physical_type = values
            .iter()
            .find_map(ColumnValue::physical_type)
            .ok_or(WisentError::UnsupportedPhysicalType)?;

        let mut pages = Vec::new();
        let mut page_buffers = Vec::new();
        let mut first_row_index = 0u64;

        let mut current_bytes: Vec<u8> = Vec::new();
        let mut current_values: Vec<ColumnValue> = Vec::new();

        let flush = |buf: &mut Vec<u8>,
                     vals: &mut Vec<ColumnValue>,
                     first_row: &mut u64,
                     pages: &mut Vec<PageHeader>,
                     page_buffers: &mut Vec<Vec<u8>>| {
            if vals.is_empty() {
                return;
            }
            let stats = compute_statistics(vals, physical_type);
            pages.push(PageHeader {
                page_type: PageType::Data,
                num_values: vals.len() as u64,
                first_row_index: *first_row,
                uncompressed_size: buf.len() as u64,
                compressed_size: 0,
                stats,
                is_dict_page: false,
                byte_array: Vec::new(),
            });
            *first_row += vals.len() as u64;
            page_buffers.push(std::mem::take(buf));
            vals.clear();
        };

        for value in values {
            let encoded = encode_value(value, physical_type)?;
            if !current_bytes.is_empty() && current_bytes.len() + encoded.len() > DEFAULT_PAGE_SIZE {
                flush(
                    &mut current_bytes,
                    &mut current_values,
                    &mut first_row_index,
                    &mut pages,
                    &mut page_buffers,
                );
            }
            current_bytes.extend(encoded);
            current_values.push(value.clone());
        }
        flush(
            &mut current_bytes,
            &mut current_values,
            &mut first_row_index,
            &mut pages,
            &mut page_buffers,
        );

        let total_uncompressed: u64 = pages.iter().map(|p| p.uncompressed_size).sum();
        let meta = ColumnMetaData {
            column_name: column_name.to_string(),
            total_values: values.len() as u64,
            total_uncompressed,
            total_compressed: 0,
            physical_type,
            encoding_type: EncodingType::Plain,
            compression_pipeline: Vec::new(),
            pages,
        };
        Ok((page_buffers, meta))
    }
}

fn encode_value(value: &ColumnValue, physical_type: PhysicalType) -> Result<Vec<u8>> {
    match (value, physical_type) {
        (ColumnValue::Int64(v), PhysicalType::Int64) => Ok(v.to_le_bytes().to_vec()),
        (ColumnValue::Double(v), PhysicalType::Double) => Ok(v.to_le_bytes().to_vec()),
        (ColumnValue::Boolean(v), PhysicalType::Boolean) => Ok(vec![*v as u8]),
        (ColumnValue::ByteArray(bytes), PhysicalType::ByteArray) => {
            let mut out = Vec::with_capacity(4 + bytes.len());
            out.extend((bytes.len() as u32).to_le_bytes());
            out.extend(bytes);
            Ok(out)
        }
        (ColumnValue::Null, _) => Ok(Vec::new()),
        _ => Err(WisentError::UnsupportedPhysicalType),
    }
}

fn compute_statistics(values: &[ColumnValue], physical_type: PhysicalType) -> Statistics {
    let mut null_count = 0u64;
    let mut distinct: HashSet<Vec<u8>> = HashSet::new();
    let mut stat_values: Vec<StatValue> = Vec::new();

    for value in values {
        match value {
            ColumnValue::Null => null_count += 1,
            ColumnValue::Int64(v) => {
                distinct.insert(v.to_le_bytes().to_vec());
                stat_values.push(StatValue::Int64(*v));
            }
            ColumnValue::Double(v) => {
                distinct.insert(v.to_le_bytes().to_vec());
                stat_values.push(StatValue::Double(*v));
            }
            ColumnValue::Boolean(v) => {
                distinct.insert(vec![*v as u8]);
                stat_values.push(StatValue::Boolean(*v));
            }
            ColumnValue::ByteArray(bytes) => {
                distinct.insert(bytes.clone());
                stat_values.push(StatValue::ByteArray(bytes.clone()));
            }
        }
    }

    let (min, max) = match physical_type {
        PhysicalType::Int64 => {
            match min_max_by(&stat_values, |v| match v {
                StatValue::Int64(x) => Some(*x),
                _ => None,
            }) {
                Some((lo, hi)) => (Some(lo.to_le_bytes().to_vec()), Some(hi.to_le_bytes().to_vec())),
                None => (None, None),
            }
        }
        PhysicalType::Double => {
            let mut lo: Option<f64> = None;
            let mut hi: Option<f64> = None;
            for v in &stat_values {
                if let StatValue::Double(x) = v {
                    lo = Some(lo.map_or(*x, |cur: f64| cur.min(*x)));
                    hi = Some(hi.map_or(*x, |cur: f64| cur.max(*x)));
                }
            }
            (lo.map(|v| v.to_le_bytes().to_vec()), hi.map(|v| v.to_le_bytes().to_vec()))
        }
        PhysicalType::Boolean => {
            let any_false = stat_values.iter().any(|v| matches!(v, StatValue::Boolean(false)));
            let any_true = stat_values.iter().any(|v| matches!(v, StatValue::Boolean(true)));
            (
                any_false.then(|| vec![0u8]).or_else(|| any_true.then(|| vec![1u8])),
                any_true.then(|| vec![1u8]).or_else(|| any_false.then(|| vec![0u8])),
            )
        }
        PhysicalType::ByteArray => {
            let mut lo: Option<&Vec<u8>> = None;
            let mut hi: Option<&Vec<u8>> = None;
            for v in &stat_values {
                if let StatValue::ByteArray(b) = v {
                    if lo.is_none_or(|cur| b < cur) {
                        lo = Some(b);
                    }
                    if hi.is_none_or(|cur| b > cur) {
                        hi = Some(b);
                    }
                }
            }
            (lo.cloned(), hi.cloned())
        }
    };

    Statistics { null_count, distinct_count: distinct.len() as u64, min, max }
}

fn min_max_by<T: PartialOrd + Copy>(values: &[StatValue], extract: impl Fn(&StatValue) -> Option<T>) -> Option<(T, T)> {
    let mut iter = values.iter().filter_map(extract);
    let first = iter.next()?;
    let mut lo = first;
    let mut hi = first;
    for v in iter {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    Some((lo, hi))
}
