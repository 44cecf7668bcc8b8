// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Turns a flat `SourceEvent` stream into an owned tree that `Counter` and
//! `Flattener` can each walk independently.
//!
//! The format's two-pass design (count sizes, then write bytes) only works
//! if both passes see the exact same structure. Re-running a hand-rolled
//! stack machine over the flat event list twice risks the two copies
//! drifting apart one edge case at a time; building the tree once and
//! handing both passes the same `&DocNode` makes that class of bug
//! impossible instead of merely unlikely. CSV expansion (spec §4.5's Table
//! wrapper) is folded into this same construction step for the same
//! reason: the wrapper's shape is built once, here, rather than described
//! twice as parallel counting/writing formulas.

use crate::column::{ColumnEncoder, ColumnMetaData, ColumnValue, PageType};
use crate::codec::pipeline::CompressionPipeline;
use crate::error::{Result, WisentError};
use crate::source::csv_source;
use crate::source::{LeafValue, SourceEvent};
use crate::value::Value;
use std::collections::HashMap;
use std::path::Path;

/// One node of the materialized document tree. `Expr` stands for anything
/// that becomes a `ComplexExpression` in the image (an object, an array, or
/// a single key wrapping its value); `Leaf` is a value that lives in the
/// argument-value array.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Expr { head: String, children: Vec<DocNode> },
    Leaf(Value),
}

impl DocNode {
    pub fn is_leaf_of_same_tag(&self, other: &DocNode) -> bool {
        match (self, other) {
            (DocNode::Leaf(a), DocNode::Leaf(b)) => a.type_tag() == b.type_tag(),
            _ => false,
        }
    }
}

pub struct BuildOptions<'a> {
    pub disable_csv: bool,
    pub csv_root: &'a Path,
    pub pipeline_map: &'a HashMap<String, CompressionPipeline>,
}

pub fn build(events: &[SourceEvent], opts: &BuildOptions) -> Result<DocNode> {
    let mut pos = 0usize;
    let node = parse_node(events, &mut pos, opts)?;
    if pos != events.len() {
        return Err(WisentError::Parse("trailing events after top-level value".into()));
    }
    Ok(node)
}

fn parse_node(events: &[SourceEvent], pos: &mut usize, opts: &BuildOptions) -> Result<DocNode> {
    let event = events.get(*pos).ok_or_else(|| WisentError::Parse("unexpected end of event stream".into()))?;
    match event {
        SourceEvent::ObjectStart => {
            *pos += 1;
            let mut children = Vec::new();
            loop {
                match events.get(*pos) {
                    Some(SourceEvent::ObjectEnd) => {
                        *pos += 1;
                        break;
                    }
                    Some(SourceEvent::Key(key)) => {
                        let key = key.clone();
                        *pos += 1;
                        let value = parse_node(events, pos, opts)?;
                        children.push(DocNode::Expr { head: key, children: vec![value] });
                    }
                    _ => return Err(WisentError::Parse("expected key or object end".into())),
                }
            }
            Ok(DocNode::Expr { head: "Object".to_string(), children })
        }
        SourceEvent::ArrayStart => {
            *pos += 1;
            let mut children = Vec::new();
            loop {
                match events.get(*pos) {
                    Some(SourceEvent::ArrayEnd) => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => children.push(parse_node(events, pos, opts)?),
                    None => return Err(WisentError::Parse("unterminated array".into())),
                }
            }
            Ok(DocNode::Expr { head: "List".to_string(), children })
        }
        SourceEvent::Value(leaf) => {
            *pos += 1;
            match leaf {
                LeafValue::String(s) if !opts.disable_csv && s.ends_with(".csv") => {
                    expand_csv(s, opts)
                }
                other => Ok(DocNode::Leaf(leaf_to_value(other))),
            }
        }
        SourceEvent::ObjectEnd | SourceEvent::ArrayEnd | SourceEvent::Key(_) => {
            Err(WisentError::Parse("unexpected structural event".into()))
        }
    }
}

fn leaf_to_value(leaf: &LeafValue) -> Value {
    match leaf {
        LeafValue::Bool(b) => Value::Bool(*b),
        LeafValue::Long(n) => Value::Long(*n),
        LeafValue::Double(d) => Value::Double(*d),
        LeafValue::String(s) => Value::String(s.clone()),
        LeafValue::Symbol(s) => Value::Symbol(s.clone()),
        LeafValue::Null => Value::Bool(false),
    }
}

/// Expands a `name.csv` leaf into a `Table` wrapper: one child expression
/// per column, and (for columns named in the pipeline map) a `ColumnMetaData`
/// subtree built from the real `ColumnEncoder` + `CompressionPipeline` output
/// instead of a placeholder, per spec §4.5/§4.4.
fn expand_csv(name: &str, opts: &BuildOptions) -> Result<DocNode> {
    let path = opts.csv_root.join(name);
    let table = csv_source::load(&path)?;

    let mut columns = Vec::with_capacity(table.column_names.len());
    for (col_name, values) in table.column_names.iter().zip(table.columns.iter()) {
        let child = if let Some(pipeline) = opts.pipeline_map.get(col_name) {
            column_metadata_node(col_name, values, pipeline)?
        } else {
            let leaves = values.iter().map(|v| DocNode::Leaf(column_value_to_value(v))).collect();
            DocNode::Expr { head: col_name.clone(), children: leaves }
        };
        columns.push(child);
    }
    Ok(DocNode::Expr { head: "Table".to_string(), children: columns })
}

fn column_value_to_value(value: &ColumnValue) -> Value {
    match value {
        ColumnValue::Int64(n) => Value::Long(*n),
        ColumnValue::Double(d) => Value::Double(*d),
        ColumnValue::Boolean(b) => Value::Bool(*b),
        ColumnValue::ByteArray(bytes) => Value::ByteArray(bytes.clone()),
        ColumnValue::Null => Value::Bool(false),
    }
}

fn column_metadata_node(col_name: &str, values: &[ColumnValue], pipeline: &CompressionPipeline) -> Result<DocNode> {
    let (page_buffers, mut meta) = ColumnEncoder::encode(col_name, values)?;
    meta.encoding_type = crate::column::EncodingType::Plain;
    meta.compression_pipeline = pipeline.tags().into_iter().map(str::to_string).collect();

    let mut total_compressed = 0u64;
    for (page, raw) in meta.pages.iter_mut().zip(page_buffers.iter()) {
        let compressed = pipeline.compress(raw)?;
        page.compressed_size = compressed.len() as u64;
        page.byte_array = compressed;
        total_compressed += page.compressed_size;
    }
    meta.total_compressed = total_compressed;

    Ok(metadata_to_node(&meta))
}

fn kv(key: &str, value: Value) -> DocNode {
    DocNode::Expr { head: key.to_string(), children: vec![DocNode::Leaf(value)] }
}

fn metadata_to_node(meta: &ColumnMetaData) -> DocNode {
    let mut children = vec![
        kv("column_name", Value::String(meta.column_name.clone())),
        kv("total_values", Value::Long(meta.total_values as i64)),
        kv("total_uncompressed", Value::Long(meta.total_uncompressed as i64)),
        kv("total_compressed", Value::Long(meta.total_compressed as i64)),
        kv("physical_type", Value::Symbol(format!("{:?}", meta.physical_type))),
        kv("encoding_type", Value::Symbol(format!("{:?}", meta.encoding_type))),
        kv(
            "compression_pipeline",
            Value::Symbol(meta.compression_pipeline.join(",")),
        ),
    ];
    for page in &meta.pages {
        children.push(page_to_node(page));
    }
    DocNode::Expr { head: "ColumnMetaData".to_string(), children }
}

fn page_to_node(page: &crate::column::PageHeader) -> DocNode {
    let page_type_name = match page.page_type {
        PageType::Data => "Data",
        PageType::Dictionary => "Dictionary",
    };
    DocNode::Expr {
        head: "PageHeader".to_string(),
        children: vec![
            kv("page_type", Value::Symbol(page_type_name.to_string())),
            kv("num_values", Value::Long(page.num_values as i64)),
            kv("first_row_index", Value::Long(page.first_row_index as i64)),
            kv("uncompressed_size", Value::Long(page.uncompressed_size as i64)),
            kv("compressed_size", Value::Long(page.compressed_size as i64)),
            kv("null_count", Value::Long(page.stats.null_count as i64)),
            kv("distinct_count", Value::Long(page.stats.distinct_count as i64)),
            kv("min", Value::ByteArray(page.stats.min.clone().unwrap_or_default())),
            kv("max", Value::ByteArray(page.stats.max.clone().unwrap_or_default())),
            kv("is_dict_page", Value::Bool(page.is_dict_page)),
            kv("byte_array", Value::ByteArray(page.byte_array.clone())),
        ],
    }
}
