// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Default JSON tokenizer: walks a `serde_json::Value` tree depth-first and
//! materializes the full `SourceEvent` sequence up front. Counter and
//! Flattener each need an independent pass over the same stream, and a
//! `Vec<SourceEvent>` is the simplest thing two passes can share without
//! re-parsing or re-running a SAX callback twice.

use super::{LeafValue, SourceEvent};
use crate::error::Result;
use serde_json::Value as Json;
use std::fs;
use std::path::Path;

pub fn parse_str(text: &str) -> Result<Vec<SourceEvent>> {
    let root: Json = serde_json::from_str(text)?;
    let mut events = Vec::new();
    walk(&root, &mut events);
    Ok(events)
}

pub fn parse_file(path: &Path) -> Result<Vec<SourceEvent>> {
    let text = fs::read_to_string(path)?;
    parse_str(&text)
}

fn walk(value: &Json, events: &mut Vec<SourceEvent>) {
    match value {
        Json::Null => events.push(SourceEvent::Value(LeafValue::Null)),
        Json::Bool(b) => events.push(SourceEvent::Value(LeafValue::Bool(*b))),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                events.push(SourceEvent::Value(LeafValue::Long(i)));
            } else {
                events.push(SourceEvent::Value(LeafValue::Double(n.as_f64().unwrap_or(0.0))));
            }
        }
        Json::String(s) => events.push(SourceEvent::Value(LeafValue::String(s.clone()))),
        Json::Array(items) => {
            events.push(SourceEvent::ArrayStart);
            for item in items {
                walk(item, events);
            }
            events.push(SourceEvent::ArrayEnd);
        }
        Json::Object(map) => {
            // A single-entry `{"$symbol": "name"}` object is the source
            // representation for a Symbol leaf, distinct from an ordinary
            // string; every other object is a record.
            if map.len() == 1 {
                if let Some(Json::String(name)) = map.get("$symbol") {
                    events.push(SourceEvent::Value(LeafValue::Symbol(name.clone())));
                    return;
                }
            }
            events.push(SourceEvent::ObjectStart);
            for (key, val) in map {
                events.push(SourceEvent::Key(key.clone()));
                walk(val, events);
            }
            events.push(SourceEvent::ObjectEnd);
        }
    }
}
