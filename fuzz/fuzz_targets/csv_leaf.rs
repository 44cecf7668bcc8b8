// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! CSV leaf expansion under adversarial input: ragged rows, non-UTF8 bytes,
//! cells that look numeric but overflow `i64`/`f64`. `csv_source::load`
//! should classify every column and return `Ok`, or fail with a named
//! error kind — never panic on type inference.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use wisent::source::csv_source;

fuzz_target!(|data: &[u8]| {
    let mut file = match tempfile::Builder::new().suffix(".csv").tempfile() {
        Ok(f) => f,
        Err(_) => return,
    };
    if file.write_all(data).is_err() {
        return;
    }

    if let Ok(table) = csv_source::load(file.path()) {
        assert_eq!(table.columns.len(), table.column_names.len());
        for column in &table.columns {
            assert_eq!(column.len(), table.row_count);
        }
    }
});
