// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Default CSV reader. Column types are inferred from the data rather than
//! declared: a column parses as `Int64` if every non-empty cell parses as
//! an integer, `Double` if every non-empty cell parses as a float, and
//! `ByteArray` (raw UTF-8 bytes) otherwise. An empty cell becomes
//! `ColumnValue::Null` regardless of the inferred type.

use crate::column::ColumnValue;
use crate::error::{Result, WisentError};
use std::path::Path;

pub struct CsvTable {
    pub column_names: Vec<String>,
    pub columns: Vec<Vec<ColumnValue>>,
    pub row_count: usize,
}

enum Inferred {
    Int64,
    Double,
    ByteArray,
}

pub fn load(path: &Path) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|_| WisentError::CsvOpenFailed(path.display().to_string()))?;

    let column_names: Vec<String> = reader
        .headers()
        .map_err(|e| WisentError::Parse(e.to_string()))?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); column_names.len()];
    let mut row_count = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| WisentError::Parse(e.to_string()))?;
        for (i, field) in record.iter().enumerate() {
            if let Some(col) = raw_columns.get_mut(i) {
                col.push(field.to_string());
            }
        }
        row_count += 1;
    }

    let columns: Vec<Vec<ColumnValue>> = raw_columns
        .iter()
        .map(|raw| {
            let kind = infer(raw);
            raw.iter()
                .map(|cell| {
                    if cell.is_empty() {
                        return ColumnValue::Null;
                    }
                    match kind {
                        Inferred::Int64 => ColumnValue::Int64(cell.parse().unwrap()),
                        Inferred::Double => ColumnValue::Double(cell.parse().unwrap()),
                        Inferred::ByteArray => ColumnValue::ByteArray(cell.clone().into_bytes()),
                    }
                })
                .collect()
        })
        .collect();

    Ok(CsvTable { column_names, columns, row_count })
}

fn infer(cells: &[String]) -> Inferred {
    let non_empty: Vec<&String> = cells.iter().filter(|c| !c.is_empty()).collect();
    if non_empty.is_empty() {
        return Inferred::ByteArray;
    }
    if non_empty.iter().all(|c| c.parse::<i64>().is_ok()) {
        return Inferred::Int64;
    }
    if non_empty.iter().all(|c| c.parse::<f64>().is_ok()) {
        return Inferred::Double;
    }
    Inferred::ByteArray
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn infers_int64_column() {
        let file = write_temp_csv("a,b\n1,x\n2,y\n3,z\n");
        let table = load(file.path()).unwrap();
        assert_eq!(table.column_names, vec!["a", "b"]);
        assert_eq!(table.row_count, 3);
        assert_eq!(table.columns[0], vec![
            ColumnValue::Int64(1),
            ColumnValue::Int64(2),
            ColumnValue::Int64(3),
        ]);
    }

    #[test]
    fn infers_double_column_when_not_all_integers() {
        let file = write_temp_csv("v\n1.5\n2\n3.25\n");
        let table = load(file.path()).unwrap();
        assert_eq!(table.columns[0], vec![
            ColumnValue::Double(1.5),
            ColumnValue::Double(2.0),
            ColumnValue::Double(3.25),
        ]);
    }

    #[test]
    fn empty_cells_become_null() {
        let file = write_temp_csv("v\n1\n\n3\n");
        let table = load(file.path()).unwrap();
        assert_eq!(table.columns[0], vec![
            ColumnValue::Int64(1),
            ColumnValue::Null,
            ColumnValue::Int64(3),
        ]);
    }

    #[test]
    fn missing_file_fails_with_csv_open_failed() {
        let result = load(Path::new("/nonexistent/path/does-not-exist.csv"));
        assert!(matches!(result, Err(WisentError::CsvOpenFailed(_))));
    }
}
