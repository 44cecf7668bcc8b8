// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Crate-wide error taxonomy.
//!
//! One enum covers every failure kind named by the format: allocation,
//! codec, source-document, and reader-side errors. Reader-side errors
//! (`TypeMismatch`, `OutOfRange`) are non-fatal in the sense that they
//! don't unwind: `Cursor` returns them as a plain `Result`, so a caller
//! walking siblings can `.ok()` one bad child and keep going rather than
//! losing the whole traversal (see `lazy.rs`). Everything else is fatal
//! for the serialization in progress.

use std::fmt;
use std::io;

/// A non-fatal note collected during serialization, e.g. "column `views` had
/// a uniform value, RLE chosen over FSE". Returned alongside a successful
/// `ImageHandle` rather than printed by the core itself.
pub type Warning = String;

#[derive(Debug)]
pub enum WisentError {
    /// Source document is not well-formed.
    Parse(String),
    /// Source stream unreadable, or CSV file could not be opened.
    Io(io::Error),
    /// The Arena could not grow to the requested size.
    AllocationFailed { requested: usize },
    /// A pipeline spec named a codec tag this crate doesn't recognize.
    UnknownCodec(String),
    /// A leaf value didn't match any known `Value` variant during flattening.
    UnknownLeafType,
    /// `ColumnEncoder` was asked to encode a type it doesn't support.
    UnsupportedPhysicalType,
    /// A codec's `compress`/`decompress` was handed an empty buffer.
    EmptyInput,
    /// A codec's input was malformed (e.g. odd-length RLE stream).
    Corrupt(&'static str),
    /// A codec's input ended before a complete token could be read.
    Truncated(&'static str),
    /// FSE declined because a single symbol covers the whole input; the
    /// caller should retry with the RLE codec instead.
    UseRLEInstead,
    /// A CSV leaf path could not be opened under the configured root.
    CsvOpenFailed(String),
    /// A codec in a column's pipeline failed.
    CodecFailed(Box<WisentError>),
    /// `LazyView` read a value but the caller asked for the wrong variant.
    TypeMismatch { expected: &'static str, found: &'static str },
    /// `LazyView` indexed past the end of a span or region.
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for WisentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WisentError::Parse(msg) => write!(f, "source document is not well-formed: {msg}"),
            WisentError::Io(e) => write!(f, "i/o error: {e}"),
            WisentError::AllocationFailed { requested } => {
                write!(f, "arena could not grow to {requested} bytes")
            }
            WisentError::UnknownCodec(tag) => write!(f, "unknown codec tag `{tag}`"),
            WisentError::UnknownLeafType => write!(f, "unknown leaf value type"),
            WisentError::UnsupportedPhysicalType => {
                write!(f, "column encoder does not support this physical type")
            }
            WisentError::EmptyInput => write!(f, "codec input must not be empty"),
            WisentError::Corrupt(what) => write!(f, "corrupt input: {what}"),
            WisentError::Truncated(what) => write!(f, "truncated input: {what}"),
            WisentError::UseRLEInstead => {
                write!(f, "fse: a single symbol covers the whole input, use RLE instead")
            }
            WisentError::CsvOpenFailed(path) => write!(f, "failed to open csv file `{path}`"),
            WisentError::CodecFailed(inner) => write!(f, "codec failed: {inner}"),
            WisentError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            WisentError::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
        }
    }
}

impl std::error::Error for WisentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WisentError::Io(e) => Some(e),
            WisentError::CodecFailed(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for WisentError {
    fn from(e: io::Error) -> Self {
        WisentError::Io(e)
    }
}

impl From<serde_json::Error> for WisentError {
    fn from(e: serde_json::Error) -> Self {
        WisentError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WisentError>;
