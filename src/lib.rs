// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! A binary image format for hierarchical, schema-flexible documents
//! (JSON-like trees whose leaves may reference tabular CSV payloads),
//! designed to be placed in shared memory and consumed by multiple
//! processes without further parsing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  source/    │────▶│ document.rs │────▶│  counter.rs  │
//! │ (json, csv) │     │ (DocNode)   │     │ (size pass)  │
//! └─────────────┘     └─────────────┘     └──────┬───────┘
//!                                                 ▼
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │   lazy.rs   │◀────│  image/     │◀────│ flattener.rs │
//! │  (Cursor)   │     │  (Image)    │     │ (write pass) │
//! └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! `document.rs` turns a pull-iterator event stream into an owned tree;
//! `counter.rs` and `flattener.rs` are the two-pass serializer that walks it
//! once to size every region and once to write every byte; `image/` is the
//! resulting self-describing buffer; `lazy.rs` reads one back lazily,
//! decoding run-length and dictionary encoding on demand. `driver.rs` and
//! `segment.rs` wire the whole pipeline to a named shared-memory segment;
//! `validator.rs` checks the structural invariants a malformed or
//! maliciously-constructed image might violate.
//!
//! Per-column compression (`codec/`, `column/`) is a separate concern
//! layered on top: CSV columns can each be paged and run through a
//! compression pipeline before their bytes land in the image as a
//! `ByteArray` leaf.

pub mod arena;
pub mod codec;
pub mod column;
pub mod counter;
pub mod diagnostics;
pub mod document;
pub mod driver;
pub mod error;
pub mod flattener;
pub mod image;
pub mod lazy;
pub mod segment;
pub mod source;
pub mod validator;
pub mod value;

pub use counter::{Counter, CounterOptions, CounterOutput};
pub use document::{build as build_document, BuildOptions, DocNode};
pub use driver::{ImageHandle, LoadOptions, PipelineSpec, SerializerDriver};
pub use error::{Result, Warning, WisentError};
pub use flattener::Flattener;
pub use image::{Image, ImageHeader};
pub use lazy::{Cursor, TypedSpan};
pub use segment::{InMemorySegmentProvider, SegmentProvider, SegmentRegistry};
pub use validator::{validate, Violation};
pub use value::{ComplexExpression, TypeTag, Value};
