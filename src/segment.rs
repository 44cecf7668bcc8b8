// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! The shared-memory collaborator (spec's out-of-scope boundary: "the
//! shared-memory segment provider, exposing `malloc/realloc/free/load/
//! unload/erase/base_address/size/exists/is_loaded`").
//!
//! The source keeps this behind a process-wide registry (a global
//! `std::unordered_map` plus a "current segment" pointer). Per the REDESIGN
//! FLAGS that global is replaced with an explicit `SegmentRegistry` object
//! the driver owns and threads through every call; nothing here is a
//! `static`. A real deployment would back `SegmentProvider` with an actual
//! shared-memory mapping (e.g. POSIX `shm_open`); `InMemorySegmentProvider`
//! stands in for that here, the same way `Arena` stands in for the raw
//! allocator the format was designed against.

use crate::error::{Result, WisentError};
use std::collections::HashMap;

/// One named region of bytes, addressable the way a shared-memory segment
/// is: by a stable name, not by a pointer a caller must keep alive.
pub trait SegmentProvider {
    fn malloc(&mut self, name: &str, size: usize) -> Result<()>;
    fn realloc(&mut self, name: &str, size: usize) -> Result<()>;
    fn free(&mut self, name: &str);
    fn load(&mut self, name: &str, bytes: Vec<u8>) -> Result<()>;
    fn unload(&mut self, name: &str);
    fn erase(&mut self, name: &str);
    fn base_address(&self, name: &str) -> Result<u64>;
    fn size(&self, name: &str) -> Result<usize>;
    fn exists(&self, name: &str) -> bool;
    fn is_loaded(&self, name: &str) -> bool;
    fn bytes(&self, name: &str) -> Result<&[u8]>;
    fn bytes_mut(&mut self, name: &str) -> Result<&mut [u8]>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    /// `malloc`'d or `load`'d but not yet considered attached by a reader.
    Allocated,
    /// A driver has successfully finished serializing into this segment.
    Loaded,
}

struct Segment {
    bytes: Vec<u8>,
    state: SegmentState,
}

/// A `SegmentProvider` backed by plain heap buffers, keyed by segment name.
/// Stands in for real shared memory within one process; every method here
/// is exactly the boundary a POSIX `shm_open`-backed implementation would
/// need to satisfy.
#[derive(Default)]
pub struct InMemorySegmentProvider {
    segments: HashMap<String, Segment>,
}

impl InMemorySegmentProvider {
    pub fn new() -> Self {
        InMemorySegmentProvider { segments: HashMap::new() }
    }

    fn get(&self, name: &str) -> Result<&Segment> {
        self.segments.get(name).ok_or_else(|| WisentError::Corrupt("segment does not exist"))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Segment> {
        self.segments.get_mut(name).ok_or_else(|| WisentError::Corrupt("segment does not exist"))
    }
}

impl SegmentProvider for InMemorySegmentProvider {
    fn malloc(&mut self, name: &str, size: usize) -> Result<()> {
        self.segments.insert(name.to_string(), Segment { bytes: vec![0; size], state: SegmentState::Allocated });
        Ok(())
    }

    fn realloc(&mut self, name: &str, size: usize) -> Result<()> {
        let segment = self.get_mut(name)?;
        segment.bytes.resize(size, 0);
        Ok(())
    }

    fn free(&mut self, name: &str) {
        self.segments.remove(name);
    }

    fn load(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        self.segments.insert(name.to_string(), Segment { bytes, state: SegmentState::Loaded });
        Ok(())
    }

    fn unload(&mut self, name: &str) {
        if let Some(segment) = self.segments.get_mut(name) {
            segment.state = SegmentState::Allocated;
        }
    }

    fn erase(&mut self, name: &str) {
        self.segments.remove(name);
    }

    fn base_address(&self, name: &str) -> Result<u64> {
        Ok(self.get(name)?.bytes.as_ptr() as u64)
    }

    fn size(&self, name: &str) -> Result<usize> {
        Ok(self.get(name)?.bytes.len())
    }

    fn exists(&self, name: &str) -> bool {
        self.segments.contains_key(name)
    }

    fn is_loaded(&self, name: &str) -> bool {
        matches!(self.segments.get(name), Some(Segment { state: SegmentState::Loaded, .. }))
    }

    fn bytes(&self, name: &str) -> Result<&[u8]> {
        Ok(&self.get(name)?.bytes)
    }

    fn bytes_mut(&mut self, name: &str) -> Result<&mut [u8]> {
        Ok(&mut self.get_mut(name)?.bytes)
    }
}

/// Owns zero or more named segments. The explicit object the REDESIGN FLAGS
/// call for in place of a process-wide static: a `SerializerDriver` takes
/// one by value or by `&mut`, and the registry's lifetime is the lifetime
/// of its longest-lived holder, not the process.
pub struct SegmentRegistry<P: SegmentProvider> {
    provider: P,
}

impl<P: SegmentProvider> SegmentRegistry<P> {
    pub fn new(provider: P) -> Self {
        SegmentRegistry { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn exists(&self, name: &str) -> bool {
        self.provider.exists(name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.provider.is_loaded(name)
    }

    pub fn free(&mut self, name: &str) {
        self.provider.free(name)
    }

    pub fn unload(&mut self, name: &str) {
        self.provider.unload(name)
    }
}

impl SegmentRegistry<InMemorySegmentProvider> {
    pub fn in_memory() -> Self {
        SegmentRegistry::new(InMemorySegmentProvider::new())
    }
}
