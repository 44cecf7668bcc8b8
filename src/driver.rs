// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! `SerializerDriver` (spec §4.8): the single synchronous entry point that
//! wires together a source document, the `Counter`/`Flattener` two-pass
//! serializer, and a `SegmentRegistry`, and hands back an `ImageHandle`.
//!
//! `load` sequences exactly what spec §4.8 names: check shared-memory
//! state, run `Counter`, size-and-alloc the `Arena` (via `Image::new`), run
//! `Flattener`, publish the result into the segment, return a handle. Any
//! error along the way releases whatever segment state was allocated and
//! propagates the error kind rather than leaving a half-built segment
//! behind (spec §5, "cancellation and timeouts").

use crate::codec::pipeline::CompressionPipeline;
use crate::counter::{Counter, CounterOptions};
use crate::diagnostics::Spinner;
use crate::document::{self, BuildOptions};
use crate::error::{Result, Warning};
use crate::flattener::Flattener;
use crate::image::Image;
use crate::segment::{InMemorySegmentProvider, SegmentProvider, SegmentRegistry};
use crate::source::json_source;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A column name to `CompressionPipeline` map (spec §6.3): which codecs, in
/// which order, each named CSV column is run through.
pub type PipelineSpec = HashMap<String, CompressionPipeline>;

/// Driver-level options (spec §6.4). `CounterOptions` covers the three that
/// also govern `Counter`/`Flattener`; `force_reload` and `disable_csv` are
/// driver-only concerns layered on top.
pub struct LoadOptions {
    pub disable_rle: bool,
    pub disable_csv: bool,
    pub force_reload: bool,
    pub dict_encode_strings: bool,
    pub dict_encode_numeric: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            disable_rle: false,
            disable_csv: false,
            force_reload: false,
            dict_encode_strings: false,
            dict_encode_numeric: false,
        }
    }
}

impl LoadOptions {
    fn counter_options(&self) -> CounterOptions {
        CounterOptions {
            disable_rle: self.disable_rle,
            dict_encode_numeric: self.dict_encode_numeric,
            dict_encode_strings: self.dict_encode_strings,
        }
    }
}

/// A successfully serialized image, plus the non-fatal warnings collected
/// while building it (spec §7: "successful completion returns the image
/// handle and the warnings collected").
#[derive(Debug)]
pub struct ImageHandle {
    pub segment_name: String,
    pub image: Image,
    pub warnings: Vec<Warning>,
}

pub struct SerializerDriver<P: SegmentProvider> {
    registry: SegmentRegistry<P>,
}

impl SerializerDriver<InMemorySegmentProvider> {
    pub fn in_memory() -> Self {
        SerializerDriver { registry: SegmentRegistry::in_memory() }
    }
}

impl<P: SegmentProvider> SerializerDriver<P> {
    pub fn new(registry: SegmentRegistry<P>) -> Self {
        SerializerDriver { registry }
    }

    pub fn registry(&self) -> &SegmentRegistry<P> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SegmentRegistry<P> {
        &mut self.registry
    }

    /// Parses `source_path`, builds the document tree, runs the two-pass
    /// serializer, and publishes the resulting bytes into `segment_name`.
    ///
    /// If the segment already holds a loaded image and `force_reload` is
    /// not set, the existing bytes are reattached without re-running the
    /// serializer (spec §6.4: `force_reload` "on a segment that is already
    /// loaded, discard and re-serialize").
    pub fn load(
        &mut self,
        source_path: &Path,
        segment_name: &str,
        csv_root: &Path,
        options: &LoadOptions,
        pipeline_map: &PipelineSpec,
    ) -> Result<ImageHandle> {
        if self.registry.is_loaded(segment_name) && !options.force_reload {
            let bytes = self.registry.provider().bytes(segment_name)?.to_vec();
            let image = Image::from_bytes(bytes)?;
            return Ok(ImageHandle { segment_name: segment_name.to_string(), image, warnings: Vec::new() });
        }

        match self.build_image(source_path, csv_root, options, pipeline_map) {
            Ok((image, warnings)) => {
                self.registry.provider_mut().load(segment_name, image.as_bytes().to_vec())?;
                Ok(ImageHandle { segment_name: segment_name.to_string(), image, warnings })
            }
            Err(err) => {
                self.registry.free(segment_name);
                Err(err)
            }
        }
    }

    fn build_image(
        &self,
        source_path: &Path,
        csv_root: &Path,
        options: &LoadOptions,
        pipeline_map: &PipelineSpec,
    ) -> Result<(Image, Vec<Warning>)> {
        let parse = Spinner::start("parsing source document...");
        let events = json_source::parse_file(source_path)?;
        parse.finish("parsed source document");

        let build_opts = BuildOptions { disable_csv: options.disable_csv, csv_root, pipeline_map };
        let tree = Spinner::start("building document tree...");
        let root = document::build(&events, &build_opts)?;
        tree.finish("built document tree");

        let counter_opts = options.counter_options();
        let count = Spinner::start("counting expressions and argument slots...");
        let counted = Counter::count(&root, &counter_opts);
        count.finish("counted expressions and argument slots");

        let mut warnings = Vec::new();
        if counted.sizes.argument_count > 0 && counted.sizes.dictionary_bytes == 0 && options.dict_encode_numeric {
            warnings.push(format!(
                "{source_path}: dict_encode_numeric was set but no span met the dictionary threshold",
                source_path = source_path.display()
            ));
        }

        let flatten = Spinner::start("flattening into the binary image...");
        let image = Flattener::flatten(&root, counted.sizes, &counter_opts)?;
        flatten.finish("flattened into the binary image");
        Ok((image, warnings))
    }

    pub fn unload(&mut self, segment_name: &str) {
        self.registry.unload(segment_name);
    }

    pub fn free(&mut self, segment_name: &str) {
        self.registry.free(segment_name);
    }
}

/// Resolves a CSV leaf's path against the directory containing the source
/// document when no explicit `csv_root` is given, matching how a caller
/// would naturally lay `data.json` and `data.csv` side by side.
pub fn default_csv_root(source_path: &Path) -> PathBuf {
    source_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}
