// Copyright 2025-present Wisent developers
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end for the serializer driver.
//!
//! `build` and `inspect` do real file I/O; `unload`/`free` operate against a
//! registry created fresh for the single invocation, since a CLI process
//! has no persistent connection to whatever shared-memory segment a long-
//! running server loaded earlier. They exist to exercise the driver's
//! contract end to end, not to administer a live segment remotely.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use wisent::codec::pipeline::CompressionPipeline;
use wisent::diagnostics::{styled, BOLD, RED, YELLOW};
use wisent::driver::{self, LoadOptions, PipelineSpec, SerializerDriver};
use wisent::{validate, Cursor, Image};

#[derive(Parser)]
#[command(name = "wisent", about = "Binary image format builder and inspector", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize a JSON source document into a binary image file.
    Build {
        /// Path to the source JSON document.
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the resulting image to.
        #[arg(short, long)]
        output: PathBuf,

        /// Directory to resolve `*.csv` leaves against (defaults to the
        /// input file's directory).
        #[arg(long)]
        csv_root: Option<PathBuf>,

        /// `column=tag1,tag2` compression pipeline, repeatable.
        #[arg(long = "pipeline", value_name = "column=tags")]
        pipelines: Vec<String>,

        #[arg(long)]
        disable_rle: bool,

        #[arg(long)]
        disable_csv: bool,

        #[arg(long)]
        dict_encode_strings: bool,

        #[arg(long)]
        dict_encode_numeric: bool,
    },

    /// Print the header and top-level structure of an image file.
    Inspect {
        /// Path to a previously built image file.
        file: PathBuf,
    },

    /// Build into a segment, then immediately unload it.
    Unload {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        segment: String,
    },

    /// Build into a segment, then immediately free it.
    Free {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        segment: String,
    },
}

fn parse_pipeline_spec(raw: &[String]) -> Result<PipelineSpec, wisent::WisentError> {
    let mut map = HashMap::new();
    for entry in raw {
        let (column, tags) = entry
            .split_once('=')
            .ok_or_else(|| wisent::WisentError::Parse(format!("`{entry}` is not `column=tags`")))?;
        let tags: Vec<String> = tags.split(',').map(str::to_string).collect();
        map.insert(column.to_string(), CompressionPipeline::from_tags(&tags)?);
    }
    Ok(map)
}

fn run() -> Result<(), wisent::WisentError> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build { input, output, csv_root, pipelines, disable_rle, disable_csv, dict_encode_strings, dict_encode_numeric } => {
            let csv_root = csv_root.unwrap_or_else(|| driver::default_csv_root(&input));
            let pipeline_map = parse_pipeline_spec(&pipelines)?;
            let options = LoadOptions { disable_rle, disable_csv, force_reload: true, dict_encode_strings, dict_encode_numeric };
            let mut driver = SerializerDriver::in_memory();
            let handle = driver.load(&input, "build", &csv_root, &options, &pipeline_map)?;
            for warning in &handle.warnings {
                eprintln!("{} {warning}", styled(&[BOLD, YELLOW], "warning:"));
            }
            std::fs::write(&output, handle.image.as_bytes())?;
            println!(
                "wrote {} bytes ({} expressions, {} argument slots) to {}",
                handle.image.as_bytes().len(),
                handle.image.header().expression_count,
                handle.image.header().argument_count,
                output.display()
            );
            Ok(())
        }
        Commands::Inspect { file } => {
            let bytes = std::fs::read(&file)?;
            let image = Image::from_bytes(bytes)?;
            let header = image.header();
            println!("argument_count:        {}", header.argument_count);
            println!("argument_bytes:        {}", header.argument_bytes);
            println!("expression_count:      {}", header.expression_count);
            println!("dictionary_bytes:      {}", header.dictionary_bytes);
            println!("string_bytes_written:  {}", header.string_bytes_written);

            let violations = validate(&image)?;
            if violations.is_empty() {
                println!("structural check:      ok");
            } else {
                println!("structural check:      {} violation(s)", violations.len());
                for v in &violations {
                    println!("  {v:?}");
                }
            }

            if header.expression_count > 0 {
                let root = Cursor::root(&image);
                println!("root head:             {}", root.head()?);
                println!("root children:         {}", root.len());
            }
            Ok(())
        }
        Commands::Unload { input, segment } => {
            let csv_root = driver::default_csv_root(&input);
            let mut driver = SerializerDriver::in_memory();
            driver.load(&input, &segment, &csv_root, &LoadOptions::default(), &PipelineSpec::new())?;
            driver.unload(&segment);
            println!("segment `{segment}` unloaded");
            Ok(())
        }
        Commands::Free { input, segment } => {
            let csv_root = driver::default_csv_root(&input);
            let mut driver = SerializerDriver::in_memory();
            driver.load(&input, &segment, &csv_root, &LoadOptions::default(), &PipelineSpec::new())?;
            driver.free(&segment);
            println!("segment `{segment}` freed");
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", styled(&[BOLD, RED], "error:"));
            ExitCode::FAILURE
        }
    }
}
