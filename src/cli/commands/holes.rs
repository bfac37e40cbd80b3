//! Holes command - report sparse regions of a file

use crate::cli::args::HolesArgs;
use crate::compressor::summarize;
use crate::config::Config;
use crate::error::{ChunkedError, ChunkedResult};
use std::fs::File;
use std::io::BufReader;

/// Execute the holes command
pub fn execute(args: HolesArgs, config: &Config) -> ChunkedResult<()> {
    let threshold = args.threshold.unwrap_or(config.compressor.hole_threshold);
    let file = File::open(&args.file)
        .map_err(|e| ChunkedError::io(format!("opening {}", args.file.display()), e))?;

    let summary = summarize(BufReader::new(file), threshold)
        .map_err(|e| ChunkedError::io(format!("scanning {}", args.file.display()), e))?;

    println!("{:<12} {}", "THRESHOLD", threshold);
    println!("{:<12} {}", "HOLES", summary.holes);
    println!("{:<12} {}", "HOLE BYTES", summary.hole_bytes);
    println!("{:<12} {}", "DATA BYTES", summary.data_bytes);
    Ok(())
}
