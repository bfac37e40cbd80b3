//! Build command - create and store the cache for a layer TOC

use super::open_store;
use crate::cache::write_cache;
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::{ChunkedError, ChunkedResult};
use console::style;
use std::fs;
use tracing::debug;

/// Execute the build command
pub fn execute(args: BuildArgs, config: &Config) -> ChunkedResult<()> {
    let toc = fs::read(&args.toc)
        .map_err(|e| ChunkedError::io(format!("reading TOC {}", args.toc.display()), e))?;

    let mut store = open_store(args.store, config);
    debug!("Using store at {}", store.root().display());

    let cache = write_cache(&toc, &args.layer, &mut store)?;

    println!(
        "{} Cached layer {}: {} tags, {} bytes of locations",
        style("[OK]").green(),
        style(&args.layer).bold(),
        cache.len(),
        cache.arena().len()
    );
    Ok(())
}
