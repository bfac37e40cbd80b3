//! Lookup command - resolve a digest against a stored cache

use super::open_store;
use crate::cache::{load_cache, Location};
use crate::cli::args::{LookupArgs, OutputFormat};
use crate::config::Config;
use crate::error::ChunkedResult;
use console::style;

/// Execute the lookup command
///
/// A miss is reported, not treated as a failure.
pub fn execute(args: LookupArgs, config: &Config) -> ChunkedResult<()> {
    let store = open_store(args.store, config);
    let cache = load_cache(&store, &args.layer)?;
    let location = cache.resolve(&args.digest)?;

    match args.format {
        OutputFormat::Table => print_table(&args.digest, location.as_ref()),
        OutputFormat::Json => print_json(&args.digest, location.as_ref())?,
        OutputFormat::Plain => print_plain(location.as_ref()),
    }
    Ok(())
}

fn print_table(digest: &str, location: Option<&Location>) {
    match location {
        Some(loc) => {
            println!("{:<10} {}", "DIGEST", digest);
            println!("{:<10} {}", "FILE", style(&loc.name).bold());
            println!("{:<10} {}", "OFFSET", loc.offset);
        }
        None => println!("{} No entry for {}", style("[MISS]").yellow(), digest),
    }
}

fn print_json(digest: &str, location: Option<&Location>) -> ChunkedResult<()> {
    #[derive(serde::Serialize)]
    struct LookupJson<'a> {
        digest: &'a str,
        found: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<u64>,
    }

    let out = LookupJson {
        digest,
        found: location.is_some(),
        name: location.map(|l| l.name.as_str()),
        offset: location.map(|l| l.offset),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_plain(location: Option<&Location>) {
    if let Some(loc) = location {
        println!("{}\t{}", loc.name, loc.offset);
    }
}
