//! chunkcache - partial layer pulls by digest
//!
//! Builds a per-layer cache that maps file digests, chunk digests and
//! hardlink fingerprints from a layer's table of contents to the place that
//! content will live, so a puller can reuse what it already has. Also finds
//! the zero runs a compressor can store as holes.

pub mod cache;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod error;
pub mod toc;

pub use cache::{load_cache, write_cache, Cache, LayerStore, Location, Tag};
pub use compressor::{HoleEvent, HolesFinder};
pub use error::{ChunkedError, ChunkedResult};
pub use toc::{hardlink_fingerprint, prepare_metadata, TocEntry};
