//! Cache construction and persistence

use crate::cache::format::read_cache;
use crate::cache::location::Location;
use crate::cache::store::LayerStore;
use crate::cache::{Cache, Tag};
use crate::error::{ChunkedError, ChunkedResult};
use crate::toc::{hardlink_fingerprint, prepare_metadata, TocEntry};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::{debug, info};

/// Store key the serialized cache is kept under, per layer
pub const METADATA_KEY: &str = "chunked-manifest-cache";

/// What kind of key a tag was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    /// File or chunk content digest
    Content,
    /// Hardlink fingerprint
    Fingerprint,
}

/// Accumulates tags and locations for one TOC
///
/// Owns the tag table and arena until [`CacheBuilder::persist`] consumes it.
#[derive(Debug, Default)]
pub struct CacheBuilder {
    tags: BTreeMap<String, (Namespace, Tag)>,
    arena: Vec<u8>,
}

impl CacheBuilder {
    /// Build from raw TOC bytes
    ///
    /// Fails on a malformed TOC, on a file that cannot be fingerprinted, and
    /// when a fingerprint collides with a content digest.
    pub fn from_toc(toc: &[u8]) -> ChunkedResult<Self> {
        let entries = prepare_metadata(toc)?;
        let mut builder = Self::default();
        for entry in &entries {
            builder.add_entry(entry)?;
        }
        Ok(builder)
    }

    fn add_entry(&mut self, entry: &TocEntry) -> ChunkedResult<()> {
        if let Some(digest) = entry.content_digest() {
            let fingerprint = hardlink_fingerprint(entry)?;
            self.add_tags(
                &Location::new(&entry.name, 0),
                &[
                    (digest, Namespace::Content),
                    (fingerprint.as_str(), Namespace::Fingerprint),
                ],
            )?;
        }

        if let Some(digest) = entry.chunk_digest() {
            self.add_tags(
                &Location::new(&entry.name, entry.chunk_offset),
                &[(digest, Namespace::Content)],
            )?;
        }

        Ok(())
    }

    /// Point every new key at one copy of `location`
    ///
    /// A key seen before keeps its first location: equal content stored at
    /// several places can be taken from any of them.
    fn add_tags(&mut self, location: &Location, keys: &[(&str, Namespace)]) -> ChunkedResult<()> {
        let mut fresh = Vec::with_capacity(keys.len());
        for &(key, namespace) in keys {
            match self.tags.get(key) {
                Some((existing, _)) if *existing != namespace => {
                    return Err(ChunkedError::TagCollision {
                        key: key.to_string(),
                    });
                }
                Some(_) => debug!("Tag {} already present, keeping first location", key),
                None => fresh.push((key, namespace)),
            }
        }
        if fresh.is_empty() {
            return Ok(());
        }

        let offset = self.arena.len() as u64;
        location.encode_into(&mut self.arena)?;
        let len = self.arena.len() as u64 - offset;

        for (key, namespace) in fresh {
            let tag = Tag {
                key: key.to_string(),
                offset,
                len,
            };
            self.tags.insert(key.to_string(), (namespace, tag));
        }
        Ok(())
    }

    /// Freeze into an immutable cache
    pub fn finish(self) -> Cache {
        Cache {
            tags: self.tags.into_values().map(|(_, tag)| tag).collect(),
            arena: self.arena,
        }
    }

    /// Serialize and hand the cache to `store`
    ///
    /// Consumes the builder, so a cache is written at most once. Store errors
    /// are returned as reported; nothing is retried.
    pub fn persist<S>(self, layer_id: &str, store: &mut S) -> ChunkedResult<Cache>
    where
        S: LayerStore + ?Sized,
    {
        let cache = self.finish();
        let data = cache.to_bytes()?;

        store
            .put(layer_id, METADATA_KEY, &mut Cursor::new(&data))
            .map_err(ChunkedError::Store)?;

        info!(
            "Stored cache for layer {}: {} tags, {} arena bytes",
            layer_id,
            cache.len(),
            cache.arena().len()
        );
        Ok(cache)
    }
}

/// Build the cache for a TOC and persist it through `store`
///
/// `layer_id` identifies this cache in the store; it is never a tag.
pub fn write_cache<S>(toc: &[u8], layer_id: &str, store: &mut S) -> ChunkedResult<Cache>
where
    S: LayerStore + ?Sized,
{
    CacheBuilder::from_toc(toc)?.persist(layer_id, store)
}

/// Load the cache previously persisted for a layer
pub fn load_cache<S>(store: &S, layer_id: &str) -> ChunkedResult<Cache>
where
    S: LayerStore + ?Sized,
{
    let reader = store
        .get(layer_id, METADATA_KEY)
        .map_err(ChunkedError::Store)?;
    let cache = read_cache(reader)?;
    debug!("Loaded cache for layer {}: {} tags", layer_id, cache.len());
    Ok(cache)
}
