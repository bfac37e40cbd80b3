//! Digest-indexed location cache
//!
//! Maps content digests, chunk digests and hardlink fingerprints of one layer
//! to the place the content will live once the layer is reconstructed, so a
//! puller can reuse data it already has instead of fetching it again.
//!
//! # Structure
//!
//! | Part | Contents |
//! |------|----------|
//! | Tag table | `(key, arena offset, arena len)`, sorted by key, keys unique |
//! | Arena | Encoded [`Location`] records, back to back |
//!
//! Tags hold integer offsets only, never references into the arena, so the
//! arena can be reallocated or persisted on its own.
//!
//! A cache is built once per TOC, handed to a [`LayerStore`] exactly once and
//! never mutated afterwards.

pub mod builder;
pub mod format;
pub mod location;
pub mod store;

pub use builder::{load_cache, write_cache, CacheBuilder, METADATA_KEY};
pub use format::{read_cache, DecodeError, FORMAT_VERSION};
pub use location::Location;
pub use store::{DirStore, LayerStore, MemoryStore};

use crate::error::ChunkedResult;
use std::ops::Range;

/// One entry of the tag table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Digest or fingerprint the entry is found by
    pub key: String,
    /// Start of the location record in the arena
    pub offset: u64,
    /// Length of the location record
    pub len: u64,
}

impl Tag {
    /// Arena range, if it is addressable on this platform
    fn range(&self) -> Option<Range<usize>> {
        let start = usize::try_from(self.offset).ok()?;
        let end = start.checked_add(usize::try_from(self.len).ok()?)?;
        Some(start..end)
    }
}

/// Immutable tag table plus location arena
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    tags: Vec<Tag>,
    arena: Vec<u8>,
}

impl Cache {
    /// Tags in key order
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Raw arena bytes
    pub fn arena(&self) -> &[u8] {
        &self.arena
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the cache has no tags
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Exact-match lookup of a digest or fingerprint
    ///
    /// Never matches prefixes. A miss is `None`.
    pub fn find_tag(&self, key: &str) -> Option<&Tag> {
        self.tags
            .binary_search_by(|tag| tag.key.as_str().cmp(key))
            .ok()
            .map(|idx| &self.tags[idx])
    }

    /// Arena slice a tag points at
    ///
    /// `None` when the tag does not fit this cache's arena, e.g. a tag taken
    /// from another cache.
    pub fn location_bytes(&self, tag: &Tag) -> Option<&[u8]> {
        self.arena.get(tag.range()?)
    }

    /// Look up a key and decode its location
    pub fn resolve(&self, key: &str) -> ChunkedResult<Option<Location>> {
        let Some(tag) = self.find_tag(key) else {
            return Ok(None);
        };
        let bytes = self
            .location_bytes(tag)
            .ok_or_else(|| DecodeError::TagOutOfBounds {
                key: tag.key.clone(),
            })?;
        Ok(Some(Location::decode(bytes)?))
    }
}
