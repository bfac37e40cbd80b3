//! Persisted cache layout
//!
//! ```text
//! magic "TOCC" | version u32 | tag count u64
//! { key len u32 | key | arena offset u64 | arena len u64 } * tag count
//! arena len u64 | arena
//! ```
//!
//! All integers are little-endian. Only round-trip fidelity within one
//! version is promised; readers reject any other version.

use crate::cache::{Cache, Tag};
use crate::error::{ChunkedError, ChunkedResult};
use bytes::{Buf, BufMut};
use std::io::Read;
use thiserror::Error;

/// File magic
pub const MAGIC: &[u8; 4] = b"TOCC";

/// Current layout version
pub const FORMAT_VERSION: u32 = 1;

/// Smallest possible encoded tag (empty key)
const MIN_TAG_LEN: usize = 4 + 8 + 8;

/// Errors while decoding a persisted cache or a location record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Insufficient bytes: expected {expected}, got {available}")]
    InsufficientBytes { expected: usize, available: usize },

    #[error("Not a chunk cache (bad magic)")]
    BadMagic,

    #[error("Unsupported cache version {0}, expected {expected}", expected = FORMAT_VERSION)]
    UnsupportedVersion(u32),

    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Tag count {0} exceeds the available data")]
    TagCountTooLarge(u64),

    #[error("Tags are not sorted or contain duplicates at {0:?}")]
    UnsortedTags(String),

    #[error("Tag {key} points outside the arena")]
    TagOutOfBounds { key: String },

    #[error("{0} trailing bytes after the record")]
    TrailingBytes(usize),
}

fn need(data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.remaining() < expected {
        return Err(DecodeError::InsufficientBytes {
            expected,
            available: data.remaining(),
        });
    }
    Ok(())
}

fn get_len(data: &mut &[u8]) -> Result<usize, DecodeError> {
    need(data, 8)?;
    let len = data.get_u64_le();
    usize::try_from(len).map_err(|_| DecodeError::InsufficientBytes {
        expected: usize::MAX,
        available: data.remaining(),
    })
}

impl Cache {
    /// Serialize the tag table and arena into one buffer
    pub fn to_bytes(&self) -> ChunkedResult<Vec<u8>> {
        let tags_len: usize = self.tags.iter().map(|t| MIN_TAG_LEN + t.key.len()).sum();
        let mut buf = Vec::with_capacity(4 + 4 + 8 + tags_len + 8 + self.arena.len());

        buf.put_slice(MAGIC);
        buf.put_u32_le(FORMAT_VERSION);
        buf.put_u64_le(self.tags.len() as u64);
        for tag in &self.tags {
            let key_len = u32::try_from(tag.key.len())
                .map_err(|_| ChunkedError::Encoding(format!("tag key of {} bytes", tag.key.len())))?;
            buf.put_u32_le(key_len);
            buf.put_slice(tag.key.as_bytes());
            buf.put_u64_le(tag.offset);
            buf.put_u64_le(tag.len);
        }
        buf.put_u64_le(self.arena.len() as u64);
        buf.put_slice(&self.arena);

        Ok(buf)
    }

    /// Decode a buffer produced by [`Cache::to_bytes`]
    pub fn from_bytes(mut data: &[u8]) -> Result<Self, DecodeError> {
        need(data, 4 + 4 + 8)?;
        if &data[..4] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        data.advance(4);

        let version = data.get_u32_le();
        if version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let count = data.get_u64_le();
        // Refuse to allocate for tags that cannot possibly be there
        if count > (data.remaining() / MIN_TAG_LEN) as u64 {
            return Err(DecodeError::TagCountTooLarge(count));
        }

        let mut tags: Vec<Tag> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            need(data, 4)?;
            let key_len = data.get_u32_le() as usize;
            need(data, key_len)?;
            let key = std::str::from_utf8(&data[..key_len])
                .map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?
                .to_string();
            data.advance(key_len);

            need(data, 16)?;
            let offset = data.get_u64_le();
            let len = data.get_u64_le();

            if let Some(prev) = tags.last() {
                if prev.key >= key {
                    return Err(DecodeError::UnsortedTags(key));
                }
            }
            tags.push(Tag { key, offset, len });
        }

        let arena_len = get_len(&mut data)?;
        need(data, arena_len)?;
        let arena = data[..arena_len].to_vec();
        data.advance(arena_len);

        if data.has_remaining() {
            return Err(DecodeError::TrailingBytes(data.remaining()));
        }

        for tag in &tags {
            let in_bounds = tag
                .offset
                .checked_add(tag.len)
                .is_some_and(|end| end <= arena.len() as u64);
            if !in_bounds {
                return Err(DecodeError::TagOutOfBounds {
                    key: tag.key.clone(),
                });
            }
        }

        Ok(Self { tags, arena })
    }
}

/// Read a persisted cache from a byte stream
///
/// The stream normally comes from a [`LayerStore`](crate::cache::LayerStore);
/// read failures are returned unchanged as [`ChunkedError::Store`].
pub fn read_cache(mut reader: impl Read) -> ChunkedResult<Cache> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(ChunkedError::Store)?;
    Ok(Cache::from_bytes(&data)?)
}
