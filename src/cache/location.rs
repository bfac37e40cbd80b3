//! Location records stored in the cache arena
//!
//! ```text
//! ┌──────────────────┬──────────────────┬──────────────────┐
//! │  name len (u32)  │  name (UTF-8)    │  offset (u64)    │
//! └──────────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! Integers are little-endian. A record carries its own length, so a tag's
//! arena slice decodes without any other context.

use crate::cache::format::DecodeError;
use crate::error::{ChunkedError, ChunkedResult};
use bytes::{Buf, BufMut};
use std::fmt;

/// Where a piece of content lives once the layer is reconstructed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// File name as listed in the TOC
    pub name: String,
    /// Offset within the file; 0 for a whole file
    pub offset: u64,
}

impl Location {
    /// Create a new location
    pub fn new(name: impl Into<String>, offset: u64) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }

    /// Size of the encoded record
    pub fn encoded_len(&self) -> usize {
        4 + self.name.len() + 8
    }

    /// Append the encoded record to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> ChunkedResult<()> {
        let name_len = u32::try_from(self.name.len()).map_err(|_| {
            ChunkedError::Encoding(format!(
                "file name of {} bytes does not fit a location record",
                self.name.len()
            ))
        })?;

        buf.reserve(self.encoded_len());
        buf.put_u32_le(name_len);
        buf.put_slice(self.name.as_bytes());
        buf.put_u64_le(self.offset);
        Ok(())
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> ChunkedResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Decode exactly one record
    pub fn decode(mut data: &[u8]) -> Result<Self, DecodeError> {
        if data.remaining() < 4 {
            return Err(DecodeError::InsufficientBytes {
                expected: 4,
                available: data.remaining(),
            });
        }
        let name_len = data.get_u32_le() as usize;

        let needed = name_len.saturating_add(8);
        if data.remaining() < needed {
            return Err(DecodeError::InsufficientBytes {
                expected: needed,
                available: data.remaining(),
            });
        }
        let name = std::str::from_utf8(&data[..name_len])
            .map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?
            .to_string();
        data.advance(name_len);
        let offset = data.get_u64_le();

        if data.has_remaining() {
            return Err(DecodeError::TrailingBytes(data.remaining()));
        }

        Ok(Self { name, offset })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.offset)
    }
}
