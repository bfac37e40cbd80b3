//! TOC entry parsing
//!
//! The TOC is a JSON document listing every entry of a layer. Entries are
//! decoded into [`TocEntry`] keyed by a closed [`EntryKind`] and checked per
//! kind right after deserialization.

use crate::error::{ChunkedError, ChunkedResult};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a TOC entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    Reg,
    /// Additional chunk of a regular file declared elsewhere
    Chunk,
    /// Hard link to another entry
    Hardlink,
    /// Symbolic link
    Symlink,
    /// Directory
    Dir,
    /// Character device
    Char,
    /// Block device
    Block,
    /// Named pipe
    Fifo,
}

impl EntryKind {
    /// Whether entries of this kind must carry a `linkName`
    fn needs_link_name(&self) -> bool {
        matches!(self, Self::Symlink | Self::Hardlink)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reg => "reg",
            Self::Chunk => "chunk",
            Self::Hardlink => "hardlink",
            Self::Symlink => "symlink",
            Self::Dir => "dir",
            Self::Char => "char",
            Self::Block => "block",
            Self::Fifo => "fifo",
        };
        write!(f, "{}", name)
    }
}

/// Parsed TOC document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toc {
    /// TOC format version
    pub version: u32,

    /// Entries in layer order
    #[serde(default)]
    pub entries: Vec<TocEntry>,
}

/// One TOC record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,

    #[serde(default)]
    pub uid: u32,

    #[serde(default)]
    pub gid: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_major: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_minor: Option<u32>,

    #[serde(default, rename = "modtime", skip_serializing_if = "Option::is_none")]
    pub mod_time: Option<DateTime<FixedOffset>>,

    #[serde(default, rename = "accesstime", skip_serializing_if = "Option::is_none")]
    pub access_time: Option<DateTime<FixedOffset>>,

    #[serde(default, rename = "changetime", skip_serializing_if = "Option::is_none")]
    pub change_time: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub xattrs: BTreeMap<String, String>,

    /// Digest of the whole file content (`reg` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Start of the entry's data in the layer stream
    #[serde(default)]
    pub offset: u64,

    /// End of the entry's data in the layer stream
    #[serde(default)]
    pub end_offset: u64,

    #[serde(default)]
    pub chunk_size: u64,

    /// Offset within the file (not the stream) covered by this chunk
    #[serde(default)]
    pub chunk_offset: u64,

    /// Digest of the chunk covering `chunk_offset..chunk_offset + chunk_size`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_digest: Option<String>,
}

impl TocEntry {
    /// Whole-file digest, if present and non-empty
    pub fn content_digest(&self) -> Option<&str> {
        self.digest.as_deref().filter(|d| !d.is_empty())
    }

    /// Chunk digest, if present and non-empty
    pub fn chunk_digest(&self) -> Option<&str> {
        self.chunk_digest.as_deref().filter(|d| !d.is_empty())
    }

    /// Whether the entry can be found by digest
    pub fn is_addressable(&self) -> bool {
        self.content_digest().is_some() || self.chunk_digest().is_some()
    }

    /// Check the fields each kind requires
    pub fn validate(&self) -> ChunkedResult<()> {
        if self.name.is_empty() {
            return Err(ChunkedError::toc_invalid("", format!("{} entry without a name", self.kind)));
        }

        if self.kind.needs_link_name() && self.link_name.as_deref().map_or(true, str::is_empty) {
            return Err(ChunkedError::toc_invalid(
                &self.name,
                format!("{} entry without linkName", self.kind),
            ));
        }

        if let Some(digest) = self.content_digest() {
            validate_digest(digest)
                .map_err(|reason| ChunkedError::toc_invalid(&self.name, format!("digest: {}", reason)))?;
        }

        if let Some(digest) = self.chunk_digest() {
            validate_digest(digest).map_err(|reason| {
                ChunkedError::toc_invalid(&self.name, format!("chunkDigest: {}", reason))
            })?;
        }

        Ok(())
    }
}

/// Check the `algorithm:hex` shape of a digest string
pub fn validate_digest(digest: &str) -> Result<(), String> {
    let (algorithm, encoded) = digest
        .split_once(':')
        .ok_or_else(|| format!("{:?} is not in algorithm:hex form", digest))?;

    let algorithm_ok = !algorithm.is_empty()
        && algorithm
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"+._-".contains(&b));
    if !algorithm_ok {
        return Err(format!("invalid algorithm {:?}", algorithm));
    }

    let encoded_ok = !encoded.is_empty()
        && encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !encoded_ok {
        return Err(format!("invalid hex body in {:?}", digest));
    }

    Ok(())
}

impl Toc {
    /// Parse and validate a TOC from raw bytes
    pub fn parse(data: &[u8]) -> ChunkedResult<Self> {
        let toc: Toc = serde_json::from_slice(data).map_err(ChunkedError::TocParse)?;
        for entry in &toc.entries {
            entry.validate()?;
        }
        Ok(toc)
    }
}
