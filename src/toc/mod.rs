//! Layer table of contents
//!
//! Parses the TOC of a chunked layer and keeps only the entries a puller can
//! find by digest: regular files with a content digest and chunks with a
//! chunk digest.

pub mod entry;
pub mod fingerprint;

pub use entry::{validate_digest, EntryKind, Toc, TocEntry};
pub use fingerprint::hardlink_fingerprint;

use crate::error::ChunkedResult;
use tracing::debug;

/// Parse a TOC and keep the digest-addressable entries, in TOC order
pub fn prepare_metadata(toc: &[u8]) -> ChunkedResult<Vec<TocEntry>> {
    let toc = Toc::parse(toc)?;
    let total = toc.entries.len();

    let entries: Vec<TocEntry> = toc
        .entries
        .into_iter()
        .filter(TocEntry::is_addressable)
        .collect();

    debug!("TOC has {} entries, {} addressable", total, entries.len());
    Ok(entries)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ChunkedError;

    pub(crate) const JSON_TOC: &str = r#"
{
  "version": 1,
  "entries": [
    {
      "type": "symlink",
      "name": "bin",
      "linkName": "usr/bin",
      "mode": 511,
      "modtime": "1970-01-01T01:00:00+01:00",
      "accesstime": "0001-01-01T00:00:00Z",
      "changetime": "0001-01-01T00:00:00Z"
    },
    {
      "type": "dir",
      "name": "usr/bin",
      "mode": 511,
      "modtime": "2022-01-07T12:36:43+01:00",
      "accesstime": "0001-01-01T00:00:00Z",
      "changetime": "0001-01-01T00:00:00Z"
    },
    {
      "type": "reg",
      "name": "usr/bin/foo",
      "mode": 511,
      "size": 103867,
      "modtime": "1970-01-01T01:00:00+01:00",
      "accesstime": "0001-01-01T00:00:00Z",
      "changetime": "0001-01-01T00:00:00Z",
      "digest": "sha256:99fe908c699dc068438b23e28319cadff1f2153c3043bafb8e83a430bba0a2c6",
      "offset": 94149,
      "endOffset": 120135,
      "chunkSize": 17615,
      "chunkDigest": "sha256:2ce0d0f8eb2aa93d13007097763e4459c814c8d0e859e5a57465af924169b544"
    },
    {
      "type": "chunk",
      "name": "usr/bin/foo",
      "offset": 99939,
      "chunkSize": 86252,
      "chunkOffset": 17615,
      "chunkDigest": "sha256:2a9d3f1b6b37abc8bb35eb8fa98b893a2a2447bcb01184c3bafc8c6b40da099d"
    }
  ]
}
"#;

    #[test]
    fn prepare_keeps_addressable_entries() {
        let entries = prepare_metadata(JSON_TOC.as_bytes()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Reg);
        assert_eq!(entries[1].kind, EntryKind::Chunk);
        assert_eq!(entries[1].chunk_offset, 17615);
    }

    #[test]
    fn prepare_empty_toc() {
        let entries = prepare_metadata(br#"{"version": 1}"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn prepare_malformed_toc() {
        let result = prepare_metadata(b"not json");
        assert!(matches!(result, Err(ChunkedError::TocParse(_))));
    }
}
