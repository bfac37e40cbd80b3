//! Hardlink fingerprints
//!
//! A hardlinked copy of a file may be listed without its own digest. The
//! fingerprint identifies it by the metadata that hardlinked files share, so
//! it resolves to the same cached location as its sibling.

use crate::error::{ChunkedError, ChunkedResult};
use crate::toc::entry::{EntryKind, TocEntry};
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Derive the hardlink fingerprint of a regular file entry
///
/// Covers size, mode, owner, modification time and extended attributes,
/// hashed as `sha256:<hex>`. The content digest is deliberately left out.
pub fn hardlink_fingerprint(entry: &TocEntry) -> ChunkedResult<String> {
    if entry.kind != EntryKind::Reg {
        return Err(ChunkedError::fingerprint(
            &entry.name,
            format!("expected a reg entry, got {}", entry.kind),
        ));
    }

    let size = entry
        .size
        .ok_or_else(|| ChunkedError::fingerprint(&entry.name, "size is missing"))?;
    let mode = entry
        .mode
        .ok_or_else(|| ChunkedError::fingerprint(&entry.name, "mode is missing"))?;
    let mod_time = entry
        .mod_time
        .ok_or_else(|| ChunkedError::fingerprint(&entry.name, "modtime is missing"))?;

    // Normalised so equal instants written with different offsets agree
    let mod_time = mod_time
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Nanos, true);

    let mut hasher = Sha256::new();
    for field in [
        size.to_string(),
        format!("{:o}", mode),
        entry.uid.to_string(),
        entry.gid.to_string(),
        mod_time,
    ] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    // BTreeMap iterates in key order
    for (key, value) in &entry.xattrs {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}
