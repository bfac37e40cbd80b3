//! Per-layer blob storage
//!
//! The cache does not own its persistence. It talks to a [`LayerStore`],
//! which keeps opaque blobs addressed by `(layer id, key)`.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Blob storage keyed by layer id and key
pub trait LayerStore {
    /// Store the complete contents of `data` under `(layer_id, key)`
    fn put(&mut self, layer_id: &str, key: &str, data: &mut dyn Read) -> io::Result<()>;

    /// Open the blob stored under `(layer_id, key)`
    fn get(&self, layer_id: &str, key: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blobs: HashMap<(String, String), Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes, if any
    pub fn blob(&self, layer_id: &str, key: &str) -> Option<&[u8]> {
        self.blobs
            .get(&(layer_id.to_string(), key.to_string()))
            .map(Vec::as_slice)
    }
}

impl LayerStore for MemoryStore {
    fn put(&mut self, layer_id: &str, key: &str, data: &mut dyn Read) -> io::Result<()> {
        let mut buf = Vec::new();
        data.read_to_end(&mut buf)?;
        self.blobs
            .insert((layer_id.to_string(), key.to_string()), buf);
        Ok(())
    }

    fn get(&self, layer_id: &str, key: &str) -> io::Result<Box<dyn Read + '_>> {
        self.blob(layer_id, key)
            .map(|b| Box::new(Cursor::new(b)) as Box<dyn Read + '_>)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no blob {} for layer {}", key, layer_id),
                )
            })
    }
}

/// Filesystem store: one file per `<root>/<layer id>/<key>`
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `root`; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, layer_id: &str, key: &str) -> io::Result<PathBuf> {
        check_component(layer_id)?;
        check_component(key)?;
        Ok(self.root.join(layer_id).join(key))
    }
}

/// Ids become path components and must not escape the root
fn check_component(part: &str) -> io::Result<()> {
    if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\', '\0']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid store id {:?}", part),
        ));
    }
    Ok(())
}

impl LayerStore for DirStore {
    fn put(&mut self, layer_id: &str, key: &str, data: &mut dyn Read) -> io::Result<()> {
        let path = self.blob_path(layer_id, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Readers never see a half-written blob
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let result = (|| {
            let mut file = fs::File::create(&tmp)?;
            io::copy(&mut *data, &mut file)?;
            file.flush()?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        } else {
            debug!("Stored {}", path.display());
        }
        result
    }

    fn get(&self, layer_id: &str, key: &str) -> io::Result<Box<dyn Read + '_>> {
        let path = self.blob_path(layer_id, key)?;
        let file = fs::File::open(&path)?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_all(mut r: impl Read) -> Vec<u8> {
        let mut buf = Vec::new();
        r.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn memory_put_get() {
        let mut store = MemoryStore::new();
        store.put("layer", "key", &mut &b"hello"[..]).unwrap();

        assert_eq!(store.blob("layer", "key"), Some(&b"hello"[..]));
        assert_eq!(read_all(store.get("layer", "key").unwrap()), b"hello");
    }

    #[test]
    fn memory_missing_blob() {
        let store = MemoryStore::new();
        let err = store.get("layer", "key").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn dir_put_get() {
        let dir = TempDir::new().unwrap();
        let mut store = DirStore::new(dir.path());

        store.put("layer1", "cache", &mut &b"data"[..]).unwrap();

        assert!(dir.path().join("layer1").join("cache").is_file());
        assert!(!dir.path().join("layer1").join("cache.tmp").exists());
        assert_eq!(read_all(store.get("layer1", "cache").unwrap()), b"data");
    }

    #[test]
    fn dir_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut store = DirStore::new(dir.path());

        store.put("l", "k", &mut &b"old contents"[..]).unwrap();
        store.put("l", "k", &mut &b"new"[..]).unwrap();

        assert_eq!(read_all(store.get("l", "k").unwrap()), b"new");
    }

    #[test]
    fn dir_rejects_path_escape() {
        let dir = TempDir::new().unwrap();
        let mut store = DirStore::new(dir.path());

        for bad in ["..", "a/b", "", "."] {
            let err = store.put(bad, "k", &mut &b""[..]).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
        let err = store.get("layer", "../etc").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn dir_missing_blob() {
        let dir = TempDir::new().unwrap();
        let store = DirStore::new(dir.path());
        let err = store.get("layer", "key").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
