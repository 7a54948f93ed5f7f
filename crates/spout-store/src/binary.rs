//! File-backed store in a compact binary format.
//!
//! Layout (big-endian): `u32` entry count, then for each entry an `i32` id,
//! a `u16` key length and the UTF-8 key bytes.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut};
use tracing::{debug, warn};

use crate::memory::MemoryStore;
use crate::{Insertion, SimpleStore, StoreError};

/// Longest key the format can hold.
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// [`MemoryStore`] that persists itself to a single file.
#[derive(Debug)]
pub struct BinaryFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl BinaryFileStore {
    /// Create an empty store bound to `path`. Nothing is read until [`load`](SimpleStore::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            memory: MemoryStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.memory.is_dirty()
    }
}

impl SimpleStore for BinaryFileStore {
    fn get(&self, key: &str) -> Option<i32> {
        self.memory.get(key)
    }

    fn reverse_get(&self, id: i32) -> Option<String> {
        self.memory.reverse_get(id)
    }

    fn set(&self, key: &str, id: i32) -> Option<i32> {
        self.memory.set(key, id)
    }

    fn set_if_absent(&self, key: &str, id: i32) -> Insertion {
        self.memory.set_if_absent(key, id)
    }

    fn remove(&self, key: &str) -> Option<i32> {
        self.memory.remove(key)
    }

    fn clear(&self) {
        self.memory.clear()
    }

    fn len(&self) -> usize {
        self.memory.len()
    }

    fn keys(&self) -> Vec<String> {
        self.memory.keys()
    }

    fn entries(&self) -> Vec<(String, i32)> {
        self.memory.entries()
    }

    fn save(&self) -> Result<(), StoreError> {
        // Hold the write lock for the whole save so no mapping slips in between
        // encoding and clearing the dirty flag.
        let mut maps = self.memory.write();
        if !maps.dirty {
            return Ok(());
        }
        let buf = encode(&maps.sorted_entries())?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, &self.path)?;

        maps.dirty = false;
        debug!(
            "Saved {} entries to {}",
            maps.by_key.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<(), StoreError> {
        let data = fs::read(&self.path)?;
        let entries = match decode(&data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to decode store {}: {e}", self.path.display());
                return Err(e);
            }
        };
        debug!(
            "Loaded {} entries from {}",
            entries.len(),
            self.path.display()
        );
        self.memory.write().replace_all(entries);
        Ok(())
    }
}

fn encode(entries: &[(String, i32)]) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::with_capacity(4 + entries.len() * 16);
    buf.put_u32(entries.len() as u32);
    for (key, id) in entries {
        if key.len() > MAX_KEY_LEN {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                limit: MAX_KEY_LEN,
            });
        }
        buf.put_i32(*id);
        buf.put_u16(key.len() as u16);
        buf.put_slice(key.as_bytes());
    }
    Ok(buf)
}

fn decode(mut buf: &[u8]) -> Result<Vec<(String, i32)>, StoreError> {
    ensure_remaining(&buf, 4)?;
    let count = buf.get_u32() as usize;
    // Every entry needs at least 6 bytes, so a bogus count can't over-allocate.
    let mut entries = Vec::with_capacity(count.min(buf.remaining() / 6));
    for _ in 0..count {
        ensure_remaining(&buf, 6)?;
        let id = buf.get_i32();
        let len = buf.get_u16() as usize;
        ensure_remaining(&buf, len)?;
        let key = std::str::from_utf8(&buf[..len])
            .map_err(|_| StoreError::InvalidUtf8)?
            .to_string();
        buf.advance(len);
        entries.push((key, id));
    }
    Ok(entries)
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), StoreError> {
    if buf.remaining() < needed {
        return Err(StoreError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}
