//! Store implementation
//!
//! Vec-backed store with linear key lookup.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::config::{Compression, Config};
use crate::error::{Result, SmolError};
use crate::value::{Value, ValueKind};

use super::Entry;

/// An embeddable key-value store persisted to a single file
///
/// The whole struct is the unit of persistence: a save encodes the
/// filename, every entry and the compression settings, so a load restores
/// the compression mode along with the data.
///
/// Not safe for concurrent mutation; see the module docs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Path used by save/load
    filename: PathBuf,

    /// Entries in insertion order, keys unique
    entries: Vec<Entry>,

    /// Compression applied on save
    compression: Compression,
}

impl Store {
    /// Create an empty store bound to `filename`
    ///
    /// Compression starts disabled at level 0. No I/O is performed.
    pub fn create(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            entries: Vec::new(),
            compression: Compression::disabled(),
        }
    }

    /// Create an empty store from a config
    pub fn with_config(config: Config) -> Self {
        Self {
            filename: config.filename,
            entries: Vec::new(),
            compression: config.compression,
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Position of `key` in insertion order, if present
    ///
    /// Linear scan; every other lookup goes through here.
    pub fn key_index(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_index(key).is_some()
    }

    /// Get the full entry for `key`
    pub fn get(&self, key: &str) -> Result<&Entry> {
        self.key_index(key)
            .and_then(|idx| self.entries.get(idx))
            .ok_or_else(|| SmolError::KeyNotFound(key.to_string()))
    }

    /// Get just the value for `key`
    ///
    /// `None` means the key is absent; a stored `Value::Null` comes back
    /// as `Some(&Value::Null)`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key).ok().map(Entry::value)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append a new entry
    ///
    /// Fails with `DuplicateKey` if `key` is already present; the existing
    /// value is left untouched. Use [`set`](Self::set) to replace.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(SmolError::DuplicateKey(key));
        }
        self.entries.push(Entry::new(key, value.into()));
        Ok(())
    }

    /// Replace the value of an existing entry in place
    ///
    /// Not an upsert: a missing key is `KeyNotFound`. Position is unchanged.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self
            .key_index(key)
            .ok_or_else(|| SmolError::KeyNotFound(key.to_string()))?;
        self.entries[idx].value = value.into();
        Ok(())
    }

    /// Remove the entry for `key`, keeping the order of the rest
    pub fn delete(&mut self, key: &str) -> Result<Entry> {
        let idx = self
            .key_index(key)
            .ok_or_else(|| SmolError::KeyNotFound(key.to_string()))?;
        Ok(self.entries.remove(idx))
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries = Vec::new();
    }

    /// Compress future saves at `level`
    ///
    /// Files already on disk are not touched. The level is checked when
    /// the store is saved.
    pub fn enable_compression(&mut self, level: u32) {
        self.compression = Compression::with_level(level);
    }

    /// Write future saves uncompressed
    pub fn disable_compression(&mut self) {
        self.compression = Compression::disabled();
    }

    // =========================================================================
    // Bulk views
    // =========================================================================

    /// Snapshot of all entries as key → value
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.entries
            .iter()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// Entries whose value has the same variant as `sample`
    ///
    /// A filter over existing entries, not a schema: the store never
    /// requires values to share a type.
    pub fn group_by_type(&self, sample: &Value) -> HashMap<String, Value> {
        self.group_by_kind(sample.kind())
    }

    /// Entries whose value has variant `kind`
    pub fn group_by_kind(&self, kind: ValueKind) -> HashMap<String, Value> {
        self.entries
            .iter()
            .filter(|entry| entry.value.kind() == kind)
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the whole store to its file
    pub fn save(&self) -> Result<()> {
        codec::save(self)
    }

    /// Write the whole store to another path
    ///
    /// The store keeps its own filename; this does not rename it.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        codec::save_to(self, path.as_ref())
    }

    /// Read a store previously written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        codec::load(path.as_ref())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// First key that appears more than once, if any.
    ///
    /// Only a decoded file can break uniqueness; the codec calls this
    /// before handing a store back.
    pub(crate) fn find_duplicate_key(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        self.entries
            .iter()
            .map(Entry::key)
            .find(|key| !seen.insert(*key))
    }
}
