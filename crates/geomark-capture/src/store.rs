//! Durable storage for the captured location.
//!
//! Two keys back one logical entry: the coordinate as JSON and the raw
//! address string. A partial pair is not a defined state and always reads
//! as a miss.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::{Address, CapturedLocation, Coordinate, StoreError};

/// Key holding the JSON-encoded coordinate
pub const LOCATION_KEY: &str = "user_location";
/// Key holding the raw address string
pub const ADDRESS_KEY: &str = "user_address";

/// Capture storage over one of the supported backends.
#[derive(Debug, Clone)]
pub enum LocationStore {
    /// One file per key under a data directory (default).
    File(FileStore),
    /// Shared in-process map; the swappable test double.
    Memory(MemoryStore),
}

impl LocationStore {
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::File(FileStore::new(dir))
    }

    pub fn memory() -> Self {
        Self::Memory(MemoryStore::default())
    }

    /// Read the stored entry.
    ///
    /// Some iff both keys are present and the coordinate decodes as valid
    /// structured data; a parse failure reads as a miss, never an error.
    pub fn read(&self) -> Option<CapturedLocation> {
        match self {
            Self::File(store) => store.read(),
            Self::Memory(store) => store.read(),
        }
    }

    /// Persist both keys. The writes are consecutive with no suspension
    /// point between them, so the pair is atomic for a single-threaded
    /// caller.
    pub fn write(&self, entry: &CapturedLocation) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.write(entry),
            Self::Memory(store) => store.write(entry),
        }
    }

    /// Remove both keys. Missing keys are not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.clear(),
            Self::Memory(store) => store.clear(),
        }
    }
}

fn decode(location_raw: &str, address_raw: &str) -> Option<CapturedLocation> {
    let coordinate: Coordinate = serde_json::from_str(location_raw).ok()?;
    if !coordinate.is_valid() {
        return None;
    }
    Some(CapturedLocation {
        coordinate,
        address: Address::new(address_raw),
    })
}

/// File-per-key backend under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn location_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", LOCATION_KEY))
    }

    fn address_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", ADDRESS_KEY))
    }

    fn read(&self) -> Option<CapturedLocation> {
        let location_raw = fs::read_to_string(self.location_path()).ok()?;
        let address_raw = fs::read_to_string(self.address_path()).ok()?;
        decode(&location_raw, &address_raw)
    }

    fn write(&self, entry: &CapturedLocation) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let encoded = serde_json::to_string(&entry.coordinate)?;
        fs::write(self.location_path(), encoded)?;
        fs::write(self.address_path(), entry.address.as_str())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        remove_if_present(&self.location_path())?;
        remove_if_present(&self.address_path())?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

/// In-process map shared across clones, mirroring origin-scoped key-value
/// storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    fn read(&self) -> Option<CapturedLocation> {
        let entries = self.entries.lock();
        let location_raw = entries.get(LOCATION_KEY)?;
        let address_raw = entries.get(ADDRESS_KEY)?;
        decode(location_raw, address_raw)
    }

    fn write(&self, entry: &CapturedLocation) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&entry.coordinate)?;
        let mut entries = self.entries.lock();
        entries.insert(LOCATION_KEY.to_string(), encoded);
        entries.insert(ADDRESS_KEY.to_string(), entry.address.as_str().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        entries.remove(LOCATION_KEY);
        entries.remove(ADDRESS_KEY);
        Ok(())
    }

    /// Put a raw value under one key; lets tests shape partial or malformed
    /// states.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }

    /// Raw value currently stored under a key.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CapturedLocation {
        CapturedLocation {
            coordinate: Coordinate::from_degrees(12.345678, 98.765432),
            address: Address::new("Test Plaza"),
        }
    }

    #[test]
    fn test_memory_round_trip_preserves_strings() {
        let store = LocationStore::memory();
        store.write(&entry()).unwrap();

        let read = store.read().unwrap();
        assert_eq!(read.coordinate.latitude, "12.345678");
        assert_eq!(read.coordinate.longitude, "98.765432");
        assert_eq!(read.address.as_str(), "Test Plaza");
    }

    #[test]
    fn test_memory_partial_pair_reads_as_miss() {
        let memory = MemoryStore::default();
        memory.insert_raw(LOCATION_KEY, r#"{"latitude":"1.000000","longitude":"2.000000"}"#);
        assert!(LocationStore::Memory(memory.clone()).read().is_none());

        let memory = MemoryStore::default();
        memory.insert_raw(ADDRESS_KEY, "Test Plaza");
        assert!(LocationStore::Memory(memory).read().is_none());
    }

    #[test]
    fn test_memory_malformed_coordinate_reads_as_miss() {
        let memory = MemoryStore::default();
        memory.insert_raw(LOCATION_KEY, "not json");
        memory.insert_raw(ADDRESS_KEY, "Test Plaza");
        assert!(LocationStore::Memory(memory).read().is_none());
    }

    #[test]
    fn test_memory_out_of_range_coordinate_reads_as_miss() {
        let memory = MemoryStore::default();
        memory.insert_raw(
            LOCATION_KEY,
            r#"{"latitude":"123.000000","longitude":"0.000000"}"#,
        );
        memory.insert_raw(ADDRESS_KEY, "Test Plaza");
        assert!(LocationStore::Memory(memory).read().is_none());
    }

    #[test]
    fn test_memory_clear_removes_both_keys() {
        let memory = MemoryStore::default();
        let store = LocationStore::Memory(memory.clone());
        store.write(&entry()).unwrap();
        store.clear().unwrap();

        assert!(memory.get_raw(LOCATION_KEY).is_none());
        assert!(memory.get_raw(ADDRESS_KEY).is_none());
        assert!(store.read().is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocationStore::file(dir.path());

        assert!(store.read().is_none());
        store.write(&entry()).unwrap();
        assert_eq!(store.read().unwrap(), entry());
    }

    #[test]
    fn test_file_partial_pair_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let file_store = FileStore::new(dir.path());
        let store = LocationStore::File(file_store.clone());
        store.write(&entry()).unwrap();

        fs::remove_file(file_store.address_path()).unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_file_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocationStore::file(dir.path());

        // Nothing written yet; clearing must still succeed
        store.clear().unwrap();

        store.write(&entry()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_file_write_fails_on_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = LocationStore::file(blocker.join("store"));
        assert!(store.write(&entry()).is_err());
    }
}
