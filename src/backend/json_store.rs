use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::backend::interface::{scan, BackendError, Result, StateEntry, WorldState};

/// World state persisted as a single JSON object mapping keys to values.
/// Changes stay in memory until `flush`.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    entries: BTreeMap<String, String>
}

impl JsonStore {
    /// Loads the store from `path`. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<JsonStore> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        debug!("opened world state {} with {} keys", path.display(), entries.len());
        return Ok(JsonStore { path, entries });
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("flushed {} keys to {}", entries.len(), self.path.display());
        return Ok(());
    }
}

impl WorldState for JsonStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|value| value.clone().into_bytes()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        let value = String::from_utf8(value)
            .map_err(|_| BackendError::NonUtf8Value(key.to_owned()))?;
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<StateEntry>> {
        Ok(scan(&self.entries, start, end).into_iter()
            .map(|(key, value)| (key, value.into_bytes()))
            .collect())
    }

    fn flush(&mut self) -> Result<()> {
        self.persist(&self.entries)
    }

    /// The candidate state reaches disk before it replaces the entries in
    /// memory, so a failed write leaves the store as it was.
    fn apply(&mut self, writes: BTreeMap<String, Vec<u8>>) -> Result<()> {
        let mut entries = self.entries.clone();
        for (key, value) in writes {
            let value = String::from_utf8(value)
                .map_err(|_| BackendError::NonUtf8Value(key.clone()))?;
            entries.insert(key, value);
        }
        self.persist(&entries)?;
        self.entries = entries;
        return Ok(());
    }
}


#[cfg(test)]
mod tests {
    use crate::backend::{BackendError, JsonStore, WorldState};

    use std::collections::BTreeMap;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn missing_file_opens_empty(dir: TempDir) {
        let store = JsonStore::open(dir.path().join("state.json")).unwrap();
        assert!(store.get_state_by_range("", "").unwrap().is_empty());
    }

    #[rstest]
    fn flush_persists_across_reopen(dir: TempDir) {
        let path = dir.path().join("nested").join("state.json");
        let mut store = JsonStore::open(&path).unwrap();
        store.put_state("CAR0", br#"{"carId":"M101"}"#.to_vec()).unwrap();
        store.put_state("M105", br#"{"carId":"M105"}"#.to_vec()).unwrap();
        store.flush().unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        let keys: Vec<_> = reopened.get_state_by_range("", "").unwrap()
            .into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["CAR0", "M105"]);
        assert_eq!(reopened.get_state("M105").unwrap().unwrap(), br#"{"carId":"M105"}"#);
    }

    #[rstest]
    fn unflushed_changes_are_not_persisted(dir: TempDir) {
        let path = dir.path().join("state.json");
        let mut store = JsonStore::open(&path).unwrap();
        store.put_state("CAR0", b"{}".to_vec()).unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        assert!(reopened.get_state("CAR0").unwrap().is_none());
    }

    #[rstest]
    fn rejects_binary_values(dir: TempDir) {
        let mut store = JsonStore::open(dir.path().join("state.json")).unwrap();
        let res = store.put_state("bad", vec![0xff, 0xfe]);
        assert!(matches!(res, Err(BackendError::NonUtf8Value(key)) if key == "bad"));
    }

    #[rstest]
    fn failed_apply_keeps_previous_entries(dir: TempDir) {
        let path = dir.path().join("state.json");
        let mut store = JsonStore::open(&path).unwrap();
        store.apply(BTreeMap::from([("CAR0".to_owned(), b"old".to_vec())])).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        let res = store.apply(BTreeMap::from([
            ("CAR0".to_owned(), b"new".to_vec()),
            ("M105".to_owned(), b"{}".to_vec())
        ]));

        assert!(matches!(res, Err(BackendError::Io(_))));
        assert_eq!(store.get_state("CAR0").unwrap().unwrap(), b"old");
        assert!(store.get_state("M105").unwrap().is_none());
    }

    #[rstest]
    fn corrupt_file_is_an_error(dir: TempDir) {
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonStore::open(&path), Err(BackendError::Serialization(_))));
    }
}
