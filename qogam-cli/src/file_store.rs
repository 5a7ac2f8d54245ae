//! JSON-file implementation of [`KeyValueStore`], the CLI's stand-in for the app's device storage.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use qogam_core::store::{KeyValueStore, StoreError, StoreResult};

/// Stores every key in one JSON object. Writes go through a temporary file and a rename so an
/// interrupted write never leaves a truncated file behind.
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`, creating parent directories. The file itself is created on the
    /// first write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| backend(parent, &err))?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Backend("file store lock poisoned".to_string()))
    }

    fn read(&self) -> StoreResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| StoreError::Serialization(err.to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(backend(&self.path, &err)),
        }
    }

    fn write(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(values)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|err| backend(&tmp, &err))?;
        fs::rename(&tmp, &self.path).map_err(|err| backend(&self.path, &err))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read()?.remove(&key))
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut values = self.read()?;
        values.insert(key, value);
        self.write(&values)
    }

    fn remove(&self, key: String) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut values = self.read()?;
        if values.remove(&key).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

fn backend(path: &Path, err: &std::io::Error) -> StoreError {
    StoreError::Backend(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileKeyValueStore::open(&path).unwrap();
        store.set("@auth_token".into(), "tok".into()).unwrap();
        store.set("user-language".into(), "kk".into()).unwrap();
        drop(store);

        let reopened = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(reopened.get("@auth_token".into()).unwrap().as_deref(), Some("tok"));
        assert_eq!(reopened.get("missing".into()).unwrap(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("session.json")).unwrap();

        store.remove("@auth_phone".into()).unwrap();
        assert!(!store.path().exists());

        store.set("@auth_phone".into(), "77001234567".into()).unwrap();
        store.remove("@auth_phone".into()).unwrap();
        store.remove("@auth_phone".into()).unwrap();
        assert_eq!(store.get("@auth_phone".into()).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileKeyValueStore::open(&path).unwrap();
        assert!(matches!(
            store.get("@auth_token".into()),
            Err(StoreError::Serialization(_))
        ));
    }
}
