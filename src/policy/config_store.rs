// The config collaborator the policy resolver and admin operations read
// and write through. Kept as a narrow trait so the policy module never
// touches a real config file directly; two implementations are provided
// for tests and for the CLI front-end.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Integer-valued key/value config surface. Only the operations the
/// policy module needs: read an int, write an int, remove a key.
pub trait ConfigStore {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set(&mut self, key: &str, value: i64);
    fn unset(&mut self, key: &str);

    /// All `branch.<name>.powdifficulty` entries currently set, for
    /// reporting purposes.
    fn branch_overrides(&self) -> Vec<(String, u32)>;
}

/// A config store backed by nothing but process memory. Used in tests
/// and as the default when no persistent config is wired up.
#[derive(Debug, Default, Clone)]
pub struct InMemoryConfigStore {
    entries: BTreeMap<String, i64>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        InMemoryConfigStore::default()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), value);
    }

    fn unset(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn branch_overrides(&self) -> Vec<(String, u32)> {
        branch_overrides_from(&self.entries)
    }
}

/// A config store persisted as a flat JSON object on disk. Loaded once
/// at construction and flushed to disk on every mutation.
pub struct JsonFileConfigStore {
    path: PathBuf,
    entries: BTreeMap<String, i64>,
}

impl JsonFileConfigStore {
    /// Load `path` if it exists, or start empty. The file is created on
    /// the first write.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        Ok(JsonFileConfigStore { path, entries })
    }

    fn flush(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.entries).unwrap_or_default();
        if let Some(parent) = Path::new(&self.path).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), value);
        let _ = self.flush();
    }

    fn unset(&mut self, key: &str) {
        self.entries.remove(key);
        let _ = self.flush();
    }

    fn branch_overrides(&self) -> Vec<(String, u32)> {
        branch_overrides_from(&self.entries)
    }
}

fn branch_overrides_from(entries: &BTreeMap<String, i64>) -> Vec<(String, u32)> {
    entries
        .iter()
        .filter_map(|(key, value)| {
            let name = key
                .strip_prefix("branch.")?
                .strip_suffix(".powdifficulty")?;
            Some((name.to_string(), *value as u32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trip() {
        let mut store = InMemoryConfigStore::new();
        assert_eq!(store.get_int("pow.difficulty.main"), None);
        store.set("pow.difficulty.main", 24);
        assert_eq!(store.get_int("pow.difficulty.main"), Some(24));
        store.unset("pow.difficulty.main");
        assert_eq!(store.get_int("pow.difficulty.main"), None);
    }

    #[test]
    fn branch_overrides_filters_by_key_shape() {
        let mut store = InMemoryConfigStore::new();
        store.set("branch.main.powdifficulty", 24);
        store.set("pow.difficulty.default", 20);
        let overrides = store.branch_overrides();
        assert_eq!(overrides, vec![("main".to_string(), 24)]);
    }

    #[test]
    fn json_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pow-config.json");

        {
            let mut store = JsonFileConfigStore::open(&path).unwrap();
            store.set("branch.release/1.0.powdifficulty", 28);
        }

        let store = JsonFileConfigStore::open(&path).unwrap();
        assert_eq!(store.get_int("branch.release/1.0.powdifficulty"), Some(28));
    }

    #[test]
    fn json_file_store_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let store = JsonFileConfigStore::open(&path).unwrap();
        assert_eq!(store.get_int("anything"), None);
    }
}
