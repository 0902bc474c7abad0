use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const TASKS_KEY: &str = "tasks";
pub const THEME_KEY: &str = "theme";
pub const USER_DATA_KEY: &str = "userData";
pub const SESSION_KEY: &str = "isLoggedIn";

pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct FileKvStore {
    pub data_dir: PathBuf,
}

impl FileKvStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened kv store");
        Ok(Self { data_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.data"))
    }
}

impl KvStore for FileKvStore {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            debug!(key, "key not present");
            return Ok(None);
        }

        let value = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        debug!(key, len = value.len(), "read value");
        Ok(Some(value))
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.key_path(key);
        debug!(key, file = %path.display(), len = value.len(), "writing value atomically");

        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed removing {}", path.display()))?;
            debug!(key, "removed key");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    map: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.map.remove(key);
        Ok(())
    }
}
