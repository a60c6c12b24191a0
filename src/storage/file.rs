use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::{namespaces, Collection, Collections, Predicate};
use crate::errors::{Result, ShortgateError};

/// One JSON document per namespace, with a write-through in-memory map.
pub struct FileCollection<T> {
    file_path: PathBuf,
    cache: RwLock<HashMap<String, T>>,
}

impl<T> FileCollection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(file_path: PathBuf) -> Result<Self> {
        let cache = Self::load_from_file(&file_path)?;
        info!(
            "FileCollection ready: {} ({} records)",
            file_path.display(),
            cache.len()
        );
        Ok(Self {
            file_path,
            cache: RwLock::new(cache),
        })
    }

    fn load_from_file(path: &Path) -> Result<HashMap<String, T>> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ShortgateError::serialization(format!(
                    "Failed to parse {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(_) => {
                // Missing file: start empty and create it on first write.
                fs::write(path, "{}")?;
                Ok(HashMap::new())
            }
        }
    }

    fn save_to_file(&self, records: &HashMap<String, T>) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.file_path, json)?;
        Ok(())
    }
}

#[async_trait]
impl<T> Collection<T> for FileCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>> {
        let cache = self.cache.read().unwrap();
        Ok(cache.get(key).cloned())
    }

    async fn set(&self, key: &str, value: T) -> Result<()> {
        let mut cache = self.cache.write().unwrap();
        cache.insert(key.to_string(), value);
        self.save_to_file(&cache)
    }

    async fn filter(&self, predicate: Predicate<T>) -> Result<Vec<T>> {
        let cache = self.cache.read().unwrap();
        Ok(cache.values().filter(|v| predicate(v)).cloned().collect())
    }
}

/// Build the four namespaces under one data directory.
pub fn open_collections(dir: &str) -> Result<Collections> {
    fs::create_dir_all(dir)?;
    let dir = Path::new(dir);

    let file = |namespace: &str| dir.join(format!("{}.json", namespace));

    Ok(Collections {
        users: Arc::new(FileCollection::new(file(namespaces::USERS))?),
        shortcodes: Arc::new(FileCollection::new(file(namespaces::SHORTCODES))?),
        creations: Arc::new(FileCollection::new(file(namespaces::SHORTCODE_CREATIONS))?),
        invocations: Arc::new(FileCollection::new(file(namespaces::SHORTCODE_INVOCATIONS))?),
    })
}
