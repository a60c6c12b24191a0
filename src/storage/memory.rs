use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Collection, Predicate};
use crate::errors::Result;

/// In-process namespace with no persistence. Useful for tests and
/// throwaway deployments.
pub struct MemoryCollection<T> {
    data: RwLock<HashMap<String, T>>,
}

impl<T> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Collection<T> for MemoryCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>> {
        let data = self.data.read().unwrap();
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: T) -> Result<()> {
        let mut data = self.data.write().unwrap();
        data.insert(key.to_string(), value);
        Ok(())
    }

    async fn filter(&self, predicate: Predicate<T>) -> Result<Vec<T>> {
        let data = self.data.read().unwrap();
        Ok(data.values().filter(|v| predicate(v)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_absent() {
        let collection: MemoryCollection<String> = MemoryCollection::new();
        assert!(collection.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let collection = MemoryCollection::new();
        collection.set("k", "v".to_string()).await.unwrap();
        assert_eq!(collection.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_filter() {
        let collection = MemoryCollection::new();
        collection.set("a", 1u32).await.unwrap();
        collection.set("b", 2u32).await.unwrap();
        collection.set("c", 3u32).await.unwrap();

        let odd = collection.filter(Box::new(|v| v % 2 == 1)).await.unwrap();
        assert_eq!(odd.len(), 2);
    }
}
