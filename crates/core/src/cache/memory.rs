//! In-memory partition storage.
//!
//! Uses a Vec of named maps behind a tokio RwLock so partitions keep their
//! creation order for [`CacheStorage::keys`] and [`CacheStorage::lookup_any`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{CacheStorage, PartitionInfo, request_key};
use crate::{Error, Request, Response};

type Partition = (String, HashMap<String, Response>);

/// In-process cache storage.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    partitions: Arc<RwLock<Vec<Partition>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(partitions: &[Partition], name: &str) -> Option<usize> {
    partitions.iter().position(|(n, _)| n == name)
}

#[async_trait::async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        if position(&partitions, partition).is_none() {
            partitions.push((partition.to_string(), HashMap::new()));
        }
        Ok(())
    }

    async fn has(&self, partition: &str) -> Result<bool, Error> {
        Ok(position(&self.partitions.read().await, partition).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.partitions.read().await.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        let mut partitions = self.partitions.write().await;
        match position(&partitions, partition) {
            Some(idx) => {
                partitions.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn lookup(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(request);
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|(n, _)| n == partition)
            .and_then(|(_, entries)| entries.get(&key).cloned()))
    }

    async fn lookup_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(request);
        let partitions = self.partitions.read().await;
        Ok(partitions.iter().find_map(|(_, entries)| entries.get(&key).cloned()))
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let key = request_key(request);
        let mut partitions = self.partitions.write().await;
        let idx = match position(&partitions, partition) {
            Some(idx) => idx,
            None => {
                partitions.push((partition.to_string(), HashMap::new()));
                partitions.len() - 1
            }
        };
        partitions[idx].1.insert(key, response.clone());
        Ok(())
    }

    async fn put_all(&self, partition: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let keyed: Vec<(String, Response)> = entries.iter().map(|(req, resp)| (request_key(req), resp.clone())).collect();
        let mut partitions = self.partitions.write().await;
        match position(&partitions, partition) {
            Some(idx) => partitions[idx].1.extend(keyed),
            None => partitions.push((partition.to_string(), keyed.into_iter().collect())),
        }
        Ok(())
    }

    async fn describe(&self) -> Result<Vec<PartitionInfo>, Error> {
        Ok(self
            .partitions
            .read()
            .await
            .iter()
            .map(|(name, entries)| PartitionInfo { name: name.clone(), entries: entries.len() as u64 })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn req(path: &str) -> Request {
        Request::get(Url::parse("https://novels.test").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_open_is_idempotent_and_ordered() {
        let store = MemoryStorage::new();
        store.open("b").await.unwrap();
        store.open("a").await.unwrap();
        store.open("b").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn test_put_creates_partition_lazily() {
        let store = MemoryStorage::new();
        store.put("pages", &req("/latest"), &Response::new(200, "hi")).await.unwrap();
        assert!(store.has("pages").await.unwrap());
        let hit = store.lookup("pages", &req("/latest")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "hi");
    }

    #[tokio::test]
    async fn test_lookup_any_prefers_oldest_partition() {
        let store = MemoryStorage::new();
        store.put("first", &req("/404.html"), &Response::new(200, "one")).await.unwrap();
        store.put("second", &req("/404.html"), &Response::new(200, "two")).await.unwrap();
        let hit = store.lookup_any(&req("/404.html")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "one");
    }

    #[tokio::test]
    async fn test_put_all() {
        let store = MemoryStorage::new();
        store.put("pages", &req("/"), &Response::new(200, "old home")).await.unwrap();

        let batch = vec![(req("/"), Response::new(200, "home")), (req("/latest"), Response::new(200, "latest"))];
        store.put_all("pages", &batch).await.unwrap();
        store.put_all("empty", &[]).await.unwrap();

        assert_eq!(store.lookup("pages", &req("/")).await.unwrap().unwrap().text(), "home");
        assert_eq!(store.lookup("pages", &req("/latest")).await.unwrap().unwrap().text(), "latest");
        assert!(store.has("empty").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStorage::new();
        store.put("pages", &req("/"), &Response::new(200, "home")).await.unwrap();
        assert!(store.delete("pages").await.unwrap());
        assert!(!store.delete("pages").await.unwrap());
        assert!(store.lookup_any(&req("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_describe_counts_entries() {
        let store = MemoryStorage::new();
        store.put("pages", &req("/"), &Response::new(200, "a")).await.unwrap();
        store.put("pages", &req("/"), &Response::new(200, "b")).await.unwrap();
        store.put("pages", &req("/latest"), &Response::new(200, "c")).await.unwrap();
        let info = store.describe().await.unwrap();
        assert_eq!(info, vec![PartitionInfo { name: "pages".into(), entries: 2 }]);
    }
}
