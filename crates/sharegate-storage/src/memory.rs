use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use sharegate_core::error::StorageError;
use sharegate_core::repository::{sort_most_recent_first, ReadRepository, Repository, Result};
use sharegate_core::{LinkId, OwnerId, ShareLink};

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap shards its locks, so mutations of one link hold a write lock on a
/// single shard only. Every read-check-write below happens under that lock,
/// which is what makes `record_access` and `deactivate` atomic per link.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, ShareLink>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored links, expired and revoked ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, id: &LinkId) -> Result<Option<ShareLink>> {
        Ok(self.storage.get(id.as_str()).map(|entry| entry.clone()))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ShareLink>> {
        let mut links: Vec<ShareLink> = self
            .storage
            .iter()
            .filter(|entry| &entry.owner_id == owner)
            .map(|entry| entry.clone())
            .collect();
        sort_most_recent_first(&mut links);
        Ok(links)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, link: &ShareLink) -> Result<()> {
        match self.storage.entry(link.id.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(link.id.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(link.clone());
                Ok(())
            }
        }
    }

    async fn record_access(&self, id: &LinkId, now: Timestamp) -> Result<Option<ShareLink>> {
        let Some(mut entry) = self.storage.get_mut(id.as_str()) else {
            return Ok(None);
        };

        if !entry.is_resolvable(now) {
            return Ok(None);
        }

        entry.access_count = entry.access_count.checked_add(1).ok_or_else(|| {
            StorageError::InvalidData(format!("access count overflow for link '{id}'"))
        })?;

        Ok(Some(entry.clone()))
    }

    async fn deactivate(&self, id: &LinkId) -> Result<bool> {
        let Some(mut entry) = self.storage.get_mut(id.as_str()) else {
            return Ok(false);
        };
        entry.is_active = false;
        Ok(true)
    }

    async fn delete(&self, id: &LinkId) -> Result<bool> {
        Ok(self.storage.remove(id.as_str()).is_some())
    }

    async fn purge_expired_before(&self, cutoff: Timestamp) -> Result<u64> {
        let mut purged = 0;
        self.storage.retain(|_, link| {
            let keep = link.expires_at >= cutoff;
            if !keep {
                purged += 1;
            }
            keep
        });
        Ok(purged)
    }
}
