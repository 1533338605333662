//! In-memory notification store using DashMap.
//!
//! Documents are lost on service restart.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::notification::{NewNotification, Notification};

use super::{FindOne, NotificationStore, StoreError};

struct StoredDocument {
    /// Insertion sequence, used for stable ordering
    seq: u64,
    notification: Notification,
}

pub struct MemoryNotificationStore {
    documents: DashMap<String, StoredDocument>,
    next_seq: AtomicU64,
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        notification.validate().map_err(StoreError::Validation)?;

        let id = Uuid::new_v4().to_string();
        let stored = notification.into_stored(id.clone(), Utc::now());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        self.documents.insert(
            id,
            StoredDocument {
                seq,
                notification: stored.clone(),
            },
        );

        Ok(stored)
    }

    async fn find_by_target(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let mut matches: Vec<(u64, Notification)> = self
            .documents
            .iter()
            .filter(|entry| entry.notification.is_addressed_to(user_id))
            .map(|entry| (entry.seq, entry.notification.clone()))
            .collect();

        matches.sort_by_key(|(seq, _)| *seq);
        Ok(matches.into_iter().map(|(_, n)| n).collect())
    }

    async fn touch_by_target(&self, user_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut updated = 0;
        for mut entry in self.documents.iter_mut() {
            if entry.notification.is_addressed_to(user_id) {
                entry.notification.last_accessed = Some(at);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn touch_and_find_by_target(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Notification>, StoreError> {
        // Stamp and copy under the same shard lock
        let mut touched: Vec<(u64, Notification)> = Vec::new();
        for mut entry in self.documents.iter_mut() {
            if entry.notification.is_addressed_to(user_id) {
                entry.notification.last_accessed = Some(at);
                touched.push((entry.seq, entry.notification.clone()));
            }
        }

        touched.sort_by_key(|(seq, _)| *seq);
        Ok(touched.into_iter().map(|(_, n)| n).collect())
    }

    async fn find_one(&self, id: &str) -> Result<FindOne, StoreError> {
        Ok(match self.documents.get(id) {
            Some(entry) => FindOne::Found(entry.notification.clone()),
            None => FindOne::Missing,
        })
    }

    async fn delete(&self, notification: &Notification) -> Result<(), StoreError> {
        self.documents
            .remove(&notification.id)
            .map(|_| ())
            .ok_or_else(|| {
                StoreError::Operation(format!("notification {} no longer exists", notification.id))
            })
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{NotificationVariant, Target};

    fn invite(user_id: &str, list_id: &str) -> NewNotification {
        NewNotification {
            targets: vec![Target::new(user_id, format!("kc-{}", user_id))],
            variant: NotificationVariant::ListInvite {
                list_id: list_id.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryNotificationStore::new();
        let stored = store.insert(invite("u1", "L1")).await.unwrap();

        assert!(!stored.id.is_empty());
        assert!(stored.last_accessed.is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_document() {
        let store = MemoryNotificationStore::new();
        let result = store
            .insert(NewNotification {
                targets: vec![],
                variant: NotificationVariant::Base,
            })
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_target_in_insertion_order() {
        let store = MemoryNotificationStore::new();
        for list in ["L1", "L2", "L3"] {
            store.insert(invite("u1", list)).await.unwrap();
        }
        store.insert(invite("u2", "L4")).await.unwrap();

        let found = store.find_by_target("u1").await.unwrap();
        let lists: Vec<_> = found.iter().filter_map(|n| n.variant.list_id()).collect();
        assert_eq!(lists, vec!["L1", "L2", "L3"]);
    }

    #[tokio::test]
    async fn test_touch_by_target() {
        let store = MemoryNotificationStore::new();
        store.insert(invite("u1", "L1")).await.unwrap();
        store.insert(invite("u2", "L2")).await.unwrap();

        let now = Utc::now();
        assert_eq!(store.touch_by_target("u1", now).await.unwrap(), 1);

        let u1 = store.find_by_target("u1").await.unwrap();
        assert_eq!(u1[0].last_accessed, Some(now));
        let u2 = store.find_by_target("u2").await.unwrap();
        assert!(u2[0].last_accessed.is_none());
    }

    #[tokio::test]
    async fn test_touch_and_find_by_target() {
        let store = MemoryNotificationStore::new();
        for list in ["L1", "L2"] {
            store.insert(invite("u1", list)).await.unwrap();
        }
        store.insert(invite("u2", "L3")).await.unwrap();

        let now = Utc::now();
        let found = store.touch_and_find_by_target("u1", now).await.unwrap();

        let lists: Vec<_> = found.iter().filter_map(|n| n.variant.list_id()).collect();
        assert_eq!(lists, vec!["L1", "L2"]);
        assert!(found.iter().all(|n| n.last_accessed == Some(now)));

        let u2 = store.find_by_target("u2").await.unwrap();
        assert!(u2[0].last_accessed.is_none());
    }

    #[tokio::test]
    async fn test_find_one_and_delete() {
        let store = MemoryNotificationStore::new();
        let stored = store.insert(invite("u1", "L1")).await.unwrap();

        let found = match store.find_one(&stored.id).await.unwrap() {
            FindOne::Found(n) => n,
            other => panic!("expected Found, got {:?}", other),
        };
        store.delete(&found).await.unwrap();

        assert_eq!(store.find_one(&stored.id).await.unwrap(), FindOne::Missing);
        assert!(matches!(
            store.delete(&found).await,
            Err(StoreError::Operation(_))
        ));
    }
}
