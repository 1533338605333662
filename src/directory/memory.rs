use async_trait::async_trait;
use dashmap::DashMap;

use super::{DirectoryError, TargetDirectory, TargetIdentity};

/// In-memory directory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryTargetDirectory {
    by_user: DashMap<String, String>,
    by_external: DashMap<String, String>,
}

impl MemoryTargetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity pair, replacing any previous mapping of either id.
    pub fn register(&self, identity: TargetIdentity) {
        if let Some(previous) = self
            .by_user
            .insert(identity.user_id.clone(), identity.external_id.clone())
        {
            self.by_external.remove(&previous);
        }
        if let Some(previous) = self
            .by_external
            .insert(identity.external_id.clone(), identity.user_id.clone())
        {
            if previous != identity.user_id {
                self.by_user.remove(&previous);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

#[async_trait]
impl TargetDirectory for MemoryTargetDirectory {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn lookup_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        Ok(self
            .by_user
            .get(user_id)
            .map(|external| TargetIdentity::new(user_id, external.value().clone())))
    }

    async fn lookup_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        Ok(self
            .by_external
            .get(external_id)
            .map(|user| TargetIdentity::new(user.value().clone(), external_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_both_directions() {
        let directory = MemoryTargetDirectory::new();
        directory.register(TargetIdentity::new("u1", "k1"));

        assert_eq!(
            directory.lookup_by_user_id("u1").await.unwrap(),
            Some(TargetIdentity::new("u1", "k1"))
        );
        assert_eq!(
            directory.lookup_by_external_id("k1").await.unwrap(),
            Some(TargetIdentity::new("u1", "k1"))
        );
        assert_eq!(directory.lookup_by_user_id("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_replaces_stale_mapping() {
        let directory = MemoryTargetDirectory::new();
        directory.register(TargetIdentity::new("u1", "k1"));
        directory.register(TargetIdentity::new("u1", "k2"));

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup_by_external_id("k1").await.unwrap(), None);
        assert_eq!(
            directory.lookup_by_user_id("u1").await.unwrap(),
            Some(TargetIdentity::new("u1", "k2"))
        );
    }
}
