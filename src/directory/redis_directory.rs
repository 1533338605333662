//! Redis-backed target directory.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::redis::RedisPool;

use super::{DirectoryError, TargetDirectory, TargetIdentity};

/// Key structure:
/// - `{prefix}:by-user:{user_id}` - identity provider id (String)
/// - `{prefix}:by-external:{external_id}` - user id (String)
pub struct RedisTargetDirectory {
    pool: Arc<RedisPool>,
    prefix: String,
}

impl RedisTargetDirectory {
    pub fn new(pool: Arc<RedisPool>, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
        }
    }

    fn user_key(&self, user_id: &str) -> String {
        format!("{}:by-user:{}", self.prefix, user_id)
    }

    fn external_key(&self, external_id: &str) -> String {
        format!("{}:by-external:{}", self.prefix, external_id)
    }

    async fn get(&self, key: String) -> Result<Option<String>, DirectoryError> {
        let value = self
            .pool
            .execute(|mut conn| async move {
                let value: Option<String> = conn.get(key).await?;
                Ok::<_, redis::RedisError>(value)
            })
            .await?;

        Ok(value.filter(|v| !v.is_empty()))
    }

    /// Store both directions of an identity pair in one transaction.
    pub async fn register(&self, identity: &TargetIdentity) -> Result<(), DirectoryError> {
        let user_key = self.user_key(&identity.user_id);
        let external_key = self.external_key(&identity.external_id);
        let user_id = identity.user_id.clone();
        let external_id = identity.external_id.clone();

        self.pool
            .execute(|mut conn| async move {
                let _: () = redis::pipe()
                    .atomic()
                    .set(&user_key, &external_id)
                    .ignore()
                    .set(&external_key, &user_id)
                    .ignore()
                    .query_async(&mut conn)
                    .await?;
                Ok::<(), redis::RedisError>(())
            })
            .await?;

        tracing::debug!(
            user_id = %identity.user_id,
            external_id = %identity.external_id,
            "Target identity registered"
        );

        Ok(())
    }
}

#[async_trait]
impl TargetDirectory for RedisTargetDirectory {
    fn backend_type(&self) -> &'static str {
        "redis"
    }

    async fn lookup_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        Ok(self
            .get(self.user_key(user_id))
            .await?
            .map(|external_id| TargetIdentity::new(user_id, external_id)))
    }

    async fn lookup_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        Ok(self
            .get(self.external_key(external_id))
            .await?
            .map(|user_id| TargetIdentity::new(user_id, external_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let pool = Arc::new(RedisPool::new("redis://127.0.0.1:6379").unwrap());
        let directory = RedisTargetDirectory::new(pool, "orodha:targets");

        assert_eq!(directory.user_key("u1"), "orodha:targets:by-user:u1");
        assert_eq!(directory.external_key("k1"), "orodha:targets:by-external:k1");
        assert_eq!(directory.backend_type(), "redis");
    }
}
