//! Target identity directory.
//!
//! Completes a partially known target (only a user id, or only an identity
//! provider id) with the missing half.
//!
//! - `NoopTargetDirectory`: never knows anything (default)
//! - `MemoryTargetDirectory`: DashMap-backed, seeded with `register`
//! - `RedisTargetDirectory`: two string keys per identity in Redis
//!
//! Use `create_target_directory()` to pick one from configuration.

mod factory;
mod memory;
mod redis_directory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::redis::RedisPoolError;

pub use factory::create_target_directory;
pub use memory::MemoryTargetDirectory;
pub use redis_directory::RedisTargetDirectory;

/// Both halves of a recipient's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetIdentity {
    pub user_id: String,
    pub external_id: String,
}

impl TargetIdentity {
    pub fn new(user_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            external_id: external_id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisPoolError),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TargetDirectory: Send + Sync {
    fn backend_type(&self) -> &'static str;

    async fn lookup_by_user_id(&self, user_id: &str)
        -> Result<Option<TargetIdentity>, DirectoryError>;

    async fn lookup_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError>;
}

/// Directory with no data; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTargetDirectory;

#[async_trait]
impl TargetDirectory for NoopTargetDirectory {
    fn backend_type(&self) -> &'static str {
        "none"
    }

    async fn lookup_by_user_id(
        &self,
        _user_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        Ok(None)
    }

    async fn lookup_by_external_id(
        &self,
        _external_id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        Ok(None)
    }
}
