//! Target directory factory

use std::sync::Arc;

use crate::config::DirectoryConfig;
use crate::redis::RedisPool;

use super::memory::MemoryTargetDirectory;
use super::redis_directory::RedisTargetDirectory;
use super::{NoopTargetDirectory, TargetDirectory};

/// Create a target directory based on configuration.
///
/// - `"redis"`: `RedisTargetDirectory` if a Redis pool is provided
/// - `"memory"`: an empty `MemoryTargetDirectory`
/// - anything else: `NoopTargetDirectory`
pub fn create_target_directory(
    settings: &DirectoryConfig,
    redis_pool: Option<Arc<RedisPool>>,
) -> Arc<dyn TargetDirectory> {
    match settings.backend.as_str() {
        "redis" => {
            if let Some(pool) = redis_pool {
                tracing::info!(
                    backend = "redis",
                    prefix = %settings.prefix,
                    "Creating Redis target directory"
                );
                Arc::new(RedisTargetDirectory::new(pool, settings.prefix.clone()))
            } else {
                tracing::warn!(
                    "Redis directory requested but no pool provided, lookups will always miss"
                );
                Arc::new(NoopTargetDirectory)
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory target directory");
            Arc::new(MemoryTargetDirectory::new())
        }
        _ => {
            tracing::info!(backend = "none", "Target directory disabled");
            Arc::new(NoopTargetDirectory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str) -> DirectoryConfig {
        DirectoryConfig {
            backend: backend.to_string(),
            ..DirectoryConfig::default()
        }
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(create_target_directory(&config("none"), None).backend_type(), "none");
        assert_eq!(create_target_directory(&config("memory"), None).backend_type(), "memory");
        assert_eq!(create_target_directory(&config("redis"), None).backend_type(), "none");

        let pool = Arc::new(RedisPool::new("redis://127.0.0.1:6379").unwrap());
        assert_eq!(
            create_target_directory(&config("redis"), Some(pool)).backend_type(),
            "redis"
        );
    }
}
