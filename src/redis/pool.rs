//! Redis connection pool for the target directory.

use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError, RedisResult};
use tokio::sync::RwLock;

/// Error type for Redis pool operations.
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    /// Redis operation failed
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),
}

/// Lazily connected, shared multiplexed connection.
///
/// The connection is dropped after an I/O failure so the next command
/// reconnects.
pub struct RedisPool {
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    url: String,
}

impl RedisPool {
    pub fn new(url: &str) -> Result<Self, RedisPoolError> {
        let client = Client::open(url)?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            url: url.to_string(),
        })
    }

    /// Get the shared connection, establishing it if needed.
    pub async fn get_connection(&self) -> Result<MultiplexedConnection, RedisPoolError> {
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        self.connect().await
    }

    async fn connect(&self) -> Result<MultiplexedConnection, RedisPoolError> {
        let mut conn_guard = self.connection.write().await;

        // Double-check in case another task connected while we waited
        if let Some(ref c) = *conn_guard {
            return Ok(c.clone());
        }

        match self.client.get_multiplexed_tokio_connection().await {
            Ok(conn) => {
                *conn_guard = Some(conn.clone());
                tracing::info!("Redis pool connection established");
                Ok(conn)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to Redis");
                Err(RedisPoolError::Redis(e))
            }
        }
    }

    /// Run a command on the shared connection.
    pub async fn execute<F, T, Fut>(&self, f: F) -> Result<T, RedisPoolError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: std::future::Future<Output = RedisResult<T>>,
    {
        let conn = self.get_connection().await?;

        match f(conn).await {
            Ok(result) => Ok(result),
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    let mut conn_guard = self.connection.write().await;
                    *conn_guard = None;
                }
                Err(RedisPoolError::Redis(e))
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ping Redis to check connectivity.
    pub async fn ping(&self) -> Result<(), RedisPoolError> {
        self.execute(|mut conn| async move {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<(), RedisError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        assert!(RedisPool::new("not-a-redis-url").is_err());
    }

    #[tokio::test]
    async fn test_client_created_without_connecting() {
        let pool = RedisPool::new("redis://127.0.0.1:6399").unwrap();
        assert_eq!(pool.url(), "redis://127.0.0.1:6399");
    }
}
