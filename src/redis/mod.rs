//! Redis connectivity, used by the Redis-backed target directory.

pub mod pool;

pub use pool::{RedisPool, RedisPoolError};
