//! Redis connections shared by the cache implementations

mod redis_pool;

pub use redis_pool::{RedisPool, RedisPoolError, RedisResult};
