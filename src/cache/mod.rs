//! # 缓存模块
//!
//! 原子计数器存储抽象，支撑速率限制与配额计数

pub mod client;
pub mod keys;
pub mod store;

pub use client::RedisCounterStore;
pub use keys::CacheKey;
pub use store::{CounterStore, MemoryCounterStore};
