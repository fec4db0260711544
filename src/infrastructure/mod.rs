//! 基础设施层：会话存储与等待策略

pub mod delay;
pub mod store;

pub use delay::{Delay, NoDelay, TokioDelay};
pub use store::{keys, read_json, write_json, JsonFileStore, KeyValueStore, MemoryStore};
