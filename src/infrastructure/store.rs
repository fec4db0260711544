//! 会话存储 - 基础设施层
//!
//! 以会话为单位的键值存储，保存科目、上传句柄、测评题和最终学习计划。
//! 编排层只通过 `KeyValueStore` 访问，不直接接触文件。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;

/// 会话存储中使用的键
pub mod keys {
    /// 学习科目
    pub const SUBJECT: &str = "studySubject";
    /// 上传资料在向量库中的文件句柄
    pub const UPLOAD_HANDLES: &str = "vectorStoreFileIds";
    /// 测评题目
    pub const QUIZ: &str = "assessmentQuizData";
    /// 最终学习计划
    pub const STUDY_PLAN: &str = "studyPlanContent";
}

/// 键值存储接口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// 删除不存在的键不算错误
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// 读取并反序列化
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Corrupted {
                key: key.to_string(),
                source,
            }),
    }
}

/// 序列化并写入
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|source| StoreError::Corrupted {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value).await
}

/// 内存存储（测试和一次性运行使用）
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, JsonValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前全部内容的副本
    pub async fn snapshot(&self) -> HashMap<String, JsonValue> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// JSON 文件存储，每个会话一个文件
///
/// 每次写入都先写临时文件再重命名，避免留下半个文件
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Map<String, JsonValue>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.display_path(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupted {
            key: self.display_path(),
            source,
        })
    }

    async fn save(&self, entries: &Map<String, JsonValue>) -> Result<(), StoreError> {
        let write_failed = |source| StoreError::WriteFailed {
            path: self.display_path(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(write_failed)?;
            }
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            StoreError::Corrupted {
                key: self.display_path(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await.map_err(write_failed)?;
        fs::rename(&tmp_path, &self.path).await.map_err(write_failed)?;

        debug!("会话存储已写入: {}", self.display_path());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value);
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}
