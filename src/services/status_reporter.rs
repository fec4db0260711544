//! 进度播报 - 业务能力层
//!
//! 编排层在每次状态切换时同步推送一条可读的进度文本，由界面层消费。
//! 播报不返回结果也不会失败，编排层不依赖它的任何行为。

use std::sync::Mutex;

use tracing::info;

/// 进度播报接口
pub trait StatusReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// 写入 tracing 日志的播报器（命令行使用）
#[derive(Debug, Default)]
pub struct TracingReporter {
    session_id: String,
}

impl TracingReporter {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

impl StatusReporter for TracingReporter {
    fn report(&self, message: &str) {
        info!("[会话 {}] 📣 {}", self.session_id, message);
    }
}

/// 在内存中保留全部播报记录
///
/// 界面层可以随时读取最后一条状态
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按播报顺序返回全部记录
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

impl StatusReporter for MemoryReporter {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
