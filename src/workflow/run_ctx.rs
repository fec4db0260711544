//! 运行上下文
//!
//! 封装"这是哪个会话、学什么科目、有哪些待清理的资料"这一信息，
//! 在运行开始时从会话存储读取一次。

use std::fmt::Display;

use tracing::warn;

use crate::error::CleanupWarning;
use crate::infrastructure::store::{keys, read_json, KeyValueStore};
use crate::models::curriculum::UploadHandle;

/// 运行上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// 会话ID（仅用于日志显示）
    pub session_id: String,

    /// 学习科目
    pub subject: String,

    /// 之前上传的参考资料句柄
    pub upload_handles: Vec<UploadHandle>,
}

impl RunContext {
    /// 创建新的运行上下文
    pub fn new(
        session_id: impl Into<String>,
        subject: impl Into<String>,
        upload_handles: Vec<UploadHandle>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            subject: subject.into(),
            upload_handles,
        }
    }

    /// 从会话存储读取科目和上传句柄
    ///
    /// 读取失败不会中断运行：科目回退到默认值，句柄视为空（留给下一次清理）
    pub async fn load(
        store: &dyn KeyValueStore,
        session_id: &str,
        default_subject: &str,
    ) -> Self {
        let subject = match read_json::<String>(store, keys::SUBJECT).await {
            Ok(Some(subject)) if !subject.trim().is_empty() => subject,
            Ok(_) => default_subject.to_string(),
            Err(e) => {
                warn!("[会话 {}] ⚠️ 读取科目失败，使用默认科目: {}", session_id, e);
                default_subject.to_string()
            }
        };

        let upload_handles = match read_json::<Vec<UploadHandle>>(store, keys::UPLOAD_HANDLES).await
        {
            Ok(handles) => handles.unwrap_or_default(),
            Err(e) => {
                let warning = CleanupWarning::new(format!("无法读取上传句柄: {}", e));
                warn!("[会话 {}] ⚠️ {}", session_id, warning);
                Vec::new()
            }
        };

        Self::new(session_id, subject, upload_handles)
    }
}

impl Display for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[会话 {} 科目#{} 待清理资料#{}]",
            self.session_id,
            self.subject,
            self.upload_handles.len()
        )
    }
}
