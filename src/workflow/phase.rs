//! 流水线阶段
//!
//! `Idle → Scoring → Curating → Generating(i) → CleaningUp → Finalizing → Succeeded`，
//! 任意阶段都可能进入终止态 `Failed`。每个阶段对应一条播报给界面的进度文本。

use std::time::Duration;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Scoring,
    Curating,
    /// 正在生成第 `index` 个课题（从 0 开始）
    Generating {
        index: usize,
        total: usize,
        topic: String,
    },
    /// 清理上传资料，`handles` 为待删除数量
    CleaningUp { handles: usize },
    Finalizing,
    Succeeded,
    Failed(PipelineError),
}

impl Phase {
    /// 播报给界面的进度文本
    pub fn status_message(&self) -> String {
        match self {
            Phase::Idle => "Idle".to_string(),
            Phase::Scoring => "Calculating scores...".to_string(),
            Phase::Curating => "Curating topics...".to_string(),
            Phase::Generating {
                index,
                total,
                topic,
            } => format!(
                "Generating content for topic {} of {}: {}...",
                index + 1,
                total,
                topic
            ),
            Phase::CleaningUp { handles: 0 } => "No uploaded files to clean up.".to_string(),
            Phase::CleaningUp { .. } => "Cleaning up uploaded files...".to_string(),
            Phase::Finalizing => "Finalizing study plan...".to_string(),
            Phase::Succeeded => "Study plan ready.".to_string(),
            Phase::Failed(_) => "Error".to_string(),
        }
    }

    /// 阶段名（日志用）
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Scoring => "Scoring",
            Phase::Curating => "Curating",
            Phase::Generating { .. } => "Generating",
            Phase::CleaningUp { .. } => "CleaningUp",
            Phase::Finalizing => "Finalizing",
            Phase::Succeeded => "Succeeded",
            Phase::Failed(_) => "Failed",
        }
    }
}

/// 课题之间限流等待的进度文本
pub fn waiting_message(delay: Duration) -> String {
    let label = if delay.subsec_millis() == 0 {
        format!("{}s", delay.as_secs())
    } else {
        format!("{}ms", delay.as_millis())
    };
    format!("Waiting {} before next topic...", label)
}
