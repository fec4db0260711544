use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 流水线终止错误
    #[error("流水线错误: {0}")]
    Pipeline(#[from] PipelineError),
    /// 远程服务错误（流水线之外的调用，如出题准备）
    #[error("服务错误: {0}")]
    Service(#[from] ServiceError),
    /// 会话存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 远程调用所属的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStep {
    CurateTopics,
    GenerateTopicContent,
    DeleteResources,
    GenerateTopics,
    GenerateQuiz,
    Health,
}

impl ServiceStep {
    /// 对应的远程端点路径
    pub fn endpoint(self) -> &'static str {
        match self {
            ServiceStep::CurateTopics => "curate-topics",
            ServiceStep::GenerateTopicContent => "generate-single-topic",
            ServiceStep::DeleteResources => "delete-vector-files",
            ServiceStep::GenerateTopics => "generate-topics",
            ServiceStep::GenerateQuiz => "generate-quiz",
            ServiceStep::Health => "health",
        }
    }
}

impl fmt::Display for ServiceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// 远程服务返回失败
///
/// `status` 为 `None` 表示请求没有拿到 HTTP 响应（连接失败、超时等）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub step: ServiceStep,
    pub status: Option<u16>,
    pub detail: String,
}

impl ServiceError {
    pub fn new(step: ServiceStep, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            step,
            status,
            detail: detail.into(),
        }
    }

    /// 没有拿到 HTTP 响应的传输层失败
    pub fn transport(step: ServiceStep, source: impl fmt::Display) -> Self {
        Self::new(step, None, source.to_string())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} 调用失败: {} - {}", self.step, status, self.detail),
            None => write!(f, "{} 请求失败: {}", self.step, self.detail),
        }
    }
}

impl std::error::Error for ServiceError {}

/// 流水线的终止原因
///
/// 任何一个变体都会让本次运行进入 `Failed`，不会产出部分成果
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// 课题筛选或内容生成的远程调用失败
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// 课题筛选返回了空列表，没有可生成的内容
    #[error("没有筛选出任何课题，无法生成内容")]
    EmptyResult,
    /// 最终成果写入存储失败
    #[error("学习计划保存失败 ({key}): {detail}")]
    Persistence { key: String, detail: String },
    /// 调用方取消
    #[error("运行已被取消")]
    Cancelled,
}

impl PipelineError {
    /// 是否为调用方主动取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}

/// 资源清理失败（非致命，只记录日志）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("资源清理未完成: {detail}")]
pub struct CleanupWarning {
    pub detail: String,
}

impl CleanupWarning {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<ServiceError> for CleanupWarning {
    fn from(err: ServiceError) -> Self {
        CleanupWarning::new(err.to_string())
    }
}

/// 会话存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取存储文件失败
    #[error("读取存储失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入存储文件失败
    #[error("写入存储失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 存储内容不是合法 JSON
    #[error("存储内容解析失败 ({key}): {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    Invalid { name: String, reason: String },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
