//! # Cramplan
//!
//! 根据测评结果生成个性化学习计划的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 会话存储与等待策略
//! - `KeyValueStore` - 会话级键值存储（内存 / JSON 文件）
//! - `Delay` - 课题之间的限流等待
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - 生成服务（curate-topics / generate-single-topic / delete-vector-files）
//! - `services/score_aggregator` - 按课题汇总测评成绩
//! - `services/status_reporter` - 进度播报
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 一次运行的上下文和阶段定义
//! - `RunContext` - 会话ID + 科目 + 待清理资料
//! - `Phase` - 阶段及对应的进度文本
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 学习计划流水线状态机
//! - `orchestrator/app` - 应用入口（准备 / 运行）
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GenerationApi, GenerationClient};
pub use config::{Config, PipelineConfig};
pub use error::{AppError, AppResult, CleanupWarning, PipelineError, ServiceError};
pub use infrastructure::{Delay, JsonFileStore, KeyValueStore, MemoryStore, NoDelay, TokioDelay};
pub use models::{
    AnswerSet, ContentUnit, QuizItem, StudyArtifact, TopicPlan, TopicScore, UploadHandle,
};
pub use orchestrator::{App, Pipeline, PipelineRun};
pub use services::{MemoryReporter, StatusReporter, TracingReporter};
pub use workflow::{Phase, RunContext};
