//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 准备模式：生成课题大纲和测评题，写入会话存储
//! - 运行模式：加载答卷，驱动流水线，输出统计信息
//!
//! ### `pipeline` - 学习计划流水线
//! - 成绩汇总 → 课题筛选 → 逐个生成 → 资料清理 → 保存成果
//! - 每次状态切换播报进度
//! - 支持取消
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一个会话的一次请求)
//!     ↓
//! pipeline (状态机)
//!     ↓
//! workflow::{RunContext, Phase}
//!     ↓
//! services / clients (能力层：成绩汇总 / 进度播报 / 生成服务)
//!     ↓
//! infrastructure (基础设施：会话存储、等待策略)
//! ```

pub mod app;
pub mod pipeline;

// 重新导出主要类型
pub use app::App;
pub use pipeline::{Pipeline, PipelineRun};
