//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责组装各层组件并管理一次请求的生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建生成服务客户端和会话存储，检查服务可用性
//! 2. **准备模式**：按科目生成课题大纲和测评题，写入会话存储
//! 3. **运行模式**：加载答卷，驱动学习计划流水线，Ctrl-C 触发取消
//! 4. **结果统计**：输出学习计划摘要
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 HTTP 客户端和会话存储的模块
//! - **向下委托**：委托 pipeline 完成具体的状态流转

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clients::GenerationClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::store::{keys, read_json, write_json, JsonFileStore};
use crate::models::loaders::{load_assessment, AssessmentFile};
use crate::models::quiz::{items_from_questions, QuizItem};
use crate::orchestrator::pipeline::Pipeline;
use crate::services::TracingReporter;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    client: Arc<GenerationClient>,
    store: Arc<JsonFileStore>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let client = GenerationClient::new(&config)?;
        let store = JsonFileStore::new(config.session_store_path());
        info!("💾 会话存储: {}", store.path().display());

        match client.health().await {
            Ok(()) => info!("✓ 生成服务可用"),
            Err(e) => warn!("⚠️ 生成服务健康检查失败，继续尝试: {}", e),
        }

        Ok(Self {
            config,
            client: Arc::new(client),
            store: Arc::new(store),
        })
    }

    /// 准备模式：生成课题大纲和测评题
    ///
    /// 生成结果写入会话存储，之后的运行模式可以直接使用
    pub async fn prepare(&self, subject: &str) -> AppResult<()> {
        info!("\n📚 正在为科目 {} 准备测评...", subject);

        let topics = self.client.generate_topics(subject).await?;
        if topics.is_empty() {
            return Err(AppError::Other(format!("科目 {} 没有生成任何课题", subject)));
        }

        let questions = self.client.generate_quiz(&topics).await?;
        let items = items_from_questions(questions);

        write_json(self.store.as_ref(), keys::SUBJECT, subject).await?;
        write_json(self.store.as_ref(), keys::QUIZ, &items).await?;

        info!("✓ 已保存 {} 道测评题 (科目: {})", items.len(), subject);
        for item in &items {
            let prompt = logging::truncate_text(&item.prompt, 60);
            info!("  {}. [{}] {}", item.id, item.topic, prompt);
        }
        Ok(())
    }

    /// 运行模式：根据答卷生成学习计划
    pub async fn run(&self) -> AppResult<()> {
        let assessment = self.load_assessment().await?;
        self.seed_session(&assessment).await?;

        let items = self.resolve_items(&assessment).await?;
        let answers = assessment.answer_set();
        if answers.is_empty() {
            warn!("⚠️ 答卷中没有任何作答，所有题目按未答对计算");
        }

        let session_id = self.config.session_id.as_str();
        let pipeline = Pipeline::new(
            self.client.clone(),
            self.store.clone(),
            Arc::new(TracingReporter::new(session_id)),
            self.config.pipeline(),
        );

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("⚠️ 收到中断信号，正在取消...");
                    cancel.cancel();
                }
            })
        };

        let run = pipeline.execute(session_id, &items, &answers, &cancel).await;
        watcher.abort();

        if let Some(warning) = &run.cleanup_warning {
            warn!("[会话 {}] ⚠️ 上传资料未能完全清理: {}", session_id, warning);
        }

        let artifact = run.into_result().map_err(|e| {
            error!("[会话 {}] ❌ 学习计划生成失败: {}", session_id, e);
            e
        })?;

        let location = self.store.path().display().to_string();
        logging::log_run_summary(session_id, &artifact, &location);
        Ok(())
    }

    /// 加载答卷
    async fn load_assessment(&self) -> AppResult<AssessmentFile> {
        info!("\n📁 正在加载答卷...");
        load_assessment(Path::new(&self.config.assessment_file))
            .await
            .map_err(|e| AppError::Other(format!("{:#}", e)))
    }

    /// 把答卷中填写的科目和上传句柄写入会话存储
    async fn seed_session(&self, assessment: &AssessmentFile) -> AppResult<()> {
        if let Some(subject) = &assessment.subject {
            write_json(self.store.as_ref(), keys::SUBJECT, subject).await?;
        }
        if let Some(handles) = &assessment.upload_handles {
            write_json(self.store.as_ref(), keys::UPLOAD_HANDLES, handles).await?;
        }
        Ok(())
    }

    /// 答卷里没有题目时使用准备模式保存的测评题
    async fn resolve_items(&self, assessment: &AssessmentFile) -> AppResult<Vec<QuizItem>> {
        if !assessment.items.is_empty() {
            return Ok(assessment.items.clone());
        }

        let items: Vec<QuizItem> = read_json(self.store.as_ref(), keys::QUIZ)
            .await?
            .unwrap_or_default();
        if items.is_empty() {
            return Err(AppError::Other(
                "答卷中没有题目，会话中也没有已保存的测评题，请先运行 prepare".to_string(),
            ));
        }
        info!("✓ 使用会话中保存的 {} 道测评题", items.len());
        Ok(items)
    }
}
