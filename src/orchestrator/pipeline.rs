//! 学习计划生成流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块是单个学习者会话的编排器，负责把一次测评结果变成一份学习计划。
//!
//! ## 核心流程
//!
//! 1. **成绩汇总**：按课题计算掌握百分比（纯计算）
//! 2. **课题筛选**：调用 curate-topics，空结果或失败直接终止，不清理资料
//! 3. **逐个生成**：按筛选顺序逐个调用 generate-single-topic，两次调用之间固定等待
//! 4. **资料清理**：删除之前上传的资料，失败只记警告
//! 5. **保存成果**：写入会话存储，写入失败视为整体失败
//!
//! 每次状态切换都向 `StatusReporter` 推送一条进度文本，顺序与切换顺序一致。
//! 同一会话内所有远程调用严格串行，任何一次等待都可以被取消。

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clients::GenerationApi;
use crate::config::PipelineConfig;
use crate::error::{CleanupWarning, PipelineError};
use crate::infrastructure::delay::{Delay, NoDelay, TokioDelay};
use crate::infrastructure::store::{keys, write_json, KeyValueStore};
use crate::models::curriculum::{ContentUnit, StudyArtifact, TopicPlan, UploadHandle};
use crate::models::quiz::{AnswerSet, QuizItem};
use crate::models::score::{Level, TopicScore};
use crate::services::score_aggregator;
use crate::services::StatusReporter;
use crate::utils::logging;
use crate::workflow::{waiting_message, Phase, RunContext};

/// 一次运行的全部状态
///
/// 运行结束后交给调用方；失败时已生成的内容只保留在 `units` 里供排查，
/// 不会作为成果返回
#[derive(Debug)]
pub struct PipelineRun {
    pub session_id: String,
    pub subject: String,
    pub phase: Phase,
    pub scores: Vec<TopicScore>,
    pub plans: Vec<TopicPlan>,
    pub units: Vec<ContentUnit>,
    /// 尚未删除的上传句柄
    pub upload_handles: Vec<UploadHandle>,
    pub last_status: Option<String>,
    pub cleanup_warning: Option<CleanupWarning>,
    cleanup_attempted: bool,
    artifact: Option<StudyArtifact>,
}

impl PipelineRun {
    fn new(ctx: RunContext) -> Self {
        Self {
            session_id: ctx.session_id,
            subject: ctx.subject,
            phase: Phase::Idle,
            scores: Vec::new(),
            plans: Vec::new(),
            units: Vec::new(),
            upload_handles: ctx.upload_handles,
            last_status: None,
            cleanup_warning: None,
            cleanup_attempted: false,
            artifact: None,
        }
    }

    /// 成功时的学习计划
    pub fn artifact(&self) -> Option<&StudyArtifact> {
        match self.phase {
            Phase::Succeeded => self.artifact.as_ref(),
            _ => None,
        }
    }

    /// 失败原因
    pub fn failure(&self) -> Option<&PipelineError> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// 转换为结果，未到达终止态的运行视为已取消
    pub fn into_result(self) -> Result<StudyArtifact, PipelineError> {
        match self.phase {
            Phase::Failed(err) => Err(err),
            Phase::Succeeded => self.artifact.ok_or(PipelineError::Cancelled),
            _ => Err(PipelineError::Cancelled),
        }
    }
}

/// 学习计划生成流水线
pub struct Pipeline {
    api: Arc<dyn GenerationApi>,
    store: Arc<dyn KeyValueStore>,
    reporter: Arc<dyn StatusReporter>,
    delay: Arc<dyn Delay>,
    config: PipelineConfig,
    /// 同一会话同一时间只允许一次运行
    active: Mutex<()>,
}

impl Pipeline {
    /// 创建新的流水线
    ///
    /// 课题间等待使用 tokio 计时器，间隔为 0 时不等待
    pub fn new(
        api: Arc<dyn GenerationApi>,
        store: Arc<dyn KeyValueStore>,
        reporter: Arc<dyn StatusReporter>,
        config: PipelineConfig,
    ) -> Self {
        let delay: Arc<dyn Delay> = if config.topic_delay.is_zero() {
            Arc::new(NoDelay)
        } else {
            Arc::new(TokioDelay)
        };
        Self {
            api,
            store,
            reporter,
            delay,
            config,
            active: Mutex::new(()),
        }
    }

    /// 替换课题间的等待策略
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// 运行一次流水线，返回学习计划或失败原因
    pub async fn run(
        &self,
        session_id: &str,
        items: &[QuizItem],
        answers: &AnswerSet,
    ) -> Result<StudyArtifact, PipelineError> {
        self.execute(session_id, items, answers, &CancellationToken::new())
            .await
            .into_result()
    }

    /// 运行一次流水线，返回完整的运行记录
    ///
    /// # 参数
    /// - `session_id`: 会话ID（仅用于日志）
    /// - `items`: 测评题目
    /// - `answers`: 学习者作答
    /// - `cancel`: 取消信号，在任意等待点生效
    pub async fn execute(
        &self,
        session_id: &str,
        items: &[QuizItem],
        answers: &AnswerSet,
        cancel: &CancellationToken,
    ) -> PipelineRun {
        let _active = self.active.lock().await;

        let ctx =
            RunContext::load(self.store.as_ref(), session_id, &self.config.default_subject).await;
        log_run_start(&ctx, items.len(), answers.len());

        let mut run = PipelineRun::new(ctx);

        match self.drive(&mut run, items, answers, cancel).await {
            Ok(artifact) => {
                run.artifact = Some(artifact);
                self.transition(&mut run, Phase::Succeeded);
                info!("[会话 {}] ✅ 学习计划生成完成", run.session_id);
            }
            Err(PipelineError::Cancelled) => {
                warn!("[会话 {}] ⚠️ 运行被取消", run.session_id);
                let outstanding = run.upload_handles.len();
                if !run.cleanup_attempted && outstanding > 0 {
                    self.transition(&mut run, Phase::CleaningUp { handles: outstanding });
                    self.cleanup(&mut run).await;
                }
                self.transition(&mut run, Phase::Failed(PipelineError::Cancelled));
            }
            Err(err) => {
                error!(
                    "[会话 {}] ❌ 运行失败 (阶段 {}): {}",
                    run.session_id,
                    run.phase.name(),
                    err
                );
                self.transition(&mut run, Phase::Failed(err));
            }
        }

        run
    }

    /// 驱动状态机直到成功或遇到第一个终止错误
    async fn drive(
        &self,
        run: &mut PipelineRun,
        items: &[QuizItem],
        answers: &AnswerSet,
        cancel: &CancellationToken,
    ) -> Result<StudyArtifact, PipelineError> {
        // ========== Scoring ==========
        self.transition(run, Phase::Scoring);
        run.scores = score_aggregator::aggregate(items, answers);
        let level = Level::from_correct(score_aggregator::overall_correct(items, answers));
        logging::log_scores(&run.session_id, &run.scores, level);

        // ========== Curating ==========
        self.transition(run, Phase::Curating);
        info!("[会话 {}] 🔍 正在筛选课题 (科目: {})", run.session_id, run.subject);
        let curation = self.api.curate_topics(&run.subject, &run.scores);
        run.plans = until_cancelled(cancel, curation).await??;
        info!("[会话 {}] ✓ 筛选出 {} 个课题", run.session_id, run.plans.len());

        // ========== Generating ==========
        let plans = run.plans.clone();
        let total = plans.len();
        for (index, plan) in plans.iter().enumerate() {
            self.transition(
                run,
                Phase::Generating {
                    index,
                    total,
                    topic: plan.topic.clone(),
                },
            );
            info!(
                "[会话 {}] 📝 生成第 {}/{} 个课题: {}",
                run.session_id,
                index + 1,
                total,
                plan.topic
            );

            let unit = until_cancelled(cancel, self.api.generate_topic_content(plan)).await??;
            run.units.push(unit);
            info!("[会话 {}] ✓ 课题内容已生成: {}", run.session_id, plan.topic);

            if index + 1 < total {
                self.report(run, waiting_message(self.config.topic_delay));
                until_cancelled(cancel, self.delay.wait(self.config.topic_delay)).await?;
            }
        }

        // ========== CleaningUp ==========
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let outstanding = run.upload_handles.len();
        self.transition(run, Phase::CleaningUp { handles: outstanding });
        if outstanding == 0 {
            info!("[会话 {}] 没有需要清理的上传资料", run.session_id);
        } else {
            // 删除请求发出后即视为已尝试清理，中途取消不会再删一次
            run.cleanup_attempted = true;
            until_cancelled(cancel, self.cleanup(run)).await?;
        }

        // ========== Finalizing ==========
        self.transition(run, Phase::Finalizing);
        let artifact = StudyArtifact::new(run.units.clone());
        until_cancelled(cancel, write_json(self.store.as_ref(), keys::STUDY_PLAN, &artifact))
            .await?
            .map_err(|e| PipelineError::Persistence {
                key: keys::STUDY_PLAN.to_string(),
                detail: e.to_string(),
            })?;

        info!(
            "[会话 {}] 💾 学习计划已保存 ({} 个课题)",
            run.session_id,
            artifact.len()
        );
        Ok(artifact)
    }

    /// 尽力删除上传资料，只有远程删除成功后才从会话存储中移除句柄
    async fn cleanup(&self, run: &mut PipelineRun) {
        run.cleanup_attempted = true;
        info!(
            "[会话 {}] 🗑️ 清理 {} 个上传资料...",
            run.session_id,
            run.upload_handles.len()
        );

        match self.api.delete_resources(&run.upload_handles).await {
            Ok(report) => {
                debug!("[会话 {}] 删除结果: {}", run.session_id, report.0);
                run.upload_handles.clear();
                if let Err(e) = self.store.remove(keys::UPLOAD_HANDLES).await {
                    let warning = CleanupWarning::new(format!("无法移除已删除的句柄: {}", e));
                    warn!("[会话 {}] ⚠️ {}", run.session_id, warning);
                    run.cleanup_warning = Some(warning);
                } else {
                    info!("[会话 {}] ✓ 上传资料已清理", run.session_id);
                }
            }
            Err(warning) => {
                warn!("[会话 {}] ⚠️ {}", run.session_id, warning);
                run.cleanup_warning = Some(warning);
            }
        }
    }

    /// 切换阶段并播报
    fn transition(&self, run: &mut PipelineRun, phase: Phase) {
        debug!(
            "[会话 {}] 状态切换: {} → {}",
            run.session_id,
            run.phase.name(),
            phase.name()
        );
        run.phase = phase;
        let message = run.phase.status_message();
        self.report(run, message);
    }

    fn report(&self, run: &mut PipelineRun, message: String) {
        self.reporter.report(&message);
        run.last_status = Some(message);
    }
}

/// 等待 `future` 完成，期间收到取消信号则立即返回 `Cancelled`
///
/// 正常流程中的每个远程调用、课题间等待和最终写入都经过这里。
/// 取消路径上的补救清理不经过这里，只受 HTTP 请求超时约束
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, PipelineError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        output = future => Ok(output),
    }
}

fn log_run_start(ctx: &RunContext, item_count: usize, answer_count: usize) {
    info!("{} 开始生成学习计划", ctx);
    info!(
        "[会话 {}] 题目总数: {}, 作答数: {}",
        ctx.session_id, item_count, answer_count
    );
}
