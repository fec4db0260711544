/// 生成服务 API 客户端
///
/// 封装课题筛选、单课题内容生成、资料删除三个远程调用，
/// 以及出题准备阶段用到的课题大纲与测评题生成。
use crate::config::Config;
use crate::error::{
    AppError, AppResult, CleanupWarning, PipelineError, ServiceError, ServiceStep,
};
use crate::models::curriculum::{ContentUnit, DeletionReport, TopicPlan, UploadHandle};
use crate::models::quiz::QuizQuestion;
use crate::models::score::TopicScore;
use crate::utils::logging::truncate_text;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 流水线依赖的三个远程操作
///
/// 每个操作都是一次请求/响应，客户端内部不做重试
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// 根据掌握程度筛选需要学习的课题
    ///
    /// 远程失败返回 `PipelineError::Service`，筛选结果为空返回 `PipelineError::EmptyResult`
    async fn curate_topics(
        &self,
        subject: &str,
        scores: &[TopicScore],
    ) -> Result<Vec<TopicPlan>, PipelineError>;

    /// 为单个课题生成教学内容
    async fn generate_topic_content(&self, plan: &TopicPlan) -> Result<ContentUnit, ServiceError>;

    /// 删除之前上传的资料，失败只作为警告
    ///
    /// 正常流程中调用方可以在请求未返回时取消；
    /// 取消之后的补救清理会等到请求返回或超时
    async fn delete_resources(
        &self,
        handles: &[UploadHandle],
    ) -> Result<DeletionReport, CleanupWarning>;
}

/// 基于 reqwest 的生成服务客户端
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
}

impl GenerationClient {
    /// 创建新的生成服务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Other(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, step: ServiceStep) -> String {
        format!("{}/{}", self.base_url, step.endpoint())
    }

    /// 发送 POST 请求，返回状态码和响应正文
    async fn post(&self, step: ServiceStep, body: &Value) -> Result<(u16, String), ServiceError> {
        let url = self.url(step);
        debug!("POST {} Payload: {}", url, truncate_text(&body.to_string(), 200));

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::transport(step, e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| {
                ServiceError::new(step, Some(status), format!("无法读取响应正文: {}", e))
            })?;

        debug!("POST {} -> {} ({} 字节)", url, status, text.len());
        Ok((status, text))
    }

    /// 根据科目生成课题大纲
    ///
    /// # 参数
    /// - `subject`: 科目名称
    ///
    /// # 返回
    /// 返回课题列表（可能为空）
    pub async fn generate_topics(&self, subject: &str) -> Result<Vec<TopicPlan>, ServiceError> {
        let step = ServiceStep::GenerateTopics;
        let (status, text) = self.post(step, &json!({ "subject": subject })).await?;
        let response: TopicListResponse = decode(step, status, &text)?;
        let topics = response.list_of_topics.unwrap_or_default();
        info!("✓ 生成课题大纲 {} 个", topics.len());
        Ok(topics)
    }

    /// 根据课题大纲生成测评题
    ///
    /// # 参数
    /// - `topics`: 课题大纲
    ///
    /// # 返回
    /// 返回出题服务的原始题目结构
    pub async fn generate_quiz(
        &self,
        topics: &[TopicPlan],
    ) -> Result<Vec<QuizQuestion>, ServiceError> {
        let step = ServiceStep::GenerateQuiz;
        let (status, text) = self
            .post(step, &json!({ "list_of_topics": topics }))
            .await?;
        let response: QuizResponse = decode(step, status, &text)?;
        info!("✓ 生成测评题 {} 道", response.list_quiz_questions.len());
        Ok(response.list_quiz_questions)
    }

    /// 检查服务是否可用
    pub async fn health(&self) -> Result<(), ServiceError> {
        let step = ServiceStep::Health;
        let response = self
            .http
            .get(self.url(step))
            .send()
            .await
            .map_err(|e| ServiceError::transport(step, e))?;
        let status = response.status().as_u16();
        if is_success_status(status) {
            Ok(())
        } else {
            Err(ServiceError::new(step, Some(status), "服务不可用"))
        }
    }
}

#[async_trait]
impl GenerationApi for GenerationClient {
    async fn curate_topics(
        &self,
        subject: &str,
        scores: &[TopicScore],
    ) -> Result<Vec<TopicPlan>, PipelineError> {
        let (status, text) = self
            .post(ServiceStep::CurateTopics, &curation_body(subject, scores))
            .await?;
        interpret_curation(status, &text)
    }

    async fn generate_topic_content(&self, plan: &TopicPlan) -> Result<ContentUnit, ServiceError> {
        let (status, text) = self
            .post(ServiceStep::GenerateTopicContent, &content_body(plan))
            .await?;
        interpret_content(status, &text)
    }

    async fn delete_resources(
        &self,
        handles: &[UploadHandle],
    ) -> Result<DeletionReport, CleanupWarning> {
        let (status, text) = self
            .post(ServiceStep::DeleteResources, &deletion_body(handles))
            .await?;
        interpret_deletion(status, &text)
    }
}

// ========== 请求体 ==========

/// 课题筛选请求体：科目 + 各课题的百分比
pub fn curation_body(subject: &str, scores: &[TopicScore]) -> Value {
    let scores: BTreeMap<&str, u32> = scores
        .iter()
        .map(|score| (score.topic.as_str(), score.percentage))
        .collect();

    json!({
        "request": { "subject": subject },
        "understanding": { "scores": scores }
    })
}

pub fn content_body(plan: &TopicPlan) -> Value {
    json!({ "topic": plan })
}

pub fn deletion_body(handles: &[UploadHandle]) -> Value {
    json!({ "vector_store_file_ids": handles })
}

// ========== 响应解析 ==========

#[derive(Debug, Deserialize)]
struct TopicListResponse {
    #[serde(default)]
    list_of_topics: Option<Vec<TopicPlan>>,
}

#[derive(Debug, Deserialize)]
struct QuizResponse {
    #[serde(default)]
    list_quiz_questions: Vec<QuizQuestion>,
}

/// 检查状态码是否为 2xx
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// 非 2xx 时把响应正文作为错误详情
fn ensure_success(step: ServiceStep, status: u16, text: &str) -> Result<(), ServiceError> {
    if is_success_status(status) {
        return Ok(());
    }
    let detail = if text.trim().is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("未知错误")
            .to_string()
    } else {
        text.trim().to_string()
    };
    Err(ServiceError::new(step, Some(status), detail))
}

fn decode<T: serde::de::DeserializeOwned>(
    step: ServiceStep,
    status: u16,
    text: &str,
) -> Result<T, ServiceError> {
    ensure_success(step, status, text)?;
    serde_json::from_str(text)
        .map_err(|e| ServiceError::new(step, Some(status), format!("响应解析失败: {}", e)))
}

/// 解析课题筛选响应，空列表视为不可恢复
pub fn interpret_curation(status: u16, text: &str) -> Result<Vec<TopicPlan>, PipelineError> {
    let response: TopicListResponse = decode(ServiceStep::CurateTopics, status, text)?;
    match response.list_of_topics {
        Some(topics) if !topics.is_empty() => Ok(topics),
        _ => Err(PipelineError::EmptyResult),
    }
}

/// 解析单课题内容响应，内容本身原样保留
pub fn interpret_content(status: u16, text: &str) -> Result<ContentUnit, ServiceError> {
    decode(ServiceStep::GenerateTopicContent, status, text).map(ContentUnit)
}

/// 解析删除响应，任何失败都降级为清理警告
pub fn interpret_deletion(status: u16, text: &str) -> Result<DeletionReport, CleanupWarning> {
    ensure_success(ServiceStep::DeleteResources, status, text)?;
    let report = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
    Ok(DeletionReport(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curation_body_nests_subject_and_scores() {
        let scores = vec![
            TopicScore::new("Biology", 2, 2),
            TopicScore::new("Math", 3, 1),
        ];
        let body = curation_body("Biology", &scores);
        assert_eq!(
            body,
            json!({
                "request": { "subject": "Biology" },
                "understanding": { "scores": { "Biology": 100, "Math": 33 } }
            })
        );
    }

    #[test]
    fn content_and_deletion_bodies() {
        let mut plan = TopicPlan::new("Cell Biology");
        plan.subtopics = vec!["Organelles".to_string()];
        assert_eq!(
            content_body(&plan),
            json!({
                "topic": { "topic": "Cell Biology", "description": "", "subtopics": ["Organelles"] }
            })
        );

        let handles = vec![UploadHandle::new("vsf_1"), UploadHandle::new("vsf_2")];
        assert_eq!(
            deletion_body(&handles),
            json!({ "vector_store_file_ids": ["vsf_1", "vsf_2"] })
        );
    }

    #[test]
    fn curation_success_keeps_order() {
        let text = r#"{"list_of_topics":[
            {"topic":"Genetics","description":"DNA","subtopics":["Replication"]},
            {"topic":"Algebra","description":"","subtopics":[]}
        ]}"#;
        let topics = interpret_curation(200, text).unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].topic, "Genetics");
        assert_eq!(topics[1].topic, "Algebra");
    }

    #[test]
    fn curation_empty_or_missing_list_is_empty_result() {
        assert_eq!(
            interpret_curation(200, r#"{"list_of_topics":[]}"#).unwrap_err(),
            PipelineError::EmptyResult
        );
        assert_eq!(
            interpret_curation(200, r#"{}"#).unwrap_err(),
            PipelineError::EmptyResult
        );
    }

    #[test]
    fn curation_failure_status_is_service_error() {
        let err = interpret_curation(500, r#"{"detail":"Error curating topics"}"#).unwrap_err();
        match err {
            PipelineError::Service(e) => {
                assert_eq!(e.step, ServiceStep::CurateTopics);
                assert_eq!(e.status, Some(500));
                assert!(e.detail.contains("Error curating topics"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn content_error_carries_body_text() {
        let err = interpret_content(429, "rate limited").unwrap_err();
        assert_eq!(
            err,
            ServiceError::new(ServiceStep::GenerateTopicContent, Some(429), "rate limited")
        );

        let err = interpret_content(503, "").unwrap_err();
        assert_eq!(err.detail, "Service Unavailable");
    }

    #[test]
    fn content_is_kept_verbatim() {
        let text = r#"{"topic_title":"Genetics","main_description":"d","subtopics":[]}"#;
        let unit = interpret_content(200, text).unwrap();
        assert_eq!(unit.0["topic_title"], "Genetics");
    }

    #[test]
    fn undecodable_success_body_is_service_error() {
        let err = interpret_content(200, "<html>").unwrap_err();
        assert_eq!(err.status, Some(200));
        assert!(err.detail.starts_with("响应解析失败"));
    }

    #[test]
    fn deletion_failure_is_only_a_warning() {
        let warning = interpret_deletion(500, "vector store unavailable").unwrap_err();
        assert!(warning.detail.contains("vector store unavailable"));

        let report = interpret_deletion(200, r#"{"deleted":2}"#).unwrap();
        assert_eq!(report.0["deleted"], 2);

        let report = interpret_deletion(200, "ok").unwrap();
        assert_eq!(report.0, Value::String("ok".to_string()));
    }
}
