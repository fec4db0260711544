//! 课程生成相关的数据结构
//!
//! 课题计划（TopicPlan）由筛选服务给出，内容单元（ContentUnit）由生成服务给出，
//! 编排层只负责按顺序收集，不解析内容本身。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 筛选服务给出的单个课题计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPlan {
    pub topic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl TopicPlan {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            description: String::new(),
            subtopics: Vec::new(),
        }
    }
}

/// 单个课题的教学内容
///
/// 对编排层来说是不透明的 JSON，原样保存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentUnit(pub JsonValue);

/// 最终的学习计划成果，顺序与筛选结果一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyArtifact {
    pub topic: Vec<ContentUnit>,
}

impl StudyArtifact {
    pub fn new(units: Vec<ContentUnit>) -> Self {
        Self { topic: units }
    }

    pub fn len(&self) -> usize {
        self.topic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topic.is_empty()
    }
}

/// 上传资料在向量库中的文件句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadHandle(String);

impl UploadHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 删除服务返回的报告（原样记录到日志）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletionReport(pub JsonValue);
