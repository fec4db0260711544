use crate::models::curriculum::UploadHandle;
use crate::models::quiz::{AnswerSet, ItemId, QuizItem};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// 测评答卷文件
///
/// ```toml
/// subject = "Biology"
/// upload_handles = ["vsf_1"]
///
/// [[items]]
/// id = 1
/// question = "What is the primary function of mitochondria in a cell?"
/// options = ["Protein synthesis", "Energy production"]
/// correctAnswer = "Energy production"
/// topic = "Biology"
///
/// [[answers]]
/// question_index = 1
/// answer = "Energy production"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentFile {
    /// 科目，未填写时沿用会话里已保存的科目
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// 之前上传的参考资料句柄，未填写时沿用会话里已保存的句柄
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_handles: Option<Vec<UploadHandle>>,
    /// 题目，未填写时使用会话里保存的测评题
    #[serde(default)]
    pub items: Vec<QuizItem>,
    #[serde(default)]
    pub answers: Vec<AnswerEntry>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

/// 单条作答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_index: ItemId,
    pub answer: String,
}

impl AssessmentFile {
    /// 汇总成作答记录
    pub fn answer_set(&self) -> AnswerSet {
        self.answers
            .iter()
            .map(|entry| (entry.question_index, entry.answer.clone()))
            .collect()
    }
}

/// 解析答卷内容
pub fn parse_assessment(content: &str) -> Result<AssessmentFile> {
    let file: AssessmentFile = toml::from_str(content).context("无法解析答卷内容")?;
    Ok(file)
}

/// 从 TOML 文件加载答卷
pub async fn load_assessment(toml_file_path: &Path) -> Result<AssessmentFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut file = parse_assessment(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    file.file_path = Some(toml_file_path.to_string_lossy().to_string());

    tracing::info!(
        "成功加载答卷: {} 道题目, {} 条作答",
        file.items.len(),
        file.answers.len()
    );

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
subject = "Biology"
upload_handles = ["vsf_1", "vsf_2"]

[[items]]
id = 1
question = "What is the primary function of mitochondria in a cell?"
options = ["Protein synthesis", "Energy production", "Cell division", "Waste removal"]
correctAnswer = "Energy production"
topic = "Biology"

[[items]]
id = 2
question = "In economics, what does GDP stand for?"
options = ["Global Development Plan", "Gross Domestic Product"]
correctAnswer = "Gross Domestic Product"
topic = "Economics"

[[answers]]
question_index = 1
answer = "Energy production"

[[answers]]
question_index = 2
answer = "Global Development Plan"
"#;

    #[test]
    fn parses_items_answers_and_session_values() {
        let file = parse_assessment(SAMPLE).unwrap();
        assert_eq!(file.subject.as_deref(), Some("Biology"));
        assert_eq!(file.upload_handles.as_ref().map(Vec::len), Some(2));
        assert_eq!(file.items.len(), 2);
        assert_eq!(file.items[1].topic, "Economics");

        let answers = file.answer_set();
        assert_eq!(answers.get(1), Some("Energy production"));
        assert_eq!(answers.get(2), Some("Global Development Plan"));
    }

    #[test]
    fn answers_only_file_is_valid() {
        let file = parse_assessment(
            r#"
[[answers]]
question_index = 3
answer = "Encapsulation"
"#,
        )
        .unwrap();
        assert!(file.items.is_empty());
        assert!(file.subject.is_none());
        assert!(file.upload_handles.is_none());
        assert_eq!(file.answer_set().len(), 1);
    }

    #[tokio::test]
    async fn load_records_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assessment.toml");
        tokio::fs::write(&path, SAMPLE).await.unwrap();

        let file = load_assessment(&path).await.unwrap();
        assert_eq!(file.file_path.as_deref(), Some(path.to_string_lossy().as_ref()));
    }
}
