use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 题目编号
pub type ItemId = u32;

/// 测评题目
///
/// 字段名与前端保存的测评数据保持一致（`question` / `correctAnswer`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: ItemId,
    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", alias = "correct_option")]
    pub correct_option: String,
    pub topic: String,
}

impl QuizItem {
    /// 学习者选择的选项是否正确（精确匹配选项文本）
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_option == answer
    }
}

/// 学习者的作答记录：题目编号 → 选择的选项文本
///
/// 同一题重复作答时以最后一次为准
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<ItemId, String>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次作答
    pub fn record(&mut self, id: ItemId, answer: impl Into<String>) {
        self.answers.insert(id, answer.into());
    }

    pub fn get(&self, id: ItemId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(ItemId, S)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (ItemId, S)>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for (id, answer) in iter {
            set.record(id, answer);
        }
        set
    }
}

/// 出题服务返回的题目结构（四个选项 + 正确选项字母）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub topic: String,
    pub quiz_question: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub correct_answer: String,
}

impl QuizQuestion {
    /// 把正确选项字母解析成选项文本
    ///
    /// 字母不在 a-d 之内时原样返回，交给作答比对自然判错
    pub fn correct_answer_text(&self) -> &str {
        match self.correct_answer.trim().to_ascii_lowercase().as_str() {
            "a" => &self.choice_a,
            "b" => &self.choice_b,
            "c" => &self.choice_c,
            "d" => &self.choice_d,
            _ => &self.correct_answer,
        }
    }

    /// 转换为测评题目
    pub fn into_item(self, id: ItemId) -> QuizItem {
        let correct_option = self.correct_answer_text().to_string();
        QuizItem {
            id,
            prompt: self.quiz_question,
            options: vec![self.choice_a, self.choice_b, self.choice_c, self.choice_d],
            correct_option,
            topic: self.topic,
        }
    }
}

/// 将出题服务的题目列表转换为测评题目，编号从 1 开始
pub fn items_from_questions(questions: Vec<QuizQuestion>) -> Vec<QuizItem> {
    questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| question.into_item(index as ItemId + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: &str) -> QuizQuestion {
        QuizQuestion {
            topic: "Biology".to_string(),
            quiz_question: "What is the primary function of mitochondria?".to_string(),
            choice_a: "Protein synthesis".to_string(),
            choice_b: "Energy production".to_string(),
            choice_c: "Cell division".to_string(),
            choice_d: "Waste removal".to_string(),
            correct_answer: correct.to_string(),
        }
    }

    #[test]
    fn letter_is_resolved_case_insensitively() {
        assert_eq!(question("B").correct_answer_text(), "Energy production");
        assert_eq!(question("d").correct_answer_text(), "Waste removal");
        assert_eq!(question("Energy production").correct_answer_text(), "Energy production");
    }

    #[test]
    fn questions_become_numbered_items() {
        let items = items_from_questions(vec![question("b"), question("a")]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 2);
        assert_eq!(items[0].options.len(), 4);
        assert!(items[0].is_correct("Energy production"));
        assert!(items[1].is_correct("Protein synthesis"));
    }

    #[test]
    fn quiz_item_uses_frontend_field_names() {
        let item: QuizItem = serde_json::from_str(
            r#"{"id":1,"question":"Q?","options":["x","y"],"correctAnswer":"y","topic":"Math"}"#,
        )
        .unwrap();
        assert_eq!(item.correct_option, "y");

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["correctAnswer"], "y");
        assert_eq!(json["question"], "Q?");
    }

    #[test]
    fn later_answer_replaces_earlier_one() {
        let mut answers = AnswerSet::new();
        answers.record(1, "x");
        answers.record(1, "y");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(1), Some("y"));
    }
}
