use std::fmt;

use serde::{Deserialize, Serialize};

/// 单个课题的掌握程度
///
/// 一次运行只计算一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicScore {
    pub topic: String,
    /// 该课题下的题目数
    pub attempted: u32,
    /// 答对的题目数
    pub correct: u32,
    /// 0-100 的百分比，四舍五入
    pub percentage: u32,
}

impl TopicScore {
    pub fn new(topic: impl Into<String>, attempted: u32, correct: u32) -> Self {
        Self {
            topic: topic.into(),
            attempted,
            correct,
            percentage: round_percentage(correct, attempted),
        }
    }
}

/// `round(correct / attempted * 100)`，0.5 向上取整
pub(crate) fn round_percentage(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(attempted));
    let attempted = u64::from(attempted);
    ((correct * 200 + attempted) / (attempted * 2)) as u32
}

/// 整体水平（按答对总题数划分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn from_correct(total_correct: u32) -> Self {
        match total_correct {
            0..=2 => Level::Beginner,
            3..=4 => Level::Intermediate,
            _ => Level::Advanced,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        };
        f.write_str(name)
    }
}
