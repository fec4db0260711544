//! 成绩汇总 - 业务能力层
//!
//! 把作答记录归约为各课题的掌握百分比。纯函数，没有 I/O，也不会失败。

use crate::models::quiz::{AnswerSet, QuizItem};
use crate::models::score::TopicScore;

/// 按课题汇总成绩
///
/// - 每道题都计入所属课题的题目数，未作答视为答错
/// - 作答记录里不存在的题目编号直接忽略
/// - 结果按课题首次出现的顺序排列，没有题目的课题不会出现
pub fn aggregate(items: &[QuizItem], answers: &AnswerSet) -> Vec<TopicScore> {
    let mut tallies: Vec<(&str, u32, u32)> = Vec::new();

    for item in items {
        let is_correct = answers
            .get(item.id)
            .map(|answer| item.is_correct(answer))
            .unwrap_or(false);

        let index = match tallies.iter().position(|(topic, _, _)| *topic == item.topic) {
            Some(index) => index,
            None => {
                tallies.push((item.topic.as_str(), 0, 0));
                tallies.len() - 1
            }
        };

        let tally = &mut tallies[index];
        tally.1 += 1;
        if is_correct {
            tally.2 += 1;
        }
    }

    tallies
        .into_iter()
        .map(|(topic, attempted, correct)| TopicScore::new(topic, attempted, correct))
        .collect()
}

/// 答对的总题数
pub fn overall_correct(items: &[QuizItem], answers: &AnswerSet) -> u32 {
    let correct = items
        .iter()
        .filter(|item| {
            answers
                .get(item.id)
                .map(|answer| item.is_correct(answer))
                .unwrap_or(false)
        })
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}
