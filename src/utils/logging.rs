/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::config::Config;
use crate::models::curriculum::StudyArtifact;
use crate::models::score::{Level, TopicScore};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 info（详细模式下为 debug）。
/// 重复初始化会被忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 学习计划生成");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!("👤 会话: {}", config.session_id);
    info!("⏱️ 课题间隔: {} 秒", config.topic_delay_secs);
    info!("{}", "=".repeat(60));
}

/// 记录测评成绩
pub fn log_scores(session_id: &str, scores: &[TopicScore], level: Level) {
    info!("[会话 {}] 📊 测评成绩 (整体水平: {})", session_id, level);
    for score in scores {
        info!(
            "[会话 {}]   {}: {}/{} ({}%)",
            session_id, score.topic, score.correct, score.attempted, score.percentage
        );
    }
}

/// 打印运行结果统计
pub fn log_run_summary(session_id: &str, artifact: &StudyArtifact, store_location: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 学习计划生成完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("👤 会话: {}", session_id);
    info!("📚 课题数: {}", artifact.len());
    info!("{}", "=".repeat(60));
    info!("\n学习计划已保存至: {}", store_location);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
