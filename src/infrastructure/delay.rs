//! 等待策略 - 基础设施层
//!
//! 课题之间的限流等待通过这个接口完成，测试里可以替换成不等待的实现。
//! 取消由编排层在外面用 `select!` 处理，这里只负责计时。

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// 基于 tokio 计时器的真实等待
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 立即返回
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}
