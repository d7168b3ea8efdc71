//! Story Lock Port - 同一故事的运行串行化

use async_trait::async_trait;
use std::any::Any;
use uuid::Uuid;

/// 运行锁守卫
///
/// 持有期间同一故事的其他运行会等待；drop 即释放
pub struct StoryRunGuard {
    _inner: Box<dyn Any + Send + Sync>,
}

impl StoryRunGuard {
    pub fn new(inner: impl Send + Sync + 'static) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

/// Story Lock Port
#[async_trait]
pub trait StoryLockPort: Send + Sync {
    /// 获取故事的运行锁（等待前一次运行结束）
    async fn acquire(&self, story_id: Uuid) -> StoryRunGuard;

    /// 当前持有或等待锁的故事数量
    fn active_count(&self) -> usize;
}
