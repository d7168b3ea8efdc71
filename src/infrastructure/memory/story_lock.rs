//! In-Memory Story Lock Manager
//!
//! 每个故事一把 tokio Mutex，运行结束且无人等待时移除

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::application::ports::{StoryLockPort, StoryRunGuard};

type LockMap = DashMap<Uuid, Arc<Mutex<()>>>;

/// 故事运行锁管理器
pub struct StoryLockManager {
    locks: Arc<LockMap>,
}

impl StoryLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for StoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 持有中的锁
struct HeldLock {
    story_id: Uuid,
    locks: Arc<LockMap>,
    mutex: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        self.guard.take();
        // map 与本守卫各持有一份引用；更多引用说明还有等待者
        self.locks.remove_if(&self.story_id, |_, mutex| {
            Arc::ptr_eq(mutex, &self.mutex) && Arc::strong_count(mutex) <= 2
        });
    }
}

#[async_trait]
impl StoryLockPort for StoryLockManager {
    async fn acquire(&self, story_id: Uuid) -> StoryRunGuard {
        let mutex = self.locks.entry(story_id).or_default().clone();

        let guard = match mutex.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::info!(story_id = %story_id, "Waiting for previous illustration run");
                mutex.clone().lock_owned().await
            }
        };

        StoryRunGuard::new(HeldLock {
            story_id,
            locks: self.locks.clone(),
            mutex,
            guard: Some(guard),
        })
    }

    fn active_count(&self) -> usize {
        self.locks.len()
    }
}
