//! Persistence Updater - 写回故事记录
//!
//! 写库使用显式的重试策略（固定次数 + 指数退避），只重试临时错误

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::publisher::PublishOutcome;
use crate::application::error::ApplicationError;
use crate::application::ports::{RepositoryError, StoryRepositoryPort};
use crate::domain::StoryImageSet;

/// 重试策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 第一次失败后的等待时间
    pub initial_backoff: Duration,
    /// 每次失败后等待时间的倍数
    pub multiplier: u32,
    /// 单次等待上限
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2,
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// 重试耗尽（或遇到不可重试错误）
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            multiplier,
            ..Default::default()
        }
    }

    /// 不等待的策略（测试用）
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, 1)
    }

    /// 第 `attempt` 次失败后的等待时间（attempt 从 1 开始）
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// 完整的等待时间表
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts.max(1))
            .map(|attempt| self.backoff_after(attempt))
            .collect()
    }

    /// 按策略执行操作
    ///
    /// `operation` 接收当前尝试次数；`is_retryable` 返回 false 的错误立即返回
    pub async fn run<T, E, F, Fut>(
        &self,
        mut operation: F,
        is_retryable: impl Fn(&E) -> bool,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= max_attempts || !is_retryable(&e) {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }

                    let delay = self.backoff_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// 持久化更新器
pub struct PersistenceUpdater {
    story_repo: Arc<dyn StoryRepositoryPort>,
    policy: RetryPolicy,
}

impl PersistenceUpdater {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>, policy: RetryPolicy) -> Self {
        Self { story_repo, policy }
    }

    /// 覆盖写入故事的插图集合
    ///
    /// has_images 当且仅当存在持久 URL；临时 URL 回退时仍写入 URL，但 has_images 为 false
    pub async fn persist(
        &self,
        story_id: Uuid,
        published: &PublishOutcome,
    ) -> Result<StoryImageSet, ApplicationError> {
        let image_set = StoryImageSet {
            story_id,
            final_urls: published.urls.clone(),
            has_images: published.durable && !published.urls.is_empty(),
        };

        if !image_set.has_images && !image_set.final_urls.is_empty() {
            tracing::warn!(
                story_id = %story_id,
                images = image_set.final_urls.len(),
                "Saving ephemeral image URLs with has_images=false"
            );
        }

        self.policy
            .run(
                |_| self.story_repo.update_images(&image_set),
                RepositoryError::is_transient,
            )
            .await
            .map_err(|failure| {
                tracing::error!(
                    story_id = %story_id,
                    attempts = failure.attempts,
                    error = %failure.last_error,
                    "Images generated but not saved"
                );
                ApplicationError::PersistenceFailed {
                    story_id,
                    attempts: failure.attempts,
                    image_urls: image_set.final_urls.clone(),
                    reason: failure.last_error.to_string(),
                }
            })?;

        tracing::info!(
            story_id = %story_id,
            images = image_set.final_urls.len(),
            has_images = image_set.has_images,
            "Story image set saved"
        );

        Ok(image_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{sample_story, FlakyStoryRepository};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn published(urls: &[&str], durable: bool) -> PublishOutcome {
        PublishOutcome {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            durable,
            uploads: Vec::new(),
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100), 2);
        assert_eq!(
            policy.schedule(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400)
            ]
        );

        let capped = RetryPolicy {
            max_backoff: Duration::from_millis(150),
            ..policy
        };
        assert_eq!(capped.backoff_after(3), Duration::from_millis(150));
        assert!(RetryPolicy::immediate(1).schedule().is_empty());
    }

    #[tokio::test]
    async fn test_run_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RetryExhausted<String>> = RetryPolicy::immediate(3)
            .run(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 3 {
                            Err("busy".to_string())
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_non_retryable() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryExhausted<String>> = RetryPolicy::immediate(5)
            .run(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("fatal".to_string()) }
                },
                |_| false,
            )
            .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_persist_recovers_from_transient_errors() {
        let story = sample_story();
        let repo = Arc::new(FlakyStoryRepository::with_story(story.clone()).fail_times(2));
        let updater = PersistenceUpdater::new(repo.clone(), RetryPolicy::immediate(3));

        let set = updater
            .persist(story.id, &published(&["https://cdn.test/a.png"], true))
            .await
            .unwrap();

        assert!(set.has_images);
        assert_eq!(repo.update_calls(), 3);
        let saved = repo.stored(story.id).await.unwrap();
        assert!(saved.has_images);
        assert_eq!(saved.image_urls, vec!["https://cdn.test/a.png"]);
    }

    #[tokio::test]
    async fn test_persist_exhaustion_is_persistence_failure() {
        let story = sample_story();
        let repo = Arc::new(FlakyStoryRepository::with_story(story.clone()).fail_times(10));
        let updater = PersistenceUpdater::new(repo.clone(), RetryPolicy::immediate(3));

        let err = updater
            .persist(story.id, &published(&["https://cdn.test/a.png"], true))
            .await
            .unwrap_err();

        match err {
            ApplicationError::PersistenceFailed {
                attempts, image_urls, ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(image_urls, vec!["https://cdn.test/a.png"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.update_calls(), 3);
    }

    #[tokio::test]
    async fn test_ephemeral_fallback_keeps_has_images_false() {
        let story = sample_story();
        let repo = Arc::new(FlakyStoryRepository::with_story(story.clone()));
        let updater = PersistenceUpdater::new(repo.clone(), RetryPolicy::immediate(1));

        let set = updater
            .persist(story.id, &published(&["https://provider.test/a.png"], false))
            .await
            .unwrap();

        assert!(!set.has_images);
        assert_eq!(set.final_urls.len(), 1);
        let saved = repo.stored(story.id).await.unwrap();
        assert!(!saved.has_images);
        assert_eq!(saved.image_urls, vec!["https://provider.test/a.png"]);
    }

    #[tokio::test]
    async fn test_missing_story_is_not_retried() {
        let repo = Arc::new(FlakyStoryRepository::empty());
        let updater = PersistenceUpdater::new(repo.clone(), RetryPolicy::immediate(3));

        let err = updater
            .persist(Uuid::new_v4(), &published(&["https://cdn.test/a.png"], true))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::PersistenceFailed { attempts: 1, .. }));
        assert_eq!(repo.update_calls(), 1);
    }
}
