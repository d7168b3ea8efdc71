//! Storage Publisher - 转存到持久存储
//!
//! 每张图片独立转存，互不阻塞。至少一张成功时，成功的持久 URL 成为正式结果；
//! 全部失败时原样返回临时 URL，存储故障不会丢掉已经生成的图片

use futures_util::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::ImageStoragePort;
use crate::domain::UploadResult;

/// 转存结果
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// 正式 URL，按场景顺序
    pub urls: Vec<String>,
    /// urls 是否来自持久存储（false 表示临时 URL 回退）
    pub durable: bool,
    /// 每张图片的转存结果
    pub uploads: Vec<UploadResult>,
}

/// 存储发布器
pub struct StoragePublisher {
    storage: Arc<dyn ImageStoragePort>,
}

impl StoragePublisher {
    pub fn new(storage: Arc<dyn ImageStoragePort>) -> Self {
        Self { storage }
    }

    /// 转存生成的图片
    ///
    /// `generated` 为 (场景下标, 临时 URL)，需按场景顺序排列
    pub async fn publish(&self, story_id: Uuid, generated: &[(usize, String)]) -> PublishOutcome {
        let uploads: Vec<UploadResult> = join_all(
            generated
                .iter()
                .map(|(scene_index, url)| self.upload_one(story_id, *scene_index, url)),
        )
        .await;

        let stored: Vec<String> = uploads
            .iter()
            .filter_map(|u| u.storage_url.clone())
            .collect();

        if stored.is_empty() {
            if !generated.is_empty() {
                tracing::warn!(
                    story_id = %story_id,
                    images = generated.len(),
                    "All uploads failed, falling back to ephemeral provider URLs"
                );
            }
            return PublishOutcome {
                urls: generated.iter().map(|(_, url)| url.clone()).collect(),
                durable: false,
                uploads,
            };
        }

        tracing::info!(
            story_id = %story_id,
            stored = stored.len(),
            failed = uploads.len() - stored.len(),
            "Images published to storage"
        );

        PublishOutcome {
            urls: stored,
            durable: true,
            uploads,
        }
    }

    /// 删除该故事下不再被记录引用的旧图片
    ///
    /// 只在写回成功后调用；清理失败只记录日志
    pub async fn remove_stale(&self, story_id: Uuid, keep: &[String]) {
        match self.storage.remove_unreferenced(story_id, keep).await {
            Ok(0) => {}
            Ok(removed) => {
                tracing::info!(story_id = %story_id, removed, "Removed images from earlier runs");
            }
            Err(e) => {
                tracing::warn!(story_id = %story_id, error = %e, "Failed to remove stale images");
            }
        }
    }

    async fn upload_one(&self, story_id: Uuid, scene_index: usize, url: &str) -> UploadResult {
        let storage_url = match self.storage.store(url, story_id).await {
            Ok(stored) => {
                let durable = stored.durable_url().map(str::to_string);
                if durable.is_none() {
                    tracing::warn!(story_id = %story_id, scene_index, "Storage reported unsuccessful upload");
                }
                durable
            }
            Err(e) => {
                tracing::warn!(story_id = %story_id, scene_index, error = %e, "Image upload failed");
                None
            }
        };

        UploadResult {
            scene_index,
            original_url: url.to_string(),
            success: storage_url.is_some(),
            storage_url,
        }
    }
}
