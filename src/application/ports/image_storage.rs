//! Image Storage Port - 出站端口
//!
//! 把临时图片 URL 转存到持久存储

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// 图片存储错误
#[derive(Debug, Error)]
pub enum ImageStorageError {
    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),
}

/// 转存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub success: bool,
    pub permanent_url: Option<String>,
}

impl StoredImage {
    pub fn stored(url: impl Into<String>) -> Self {
        Self {
            success: true,
            permanent_url: Some(url.into()),
        }
    }

    /// 只有 success 且带 URL 才算进入持久存储
    pub fn durable_url(&self) -> Option<&str> {
        if self.success {
            self.permanent_url.as_deref()
        } else {
            None
        }
    }
}

/// Image Storage Port
#[async_trait]
pub trait ImageStoragePort: Send + Sync {
    /// 转存一张临时图片
    async fn store(&self, ephemeral_url: &str, story_id: Uuid) -> Result<StoredImage, ImageStorageError>;

    /// 删除该故事下不在 `keep` 中的已转存图片，返回删除数量
    ///
    /// 在故事记录写回成功之后调用
    async fn remove_unreferenced(&self, _story_id: Uuid, _keep: &[String]) -> Result<usize, ImageStorageError> {
        Ok(0)
    }
}
