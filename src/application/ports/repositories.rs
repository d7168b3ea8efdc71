//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite / 内存）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{StoryError, StoryImageSet, StoryText, Subject};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RepositoryError {
    /// 是否为可重试的临时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::DatabaseError(_))
    }
}

// ============================================================================
// Story Repository
// ============================================================================

/// 故事实体（用于持久化）
#[derive(Debug, Clone)]
pub struct StoryRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub theme: String,
    pub primary_subject: Subject,
    pub secondary_subjects: Vec<Subject>,
    pub has_images: bool,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoryRecord {
    /// 转换为流水线输入
    pub fn to_story_text(&self) -> Result<StoryText, StoryError> {
        StoryText::new(
            self.content.clone(),
            self.theme.clone(),
            self.primary_subject.clone(),
            self.secondary_subjects.clone(),
        )
    }

    /// 当前保存的插图集合
    pub fn image_set(&self) -> StoryImageSet {
        StoryImageSet {
            story_id: self.id,
            final_urls: self.image_urls.clone(),
            has_images: self.has_images,
        }
    }
}

/// Story Repository Port
#[async_trait]
pub trait StoryRepositoryPort: Send + Sync {
    /// 保存故事
    async fn save(&self, story: &StoryRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找故事
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError>;

    /// 获取所有故事
    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError>;

    /// 整体覆盖故事的插图字段
    ///
    /// 故事不存在时返回 `NotFound`
    async fn update_images(&self, images: &StoryImageSet) -> Result<(), RepositoryError>;
}
