//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{IllustrateStoryResponse, StoryResponse, StorySummary};
use crate::domain::{Subject, SubjectAppearance};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Story DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    #[serde(default)]
    pub title: String,
    pub content: String,
    pub theme: String,
    pub primary_subject: Subject,
    #[serde(default)]
    pub secondary_subjects: Vec<Subject>,
}

#[derive(Debug, Serialize)]
pub struct CreateStoryResponseDto {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct GetStoryRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StoryDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub theme: String,
    pub primary_subject: Subject,
    pub secondary_subjects: Vec<Subject>,
    pub has_images: bool,
    pub image_urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<StoryResponse> for StoryDto {
    fn from(story: StoryResponse) -> Self {
        Self {
            id: story.id,
            title: story.title,
            content: story.content,
            theme: story.theme,
            primary_subject: story.primary_subject,
            secondary_subjects: story.secondary_subjects,
            has_images: story.has_images,
            image_urls: story.image_urls,
            created_at: story.created_at,
            updated_at: story.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorySummaryDto {
    pub id: Uuid,
    pub title: String,
    pub theme: String,
    pub has_images: bool,
    pub image_count: usize,
    pub created_at: String,
}

impl From<StorySummary> for StorySummaryDto {
    fn from(story: StorySummary) -> Self {
        Self {
            id: story.id,
            title: story.title,
            theme: story.theme,
            has_images: story.has_images,
            image_count: story.image_count,
            created_at: story.created_at,
        }
    }
}

// ============================================================================
// Illustration DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IllustrateStoryRequest {
    pub story_id: Uuid,
    #[serde(default)]
    pub style_override: Option<String>,
    #[serde(default)]
    pub appearance_override: Option<SubjectAppearance>,
}

/// 插图运行结果
///
/// 至少生成一张图片时 success 为 true（部分成功不视为错误）
#[derive(Debug, Serialize)]
pub struct IllustrateStoryResponseDto {
    pub success: bool,
    pub story_id: Uuid,
    pub image_urls: Vec<String>,
    pub has_images: bool,
    pub status: String,
    pub art_style: String,
    pub scenes_attempted: usize,
    pub scenes_generated: usize,
    pub images_stored: usize,
}

impl From<IllustrateStoryResponse> for IllustrateStoryResponseDto {
    fn from(response: IllustrateStoryResponse) -> Self {
        Self {
            success: true,
            story_id: response.story_id,
            image_urls: response.image_urls,
            has_images: response.has_images,
            status: response.status.as_str().to_string(),
            art_style: response.art_style,
            scenes_attempted: response.scenes_attempted,
            scenes_generated: response.scenes_generated,
            images_stored: response.images_stored,
        }
    }
}
