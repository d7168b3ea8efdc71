//! Story Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::CreateStory;
use crate::application::error::ApplicationError;
use crate::application::ports::{StoryRecord, StoryRepositoryPort};
use crate::domain::StoryText;

/// 未提供标题时使用的标题
const UNTITLED: &str = "Untitled story";

/// 创建故事响应
#[derive(Debug, Clone)]
pub struct CreateStoryResponse {
    pub id: Uuid,
    pub title: String,
}

/// CreateStory Handler
pub struct CreateStoryHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
}

impl CreateStoryHandler {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { story_repo }
    }

    pub async fn handle(&self, command: CreateStory) -> Result<CreateStoryResponse, ApplicationError> {
        // 与流水线输入相同的校验
        let text = StoryText::new(
            command.content,
            command.theme,
            command.primary_subject,
            command.secondary_subjects,
        )?;

        let title = match command.title.trim() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };

        let story_id = Uuid::new_v4();
        let now = Utc::now();
        let record = StoryRecord {
            id: story_id,
            title: title.clone(),
            content: text.content().to_string(),
            theme: text.theme().to_string(),
            primary_subject: text.primary().clone(),
            secondary_subjects: text.secondary().to_vec(),
            has_images: false,
            image_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.story_repo.save(&record).await?;

        tracing::info!(
            story_id = %story_id,
            title = %title,
            theme = %record.theme,
            "Story created"
        );

        Ok(CreateStoryResponse { id: story_id, title })
    }
}
