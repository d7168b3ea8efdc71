//! Story Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{StoryRecord, StoryRepositoryPort};
use crate::application::queries::{GetStory, ListStories};
use crate::domain::Subject;

// ============================================================================
// Response DTOs
// ============================================================================

/// 故事详情响应
#[derive(Debug, Clone)]
pub struct StoryResponse {
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

impl From<StoryRecord> for StoryResponse {
    fn from(record: StoryRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            theme: record.theme,
            primary_subject: record.primary_subject,
            secondary_subjects: record.secondary_subjects,
            has_images: record.has_images,
            image_urls: record.image_urls,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 故事列表项（不含正文）
#[derive(Debug, Clone)]
pub struct StorySummary {
    pub id: Uuid,
    pub title: String,
    pub theme: String,
    pub has_images: bool,
    pub image_count: usize,
    pub created_at: String,
}

impl From<StoryRecord> for StorySummary {
    fn from(record: StoryRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            theme: record.theme,
            has_images: record.has_images,
            image_count: record.image_urls.len(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetStory Handler
pub struct GetStoryHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
}

impl GetStoryHandler {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { story_repo }
    }

    pub async fn handle(&self, query: GetStory) -> Result<StoryResponse, ApplicationError> {
        let story = self
            .story_repo
            .find_by_id(query.story_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Story", query.story_id))?;

        Ok(StoryResponse::from(story))
    }
}

/// ListStories Handler
pub struct ListStoriesHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
}

impl ListStoriesHandler {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { story_repo }
    }

    pub async fn handle(&self, _query: ListStories) -> Result<Vec<StorySummary>, ApplicationError> {
        let stories = self.story_repo.find_all().await?;
        Ok(stories.into_iter().map(StorySummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{sample_story, FlakyStoryRepository};

    #[tokio::test]
    async fn test_get_story_includes_image_set() {
        let mut story = sample_story();
        story.has_images = true;
        story.image_urls = vec!["https://cdn.test/a.png".to_string()];
        let handler = GetStoryHandler::new(Arc::new(FlakyStoryRepository::with_story(story.clone())));

        let response = handler.handle(GetStory { story_id: story.id }).await.unwrap();
        assert_eq!(response.title, story.title);
        assert!(response.has_images);
        assert_eq!(response.image_urls, story.image_urls);
    }

    #[tokio::test]
    async fn test_get_missing_story() {
        let handler = GetStoryHandler::new(Arc::new(FlakyStoryRepository::empty()));
        let err = handler
            .handle(GetStory {
                story_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { resource_type: "Story", .. }));
    }

    #[tokio::test]
    async fn test_list_stories() {
        let story = sample_story();
        let handler = ListStoriesHandler::new(Arc::new(FlakyStoryRepository::with_story(story.clone())));

        let list = handler.handle(ListStories).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, story.id);
        assert_eq!(list[0].image_count, 0);
    }
}
