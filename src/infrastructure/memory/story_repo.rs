//! In-Memory Story Repository
//!
//! fake 模式和测试使用

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, StoryRecord, StoryRepositoryPort};
use crate::domain::StoryImageSet;

/// 内存故事仓储
pub struct InMemoryStoryRepository {
    stories: DashMap<Uuid, StoryRecord>,
}

impl InMemoryStoryRepository {
    pub fn new() -> Self {
        Self {
            stories: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryStoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoryRepositoryPort for InMemoryStoryRepository {
    async fn save(&self, story: &StoryRecord) -> Result<(), RepositoryError> {
        if self.stories.contains_key(&story.id) {
            return Err(RepositoryError::Duplicate(story.id.to_string()));
        }
        self.stories.insert(story.id, story.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
        Ok(self.stories.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
        let mut stories: Vec<StoryRecord> = self.stories.iter().map(|s| s.clone()).collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn update_images(&self, images: &StoryImageSet) -> Result<(), RepositoryError> {
        let mut story = self
            .stories
            .get_mut(&images.story_id)
            .ok_or_else(|| RepositoryError::NotFound(images.story_id.to_string()))?;
        story.image_urls = images.final_urls.clone();
        story.has_images = images.has_images;
        story.updated_at = Utc::now();
        tracing::debug!(story_id = %images.story_id, images = images.final_urls.len(), "Story images updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::sample_story;

    #[tokio::test]
    async fn test_save_and_update_images() {
        let repo = InMemoryStoryRepository::new();
        let story = sample_story();
        repo.save(&story).await.unwrap();
        assert!(matches!(repo.save(&story).await, Err(RepositoryError::Duplicate(_))));

        repo.update_images(&StoryImageSet {
            story_id: story.id,
            final_urls: vec!["https://cdn.test/a.png".to_string()],
            has_images: true,
        })
        .await
        .unwrap();

        let stored = repo.find_by_id(story.id).await.unwrap().unwrap();
        assert!(stored.has_images);
        assert_eq!(stored.image_urls.len(), 1);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_story() {
        let repo = InMemoryStoryRepository::new();
        let err = repo
            .update_images(&StoryImageSet {
                story_id: Uuid::new_v4(),
                final_urls: Vec::new(),
                has_images: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
