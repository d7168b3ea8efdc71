//! SQLite Story Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{RepositoryError, StoryRecord, StoryRepositoryPort};
use crate::domain::{StoryImageSet, Subject};

/// SQLite Story Repository
pub struct SqliteStoryRepository {
    pool: DbPool,
}

impl SqliteStoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const STORY_COLUMNS: &str = "id, title, content, theme, primary_subject, secondary_subjects, has_images, image_urls, created_at, updated_at";

#[derive(FromRow)]
struct StoryRow {
    id: String,
    title: String,
    content: String,
    theme: String,
    primary_subject: String,
    secondary_subjects: String,
    has_images: bool,
    image_urls: String,
    created_at: String,
    updated_at: String,
}

fn serialization_error(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::SerializationError(e.to_string())
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(serialization_error)
}

impl TryFrom<StoryRow> for StoryRecord {
    type Error = RepositoryError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        Ok(StoryRecord {
            id: Uuid::parse_str(&row.id).map_err(serialization_error)?,
            title: row.title,
            content: row.content,
            theme: row.theme,
            primary_subject: serde_json::from_str::<Subject>(&row.primary_subject)
                .map_err(serialization_error)?,
            secondary_subjects: serde_json::from_str(&row.secondary_subjects)
                .map_err(serialization_error)?,
            has_images: row.has_images,
            image_urls: serde_json::from_str(&row.image_urls).map_err(serialization_error)?,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl StoryRepositoryPort for SqliteStoryRepository {
    async fn save(&self, story: &StoryRecord) -> Result<(), RepositoryError> {
        let primary = serde_json::to_string(&story.primary_subject).map_err(serialization_error)?;
        let secondary =
            serde_json::to_string(&story.secondary_subjects).map_err(serialization_error)?;
        let image_urls = serde_json::to_string(&story.image_urls).map_err(serialization_error)?;

        sqlx::query(
            r#"
            INSERT INTO stories (id, title, content, theme, primary_subject, secondary_subjects, has_images, image_urls, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(story.id.to_string())
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.theme)
        .bind(primary)
        .bind(secondary)
        .bind(story.has_images)
        .bind(image_urls)
        .bind(story.created_at.to_rfc3339())
        .bind(story.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::Duplicate(story.id.to_string()),
            _ => database_error(e),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
        let row: Option<StoryRow> =
            sqlx::query_as(&format!("SELECT {} FROM stories WHERE id = ?", STORY_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        row.map(StoryRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
        let rows: Vec<StoryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM stories ORDER BY created_at DESC",
            STORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(StoryRecord::try_from).collect()
    }

    async fn update_images(&self, images: &StoryImageSet) -> Result<(), RepositoryError> {
        let image_urls = serde_json::to_string(&images.final_urls).map_err(serialization_error)?;

        let result = sqlx::query(
            "UPDATE stories SET has_images = ?, image_urls = ?, updated_at = ? WHERE id = ?",
        )
        .bind(images.has_images)
        .bind(image_urls)
        .bind(Utc::now().to_rfc3339())
        .bind(images.story_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(images.story_id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::sample_story;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteStoryRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteStoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = repo().await;
        let mut story = sample_story();
        story.secondary_subjects = vec![Subject::new("Liam")];
        repo.save(&story).await.unwrap();

        let found = repo.find_by_id(story.id).await.unwrap().unwrap();
        assert_eq!(found.title, story.title);
        assert_eq!(found.primary_subject, story.primary_subject);
        assert_eq!(found.secondary_subjects, story.secondary_subjects);
        assert!(!found.has_images);
        assert!(found.image_urls.is_empty());

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_save() {
        let repo = repo().await;
        let story = sample_story();
        repo.save(&story).await.unwrap();
        assert!(matches!(repo.save(&story).await, Err(RepositoryError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_update_images_overwrites() {
        let repo = repo().await;
        let story = sample_story();
        repo.save(&story).await.unwrap();

        repo.update_images(&StoryImageSet {
            story_id: story.id,
            final_urls: vec!["https://cdn.test/a.png".into(), "https://cdn.test/b.png".into()],
            has_images: true,
        })
        .await
        .unwrap();
        repo.update_images(&StoryImageSet {
            story_id: story.id,
            final_urls: vec!["https://provider.test/c.png".into()],
            has_images: false,
        })
        .await
        .unwrap();

        let found = repo.find_by_id(story.id).await.unwrap().unwrap();
        assert!(!found.has_images);
        assert_eq!(found.image_urls, vec!["https://provider.test/c.png"]);
    }

    #[tokio::test]
    async fn test_update_missing_story() {
        let repo = repo().await;
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
