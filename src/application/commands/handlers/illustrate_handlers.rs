//! IllustrateStory Handler - 一次完整的插图运行
//!
//! 读取故事 -> 角色描述 -> 画风 -> 场景 -> 提示词 -> 生成 -> 转存 -> 写回

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::IllustrateStory;
use crate::application::error::ApplicationError;
use crate::application::pipeline::{
    GenerationConfig, GenerationOrchestrator, PersistenceUpdater, RetryPolicy, StoragePublisher,
};
use crate::application::ports::{
    IllustrationEvent, IllustrationEventsPort, ImageGeneratorPort, ImageStoragePort,
    RandomSourcePort, StoryLockPort, StoryRepositoryPort,
};
use crate::domain::{
    build_character_descriptor, compose_prompts, extract_scenes, select_art_style,
    ExtractionContext, GenerationStatus, IllustrationPrompt, PromptContext, DEFAULT_TONE,
};

/// 流水线设置
#[derive(Debug, Clone)]
pub struct IllustrationSettings {
    /// 画风基调标签
    pub tone: String,
    pub generation: GenerationConfig,
    pub retry: RetryPolicy,
    /// 同一故事的运行是否串行
    pub serialize_per_story: bool,
}

impl Default for IllustrationSettings {
    fn default() -> Self {
        Self {
            tone: DEFAULT_TONE.to_string(),
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
            serialize_per_story: true,
        }
    }
}

/// 外部能力
pub struct IllustrationDeps {
    pub story_repo: Arc<dyn StoryRepositoryPort>,
    pub generator: Arc<dyn ImageGeneratorPort>,
    pub storage: Arc<dyn ImageStoragePort>,
    pub random: Arc<dyn RandomSourcePort>,
    pub story_lock: Arc<dyn StoryLockPort>,
    pub events: Arc<dyn IllustrationEventsPort>,
}

/// 插图运行响应
#[derive(Debug, Clone)]
pub struct IllustrateStoryResponse {
    pub story_id: Uuid,
    /// 按场景顺序
    pub image_urls: Vec<String>,
    pub has_images: bool,
    pub status: GenerationStatus,
    pub art_style: String,
    pub scenes_attempted: usize,
    pub scenes_generated: usize,
    pub images_stored: usize,
}

/// IllustrateStory Handler
pub struct IllustrateStoryHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
    story_lock: Arc<dyn StoryLockPort>,
    events: Arc<dyn IllustrationEventsPort>,
    orchestrator: GenerationOrchestrator,
    publisher: StoragePublisher,
    persistence: PersistenceUpdater,
    tone: String,
    serialize_per_story: bool,
}

impl IllustrateStoryHandler {
    pub fn new(deps: IllustrationDeps, settings: IllustrationSettings) -> Self {
        Self {
            orchestrator: GenerationOrchestrator::new(
                settings.generation,
                deps.generator,
                deps.random,
                deps.events.clone(),
            ),
            publisher: StoragePublisher::new(deps.storage),
            persistence: PersistenceUpdater::new(deps.story_repo.clone(), settings.retry),
            story_repo: deps.story_repo,
            story_lock: deps.story_lock,
            events: deps.events,
            tone: settings.tone,
            serialize_per_story: settings.serialize_per_story,
        }
    }

    pub async fn handle(&self, command: IllustrateStory) -> Result<IllustrateStoryResponse, ApplicationError> {
        let story_id = command.story_id;

        // 持有到运行结束
        let _guard = if self.serialize_per_story {
            Some(self.story_lock.acquire(story_id).await)
        } else {
            None
        };

        let story = self
            .story_repo
            .find_by_id(story_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Story", story_id))?;

        let mut text = story.to_story_text()?;
        if let Some(appearance) = command.appearance_override {
            text = text.with_primary_appearance(appearance);
        }

        // 故事级状态只计算一次
        let character = build_character_descriptor(text.primary(), text.secondary());
        let art_style = select_art_style(text.theme(), &self.tone, command.style_override.as_deref());

        let scenes = extract_scenes(
            text.content(),
            &ExtractionContext {
                subject_name: text.primary().name(),
                theme: text.theme(),
                character: Some(&character),
            },
        );
        if scenes.is_empty() {
            return Err(ApplicationError::validation("Story text yields no scenes"));
        }

        let prompts = compose_prompts(
            &scenes,
            &PromptContext {
                art_style: &art_style,
                character: Some(&character),
                theme: text.theme(),
                total_scenes: scenes.len(),
            },
        );

        tracing::info!(
            story_id = %story_id,
            scenes = prompts.len(),
            art_style = %art_style.label(),
            character_tier = ?character.tier(),
            "Illustration run started"
        );
        self.events.publish(IllustrationEvent::IllustrationStarted {
            story_id,
            total_scenes: prompts.len(),
            art_style: art_style.label().to_string(),
        });

        match self.run_stages(story_id, &prompts).await {
            Ok(mut response) => {
                response.art_style = art_style.label().to_string();
                self.events.publish(IllustrationEvent::IllustrationCompleted {
                    story_id,
                    image_count: response.image_urls.len(),
                    has_images: response.has_images,
                });
                Ok(response)
            }
            Err(e) => {
                tracing::error!(story_id = %story_id, error = %e, "Illustration run failed");
                self.events.publish(IllustrationEvent::IllustrationFailed {
                    story_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// 生成 -> 转存 -> 写回
    async fn run_stages(
        &self,
        story_id: Uuid,
        prompts: &[IllustrationPrompt],
    ) -> Result<IllustrateStoryResponse, ApplicationError> {
        let generated = self.orchestrator.run(story_id, prompts).await?;
        let successes = generated.successes();

        let published = self.publisher.publish(story_id, &successes).await;
        let images_stored = published.uploads.iter().filter(|u| u.success).count();

        let image_set = self.persistence.persist(story_id, &published).await?;
        self.publisher.remove_stale(story_id, &image_set.final_urls).await;

        tracing::info!(
            story_id = %story_id,
            status = generated.status.as_str(),
            images = image_set.final_urls.len(),
            has_images = image_set.has_images,
            "Illustration run finished"
        );

        Ok(IllustrateStoryResponse {
            story_id,
            image_urls: image_set.final_urls,
            has_images: image_set.has_images,
            status: generated.status,
            art_style: String::new(),
            scenes_attempted: prompts.len(),
            scenes_generated: successes.len(),
            images_stored,
        })
    }
}
