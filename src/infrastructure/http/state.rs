//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateStoryHandler, IllustrateStoryHandler, IllustrationDeps, IllustrationSettings,
    // Query handlers
    GetStoryHandler, ListStoriesHandler,
    // Ports
    ImageGeneratorPort, ImageStoragePort, RandomSourcePort, StoryLockPort, StoryRepositoryPort,
};
use crate::infrastructure::events::EventPublisher;

/// 外部能力
pub struct AppPorts {
    pub story_repo: Arc<dyn StoryRepositoryPort>,
    pub image_generator: Arc<dyn ImageGeneratorPort>,
    pub image_storage: Arc<dyn ImageStoragePort>,
    pub random: Arc<dyn RandomSourcePort>,
    pub story_lock: Arc<dyn StoryLockPort>,
    pub event_publisher: Arc<EventPublisher>,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub story_repo: Arc<dyn StoryRepositoryPort>,
    pub story_lock: Arc<dyn StoryLockPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub create_story_handler: CreateStoryHandler,
    /// 在独立任务中运行，需要共享所有权
    pub illustrate_handler: Arc<IllustrateStoryHandler>,

    // ========== Query Handlers ==========
    pub get_story_handler: GetStoryHandler,
    pub list_stories_handler: ListStoriesHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ports: AppPorts, settings: IllustrationSettings) -> Self {
        let illustrate_handler = IllustrateStoryHandler::new(
            IllustrationDeps {
                story_repo: ports.story_repo.clone(),
                generator: ports.image_generator,
                storage: ports.image_storage,
                random: ports.random,
                story_lock: ports.story_lock.clone(),
                events: ports.event_publisher.clone(),
            },
            settings,
        );

        Self {
            // Command handlers
            create_story_handler: CreateStoryHandler::new(ports.story_repo.clone()),
            illustrate_handler: Arc::new(illustrate_handler),

            // Query handlers
            get_story_handler: GetStoryHandler::new(ports.story_repo.clone()),
            list_stories_handler: ListStoriesHandler::new(ports.story_repo.clone()),

            // Ports
            story_repo: ports.story_repo,
            story_lock: ports.story_lock,
            event_publisher: ports.event_publisher,
        }
    }
}
