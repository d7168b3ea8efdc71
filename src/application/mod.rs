//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（ImageGenerator、ImageStorage、Repository、StoryLock 等）
//! - pipeline: 插图流水线的生成、转存、写回阶段
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod queries;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use commands::{
    handlers::{
        CreateStoryHandler, CreateStoryResponse, IllustrateStoryHandler, IllustrateStoryResponse,
        IllustrationDeps, IllustrationSettings,
    },
    CreateStory, IllustrateStory,
};

pub use error::ApplicationError;

pub use pipeline::{GenerationConfig, RetryPolicy, MAX_CONCURRENT_CALLS};

pub use ports::{
    // Events
    IllustrationEvent,
    IllustrationEventsPort,
    // Image generator
    ImageGenError,
    ImageGenRequest,
    ImageGeneratorPort,
    // Image storage
    ImageStorageError,
    ImageStoragePort,
    StoredImage,
    // Random source
    RandomSourcePort,
    // Repositories
    RepositoryError,
    StoryRecord,
    StoryRepositoryPort,
    // Story lock
    StoryLockPort,
    StoryRunGuard,
};

pub use queries::{
    handlers::{GetStoryHandler, ListStoriesHandler, StoryResponse, StorySummary},
    GetStory, ListStories,
};
