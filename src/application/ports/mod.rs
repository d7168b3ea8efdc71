//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod events;
mod image_generator;
mod image_storage;
mod random_source;
mod repositories;
mod story_lock;

pub use events::{IllustrationEvent, IllustrationEventsPort};
pub use image_generator::{ImageGenError, ImageGenRequest, ImageGeneratorPort};
pub use image_storage::{ImageStorageError, ImageStoragePort, StoredImage};
pub use random_source::RandomSourcePort;
pub use repositories::{RepositoryError, StoryRecord, StoryRepositoryPort};
pub use story_lock::{StoryLockPort, StoryRunGuard};
