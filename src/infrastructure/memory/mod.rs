//! Memory Layer - In-Memory State Management
//!
//! 故事运行锁与内存故事仓储

mod story_lock;
mod story_repo;

pub use story_lock::StoryLockManager;
pub use story_repo::InMemoryStoryRepository;
