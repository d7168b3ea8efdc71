//! 插图流水线的三个有副作用的阶段
//!
//! - orchestrator: 调用图像服务（有界并发，单场景失败跳过）
//! - publisher: 转存到持久存储（全部失败时回退到临时 URL）
//! - persistence: 写回故事记录（显式重试策略）

mod orchestrator;
mod persistence;
mod publisher;

pub use orchestrator::{
    GenerationConfig, GenerationOrchestrator, GenerationOutcome, MAX_CONCURRENT_CALLS,
};
pub use persistence::{PersistenceUpdater, RetryExhausted, RetryPolicy};
pub use publisher::{PublishOutcome, StoragePublisher};
