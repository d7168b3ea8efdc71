//! Illustration Events Port - 流水线进度事件

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 插图流水线事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum IllustrationEvent {
    /// 开始生成
    IllustrationStarted {
        story_id: Uuid,
        total_scenes: usize,
        art_style: String,
    },
    /// 单个场景生成成功
    SceneGenerated { story_id: Uuid, scene_index: usize },
    /// 单个场景生成失败（已跳过）
    SceneFailed {
        story_id: Uuid,
        scene_index: usize,
        error: String,
    },
    /// 运行完成
    IllustrationCompleted {
        story_id: Uuid,
        image_count: usize,
        has_images: bool,
    },
    /// 运行失败
    IllustrationFailed { story_id: Uuid, error: String },
}

/// 事件发布端口
pub trait IllustrationEventsPort: Send + Sync {
    fn publish(&self, event: IllustrationEvent);
}
