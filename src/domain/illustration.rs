//! Illustration Context - 插图生成相关的值对象

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 图像服务支持的尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1024x1792")]
    Portrait1024x1792,
    #[serde(rename = "1792x1024")]
    Landscape1792x1024,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Portrait1024x1792 => "1024x1792",
            ImageSize::Landscape1792x1024 => "1792x1024",
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 画面比例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Square,
    Portrait,
    Landscape,
}

impl AspectRatio {
    /// 可选比例（顺序固定，随机源按下标抽取）
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
    ];

    pub fn size(&self) -> ImageSize {
        match self {
            AspectRatio::Square => ImageSize::Square1024,
            AspectRatio::Portrait => ImageSize::Portrait1024x1792,
            AspectRatio::Landscape => ImageSize::Landscape1792x1024,
        }
    }
}

/// 单个场景的生成结果（运行结束即丢弃）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub scene_index: usize,
    pub provider_url: Option<String>,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(scene_index: usize, url: String) -> Self {
        Self {
            scene_index,
            provider_url: Some(url),
            error: None,
        }
    }

    pub fn failure(scene_index: usize, error: impl Into<String>) -> Self {
        Self {
            scene_index,
            provider_url: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.provider_url.is_some()
    }
}

/// 单张图片的上传结果（运行结束即丢弃）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub scene_index: usize,
    pub original_url: String,
    pub storage_url: Option<String>,
    pub success: bool,
}

/// 生成批次状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    InProgress,
    FullSuccess,
    PartialSuccess,
    Failed,
}

impl GenerationStatus {
    /// 根据成功数量得出终态
    pub fn from_counts(attempted: usize, succeeded: usize) -> Self {
        if succeeded == 0 {
            GenerationStatus::Failed
        } else if succeeded < attempted {
            GenerationStatus::PartialSuccess
        } else {
            GenerationStatus::FullSuccess
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::InProgress => "in_progress",
            GenerationStatus::FullSuccess => "full_success",
            GenerationStatus::PartialSuccess => "partial_success",
            GenerationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationStatus::FullSuccess | GenerationStatus::PartialSuccess | GenerationStatus::Failed
        )
    }
}

/// 故事的插图集合（唯一的持久化输出）
///
/// 不变量:
/// - final_urls 按场景顺序排列
/// - has_images 为 true 当且仅当至少一张图片进入了持久存储
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryImageSet {
    pub story_id: Uuid,
    pub final_urls: Vec<String>,
    pub has_images: bool,
}
