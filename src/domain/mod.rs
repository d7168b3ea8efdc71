//! Domain Layer - 领域层
//!
//! 包含:
//! - Story Context: 故事文本与角色
//! - Scene Context: 场景提取与画面瞬间
//! - 角色描述、画风与情绪、提示词组装（均为纯函数）

pub mod character;
pub mod illustration;
pub mod prompt;
pub mod scene;
pub mod story;
pub mod style;

// 共享的文本分割器
mod text_segmenter;

pub use character::{build_character_descriptor, CharacterDescriptor, CharacterTier};
pub use illustration::{
    AspectRatio, GenerationResult, GenerationStatus, ImageSize, StoryImageSet, UploadResult,
};
pub use prompt::{compose_prompt, compose_prompts, IllustrationPrompt, PromptContext};
pub use scene::{extract_scenes, ExtractionContext, SceneDescriptor};
pub use story::{StoryError, StoryText, Subject, SubjectAppearance};
pub use style::{detect_mood, select_art_style, ArtStyle, Mood, ProviderStyle, DEFAULT_TONE};
pub use text_segmenter::{split_paragraphs, split_sentences, SegmentConfig};
