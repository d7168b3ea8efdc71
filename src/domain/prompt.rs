//! 插图提示词组装
//!
//! 纯函数：只读取预先算好的故事级状态（画风、角色描述），不重新计算

use super::character::CharacterDescriptor;
use super::scene::SceneDescriptor;
use super::style::{ArtStyle, Mood, ProviderStyle};

/// 一个场景对应的完整提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustrationPrompt {
    pub scene_index: usize,
    pub total_scenes: usize,
    pub text: String,
    pub art_style: String,
    pub provider_style: ProviderStyle,
    pub mood: Mood,
    pub includes_character: bool,
}

/// 故事级的共享状态
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub art_style: &'a ArtStyle,
    pub character: Option<&'a CharacterDescriptor>,
    pub theme: &'a str,
    pub total_scenes: usize,
}

/// 组装单个场景的提示词
pub fn compose_prompt(scene: &SceneDescriptor, context: &PromptContext<'_>) -> IllustrationPrompt {
    let page = scene.index + 1;
    let total = context.total_scenes.max(page);

    let mut parts: Vec<String> = vec![
        format!("Children's picture book illustration, page {} of {}.", page, total),
        format!("Scene: {}.", scene.key_moment),
        format!("Setting theme: {}.", context.theme),
        format!("Art style: {}.", context.art_style.label()),
        format!("Mood: {}.", scene.mood.description()),
    ];

    let character = context
        .character
        .filter(|c| c.include_character())
        .and_then(|c| c.description());
    if let Some(description) = character {
        parts.push(format!("Main character: {}.", description));
    }

    if page == 1 {
        parts.push("This is the opening page of the story.".to_string());
    } else if page == total {
        parts.push("This is the closing page of the story.".to_string());
    }
    parts.push(
        "Keep the art style, color palette and character designs consistent with the other pages of this book."
            .to_string(),
    );
    parts.push("No text, letters or words in the image.".to_string());

    IllustrationPrompt {
        scene_index: scene.index,
        total_scenes: total,
        text: parts.join(" "),
        art_style: context.art_style.label().to_string(),
        provider_style: context.art_style.provider_style(),
        mood: scene.mood,
        includes_character: character.is_some(),
    }
}

/// 为所有场景组装提示词，保持场景顺序
pub fn compose_prompts(scenes: &[SceneDescriptor], context: &PromptContext<'_>) -> Vec<IllustrationPrompt> {
    scenes.iter().map(|scene| compose_prompt(scene, context)).collect()
}
