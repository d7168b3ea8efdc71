//! 角色描述构建
//!
//! 只有存在结构化外貌特征时才描述角色；没有特征的角色不出现在提示词里，
//! 绝不臆造外貌

use super::story::{Subject, SubjectAppearance};

/// 角色层级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterTier {
    /// 有结构化特征，可以描述外貌
    Appearance,
    /// 没有特征，角色从提示词中省略
    Generic,
}

/// 整个故事共用的角色描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDescriptor {
    subject_name: String,
    tier: CharacterTier,
    description: Option<String>,
}

impl CharacterDescriptor {
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn tier(&self) -> CharacterTier {
        self.tier
    }

    pub fn include_character(&self) -> bool {
        self.tier == CharacterTier::Appearance
    }

    /// 角色描述；Generic 层级总是 None
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// 判断角色层级
pub fn classify(subject: &Subject) -> CharacterTier {
    if subject.traits().is_some() {
        CharacterTier::Appearance
    } else {
        CharacterTier::Generic
    }
}

/// 把外貌特征写成短语，例如 `light skin and curly brown hair`
pub fn describe_traits(appearance: &SubjectAppearance) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(skin) = appearance.skin_tone() {
        parts.push(format!("{} skin", skin));
    }

    let hair = match (appearance.hair_style(), appearance.hair_color()) {
        (Some(style), Some(color)) => Some(format!("{} {} hair", style, color)),
        (None, Some(color)) => Some(format!("{} hair", color)),
        (Some(style), None) => Some(format!("{} hair", style)),
        (None, None) => None,
    };
    parts.extend(hair);

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" and "))
    }
}

fn describe_subject(subject: &Subject) -> String {
    match subject.traits().and_then(describe_traits) {
        Some(traits) => format!("{} with {}", subject.name(), traits),
        None => subject.name().to_string(),
    }
}

/// 构建角色描述
///
/// 主角决定层级；配角以 `With friends: X with <traits>, Y` 附加，没有特征的配角只出现名字
pub fn build_character_descriptor(primary: &Subject, secondary: &[Subject]) -> CharacterDescriptor {
    let tier = classify(primary);

    let description = match tier {
        CharacterTier::Generic => None,
        CharacterTier::Appearance => {
            let mut text = describe_subject(primary);
            if !secondary.is_empty() {
                let friends: Vec<String> = secondary.iter().map(describe_subject).collect();
                text.push_str(". With friends: ");
                text.push_str(&friends.join(", "));
            }
            Some(text)
        }
    };

    CharacterDescriptor {
        subject_name: primary.name().to_string(),
        tier,
        description,
    }
}
