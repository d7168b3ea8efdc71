//! Story Context - Entities

use serde::{Deserialize, Serialize};

use super::errors::StoryError;

/// 角色外貌特征
///
/// 所有字段都是可选的；空白字符串视为缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAppearance {
    #[serde(default)]
    pub skin_tone: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub hair_style: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SubjectAppearance {
    pub fn skin_tone(&self) -> Option<&str> {
        trimmed(&self.skin_tone)
    }

    pub fn hair_color(&self) -> Option<&str> {
        trimmed(&self.hair_color)
    }

    pub fn hair_style(&self) -> Option<&str> {
        trimmed(&self.hair_style)
    }

    /// 是否至少包含一个可用特征
    pub fn has_traits(&self) -> bool {
        self.skin_tone().is_some() || self.hair_color().is_some() || self.hair_style().is_some()
    }
}

/// 故事角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub appearance: Option<SubjectAppearance>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            appearance: None,
        }
    }

    pub fn with_appearance(mut self, appearance: SubjectAppearance) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn name(&self) -> &str {
        self.name.trim()
    }

    /// 返回可用的外貌特征；没有任何特征时返回 None
    pub fn traits(&self) -> Option<&SubjectAppearance> {
        self.appearance.as_ref().filter(|a| a.has_traits())
    }
}

/// 故事文本
///
/// 不变量:
/// - content 非空
/// - 主角名字非空
#[derive(Debug, Clone)]
pub struct StoryText {
    content: String,
    theme: String,
    primary: Subject,
    secondary: Vec<Subject>,
}

impl StoryText {
    pub fn new(
        content: impl Into<String>,
        theme: impl Into<String>,
        primary: Subject,
        secondary: Vec<Subject>,
    ) -> Result<Self, StoryError> {
        let content = content.into();
        let theme = theme.into();

        if content.trim().is_empty() {
            return Err(StoryError::EmptyContent);
        }
        if theme.trim().is_empty() {
            return Err(StoryError::EmptyTheme);
        }
        if primary.name().is_empty() {
            return Err(StoryError::EmptySubjectName);
        }

        // 没有名字的配角直接丢弃
        let secondary = secondary
            .into_iter()
            .filter(|s| !s.name().is_empty())
            .collect();

        Ok(Self {
            content,
            theme: theme.trim().to_string(),
            primary,
            secondary,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn primary(&self) -> &Subject {
        &self.primary
    }

    pub fn secondary(&self) -> &[Subject] {
        &self.secondary
    }

    /// 使用请求中的外貌覆盖主角的外貌（仅本次运行有效）
    pub fn with_primary_appearance(mut self, appearance: SubjectAppearance) -> Self {
        self.primary.appearance = Some(appearance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_traits_are_absent() {
        let appearance = SubjectAppearance {
            skin_tone: Some("  ".to_string()),
            hair_color: None,
            hair_style: Some(String::new()),
        };
        assert!(!appearance.has_traits());
        assert!(Subject::new("Emma").with_appearance(appearance).traits().is_none());
    }

    #[test]
    fn test_story_requires_content_and_subject() {
        let err = StoryText::new("   ", "Ocean", Subject::new("Emma"), vec![]).unwrap_err();
        assert_eq!(err, StoryError::EmptyContent);

        let err = StoryText::new("Once upon a time.", "Ocean", Subject::new(" "), vec![]).unwrap_err();
        assert_eq!(err, StoryError::EmptySubjectName);
    }

    #[test]
    fn test_unnamed_secondary_subjects_dropped() {
        let story = StoryText::new(
            "Once upon a time.",
            "Ocean",
            Subject::new("Emma"),
            vec![Subject::new(""), Subject::new("Liam")],
        )
        .unwrap();
        assert_eq!(story.secondary().len(), 1);
        assert_eq!(story.secondary()[0].name(), "Liam");
    }

    #[test]
    fn test_appearance_override() {
        let story = StoryText::new("Once upon a time.", "Ocean", Subject::new("Emma"), vec![])
            .unwrap()
            .with_primary_appearance(SubjectAppearance {
                hair_color: Some("red".to_string()),
                ..Default::default()
            });
        assert_eq!(story.primary().traits().and_then(|t| t.hair_color()), Some("red"));
    }
}
