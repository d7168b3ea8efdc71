//! Story Commands

use uuid::Uuid;

use crate::domain::{Subject, SubjectAppearance};

/// 创建故事命令
#[derive(Debug, Clone)]
pub struct CreateStory {
    pub title: String,
    pub content: String,
    pub theme: String,
    pub primary_subject: Subject,
    pub secondary_subjects: Vec<Subject>,
}

/// 为故事生成插图命令
#[derive(Debug, Clone, Default)]
pub struct IllustrateStory {
    pub story_id: Uuid,
    /// 替换由主题推导的画风描述
    pub style_override: Option<String>,
    /// 仅本次运行生效的主角外貌
    pub appearance_override: Option<SubjectAppearance>,
}
