//! Story Context - 故事限界上下文
//!
//! 职责:
//! - 故事文本（流水线的不可变输入）
//! - 主角 / 配角及其结构化外貌特征

mod entities;
mod errors;

pub use entities::{StoryText, Subject, SubjectAppearance};
pub use errors::StoryError;
