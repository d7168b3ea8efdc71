//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoryError {
    #[error("故事内容不能为空")]
    EmptyContent,

    #[error("主角名字不能为空")]
    EmptySubjectName,

    #[error("主题不能为空")]
    EmptyTheme,
}
