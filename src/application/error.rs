//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。单个场景的生成失败和单张图片的转存失败
//! 在流水线内部消化，只有导致零产出的情况才会出现在这里

use thiserror::Error;
use uuid::Uuid;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 图像服务整体不可用
    #[error("Image provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// 所有场景都生成失败
    #[error("Failed to generate any images ({attempted} scenes attempted)")]
    ZeroResults { attempted: usize },

    /// 图片已生成但写库失败（重试耗尽）
    #[error("Images were generated but could not be saved after {attempts} attempts: {reason}")]
    PersistenceFailed {
        story_id: Uuid,
        attempts: u32,
        image_urls: Vec<String>,
        reason: String,
    },

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 是否为流水线运行失败（需要返回 success=false）
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::ZeroResults { .. } | Self::PersistenceFailed { .. }
        )
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<crate::domain::StoryError> for ApplicationError {
    fn from(err: crate::domain::StoryError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
