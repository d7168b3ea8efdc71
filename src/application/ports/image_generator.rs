//! Image Generator Port - 图像生成服务抽象
//!
//! 定义图像生成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ImageSize, ProviderStyle};

/// 图像生成错误
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// 服务不可达（连接失败等系统性故障）
    #[error("Image provider unavailable: {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 提示词被服务拒绝（内容策略等）
    #[error("Prompt rejected: {0}")]
    Rejected(String),
}

impl ImageGenError {
    /// 是否属于系统性不可用
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ImageGenError::Unavailable(_))
    }
}

/// 图像生成请求
#[derive(Debug, Clone)]
pub struct ImageGenRequest {
    /// 完整提示词
    pub prompt: String,
    /// 生成数量
    pub count: u32,
    /// 尺寸
    pub size: ImageSize,
    /// 风格提示
    pub style: ProviderStyle,
}

/// Image Generator Port
///
/// 外部图像生成服务的抽象接口；返回的 URL 都是临时的
#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    /// 生成图像，返回临时 URL 列表
    async fn generate(&self, request: ImageGenRequest) -> Result<Vec<String>, ImageGenError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
