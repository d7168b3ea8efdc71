//! Fake Image Client - 本地运行与测试用的图像服务
//!
//! 不调用外部服务，返回确定性的 URL

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{ImageGenError, ImageGenRequest, ImageGeneratorPort};

/// Fake Image Client 配置
#[derive(Debug, Clone)]
pub struct FakeImageClientConfig {
    /// 返回 URL 的前缀
    pub base_url: String,
    /// 模拟延迟（毫秒）
    pub latency_ms: u64,
    /// 提示词包含其中任一片段时返回错误
    pub failing_fragments: Vec<String>,
    /// 模拟服务不可达
    pub unavailable: bool,
}

impl Default for FakeImageClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/fake-images".to_string(),
            latency_ms: 200,
            failing_fragments: Vec::new(),
            unavailable: false,
        }
    }
}

/// Fake Image Client
pub struct FakeImageClient {
    config: FakeImageClientConfig,
}

impl FakeImageClient {
    pub fn new(config: FakeImageClientConfig) -> Self {
        tracing::info!(
            base_url = %config.base_url,
            latency_ms = config.latency_ms,
            "FakeImageClient initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeImageClientConfig::default())
    }

    /// 同一提示词总是得到同一 URL
    fn url_for(&self, request: &ImageGenRequest, n: u32) -> String {
        let digest = request
            .prompt
            .bytes()
            .fold(0xcbf29ce484222325u64, |hash, b| (hash ^ u64::from(b)).wrapping_mul(0x100000001b3));
        format!(
            "{}/{:016x}-{}-{}.png",
            self.config.base_url.trim_end_matches('/'),
            digest,
            request.size,
            n
        )
    }
}

#[async_trait]
impl ImageGeneratorPort for FakeImageClient {
    async fn generate(&self, request: ImageGenRequest) -> Result<Vec<String>, ImageGenError> {
        if self.config.unavailable {
            return Err(ImageGenError::Unavailable("fake provider offline".to_string()));
        }

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(fragment) = self
            .config
            .failing_fragments
            .iter()
            .find(|f| request.prompt.contains(f.as_str()))
        {
            tracing::debug!(fragment = %fragment, "FakeImageClient: rejecting prompt");
            return Err(ImageGenError::Rejected(format!("prompt matched '{}'", fragment)));
        }

        tracing::debug!(size = %request.size, "FakeImageClient: returning fixed URL");
        Ok((0..request.count.max(1)).map(|n| self.url_for(&request, n)).collect())
    }

    async fn health_check(&self) -> bool {
        !self.config.unavailable
    }
}
