//! HTTP Image Client - 调用外部图像生成服务
//!
//! 实现 ImageGeneratorPort trait，兼容 OpenAI 风格的接口
//!
//! 外部 API:
//! POST {base_url}/v1/images/generations
//! Request: {"model": "...", "prompt": "...", "n": 1, "size": "1024x1024", "style": "vivid", "response_format": "url"}
//! Response: {"data": [{"url": "https://..."}]}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{ImageGenError, ImageGenRequest, ImageGeneratorPort};

/// 生成请求体
#[derive(Debug, Serialize)]
struct GenerationHttpRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'static str,
    style: &'static str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerationHttpResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

/// HTTP 图像客户端配置
#[derive(Debug, Clone)]
pub struct HttpImageClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// Bearer token
    pub api_key: Option<String>,
    /// 模型名
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpImageClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            model: "dall-e-3".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpImageClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// HTTP 图像客户端
pub struct HttpImageClient {
    client: Client,
    config: HttpImageClientConfig,
}

impl HttpImageClient {
    pub fn new(config: HttpImageClientConfig) -> Result<Self, ImageGenError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageGenError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generations_url(&self) -> String {
        format!("{}/v1/images/generations", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/v1/models", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

/// 把非 2xx 状态码映射为错误
fn status_error(status: StatusCode, body: &str) -> ImageGenError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ImageGenError::Rejected(format!("HTTP {}: {}", status, body))
        }
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
            ImageGenError::Unavailable(format!("HTTP {}", status))
        }
        _ => ImageGenError::ServiceError(format!("HTTP {}: {}", status, body)),
    }
}

/// 提取返回的 URL
fn parse_urls(body: &str) -> Result<Vec<String>, ImageGenError> {
    let parsed: GenerationHttpResponse = serde_json::from_str(body)
        .map_err(|e| ImageGenError::InvalidResponse(format!("Malformed body: {}", e)))?;

    let urls: Vec<String> = parsed.data.into_iter().filter_map(|d| d.url).collect();
    if urls.is_empty() {
        return Err(ImageGenError::InvalidResponse("No image URL in response".to_string()));
    }
    Ok(urls)
}

#[async_trait]
impl ImageGeneratorPort for HttpImageClient {
    async fn generate(&self, request: ImageGenRequest) -> Result<Vec<String>, ImageGenError> {
        let body = GenerationHttpRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            n: request.count,
            size: request.size.as_str(),
            style: request.style.as_str(),
            response_format: "url",
        };

        tracing::debug!(
            url = %self.generations_url(),
            prompt_len = request.prompt.len(),
            size = %request.size,
            "Sending image generation request"
        );

        let response = self
            .authorize(self.client.post(self.generations_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageGenError::Timeout
                } else if e.is_connect() {
                    ImageGenError::Unavailable(format!("Cannot connect to image service: {}", e))
                } else {
                    ImageGenError::ServiceError(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ImageGenError::InvalidResponse(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let urls = parse_urls(&text)?;
        tracing::info!(images = urls.len(), size = %request.size, "Image generation completed");
        Ok(urls)
    }

    async fn health_check(&self) -> bool {
        match self
            .authorize(self.client.get(self.health_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
