//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{GenerationConfig, IllustrationSettings, RetryPolicy};
use crate::domain::DEFAULT_TONE;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 图像服务配置
    #[serde(default)]
    pub image: ImageConfig,

    /// 图片存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 插图流水线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 图像服务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    /// OpenAI 兼容的 HTTP 服务
    Http,
    /// 本地 fake 实现，不访问外部服务
    #[default]
    Fake,
}

/// 图像服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub provider: ImageProvider,

    /// 服务基础 URL
    #[serde(default = "default_image_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// 单次生成请求超时（秒）
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    /// fake 模式的模拟延迟（毫秒）
    #[serde(default = "default_fake_latency")]
    pub fake_latency_ms: u64,
}

fn default_image_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_timeout() -> u64 {
    120
}

fn default_fake_latency() -> u64 {
    200
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            provider: ImageProvider::default(),
            url: default_image_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_image_timeout(),
            fake_latency_ms: default_fake_latency(),
        }
    }
}

/// 图片存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 转存图片目录
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// 持久 URL 的前缀，未设置时使用 server 的公开地址
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// 下载临时 URL 的超时（秒）
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// 单张图片大小上限（字节）
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("data/media")
}

fn default_download_timeout() -> u64 {
    30
}

fn default_max_image_bytes() -> u64 {
    20 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            public_base_url: None,
            download_timeout_secs: default_download_timeout(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径，为空时使用内存仓储
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/taleframe.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.trim().is_empty()
    }
}

/// 插图流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// 同时进行的生成调用数（1..=3）
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 写库最多尝试次数（含首次）
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,

    /// 固定种子让画幅选择可复现
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// 画风基调标签
    #[serde(default = "default_tone")]
    pub tone: String,

    /// 同一故事的运行是否串行
    #[serde(default = "default_serialize_per_story")]
    pub serialize_per_story: bool,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_backoff_multiplier() -> u32 {
    2
}

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

fn default_serialize_per_story() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            retry_attempts: default_retry_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            backoff_multiplier: default_backoff_multiplier(),
            rng_seed: None,
            tone: default_tone(),
            serialize_per_story: default_serialize_per_story(),
        }
    }
}

impl PipelineConfig {
    /// 转换为流水线设置
    pub fn settings(&self) -> IllustrationSettings {
        IllustrationSettings {
            tone: self.tone.clone(),
            generation: GenerationConfig {
                max_concurrent: self.max_concurrent,
            },
            retry: RetryPolicy::new(
                self.retry_attempts,
                Duration::from_millis(self.initial_backoff_ms),
                self.backoff_multiplier,
            ),
            serialize_per_story: self.serialize_per_story,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
