//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, ImageProvider};
use crate::application::MAX_CONCURRENT_CALLS;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "TALEFRAME";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `TALEFRAME_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `TALEFRAME_SERVER__PORT=8080`
/// - `TALEFRAME_IMAGE__PROVIDER=http`
/// - `TALEFRAME_IMAGE__API_KEY=sk-...`
/// - `TALEFRAME_PIPELINE__RNG_SEED=42`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("image.provider", "fake")?
        .set_default("image.model", "dall-e-3")?
        .set_default("image.timeout_secs", 120)?
        .set_default("storage.media_dir", "data/media")?
        .set_default("storage.download_timeout_secs", 30)?
        .set_default("storage.max_image_bytes", 20 * 1024 * 1024)?
        .set_default("database.path", "data/taleframe.db")?
        .set_default("database.max_connections", 5)?
        .set_default("pipeline.max_concurrent", 2)?
        .set_default("pipeline.retry_attempts", 3)?
        .set_default("pipeline.initial_backoff_ms", 500)?
        .set_default("pipeline.backoff_multiplier", 2)?
        .set_default("pipeline.serialize_per_story", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: TALEFRAME_IMAGE__URL=http://images:8080
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.image.provider == ImageProvider::Http && config.image.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Image provider URL cannot be empty".to_string(),
        ));
    }

    if config.image.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Image timeout cannot be 0".to_string(),
        ));
    }

    if !(1..=MAX_CONCURRENT_CALLS).contains(&config.pipeline.max_concurrent) {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.max_concurrent must be between 1 and {}",
            MAX_CONCURRENT_CALLS
        )));
    }

    if config.pipeline.retry_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.retry_attempts must be at least 1".to_string(),
        ));
    }

    if config.storage.max_image_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_image_bytes cannot be 0".to_string(),
        ));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "Database max connections cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Image Provider: {:?}", config.image.provider);
    if config.image.provider == ImageProvider::Http {
        tracing::info!("Image URL: {}", config.image.url);
        tracing::info!("Image Model: {}", config.image.model);
        tracing::info!("Image API Key: {}", if config.image.api_key.is_some() { "set" } else { "none" });
    }
    tracing::info!("Media Directory: {:?}", config.storage.media_dir);
    if config.database.is_in_memory() {
        tracing::info!("Database: in-memory");
    } else {
        tracing::info!("Database: {}", config.database.path);
    }
    tracing::info!(
        "Pipeline: max_concurrent={} retry_attempts={} backoff={}ms x{}",
        config.pipeline.max_concurrent,
        config.pipeline.retry_attempts,
        config.pipeline.initial_backoff_ms,
        config.pipeline.backoff_multiplier
    );
    if let Some(seed) = config.pipeline.rng_seed {
        tracing::info!("RNG Seed: {}", seed);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
