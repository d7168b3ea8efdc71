//! Taleframe - 故事插图生成服务
//!
//! - Domain: story/, scene/, 角色与画风
//! - Application: pipeline, commands, queries, ports
//! - Infrastructure: http, adapters, memory, persistence, events

use std::sync::Arc;

use taleframe::application::{ImageGeneratorPort, StoryRepositoryPort};
use taleframe::config::{load_config, print_config, AppConfig, ImageProvider, LogConfig};
use taleframe::infrastructure::adapters::{
    FakeImageClient, FakeImageClientConfig, FileImageStorage, HttpImageClient,
    HttpImageClientConfig, SeededRandom,
};
use taleframe::infrastructure::events::EventPublisher;
use taleframe::infrastructure::http::{AppPorts, AppState, HttpServer, ServerConfig};
use taleframe::infrastructure::memory::{InMemoryStoryRepository, StoryLockManager};
use taleframe::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteStoryRepository,
};

/// 初始化日志
fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},taleframe={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 创建故事仓储：配置了数据库路径时使用 SQLite，否则使用内存
async fn build_story_repo(config: &AppConfig) -> anyhow::Result<Arc<dyn StoryRepositoryPort>> {
    if config.database.is_in_memory() {
        tracing::warn!("No database path configured, stories will not survive a restart");
        return Ok(Arc::new(InMemoryStoryRepository::new()));
    }

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let db_config = DatabaseConfig::new(&config.database.path, config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    Ok(Arc::new(SqliteStoryRepository::new(pool)))
}

/// 创建图像服务客户端
fn build_image_generator(config: &AppConfig) -> anyhow::Result<Arc<dyn ImageGeneratorPort>> {
    match config.image.provider {
        ImageProvider::Http => {
            let mut client_config = HttpImageClientConfig::new(&config.image.url)
                .with_model(&config.image.model)
                .with_timeout(config.image.timeout_secs);
            if let Some(api_key) = &config.image.api_key {
                client_config = client_config.with_api_key(api_key);
            }
            Ok(Arc::new(HttpImageClient::new(client_config)?))
        }
        ImageProvider::Fake => {
            // fake URL 指向本服务的占位图路由，转存阶段可以真实下载
            let client_config = FakeImageClientConfig {
                base_url: format!("{}/fake-images", config.server.public_base_url()),
                latency_ms: config.image.fake_latency_ms,
                ..Default::default()
            };
            Ok(Arc::new(FakeImageClient::new(client_config)))
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for ctrl-c"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Taleframe - 故事插图生成服务");
    print_config(&config);

    let story_repo = build_story_repo(&config).await?;
    let image_generator = build_image_generator(&config)?;

    let public_base_url = config
        .storage
        .public_base_url
        .clone()
        .unwrap_or_else(|| config.server.public_base_url());
    let image_storage = Arc::new(
        FileImageStorage::new(
            &config.storage.media_dir,
            public_base_url,
            config.storage.download_timeout_secs,
        )
        .await?
        .with_max_image_bytes(config.storage.max_image_bytes),
    );

    let ports = AppPorts {
        story_repo,
        image_generator,
        image_storage,
        random: Arc::new(SeededRandom::new(config.pipeline.rng_seed)),
        story_lock: Arc::new(StoryLockManager::new()),
        event_publisher: Arc::new(EventPublisher::new()),
    };
    let state = AppState::new(ports, config.pipeline.settings());

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_media_dir(&config.storage.media_dir)
        .with_fake_images(config.image.provider == ImageProvider::Fake);

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server.run_with_shutdown(shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
