//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping               GET   健康检查
//! - /api/story/create       POST  创建故事
//! - /api/story/get          POST  获取故事详情（含插图集合）
//! - /api/story/list         GET   列出所有故事
//! - /api/story/illustrate   POST  为故事生成插图
//! - /ws/events              WS    插图进度事件（可选 ?story_id=）
//! - /media/*                GET   已转存的图片（静态文件，见 server.rs）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/story", story_routes())
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_story))
        .route("/get", post(handlers::get_story))
        .route("/list", get(handlers::list_stories))
        .route("/illustrate", post(handlers::illustrate_story))
}

/// fake 模式下的占位图路由
pub fn fake_image_routes() -> Router<Arc<AppState>> {
    Router::new().route("/fake-images/:name", get(handlers::fake_image))
}
