//! Fake Image Handler
//!
//! fake 模式下为 FakeImageClient 返回的 URL 提供真实可下载的图片

use axum::{extract::Path, http::header, response::IntoResponse};

/// 1x1 透明 PNG
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// 任意文件名都返回占位图
pub async fn fake_image(Path(name): Path<String>) -> impl IntoResponse {
    tracing::debug!(name = %name, "Serving placeholder image");
    ([(header::CONTENT_TYPE, "image/png")], PLACEHOLDER_PNG)
}
