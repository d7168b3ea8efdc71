//! Image Adapter - 图像生成服务客户端

mod fake_image_client;
mod http_image_client;

pub use fake_image_client::{FakeImageClient, FakeImageClientConfig};
pub use http_image_client::*;
