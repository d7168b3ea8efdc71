//! HTTP Handlers

mod fake_images;
mod ping;
mod story;
mod websocket;

pub use fake_images::*;
pub use ping::*;
pub use story::*;
pub use websocket::*;
