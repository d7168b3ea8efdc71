//! Storage Adapter - 图片持久存储

mod file_storage;

pub use file_storage::{FileImageStorage, MEDIA_ROUTE};
