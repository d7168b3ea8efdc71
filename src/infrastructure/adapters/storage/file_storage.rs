//! File Storage - 文件系统图片存储实现
//!
//! 实现 ImageStoragePort trait：下载临时 URL，写入 `{media_dir}/{story_id}/{uuid}.{ext}`，
//! 返回经 `/media` 静态路由可访问的持久 URL。下载体积受上限约束；
//! 故事写回后删除目录中不再被引用的旧文件

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{ImageStorageError, ImageStoragePort, StoredImage};

/// 允许的图片扩展名
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// 静态路由前缀
pub const MEDIA_ROUTE: &str = "/media";

/// 单张图片的默认大小上限
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// 文件系统图片存储
pub struct FileImageStorage {
    /// 存储根目录
    base_dir: PathBuf,
    /// 对外访问的基础 URL
    public_base_url: String,
    /// 单张图片大小上限（字节）
    max_image_bytes: u64,
    client: Client,
}

impl FileImageStorage {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        public_base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ImageStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ImageStorageError::DownloadError(e.to_string()))?;

        Ok(Self {
            base_dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            client,
        })
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn story_dir(&self, story_id: Uuid) -> PathBuf {
        self.base_dir.join(story_id.to_string())
    }

    fn public_url(&self, story_id: Uuid, file_name: &str) -> String {
        format!("{}{}/{}/{}", self.public_base_url, MEDIA_ROUTE, story_id, file_name)
    }

    async fn download(&self, url: &str) -> Result<(Vec<u8>, Option<String>), ImageStorageError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageStorageError::DownloadError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageStorageError::DownloadError(format!("HTTP {} for {}", status, url)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // 声明了长度时先检查，未声明时边读边检查
        if let Some(length) = response.content_length() {
            if length > self.max_image_bytes {
                return Err(self.too_large(length));
            }
        }

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ImageStorageError::DownloadError(format!("Failed to read image: {}", e)))?
        {
            let received = (data.len() + chunk.len()) as u64;
            if received > self.max_image_bytes {
                return Err(self.too_large(received));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(ImageStorageError::Rejected("empty image body".to_string()));
        }

        Ok((data, content_type))
    }

    fn too_large(&self, size: u64) -> ImageStorageError {
        ImageStorageError::Rejected(format!(
            "image exceeds {} bytes (got at least {})",
            self.max_image_bytes, size
        ))
    }
}

/// 根据 Content-Type 或 URL 路径推断扩展名，默认 png
fn extension_for(url: &str, content_type: Option<&str>) -> &'static str {
    if let Some(subtype) = content_type
        .and_then(|ct| ct.split(';').next())
        .and_then(|ct| ct.trim().strip_prefix("image/"))
    {
        match subtype {
            "jpeg" | "jpg" => return "jpg",
            "webp" => return "webp",
            "gif" => return "gif",
            "png" => return "png",
            _ => {}
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .and_then(|ext| IMAGE_EXTENSIONS.iter().find(|known| **known == ext).copied())
        .map(|ext| if ext == "jpeg" { "jpg" } else { ext })
        .unwrap_or("png")
}

#[async_trait]
impl ImageStoragePort for FileImageStorage {
    async fn store(&self, ephemeral_url: &str, story_id: Uuid) -> Result<StoredImage, ImageStorageError> {
        let (data, content_type) = self.download(ephemeral_url).await?;

        let story_dir = self.story_dir(story_id);
        fs::create_dir_all(&story_dir)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        let file_name = format!(
            "{}.{}",
            Uuid::new_v4(),
            extension_for(ephemeral_url, content_type.as_deref())
        );
        let path = story_dir.join(&file_name);

        fs::write(&path, &data)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            story_id = %story_id,
            path = %path.display(),
            size = data.len(),
            "Stored image"
        );

        Ok(StoredImage::stored(self.public_url(story_id, &file_name)))
    }

    async fn remove_unreferenced(&self, story_id: Uuid, keep: &[String]) -> Result<usize, ImageStorageError> {
        let story_dir = self.story_dir(story_id);
        let mut entries = match fs::read_dir(&story_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(ImageStorageError::IoError(e.to_string())),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?
        {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let url = self.public_url(story_id, &file_name);
            if keep.contains(&url) {
                continue;
            }
            fs::remove_file(entry.path())
                .await
                .map_err(|e| ImageStorageError::IoError(e.to_string()))?;
            removed += 1;
        }

        if removed > 0 {
            tracing::debug!(story_id = %story_id, removed, "Removed unreferenced images");
        }

        Ok(removed)
    }
}
