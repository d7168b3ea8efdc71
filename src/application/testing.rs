//! 应用层测试替身

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::application::ports::{
    IllustrationEvent, IllustrationEventsPort, ImageGenError, ImageGenRequest, ImageGeneratorPort,
    ImageStorageError, ImageStoragePort, RandomSourcePort, RepositoryError, StoredImage,
    StoryRecord, StoryRepositoryPort,
};
use crate::domain::{
    IllustrationPrompt, ImageSize, Mood, ProviderStyle, StoryImageSet, Subject, SubjectAppearance,
};

/// 生成 `n` 个最小提示词，文本中带有 `page N of M` 以便识别场景
pub fn prompts(n: usize) -> Vec<IllustrationPrompt> {
    (0..n)
        .map(|i| IllustrationPrompt {
            scene_index: i,
            total_scenes: n,
            text: format!("page {} of {}", i + 1, n),
            art_style: "test style".to_string(),
            provider_style: ProviderStyle::Natural,
            mood: Mood::Calm,
            includes_character: false,
        })
        .collect()
}

/// 从提示词中解析场景下标（`page N of` -> N - 1）
fn scene_of(prompt: &str) -> usize {
    prompt
        .split("page ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse::<usize>().ok())
        .map_or(0, |page| page.saturating_sub(1))
}

// ============================================================================
// Image generator
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptOutcome {
    Ok,
    Fail,
    Unavailable,
}

/// 单个场景的预设行为
#[derive(Debug, Clone)]
pub struct SceneScript {
    outcome: ScriptOutcome,
    delay_ms: u64,
}

impl SceneScript {
    pub fn ok() -> Self {
        Self {
            outcome: ScriptOutcome::Ok,
            delay_ms: 0,
        }
    }

    pub fn fail() -> Self {
        Self {
            outcome: ScriptOutcome::Fail,
            delay_ms: 0,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            outcome: ScriptOutcome::Unavailable,
            delay_ms: 0,
        }
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// 按场景下标执行预设行为的图像服务
pub struct ScriptedGenerator {
    scripts: Vec<SceneScript>,
    healthy: bool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: Mutex<Vec<usize>>,
    requests: Mutex<Vec<(usize, ImageGenRequest)>>,
}

impl ScriptedGenerator {
    /// 没有脚本的场景按成功处理
    pub fn new(scripts: Vec<SceneScript>) -> Self {
        Self {
            scripts,
            healthy: true,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn url_for(scene_index: usize) -> String {
        format!("https://provider.test/images/scene-{}.png", scene_index)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 同时进行中的调用数峰值
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<usize> {
        self.completed.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ImageGenRequest> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort_by_key(|(scene, _)| *scene);
        requests.into_iter().map(|(_, r)| r).collect()
    }

    pub fn sizes_by_scene(&self) -> Vec<ImageSize> {
        self.requests().into_iter().map(|r| r.size).collect()
    }

    pub fn prompts_by_scene(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }
}

#[async_trait]
impl ImageGeneratorPort for ScriptedGenerator {
    async fn generate(&self, request: ImageGenRequest) -> Result<Vec<String>, ImageGenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let scene = scene_of(&request.prompt);
        self.requests.lock().unwrap().push((scene, request));

        let script = self.scripts.get(scene).cloned().unwrap_or_else(SceneScript::ok);
        if script.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(script.delay_ms)).await;
        }
        self.completed.lock().unwrap().push(scene);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script.outcome {
            ScriptOutcome::Ok => Ok(vec![Self::url_for(scene)]),
            ScriptOutcome::Fail => Err(ImageGenError::ServiceError(format!("scene {} failed", scene))),
            ScriptOutcome::Unavailable => Err(ImageGenError::Unavailable("connection refused".to_string())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

// ============================================================================
// Random source
// ============================================================================

/// 循环返回预设序列的随机源
pub struct SequenceRandom {
    sequence: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSourcePort for SequenceRandom {
    fn next_index(&self, bound: usize) -> usize {
        if self.sequence.is_empty() || bound == 0 {
            return 0;
        }
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.sequence[i % self.sequence.len()] % bound
    }
}

// ============================================================================
// Events
// ============================================================================

/// 记录所有事件
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<IllustrationEvent>>,
}

impl RecordingEvents {
    pub fn events(&self) -> Vec<IllustrationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_scene_failed(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, IllustrationEvent::SceneFailed { .. }))
            .count()
    }
}

impl IllustrationEventsPort for RecordingEvents {
    fn publish(&self, event: IllustrationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ============================================================================
// Storage
// ============================================================================

/// 按 URL 预设失败的存储
#[derive(Default)]
pub struct ScriptedStorage {
    failing: HashSet<String>,
    fail_all: bool,
    calls: AtomicUsize,
    kept: Mutex<Vec<(Uuid, Vec<String>)>>,
}

impl ScriptedStorage {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_all() -> Self {
        Self {
            fail_all: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 每次清理调用时保留的 URL
    pub fn cleanups(&self) -> Vec<(Uuid, Vec<String>)> {
        self.kept.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStoragePort for ScriptedStorage {
    async fn store(&self, ephemeral_url: &str, story_id: Uuid) -> Result<StoredImage, ImageStorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.failing.contains(ephemeral_url) {
            return Err(ImageStorageError::DownloadError("storage offline".to_string()));
        }
        let file = ephemeral_url.rsplit('/').next().unwrap_or("image.png");
        Ok(StoredImage::stored(format!("https://cdn.test/{}/{}", story_id, file)))
    }

    async fn remove_unreferenced(&self, story_id: Uuid, keep: &[String]) -> Result<usize, ImageStorageError> {
        self.kept.lock().unwrap().push((story_id, keep.to_vec()));
        Ok(0)
    }
}

// ============================================================================
// Repository
// ============================================================================

pub const SAMPLE_CONTENT: &str = "Emma walked along the sandy beach at sunrise.\n\n\
Emma found a glowing shell near the rocks.\n\n\
A big wave splashed and Emma laughed with joy.\n\n\
Emma swam toward a tiny island with a lighthouse.\n\n\
A friendly dolphin leaped beside her in the water.\n\n\
Emma waved goodbye to the sea as the sun set.";

/// Emma / Ocean 示例故事（6 个段落）
pub fn sample_story() -> StoryRecord {
    let now = Utc::now();
    StoryRecord {
        id: Uuid::new_v4(),
        title: "Emma and the Sea".to_string(),
        content: SAMPLE_CONTENT.to_string(),
        theme: "Ocean".to_string(),
        primary_subject: Subject::new("Emma").with_appearance(SubjectAppearance {
            hair_color: Some("brown".to_string()),
            ..Default::default()
        }),
        secondary_subjects: Vec::new(),
        has_images: false,
        image_urls: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// 前 N 次 update_images 返回临时错误的内存仓储
pub struct FlakyStoryRepository {
    stories: tokio::sync::Mutex<HashMap<Uuid, StoryRecord>>,
    failures_left: AtomicUsize,
    update_calls: AtomicUsize,
}

impl FlakyStoryRepository {
    pub fn empty() -> Self {
        Self {
            stories: tokio::sync::Mutex::new(HashMap::new()),
            failures_left: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_story(story: StoryRecord) -> Self {
        let repo = Self::empty();
        repo.stories.try_lock().unwrap().insert(story.id, story);
        repo
    }

    pub fn fail_times(self, times: usize) -> Self {
        self.failures_left.store(times, Ordering::SeqCst);
        self
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub async fn stored(&self, id: Uuid) -> Option<StoryRecord> {
        self.stories.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl StoryRepositoryPort for FlakyStoryRepository {
    async fn save(&self, story: &StoryRecord) -> Result<(), RepositoryError> {
        self.stories.lock().await.insert(story.id, story.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
        Ok(self.stories.lock().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
        Ok(self.stories.lock().await.values().cloned().collect())
    }

    async fn update_images(&self, images: &StoryImageSet) -> Result<(), RepositoryError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::DatabaseError("database is locked".to_string()));
        }

        let mut stories = self.stories.lock().await;
        let story = stories
            .get_mut(&images.story_id)
            .ok_or_else(|| RepositoryError::NotFound(images.story_id.to_string()))?;
        story.image_urls = images.final_urls.clone();
        story.has_images = images.has_images;
        story.updated_at = Utc::now();
        Ok(())
    }
}
