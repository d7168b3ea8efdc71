//! Generation Orchestrator - 图像生成编排
//!
//! 每个提示词调用一次图像服务。单个场景失败只记录并跳过，不会中断整批；
//! 并发由 semaphore 限制，结果按场景下标重新排序

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    IllustrationEvent, IllustrationEventsPort, ImageGenRequest, ImageGeneratorPort,
    RandomSourcePort,
};
use crate::domain::{AspectRatio, GenerationResult, GenerationStatus, IllustrationPrompt};

/// 同时进行的图像服务调用上限
pub const MAX_CONCURRENT_CALLS: usize = 3;

/// 编排器配置
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// 最大并发调用数，1 表示顺序调用，超过 [`MAX_CONCURRENT_CALLS`] 按上限处理
    pub max_concurrent: usize,
}

impl GenerationConfig {
    /// 实际使用的并发数，落在 `1..=MAX_CONCURRENT_CALLS`
    pub fn permits(&self) -> usize {
        self.max_concurrent.clamp(1, MAX_CONCURRENT_CALLS)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 至少一个场景成功时的生成结果
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// FullSuccess 或 PartialSuccess
    pub status: GenerationStatus,
    /// 按场景下标升序
    pub results: Vec<GenerationResult>,
}

impl GenerationOutcome {
    /// 成功场景的 (下标, 临时 URL)，按场景顺序
    pub fn successes(&self) -> Vec<(usize, String)> {
        self.results
            .iter()
            .filter_map(|r| r.provider_url.clone().map(|url| (r.scene_index, url)))
            .collect()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

/// 单个任务的返回值
struct SceneAttempt {
    result: GenerationResult,
    unavailable: bool,
}

/// 生成编排器
pub struct GenerationOrchestrator {
    config: GenerationConfig,
    generator: Arc<dyn ImageGeneratorPort>,
    random: Arc<dyn RandomSourcePort>,
    events: Arc<dyn IllustrationEventsPort>,
}

impl GenerationOrchestrator {
    pub fn new(
        config: GenerationConfig,
        generator: Arc<dyn ImageGeneratorPort>,
        random: Arc<dyn RandomSourcePort>,
        events: Arc<dyn IllustrationEventsPort>,
    ) -> Self {
        Self {
            config,
            generator,
            random,
            events,
        }
    }

    /// 按场景顺序抽取画面比例
    ///
    /// 在派发任何调用之前完成，抽取顺序与调度无关
    fn draw_aspect_ratios(&self, count: usize) -> Vec<AspectRatio> {
        (0..count)
            .map(|_| AspectRatio::ALL[self.random.next_index(AspectRatio::ALL.len())])
            .collect()
    }

    /// 执行一批生成
    ///
    /// - 服务健康检查失败，或所有调用都因不可用失败 -> `ProviderUnavailable`
    /// - 零成功 -> `ZeroResults`
    /// - 否则返回按场景排序的结果
    pub async fn run(
        &self,
        story_id: Uuid,
        prompts: &[IllustrationPrompt],
    ) -> Result<GenerationOutcome, ApplicationError> {
        let mut status = GenerationStatus::Pending;
        tracing::debug!(story_id = %story_id, status = status.as_str(), scenes = prompts.len(), "Generation batch created");

        if prompts.is_empty() {
            return Err(ApplicationError::ZeroResults { attempted: 0 });
        }

        if !self.generator.health_check().await {
            tracing::error!(story_id = %story_id, "Image provider health check failed");
            return Err(ApplicationError::ProviderUnavailable(
                "Image provider health check failed".to_string(),
            ));
        }

        let ratios = self.draw_aspect_ratios(prompts.len());
        let semaphore = Arc::new(Semaphore::new(self.config.permits()));
        let mut tasks: JoinSet<SceneAttempt> = JoinSet::new();

        status = GenerationStatus::InProgress;
        tracing::info!(
            story_id = %story_id,
            status = status.as_str(),
            scenes = prompts.len(),
            max_concurrent = self.config.permits(),
            "Generating illustrations"
        );

        for (prompt, ratio) in prompts.iter().zip(ratios) {
            let semaphore = semaphore.clone();
            let generator = self.generator.clone();
            let scene_index = prompt.scene_index;
            let request = ImageGenRequest {
                prompt: prompt.text.clone(),
                count: 1,
                size: ratio.size(),
                style: prompt.provider_style,
            };

            tasks.spawn(async move {
                // 持有 permit 直到调用完成
                let _permit = semaphore.acquire_owned().await;
                Self::generate_scene(generator, story_id, scene_index, request).await
            });
        }

        let mut attempts: HashMap<usize, SceneAttempt> = HashMap::with_capacity(prompts.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(attempt) => {
                    self.publish_scene_event(story_id, &attempt.result);
                    attempts.insert(attempt.result.scene_index, attempt);
                }
                Err(e) => {
                    tracing::error!(story_id = %story_id, error = %e, "Generation task aborted");
                }
            }
        }

        // 恢复场景顺序；任务异常退出的场景按失败处理
        let mut results = Vec::with_capacity(prompts.len());
        let mut unavailable = 0usize;
        for prompt in prompts {
            match attempts.remove(&prompt.scene_index) {
                Some(attempt) => {
                    if attempt.unavailable {
                        unavailable += 1;
                    }
                    results.push(attempt.result);
                }
                None => results.push(GenerationResult::failure(
                    prompt.scene_index,
                    "generation task aborted",
                )),
            }
        }
        results.sort_by_key(|r| r.scene_index);

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        status = GenerationStatus::from_counts(results.len(), succeeded);

        tracing::info!(
            story_id = %story_id,
            status = status.as_str(),
            attempted = results.len(),
            succeeded,
            "Generation batch finished"
        );

        if succeeded == 0 {
            if unavailable == results.len() {
                return Err(ApplicationError::ProviderUnavailable(
                    "Every image request failed to reach the provider".to_string(),
                ));
            }
            return Err(ApplicationError::ZeroResults {
                attempted: results.len(),
            });
        }

        Ok(GenerationOutcome { status, results })
    }

    /// 生成单个场景，错误转为失败结果
    async fn generate_scene(
        generator: Arc<dyn ImageGeneratorPort>,
        story_id: Uuid,
        scene_index: usize,
        request: ImageGenRequest,
    ) -> SceneAttempt {
        let size = request.size;
        match generator.generate(request).await {
            Ok(urls) => match urls.into_iter().next() {
                Some(url) => {
                    tracing::debug!(story_id = %story_id, scene_index, size = %size, "Scene generated");
                    SceneAttempt {
                        result: GenerationResult::success(scene_index, url),
                        unavailable: false,
                    }
                }
                None => {
                    tracing::warn!(story_id = %story_id, scene_index, "Provider returned no images, skipping scene");
                    SceneAttempt {
                        result: GenerationResult::failure(scene_index, "provider returned no images"),
                        unavailable: false,
                    }
                }
            },
            Err(e) => {
                tracing::warn!(story_id = %story_id, scene_index, error = %e, "Scene generation failed, skipping");
                SceneAttempt {
                    unavailable: e.is_unavailable(),
                    result: GenerationResult::failure(scene_index, e.to_string()),
                }
            }
        }
    }

    fn publish_scene_event(&self, story_id: Uuid, result: &GenerationResult) {
        let event = match &result.error {
            None => IllustrationEvent::SceneGenerated {
                story_id,
                scene_index: result.scene_index,
            },
            Some(error) => IllustrationEvent::SceneFailed {
                story_id,
                scene_index: result.scene_index,
                error: error.clone(),
            },
        };
        self.events.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        prompts, RecordingEvents, ScriptedGenerator, SceneScript, SequenceRandom,
    };
    use crate::domain::ImageSize;

    fn orchestrator(
        generator: Arc<ScriptedGenerator>,
        max_concurrent: usize,
    ) -> (GenerationOrchestrator, Arc<RecordingEvents>) {
        let events = Arc::new(RecordingEvents::default());
        let orchestrator = GenerationOrchestrator::new(
            GenerationConfig { max_concurrent },
            generator,
            Arc::new(SequenceRandom::new(vec![0, 1, 2])),
            events.clone(),
        );
        (orchestrator, events)
    }

    #[test]
    fn test_permits_are_bounded() {
        assert_eq!(GenerationConfig { max_concurrent: 0 }.permits(), 1);
        assert_eq!(GenerationConfig { max_concurrent: 2 }.permits(), 2);
        assert_eq!(GenerationConfig { max_concurrent: 16 }.permits(), MAX_CONCURRENT_CALLS);
    }

    #[tokio::test]
    async fn test_large_concurrency_setting_is_capped() {
        let generator = Arc::new(ScriptedGenerator::new(vec![SceneScript::ok().delay_ms(30); 5]));
        let (orchestrator, _) = orchestrator(generator.clone(), 16);

        let outcome = orchestrator.run(Uuid::new_v4(), &prompts(5)).await.unwrap();

        assert_eq!(outcome.succeeded(), 5);
        assert!(generator.peak_in_flight() <= MAX_CONCURRENT_CALLS);
    }

    #[tokio::test]
    async fn test_sequential_calls_never_overlap() {
        let generator = Arc::new(ScriptedGenerator::new(vec![SceneScript::ok().delay_ms(10); 3]));
        let (orchestrator, _) = orchestrator(generator.clone(), 1);

        orchestrator.run(Uuid::new_v4(), &prompts(3)).await.unwrap();

        assert_eq!(generator.peak_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_skipped() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            SceneScript::ok(),
            SceneScript::fail(),
            SceneScript::ok(),
            SceneScript::fail(),
            SceneScript::ok(),
        ]));
        let (orchestrator, events) = orchestrator(generator.clone(), 1);

        let outcome = orchestrator.run(Uuid::new_v4(), &prompts(5)).await.unwrap();

        assert_eq!(outcome.status, GenerationStatus::PartialSuccess);
        assert_eq!(outcome.succeeded(), 3);
        let indices: Vec<usize> = outcome.successes().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2, 4]);
        assert_eq!(generator.call_count(), 5);
        assert_eq!(events.count_scene_failed(), 2);
    }

    #[tokio::test]
    async fn test_results_ordered_despite_completion_order() {
        // 前面的场景更慢，完成顺序与场景顺序相反
        let generator = Arc::new(ScriptedGenerator::new(vec![
            SceneScript::ok().delay_ms(80),
            SceneScript::ok().delay_ms(40),
            SceneScript::ok().delay_ms(0),
        ]));
        let (orchestrator, _) = orchestrator(generator.clone(), 3);

        let outcome = orchestrator.run(Uuid::new_v4(), &prompts(3)).await.unwrap();

        assert_eq!(outcome.status, GenerationStatus::FullSuccess);
        let urls: Vec<String> = outcome.successes().into_iter().map(|(_, u)| u).collect();
        assert_eq!(urls, vec![
            ScriptedGenerator::url_for(0),
            ScriptedGenerator::url_for(1),
            ScriptedGenerator::url_for(2),
        ]);
        assert_eq!(generator.completion_order(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_all_failures_yield_zero_results() {
        let generator = Arc::new(ScriptedGenerator::new(vec![SceneScript::fail(); 5]));
        let (orchestrator, _) = orchestrator(generator.clone(), 2);

        let err = orchestrator.run(Uuid::new_v4(), &prompts(5)).await.unwrap_err();

        assert!(matches!(err, ApplicationError::ZeroResults { attempted: 5 }));
        assert_eq!(generator.call_count(), 5);
    }

    #[tokio::test]
    async fn test_all_unavailable_is_provider_unavailable() {
        let generator = Arc::new(ScriptedGenerator::new(vec![SceneScript::unavailable(); 3]));
        let (orchestrator, _) = orchestrator(generator, 1);

        let err = orchestrator.run(Uuid::new_v4(), &prompts(3)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failed_health_check_skips_calls() {
        let generator = Arc::new(ScriptedGenerator::new(vec![SceneScript::ok(); 3]).unhealthy());
        let (orchestrator, _) = orchestrator(generator.clone(), 1);

        let err = orchestrator.run(Uuid::new_v4(), &prompts(3)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ProviderUnavailable(_)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sizes_follow_random_source() {
        let generator = Arc::new(ScriptedGenerator::new(vec![SceneScript::ok(); 3]));
        let (orchestrator, _) = orchestrator(generator.clone(), 3);

        orchestrator.run(Uuid::new_v4(), &prompts(3)).await.unwrap();

        assert_eq!(
            generator.sizes_by_scene(),
            vec![ImageSize::Square1024, ImageSize::Portrait1024x1792, ImageSize::Landscape1792x1024]
        );
        assert!(generator.requests().iter().all(|r| r.count == 1));
    }
}
