//! Story HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{CreateStory, GetStory, IllustrateStory, ListStories};
use crate::infrastructure::http::dto::{
    ApiResponse, CreateStoryRequest, CreateStoryResponseDto, GetStoryRequest,
    IllustrateStoryRequest, IllustrateStoryResponseDto, StoryDto, StorySummaryDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 创建故事
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStoryRequest>,
) -> Result<Json<ApiResponse<CreateStoryResponseDto>>, ApiError> {
    let response = state
        .create_story_handler
        .handle(CreateStory {
            title: req.title,
            content: req.content,
            theme: req.theme,
            primary_subject: req.primary_subject,
            secondary_subjects: req.secondary_subjects,
        })
        .await?;

    Ok(Json(ApiResponse::success(CreateStoryResponseDto {
        id: response.id,
        title: response.title,
    })))
}

/// 获取故事详情（含当前插图集合）
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetStoryRequest>,
) -> Result<Json<ApiResponse<StoryDto>>, ApiError> {
    let story = state
        .get_story_handler
        .handle(GetStory { story_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(StoryDto::from(story))))
}

/// 列出所有故事
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<StorySummaryDto>>>, ApiError> {
    let stories = state.list_stories_handler.handle(ListStories).await?;

    Ok(Json(ApiResponse::success(
        stories.into_iter().map(StorySummaryDto::from).collect(),
    )))
}

/// 为故事生成插图
///
/// 运行在独立的 tokio 任务上：客户端断开只会丢弃等待方，已生成的图片仍会转存并写回
pub async fn illustrate_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IllustrateStoryRequest>,
) -> Result<Json<ApiResponse<IllustrateStoryResponseDto>>, ApiError> {
    let command = IllustrateStory {
        story_id: req.story_id,
        style_override: req.style_override,
        appearance_override: req.appearance_override,
    };

    let handler = state.illustrate_handler.clone();
    let run = tokio::spawn(async move { handler.handle(command).await });

    let response = run
        .await
        .map_err(|e| ApiError::Internal(format!("Illustration task aborted: {}", e)))??;

    Ok(Json(ApiResponse::success(IllustrateStoryResponseDto::from(response))))
}
