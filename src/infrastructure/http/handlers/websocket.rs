//! WebSocket Handler
//!
//! 推送插图流水线进度事件；`?story_id=` 只订阅单个故事

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::application::IllustrationEvent;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub story_id: Option<Uuid>,
}

/// 事件 WebSocket
pub async fn events_websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<EventsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_events_socket(socket, query.story_id, state))
}

async fn handle_events_socket(socket: WebSocket, story_id: Option<Uuid>, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut event_rx: broadcast::Receiver<IllustrationEvent> = match story_id {
        Some(id) => state.event_publisher.subscribe_story(id),
        None => state.event_publisher.subscribe_global(),
    };

    tracing::info!(story_id = ?story_id, "Events WebSocket connected");

    // 事件转发任务
    let mut forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Events WebSocket lagging, events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Events WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Events WebSocket error");
                    break;
                }
                // Ping 由 axum 自动响应
                _ => {}
            }
        }
    });

    // 任一任务结束即关闭另一个
    tokio::select! {
        _ = &mut forward_task => {
            receive_task.abort();
            let _ = receive_task.await;
        }
        _ = &mut receive_task => {
            forward_task.abort();
            let _ = forward_task.await;
        }
    }

    if story_id.is_some() {
        state.event_publisher.prune_story_channels();
    }
    tracing::info!(story_id = ?story_id, "Events WebSocket disconnected");
}
