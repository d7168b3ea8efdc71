//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::ports::{IllustrationEvent, IllustrationEventsPort};

/// 通道容量
const CHANNEL_CAPACITY: usize = 100;

fn story_of(event: &IllustrationEvent) -> Uuid {
    match event {
        IllustrationEvent::IllustrationStarted { story_id, .. }
        | IllustrationEvent::SceneGenerated { story_id, .. }
        | IllustrationEvent::SceneFailed { story_id, .. }
        | IllustrationEvent::IllustrationCompleted { story_id, .. }
        | IllustrationEvent::IllustrationFailed { story_id, .. } => *story_id,
    }
}

/// 事件发布器
pub struct EventPublisher {
    /// story_id -> broadcast sender（只关心单个故事的订阅者）
    story_channels: DashMap<Uuid, broadcast::Sender<IllustrationEvent>>,
    /// 全局广播通道
    global_channel: broadcast::Sender<IllustrationEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            story_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅所有故事的事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<IllustrationEvent> {
        self.global_channel.subscribe()
    }

    /// 订阅单个故事的事件
    pub fn subscribe_story(&self, story_id: Uuid) -> broadcast::Receiver<IllustrationEvent> {
        self.story_channels
            .entry(story_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 清理没有订阅者的故事通道
    pub fn prune_story_channels(&self) {
        self.story_channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    fn publish_to_story(&self, story_id: Uuid, event: IllustrationEvent) {
        if let Some(sender) = self.story_channels.get(&story_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    story_id = %story_id,
                    error = %e,
                    "Failed to publish story event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl IllustrationEventsPort for EventPublisher {
    fn publish(&self, event: IllustrationEvent) {
        let story_id = story_of(&event);
        self.publish_to_story(story_id, event.clone());

        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(
                story_id = %story_id,
                error = %e,
                "Failed to publish event (no receivers)"
            );
        }

        // 通道过多时清理无人订阅的
        if self.story_channels.len() > CHANNEL_CAPACITY {
            self.prune_story_channels();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_global_and_story_subscribers() {
        let publisher = EventPublisher::new();
        let story_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();
        let mut global = publisher.subscribe_global();
        let mut story = publisher.subscribe_story(story_id);

        publisher.publish(IllustrationEvent::SceneGenerated {
            story_id: other_id,
            scene_index: 0,
        });
        publisher.publish(IllustrationEvent::SceneGenerated {
            story_id,
            scene_index: 1,
        });

        assert_eq!(story_of(&global.recv().await.unwrap()), other_id);
        assert_eq!(story_of(&global.recv().await.unwrap()), story_id);
        assert_eq!(
            story.recv().await.unwrap(),
            IllustrationEvent::SceneGenerated {
                story_id,
                scene_index: 1
            }
        );
        assert!(story.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish(IllustrationEvent::IllustrationFailed {
            story_id: Uuid::new_v4(),
            error: "x".to_string(),
        });
    }

    #[test]
    fn test_prune_drops_idle_channels() {
        let publisher = EventPublisher::new();
        let story_id = Uuid::new_v4();
        drop(publisher.subscribe_story(story_id));
        publisher.prune_story_channels();
        assert!(publisher.story_channels.is_empty());
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(IllustrationEvent::SceneFailed {
            story_id: Uuid::nil(),
            scene_index: 2,
            error: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["event"], "SceneFailed");
        assert_eq!(json["data"]["scene_index"], 2);
    }
}
