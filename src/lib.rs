//! Taleframe - 故事插图生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story: 故事文本与角色
//! - 场景抽取、角色描述、画风与情绪、提示词组装
//!
//! 应用层 (application/):
//! - Ports: 端口定义（ImageGenerator, ImageStorage, StoryRepository, StoryLock, RandomSource, Events）
//! - Pipeline: 生成编排、转存、写回重试
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Adapters: 图像服务客户端、文件存储、随机源
//! - Memory: 故事锁、内存仓储
//! - Persistence: SQLite 存储
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
