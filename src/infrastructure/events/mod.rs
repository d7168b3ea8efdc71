//! Events - 流水线进度事件广播

mod publisher;

pub use publisher::EventPublisher;
