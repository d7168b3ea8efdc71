//! Scene Context - 场景提取
//!
//! 职责:
//! - 把故事文本切成有序的场景候选
//! - 选出 3~5 个插图目标（总是包含首尾）
//! - 为每个场景提炼画面瞬间并推导情绪

mod extractor;
mod moment;

pub use extractor::{
    extract_scenes, scene_candidates, select_candidate_indices, ExtractionContext,
    SceneDescriptor, MAX_SCENES, MIN_SCENES,
};
pub use moment::{distill_visual_moment, MAX_MOMENT_WORDS};
