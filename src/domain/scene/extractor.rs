//! 场景提取与选择

use crate::domain::character::CharacterDescriptor;
use crate::domain::style::{detect_mood, Mood};
use crate::domain::text_segmenter::{split_paragraphs, split_sentences, SegmentConfig};

use super::moment::distill_visual_moment;

/// 最少插图场景数
pub const MIN_SCENES: usize = 3;
/// 最多插图场景数
pub const MAX_SCENES: usize = 5;

/// 选中的场景
///
/// 不变量:
/// - `index` 在选中场景中连续且从 0 开始
/// - `source_index` 严格递增
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDescriptor {
    /// 在选中场景中的顺序
    pub index: usize,
    /// 在候选列表中的位置
    pub source_index: usize,
    /// 原始摘录
    pub excerpt: String,
    /// 提炼出的画面瞬间
    pub key_moment: String,
    /// 场景情绪
    pub mood: Mood,
}

/// 场景提取上下文
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub subject_name: &'a str,
    pub theme: &'a str,
    pub character: Option<&'a CharacterDescriptor>,
}

impl ExtractionContext<'_> {
    /// 是否允许描绘角色
    pub fn include_character(&self) -> bool {
        self.character.is_some_and(|c| c.include_character())
    }
}

/// 把故事切成场景候选，保持原文顺序
///
/// 段落不足 [`MIN_SCENES`] 时退回到句子粒度。短句合并后仍不足时不合并，
/// 每个句子都是独立的候选
pub fn scene_candidates(text: &str) -> Vec<String> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.len() >= MIN_SCENES {
        return paragraphs;
    }

    let mut sentences = split_sentences(text, &SegmentConfig::default());
    if sentences.len() < MIN_SCENES {
        sentences = split_sentences(text, &SegmentConfig { min_chars: 0 });
    }

    if sentences.len() > paragraphs.len() {
        sentences
    } else {
        paragraphs
    }
}

/// 从 `total` 个候选中选出插图目标的位置
///
/// 选 `min(5, max(3, total))` 个，总是包含首尾，内部位置均匀分布；
/// 候选不足时返回全部，不会臆造场景
pub fn select_candidate_indices(total: usize) -> Vec<usize> {
    let count = MAX_SCENES.min(MIN_SCENES.max(total));
    if total <= count {
        return (0..total).collect();
    }

    // round(i * span / steps)，total > count 时严格递增
    let span = total - 1;
    let steps = count - 1;
    (0..count)
        .map(|i| (2 * i * span + steps) / (2 * steps))
        .collect()
}

/// 提取插图场景
pub fn extract_scenes(text: &str, context: &ExtractionContext<'_>) -> Vec<SceneDescriptor> {
    let candidates = scene_candidates(text);
    let selected = select_candidate_indices(candidates.len());

    tracing::debug!(
        candidates = candidates.len(),
        selected = ?selected,
        "Scene candidates selected"
    );

    let include_character = context.include_character();

    selected
        .into_iter()
        .enumerate()
        .map(|(index, source_index)| {
            let excerpt = candidates[source_index].clone();
            SceneDescriptor {
                index,
                source_index,
                key_moment: distill_visual_moment(
                    &excerpt,
                    context.subject_name,
                    context.theme,
                    include_character,
                ),
                mood: detect_mood(&excerpt),
                excerpt,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(n: usize) -> String {
        (0..n)
            .map(|i| format!("Paragraph {} where Emma looked at the sea.", i))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn context() -> ExtractionContext<'static> {
        ExtractionContext {
            subject_name: "Emma",
            theme: "Ocean",
            character: None,
        }
    }

    #[test]
    fn test_select_indices_bounds() {
        assert!(select_candidate_indices(0).is_empty());
        assert_eq!(select_candidate_indices(1), vec![0]);
        assert_eq!(select_candidate_indices(2), vec![0, 1]);
        assert_eq!(select_candidate_indices(3), vec![0, 1, 2]);
        assert_eq!(select_candidate_indices(4), vec![0, 1, 2, 3]);
        assert_eq!(select_candidate_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(select_candidate_indices(6), vec![0, 1, 3, 4, 5]);
        assert_eq!(select_candidate_indices(7), vec![0, 2, 3, 5, 6]);
    }

    #[test]
    fn test_select_indices_invariants() {
        for total in 5..200 {
            let selected = select_candidate_indices(total);
            assert_eq!(selected.len(), MAX_SCENES);
            assert_eq!(selected[0], 0);
            assert_eq!(*selected.last().unwrap(), total - 1);
            assert!(selected.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_five_or_more_candidates_yield_five_scenes() {
        let scenes = extract_scenes(&paragraphs(9), &context());
        assert_eq!(scenes.len(), 5);
        assert_eq!(scenes[0].source_index, 0);
        assert_eq!(scenes[4].source_index, 8);
        assert!(scenes.iter().enumerate().all(|(i, s)| s.index == i));
        assert!(scenes[0].excerpt.starts_with("Paragraph 0"));
        assert!(scenes[4].excerpt.starts_with("Paragraph 8"));
    }

    #[test]
    fn test_three_candidates_yield_first_middle_last() {
        let scenes = extract_scenes(&paragraphs(3), &context());
        let sources: Vec<usize> = scenes.iter().map(|s| s.source_index).collect();
        assert_eq!(sources, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_paragraph_falls_back_to_sentences() {
        let text = "Emma walked down to the beach with her bucket in hand. \
                    A huge wave rolled in and splashed over the sandcastle. \
                    She laughed and started to build a brand new tower.";
        let candidates = scene_candidates(text);
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_short_sentences_stay_separate_beats() {
        let text = "Emma found a shell. A crab pinched her toe. She laughed all the way home.";
        assert_eq!(
            scene_candidates(text),
            vec![
                "Emma found a shell.",
                "A crab pinched her toe.",
                "She laughed all the way home."
            ]
        );

        let scenes = extract_scenes(text, &context());
        assert_eq!(scenes.len(), 3);
        assert!(scenes[1].excerpt.contains("crab"));
    }

    #[test]
    fn test_short_sentences_merge_when_enough_remain() {
        // 合并后仍有至少 3 个候选时保留合并结果
        let text = "Emma ran. She ran to the sea and looked for the little boat. \
                    Wind. The wind blew hard across the wide and empty beach. \
                    Home. Emma walked home slowly as the sun went down.";
        let candidates = scene_candidates(text);
        assert_eq!(candidates.len(), 3);
        assert!(candidates[0].starts_with("Emma ran. She ran"));
    }

    #[test]
    fn test_short_story_does_not_fabricate() {
        let scenes = extract_scenes("Emma saw a whale.", &context());
        assert_eq!(scenes.len(), 1);
        assert!(extract_scenes("   ", &context()).is_empty());
    }

    #[test]
    fn test_moment_is_not_verbatim() {
        let text = "\"Hello!\" said Emma. Emma swam really fast toward the shining island.\n\nMiddle.\n\nEnd of the day.";
        let scenes = extract_scenes(text, &context());
        assert_ne!(scenes[0].key_moment, scenes[0].excerpt);
        assert!(!scenes[0].key_moment.contains("really"));
    }
}
