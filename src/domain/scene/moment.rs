//! 画面瞬间提炼
//!
//! 从场景摘录中提炼一个简短、具体、可画的瞬间，而不是照抄原文

use crate::domain::text_segmenter::{split_sentences, SegmentConfig};

/// 画面瞬间的最大词数
pub const MAX_MOMENT_WORDS: usize = 24;

/// 不能描绘角色时代替名字的中性称呼
const NEUTRAL_SUBJECT: &str = "the main character";

const FILLER_WORDS: &[&str] = &[
    "very", "really", "just", "suddenly", "then", "quite", "actually", "also", "so", "almost",
    "simply", "totally", "finally", "somehow",
];

/// 具体视觉线索（按词前缀匹配）
const VISUAL_CUES: &[&str] = &[
    // 场景与物体
    "sea", "ocean", "wave", "beach", "sand", "shell", "boat", "ship", "sail", "island", "sky",
    "sun", "moon", "star", "cloud", "rain", "snow", "river", "lake", "mountain", "hill", "cave",
    "forest", "tree", "flower", "garden", "castle", "tower", "house", "door", "window",
    "bridge", "path", "meadow", "lantern", "fire", "fish", "whale", "dolphin", "turtle", "crab",
    "bird", "dragon", "dog", "cat", "horse", "rocket", "planet", "map", "treasure", "chest",
    "kite", "balloon", "cake",
    // 动作
    "ran", "run", "jump", "swam", "swim", "dove", "dive", "flew", "fly", "climb", "look", "saw",
    "found", "held", "hold", "open", "danc", "splash", "hug", "reach", "point", "float", "glow",
    "shin", "sparkl", "peek", "buil",
];

fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'')
        .collect::<String>()
        .to_lowercase()
}

/// 去掉双引号内的对白
fn strip_dialogue(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_quote = false;

    for ch in text.chars() {
        match ch {
            '"' => in_quote = !in_quote,
            '\u{201C}' => in_quote = true,
            '\u{201D}' => in_quote = false,
            _ if !in_quote => out.push(ch),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn mentions_subject(word: &str, subject: &str) -> bool {
    let word = normalize(word);
    word == subject || word.strip_suffix("'s").is_some_and(|base| base == subject)
}

fn score_sentence(sentence: &str, subject: &str) -> (usize, bool) {
    let mut cues = 0;
    let mut mentioned = false;
    for word in sentence.split_whitespace() {
        let normalized = normalize(word);
        if VISUAL_CUES.iter().any(|cue| normalized.starts_with(cue)) {
            cues += 1;
        }
        if !subject.is_empty() && mentions_subject(word, subject) {
            mentioned = true;
        }
    }
    (cues, mentioned)
}

/// 把主角名字替换为中性称呼，保留所有格和尾随标点
fn neutralize_name(word: &str, subject: &str) -> Option<String> {
    let core = word.trim_end_matches(|c: char| !c.is_alphanumeric());
    let trailing = &word[core.len()..];

    if core.to_lowercase() == subject {
        return Some(format!("{}{}", NEUTRAL_SUBJECT, trailing));
    }
    for suffix in ["'s", "\u{2019}s"] {
        if let Some(base) = core.strip_suffix(suffix) {
            if base.to_lowercase() == subject {
                return Some(format!("{}{}{}", NEUTRAL_SUBJECT, suffix, trailing));
            }
        }
    }
    None
}

/// `a forest` / `an ocean`
fn with_article(noun: &str) -> String {
    let article = match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("{} {}", article, noun)
}

fn is_filler(word: &str) -> bool {
    let normalized = normalize(word);
    FILLER_WORDS.contains(&normalized.as_str())
}

/// 提炼场景的画面瞬间
///
/// 1. 去掉对白（整段都是对白时保留文字、去掉引号）
/// 2. 选出视觉线索最多的句子，提到主角的句子优先，平局取最早的
/// 3. 去掉填充词，截断到 [`MAX_MOMENT_WORDS`]
/// 4. 不能描绘角色时把名字换成中性称呼
/// 5. 没有具体线索时用主题补充场景
pub fn distill_visual_moment(
    excerpt: &str,
    subject_name: &str,
    theme: &str,
    include_character: bool,
) -> String {
    let subject = subject_name.trim().to_lowercase();

    let mut narration = strip_dialogue(excerpt);
    if !narration.chars().any(char::is_alphanumeric) {
        narration = excerpt
            .chars()
            .filter(|c| !matches!(c, '"' | '\u{201C}' | '\u{201D}'))
            .collect();
    }

    let sentences = split_sentences(&narration, &SegmentConfig { min_chars: 0 });

    let mut best: Option<(&str, (usize, bool))> = None;
    for sentence in &sentences {
        let score = score_sentence(sentence, &subject);
        let better = match best {
            None => true,
            // 提到主角的句子额外加权
            Some((_, (cues, mentioned))) => {
                score.0 + 2 * usize::from(score.1) > cues + 2 * usize::from(mentioned)
            }
        };
        if better {
            best = Some((sentence.as_str(), score));
        }
    }

    let theme = theme.trim().to_lowercase();
    let Some((sentence, (cues, _))) = best else {
        return format!("{} scene", with_article(&theme));
    };

    let words: Vec<String> = sentence
        .split_whitespace()
        .filter(|w| !is_filler(w))
        .take(MAX_MOMENT_WORDS)
        .map(|w| {
            if include_character || subject.is_empty() {
                w.to_string()
            } else {
                neutralize_name(w, &subject).unwrap_or_else(|| w.to_string())
            }
        })
        .collect();

    let moment = words
        .join(" ")
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_string();

    if moment.is_empty() {
        format!("{} scene", with_article(&theme))
    } else if cues == 0 {
        format!("{}, in {} setting", moment, with_article(&theme))
    } else {
        moment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_most_visual_sentence() {
        let excerpt = "It was a Tuesday. Emma ran across the beach toward the glowing shell. Everyone went home.";
        let moment = distill_visual_moment(excerpt, "Emma", "Ocean", true);
        assert_eq!(moment, "Emma ran across the beach toward the glowing shell");
    }

    #[test]
    fn test_dialogue_removed() {
        let excerpt = "\"We have to hurry, the tide is coming!\" Emma climbed onto the rocks by the sea.";
        let moment = distill_visual_moment(excerpt, "Emma", "Ocean", true);
        assert!(!moment.contains("hurry"));
        assert!(moment.contains("climbed onto the rocks"));
    }

    #[test]
    fn test_dialogue_only_paragraph_keeps_words() {
        let moment = distill_visual_moment("\"Look at the whale!\"", "Emma", "Ocean", true);
        assert_eq!(moment, "Look at the whale");
    }

    #[test]
    fn test_filler_words_dropped_and_capped() {
        let excerpt = "Suddenly the boat very slowly sailed past one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty twenty-one islands.";
        let moment = distill_visual_moment(excerpt, "Emma", "Ocean", true);
        assert!(!moment.to_lowercase().contains("suddenly"));
        assert!(!moment.contains("very"));
        assert_eq!(moment.split_whitespace().count(), MAX_MOMENT_WORDS);
    }

    #[test]
    fn test_name_neutralized_without_character() {
        let moment = distill_visual_moment("Emma's kite flew over Emma.", "Emma", "Ocean", false);
        assert_eq!(moment, "the main character's kite flew over the main character");
    }

    #[test]
    fn test_theme_used_when_nothing_concrete() {
        let moment = distill_visual_moment("It was nice.", "Emma", "Ocean", true);
        assert_eq!(moment, "It was nice, in an ocean setting");

        assert_eq!(distill_visual_moment("...", "Emma", "Ocean", true), "an ocean scene");
    }
}
