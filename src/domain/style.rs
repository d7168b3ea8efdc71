//! 画风与情绪选择
//!
//! 画风每次运行只选一次，所有插图共用；情绪按场景从文本线索推导

use serde::{Deserialize, Serialize};

/// 固定的基调标签
pub const DEFAULT_TONE: &str = "whimsical";

/// 图像服务的风格提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStyle {
    Vivid,
    Natural,
}

impl ProviderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStyle::Vivid => "vivid",
            ProviderStyle::Natural => "natural",
        }
    }
}

/// 整本故事共用的画风
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtStyle {
    label: String,
    provider_style: ProviderStyle,
}

impl ArtStyle {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn provider_style(&self) -> ProviderStyle {
        self.provider_style
    }
}

/// 主题关键字 -> (基础画风, 风格提示)
const THEME_STYLES: &[(&[&str], &str, ProviderStyle)] = &[
    (
        &["ocean", "sea", "underwater", "beach", "pirate"],
        "soft watercolor illustration with flowing blues and sea-glass greens",
        ProviderStyle::Natural,
    ),
    (
        &["space", "star", "planet", "rocket", "galaxy"],
        "vibrant digital painting with deep cosmic purples and glowing highlights",
        ProviderStyle::Vivid,
    ),
    (
        &["forest", "wood", "nature", "animal", "garden"],
        "storybook gouache illustration with warm earthy greens and golden light",
        ProviderStyle::Natural,
    ),
    (
        &["dragon", "magic", "fantasy", "fairy", "castle", "princess", "knight"],
        "rich fantasy storybook painting with luminous jewel tones",
        ProviderStyle::Vivid,
    ),
    (
        &["dinosaur", "jungle", "safari"],
        "bold colorful cartoon illustration with lush tropical greens",
        ProviderStyle::Vivid,
    ),
    (
        &["bedtime", "night", "dream", "sleep"],
        "gentle pastel illustration with soft moonlit tones",
        ProviderStyle::Natural,
    ),
];

const FALLBACK_STYLE: &str =
    "classic children's picture book illustration in soft colored pencil and watercolor";

fn theme_entry(theme: &str) -> Option<&'static (&'static [&'static str], &'static str, ProviderStyle)> {
    let theme = theme.to_lowercase();
    THEME_STYLES
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| theme.contains(k)))
}

/// 选择本次运行的画风
///
/// `style_override` 非空时替换由主题推导的画风描述，风格提示仍按主题选择
pub fn select_art_style(theme: &str, tone: &str, style_override: Option<&str>) -> ArtStyle {
    let entry = theme_entry(theme);
    let provider_style = entry.map_or(ProviderStyle::Natural, |(_, _, s)| *s);

    let label = match style_override.map(str::trim).filter(|s| !s.is_empty()) {
        Some(custom) => custom.to_string(),
        None => {
            let base = entry.map_or(FALLBACK_STYLE, |(_, base, _)| *base);
            let tone = tone.trim();
            if tone.is_empty() {
                base.to_string()
            } else {
                format!("{} {}", tone, base)
            }
        }
    };

    ArtStyle {
        label,
        provider_style,
    }
}

/// 场景情绪
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Exciting,
    Calm,
    Tense,
    Joyful,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Exciting => "exciting",
            Mood::Calm => "calm",
            Mood::Tense => "tense",
            Mood::Joyful => "joyful",
        }
    }

    /// 写入提示词的情绪描述
    pub fn description(&self) -> &'static str {
        match self {
            Mood::Exciting => "exciting and full of energy, dynamic composition",
            Mood::Calm => "calm and peaceful, soft gentle lighting",
            Mood::Tense => "suspenseful but child-friendly, dramatic lighting",
            Mood::Joyful => "joyful and warm, bright cheerful colors",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 情绪关键字（按词前缀匹配）
///
/// 顺序即平局时的优先级
const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
    (
        Mood::Tense,
        &[
            "scar", "afraid", "fear", "dark", "shadow", "storm", "danger", "trembl", "worr",
            "nervous", "lost", "creep", "growl", "thunder", "alone", "cried",
        ],
    ),
    (
        Mood::Exciting,
        &[
            "race", "raced", "rush", "leap", "jump", "zoom", "adventure", "explor", "discover",
            "fast", "quick", "chase", "soar", "dash", "hurr", "splash", "dove", "flew",
        ],
    ),
    (
        Mood::Joyful,
        &[
            "laugh", "smil", "happy", "happi", "joy", "celebrat", "cheer", "giggl", "danc",
            "sang", "sing", "hug", "delight", "party", "friend",
        ],
    ),
    (
        Mood::Calm,
        &[
            "quiet", "calm", "gentl", "soft", "sleep", "rest", "peace", "still", "slow", "dream",
            "whisper", "breez", "cozy", "snug", "float",
        ],
    ),
];

/// 从场景摘录推导情绪
///
/// 命中最多的类别获胜；平局按 tense、exciting、joyful、calm 的顺序；没有命中时为 calm
pub fn detect_mood(excerpt: &str) -> Mood {
    let words: Vec<String> = excerpt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut best = (Mood::Calm, 0usize);
    for (mood, keywords) in MOOD_KEYWORDS {
        let hits = words
            .iter()
            .filter(|w| keywords.iter().any(|k| w.starts_with(k)))
            .count();
        if hits > best.1 {
            best = (*mood, hits);
        }
    }

    best.0
}
