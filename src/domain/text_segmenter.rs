//! 文本分割器
//!
//! 把故事文本切成段落和句子，供场景提取使用

/// 默认最小字符数限制
/// 句子字符数未达到此限制时会与后一句合并
pub const DEFAULT_MIN_CHARS: usize = 40;

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 最小字符数限制（用于合并短句）
    pub min_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// 句末标点（总是分割）
#[inline]
fn is_sentence_end(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!' | '…')
}

/// 右引号 / 右括号，紧跟句末标点时归属当前句
#[inline]
fn is_closing_mark(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '\u{201D}' | '\u{2019}' | ')' | '）' | '」' | '』')
}

/// 检查片段是否只包含引号、标点或空白（应该被合并）
#[inline]
fn is_trivial_segment(s: &str) -> bool {
    s.chars()
        .all(|c| is_closing_mark(c) || is_sentence_end(c) || matches!(c, '\u{201C}' | '\u{2018}') || c.is_whitespace())
}

fn push_trimmed(segments: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
    current.clear();
}

/// 按句末标点分割（不做合并）
fn split_by_delimiters(text: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);

        if is_sentence_end(ch) {
            // 连续的句末标点和右引号（如 `!"`、`...`）归属当前句
            while let Some(&next) = chars.peek() {
                if is_sentence_end(next) || is_closing_mark(next) {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            push_trimmed(&mut segments, &mut current);
        }
    }

    push_trimmed(&mut segments, &mut current);
    segments
}

/// 合并短句直到满足 min_chars
fn merge_until_min_chars(segments: Vec<String>, min_chars: usize) -> Vec<String> {
    if segments.is_empty() {
        return segments;
    }

    let mut result: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for seg in segments {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&seg);

        if buffer.chars().count() >= min_chars {
            result.push(std::mem::take(&mut buffer));
        }
    }

    // 处理剩余buffer
    if !buffer.is_empty() {
        if let Some(last) = result.last_mut() {
            last.push(' ');
            last.push_str(&buffer);
        } else {
            result.push(buffer);
        }
    }

    result
}

/// 按空行切分段落
///
/// 段落内的换行折叠为单个空格
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// 对文本进行分句
///
/// 分句策略：
/// 1. 按段落切分，句子不跨段落合并
/// 2. 每段按句末标点分割
/// 3. 只有引号 / 标点的碎片合并到前一句
/// 4. 段内短句合并直到满足 min_chars
pub fn split_sentences(text: &str, config: &SegmentConfig) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();

    for paragraph in split_paragraphs(text) {
        let mut pieces: Vec<String> = Vec::new();
        for piece in split_by_delimiters(&paragraph) {
            if is_trivial_segment(&piece) {
                if let Some(last) = pieces.last_mut() {
                    last.push_str(&piece);
                }
            } else {
                pieces.push(piece);
            }
        }
        sentences.extend(merge_until_min_chars(pieces, config.min_chars));
    }

    sentences
}
