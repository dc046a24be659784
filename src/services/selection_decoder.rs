//! 模型回答解析 - 业务能力层
//!
//! 从模型的自由文本回答中提取被选中的论文序号。
//! 回答中形如 `[2,5]` 的数组都会被识别，序号从 1 开始，结果转换为从 0 开始。

use regex::Regex;
use tracing::debug;

const NUMERIC_ARRAY_PATTERN: &str = r"\[[\d,]+\]";
const ALL_MARKER: &str = "[all]";
const NONE_MARKER: &str = "[none]";

/// 提取回答中所有数字数组，按出现顺序拼接成组内下标（0-based）
///
/// 不会失败：无法解析的元素（空串、溢出、`0`）直接跳过，
/// 没有匹配时返回空列表。`[all]` / `[none]` 这类文字标记不在此语法内。
pub fn decode(answer: &str) -> Vec<usize> {
    let Ok(re) = Regex::new(NUMERIC_ARRAY_PATTERN) else {
        return Vec::new();
    };

    let mut indices = Vec::new();
    for matched in re.find_iter(answer) {
        let body = matched.as_str().trim_start_matches('[').trim_end_matches(']');
        for token in body.split(',') {
            match token.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) => indices.push(index),
                None => debug!("忽略无法解析的序号 '{}' (来自 {})", token, matched.as_str()),
            }
        }
    }
    indices
}

/// 针对一个分组解析回答
///
/// 在 [`decode`] 的基础上识别提示词里约定的文字标记：
/// 回答中没有任何数字数组时，`[all]` 选中整组，`[none]` 表示不选。
pub fn decode_for_group(answer: &str, group_len: usize) -> Vec<usize> {
    let indices = decode(answer);
    if !indices.is_empty() {
        return indices;
    }

    let lowered = answer.to_lowercase();
    if lowered.contains(ALL_MARKER) {
        debug!("回答选择了整组 ({} 篇)", group_len);
        return (0..group_len).collect();
    }
    if !lowered.contains(NONE_MARKER) {
        debug!("回答中没有可识别的选择: {}", crate::utils::truncate_text(answer, 80));
    }
    Vec::new()
}
